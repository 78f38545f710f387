//! Build information, populated at compile time by `build.rs`.

use crate::config::Env;

pub const BUILD_DATE: &str = env!("BUILD_DATE");
pub const BUILD_COMMIT: &str = env!("BUILD_COMMIT");
pub const BUILD_BRANCH: &str = env!("BUILD_BRANCH");

/// Get the package version
pub fn build_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Version string reported in the `x-service-version` header.
///
/// - Prod: `stable:{version}`
/// - PR: `pr:{commit}`
/// - Local/Test: `main:{commit}`
pub fn format_version_for_env(env: Env) -> String {
    match env {
        Env::Prod => format!("stable:{}", build_version()),
        Env::Pr => format!("pr:{BUILD_COMMIT}"),
        Env::Local | Env::Test => format!("main:{BUILD_COMMIT}"),
    }
}
