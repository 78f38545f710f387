use serde::Deserialize;
use std::env::vars;
use std::fmt::Display;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Env {
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "test")]
    Test,
    #[serde(rename = "pr")]
    Pr,
    #[serde(rename = "prod")]
    Prod,
}

impl Display for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Test => write!(f, "test"),
            Self::Pr => write!(f, "pr"),
            Self::Prod => write!(f, "prod"),
        }
    }
}

const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// The final, validated configuration struct.
// Loaded once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    env: Env,
    server_addr: String,
    port: u16,
    // Remote data service
    data_api_url: String,
    data_api_token: Option<String>,
    static_dir: String,
    request_timeout: Duration,
}

// An intermediate struct for deserializing environment variables
// where most settings are optional.
#[derive(Deserialize)]
struct RawConfig {
    env: Env,
    server_addr: Option<String>,
    port: Option<u16>,
    data_api_url: String,
    data_api_token: Option<String>,
    static_dir: Option<String>,
    request_timeout_secs: Option<u64>,
}

impl Config {
    /// Create a test configuration with default values.
    ///
    /// Available to both unit and integration tests; not meant for production.
    pub fn new_for_test() -> Self {
        Self {
            env: Env::Local,
            server_addr: "127.0.0.1".to_owned(),
            port: 8080,
            data_api_url: "http://127.0.0.1:9000".to_owned(),
            data_api_token: None,
            static_dir: DEFAULT_STATIC_DIR.to_owned(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Same as [`Config::new_for_test`] with a different static directory.
    pub fn new_for_test_with_static_dir(static_dir: impl Into<String>) -> Self {
        Self {
            static_dir: static_dir.into(),
            ..Self::new_for_test()
        }
    }

    /// Point a configuration at another data service, e.g. a wiremock server.
    pub fn with_data_api(mut self, url: impl Into<String>, token: Option<String>) -> Self {
        self.data_api_url = url.into();
        self.data_api_token = token;
        self
    }

    pub fn environment(&self) -> &Env {
        &self.env
    }

    pub fn server_addr(&self) -> &str {
        &self.server_addr
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn data_api_url(&self) -> &str {
        &self.data_api_url
    }

    pub fn data_api_token(&self) -> Option<&str> {
        self.data_api_token.as_deref()
    }

    pub fn static_dir(&self) -> &str {
        &self.static_dir
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn is_local(&self) -> bool {
        matches!(self.env, Env::Local)
    }

    /// Reads configuration from environment variables and applies
    /// environment-aware defaults.
    pub fn init() -> anyhow::Result<Self> {
        let raw_config: RawConfig = serde_env::from_iter(vars())?;
        Self::from_raw(raw_config)
    }

    fn from_raw(raw_config: RawConfig) -> anyhow::Result<Self> {
        let RawConfig {
            env,
            server_addr,
            port,
            data_api_url,
            data_api_token,
            static_dir,
            request_timeout_secs,
        } = raw_config;

        let server_addr = match server_addr {
            Some(addr) => {
                info!("Using provided SERVER_ADDR: {}", addr);
                addr
            }
            None => {
                let default_addr = match env {
                    Env::Local => "127.0.0.1",
                    _ => "0.0.0.0",
                };
                info!(
                    "SERVER_ADDR not set, defaulting to {} for {} environment",
                    default_addr, env
                );
                default_addr.to_owned()
            }
        };

        let port = match port {
            Some(port) => port,
            None if matches!(env, Env::Local) => {
                info!("PORT not set, defaulting to 8080 for local environment");
                8080
            }
            None => anyhow::bail!("PORT must be set for {} environment", env),
        };

        if data_api_url.trim().is_empty() {
            anyhow::bail!("DATA_API_URL must not be empty");
        }

        // The token is only optional while talking to a local or test data service
        if data_api_token.is_none() && !matches!(env, Env::Local | Env::Test) {
            anyhow::bail!("DATA_API_TOKEN must be set for {} environment", env);
        }

        let request_timeout_secs = request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Self {
            env,
            server_addr,
            port,
            data_api_url: data_api_url.trim_end_matches('/').to_owned(),
            data_api_token,
            static_dir: static_dir.unwrap_or_else(|| DEFAULT_STATIC_DIR.to_owned()),
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_env::from_iter;

    #[test]
    fn local_defaults_apply() {
        let raw: RawConfig = from_iter(vec![
            ("ENV", "local"),
            ("DATA_API_URL", "http://localhost:9000/"),
        ])
        .expect("RawConfig should deserialize");

        let config = Config::from_raw(raw).expect("local config should build");
        assert_eq!(config.server_addr(), "127.0.0.1");
        assert_eq!(config.port(), 8080);
        assert_eq!(config.data_api_url(), "http://localhost:9000");
        assert_eq!(config.static_dir(), "static");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.data_api_token().is_none());
        assert!(config.is_local());
    }

    #[test]
    fn default_server_addr_for_pr_is_public() {
        let raw: RawConfig = from_iter(vec![
            ("ENV", "pr"),
            ("PORT", "8081"),
            ("DATA_API_URL", "https://data.example.com"),
            ("DATA_API_TOKEN", "token"),
        ])
        .expect("RawConfig should deserialize");

        let config = Config::from_raw(raw).expect("pr config should build");
        assert_eq!(config.server_addr(), "0.0.0.0");
        assert_eq!(config.port(), 8081);
        assert_eq!(config.data_api_token(), Some("token"));
    }

    #[test]
    fn port_required_outside_local() {
        let raw: RawConfig = from_iter(vec![
            ("ENV", "prod"),
            ("DATA_API_URL", "https://data.example.com"),
            ("DATA_API_TOKEN", "token"),
        ])
        .expect("RawConfig should deserialize");

        let err = Config::from_raw(raw).unwrap_err().to_string();
        assert!(err.contains("PORT"));
    }

    #[test]
    fn token_required_for_prod() {
        let raw: RawConfig = from_iter(vec![
            ("ENV", "prod"),
            ("PORT", "8080"),
            ("DATA_API_URL", "https://data.example.com"),
        ])
        .expect("RawConfig should deserialize");

        let err = Config::from_raw(raw).unwrap_err().to_string();
        assert!(err.contains("DATA_API_TOKEN"));
    }

    #[test]
    fn token_optional_for_test_env() {
        let raw: RawConfig = from_iter(vec![
            ("ENV", "test"),
            ("PORT", "8080"),
            ("DATA_API_URL", "http://data.internal"),
        ])
        .expect("RawConfig should deserialize");

        assert!(Config::from_raw(raw).is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let raw: RawConfig = from_iter(vec![
            ("ENV", "local"),
            ("DATA_API_URL", "http://localhost:9000"),
            ("REQUEST_TIMEOUT_SECS", "0"),
        ])
        .expect("RawConfig should deserialize");

        let err = Config::from_raw(raw).unwrap_err().to_string();
        assert!(err.contains("REQUEST_TIMEOUT_SECS"));
    }

    #[test]
    fn custom_static_dir_and_timeout() {
        let raw: RawConfig = from_iter(vec![
            ("ENV", "local"),
            ("DATA_API_URL", "http://localhost:9000"),
            ("STATIC_DIR", "/srv/static"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ])
        .expect("RawConfig should deserialize");

        let config = Config::from_raw(raw).expect("config should build");
        assert_eq!(config.static_dir(), "/srv/static");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }
}
