//! HTTP service embedding tables from a remote data service as HTML views.

use crate::client::DataClient;
use crate::config::Config;
use crate::embed::ErrorBody;
use crate::state::AppState;
use axum::{
    Json, Router,
    extract::{Extension, Request},
    http::{HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{any, get},
};
use opentelemetry::{global, propagation::Extractor};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub mod client;
pub mod config;
pub mod embed;
pub mod state;
pub mod telemetry;
pub mod templates;
pub mod version;

struct HeaderExtractor<'a>(&'a axum::http::HeaderMap);

impl<'a> Extractor for HeaderExtractor<'a> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

/// Builds the application router around a data client.
pub fn routes<C: DataClient>(client: C, config: Config) -> Router {
    let state = AppState::new(client);

    Router::new()
        .route("/", get(health_check))
        .nest("/embed", embed::routes::<C>())
        .nest_service("/static", ServeDir::new(config.static_dir()))
        .fallback(any(catch_all))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout(),
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let parent_context = global::get_text_map_propagator(|propagator| {
                    propagator.extract(&HeaderExtractor(request.headers()))
                });

                let span = tracing::info_span!(
                    "http_request",
                    http_request.method = ?request.method(),
                    http_request.uri = ?request.uri(),
                    http_request.version = ?request.version(),
                    http_request.user_agent = ?request.headers().get(axum::http::header::USER_AGENT),
                    otp_trace_id = tracing::field::Empty,
                );

                span.set_parent(parent_context);

                span
            }),
        )
        .layer(Extension(config))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthBody {
    ok: bool,
    message: &'static str,
}

async fn health_check(Extension(config): Extension<Config>) -> impl IntoResponse {
    let mut response = Json(HealthBody {
        ok: true,
        message: "Service is healthy",
    })
    .into_response();

    // Env names and version strings are plain ASCII; skip the header otherwise.
    let env = *config.environment();
    if let Ok(value) = HeaderValue::from_str(&env.to_string()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-service-env"), value);
    }
    if let Ok(value) = HeaderValue::from_str(&version::format_version_for_env(env)) {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-service-version"), value);
    }

    response
}

async fn catch_all() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Field, MockDataClient, TableResponse};
    use axum::{body::Body, http::Request};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn client() -> MockDataClient {
        MockDataClient::new().with_table(
            "acme",
            "sales-data",
            "orders",
            TableResponse {
                data: serde_json::from_value(json!([
                    {"rcd___id": 1, "a": "x", "b": 2},
                    {"rcd___id": 2, "a": "y", "b": 1},
                ]))
                .unwrap(),
                fields: vec![Field::new("a", "Name"), Field::new("b", "Qty")],
            },
        )
    }

    fn app() -> Router {
        routes(client(), Config::new_for_test())
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_check_reports_env_and_version() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-service-env").unwrap(), "local");
        let version = response.headers().get("x-service-version").unwrap();
        assert!(version.to_str().unwrap().starts_with("main:"));

        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body, json!({"ok": true, "message": "Service is healthy"}));
    }

    #[tokio::test]
    async fn unknown_path_is_json_404() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/nothing/here")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body, json!({"ok": false, "message": "Not found"}));
    }

    #[tokio::test]
    async fn table_embed_renders_html() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/embed/acme/sales-data/orders?order=b")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("<title>Sales Data</title>"));
        assert!(html.contains("<th>name</th><th>qty</th>"));
        assert!(!html.contains("rcd___id"));
        let y = html.find("<td>y</td>").unwrap();
        let x = html.find("<td>x</td>").unwrap();
        assert!(y < x, "rows sorted by qty");
    }

    #[tokio::test]
    async fn table_embed_missing_table_is_404() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/embed/acme/sales-data/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["message"], embed::NOT_FOUND_MESSAGE);
    }
}
