//! HTTP API gateway for BayMed.
//!
//! Serves the embedded chat-and-map frontend, a health check, and the v1
//! API the frontend talks to.
//!
//! Built on Axum.

pub mod api_v1;
pub mod frontend;

use axum::extract::DefaultBodyLimit;
use axum::{Router, extract::State, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use baymed_agent::TurnEngine;
use baymed_config::AppConfig;
use baymed_dataset::{DataStatus, DatasetLoader};

/// Request bodies above this size are rejected.
pub const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Build the full router: health, v1 API, and frontend.
///
/// Layers applied:
/// - Request body size limit (64 KiB)
/// - HTTP trace logging
pub fn build_router(api_state: api_v1::SharedApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(api_state.clone())
        .nest("/v1", api_v1::v1_router(api_state))
        .merge(frontend::frontend_router())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// The dataset is read once here and shared by every session.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let dataset = DatasetLoader::new(&config.dataset.path).load();
    let engine = Arc::new(TurnEngine::from_config(&config, dataset)?);
    if !engine.has_credentials() {
        tracing::warn!("No API key configured; chat replies will carry a setup notice");
    }

    let api_state = Arc::new(api_v1::ApiV1State::new(engine, config.gateway.max_sessions));
    let app = build_router(api_state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    facilities: usize,
    dataset: DataStatus,
}

async fn health_handler(State(state): State<api_v1::SharedApiState>) -> Json<HealthResponse> {
    let dataset = state.engine.dataset();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        facilities: dataset.records.len(),
        dataset: dataset.status.clone(),
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::{CountingProvider, test_engine};
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> api_v1::SharedApiState {
        let provider = Arc::new(CountingProvider::replying("ok"));
        Arc::new(api_v1::ApiV1State::new(test_engine(provider, false), 10))
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state());

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["facilities"], 4);
        assert_eq!(json["dataset"]["state"], "loaded");
    }

    #[tokio::test]
    async fn v1_is_nested() {
        let app = build_router(test_state());

        let req = Request::builder()
            .method("POST")
            .uri("/v1/sessions")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let app = build_router(test_state());
        let message = "港".repeat(BODY_LIMIT_BYTES);
        let body = serde_json::json!({ "message": message }).to_string();

        let req = Request::builder()
            .method("POST")
            .uri("/v1/chat")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn missing_credentials_reply_without_calling_out() {
        let provider = Arc::new(CountingProvider::replying("unused"));
        let state = Arc::new(api_v1::ApiV1State::new(test_engine(provider.clone(), false), 10));

        let req = Request::builder()
            .method("POST")
            .uri("/v1/chat")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"message":"港大深圳医院怎么走？"}"#))
            .unwrap();

        let response = build_router(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["reply"], baymed_agent::MISSING_CONFIGURATION_REPLY);
        assert_eq!(provider.calls(), 0);
    }
}
