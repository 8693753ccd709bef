//! HTTP API v1.
//!
//! Endpoints:
//!
//! - `POST   /v1/chat`            — Run one turn, get reply and map view
//! - `POST   /v1/sessions`        — Start a session
//! - `GET    /v1/sessions/{id}`   — Transcript and current map view
//! - `DELETE /v1/sessions/{id}`   — End a session
//! - `GET    /v1/facilities?q=`   — Map view for an ad-hoc query

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use baymed_agent::TurnEngine;
use baymed_core::{FilterCategory, Message};
use baymed_dataset::MapView;
use baymed_session::{SessionId, SessionRegistry};

// ── State ─────────────────────────────────────────────────────────────────

/// Shared state for the v1 API.
pub struct ApiV1State {
    pub engine: Arc<TurnEngine>,
    pub sessions: RwLock<SessionRegistry>,
}

impl ApiV1State {
    pub fn new(engine: Arc<TurnEngine>, max_sessions: usize) -> Self {
        Self {
            engine,
            sessions: RwLock::new(SessionRegistry::new(max_sessions)),
        }
    }
}

pub type SharedApiState = Arc<ApiV1State>;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/sessions", post(create_session_handler))
        .route(
            "/sessions/{id}",
            get(get_session_handler).delete(delete_session_handler),
        )
        .route("/facilities", get(facilities_handler))
        .with_state(state)
}

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<SessionId>,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: SessionId,
    pub reply: String,
    pub filter: FilterCategory,
    pub view: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: SessionId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub role: String,
    pub content: String,
    pub timestamp: String,
}

impl From<&Message> for MessageDto {
    fn from(m: &Message) -> Self {
        Self {
            id: m.id.clone(),
            role: m.role.as_str().to_string(),
            content: m.content.clone(),
            timestamp: m.timestamp.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionDetailResponse {
    pub session_id: SessionId,
    pub messages: Vec<MessageDto>,
    pub filter: FilterCategory,
    pub view: serde_json::Value,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct FacilitiesQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

fn view_json(view: &MapView) -> serde_json::Value {
    serde_json::to_value(view).unwrap_or(serde_json::Value::Null)
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn chat_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let utterance = payload.message.trim();
    if utterance.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "message must not be empty"));
    }

    // An unknown id starts a fresh session under that id.
    let (session_id, session) = {
        let mut sessions = state.sessions.write().await;
        let id = payload.session_id.unwrap_or_else(|| sessions.create());
        let session = sessions.get_or_create(&id);
        (id, session)
    };

    info!(session = %session_id, message_len = utterance.chars().count(), "v1/chat request");

    // Holding the session's own lock serializes turns on it. The registry
    // lock is already released, so other sessions proceed.
    let mut conversation = session.lock().await;
    let outcome = state.engine.handle_turn(&mut conversation, utterance).await;
    drop(conversation);

    Ok(Json(ChatResponse {
        session_id,
        reply: outcome.reply.content,
        filter: outcome.filter,
        view: view_json(&outcome.view),
    }))
}

async fn create_session_handler(
    State(state): State<SharedApiState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session_id = state.sessions.write().await.create();
    info!(session = %session_id, "Session created");
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

async fn get_session_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> Result<Json<SessionDetailResponse>, ApiError> {
    let session = state
        .sessions
        .read()
        .await
        .get(&id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("unknown session: {id}")))?;
    let conversation = session.lock().await.clone();

    let view = state.engine.view(&conversation);

    Ok(Json(SessionDetailResponse {
        session_id: id,
        messages: conversation.store.messages().iter().map(MessageDto::from).collect(),
        filter: conversation.last_filter,
        view: view_json(&view),
        created_at: conversation.created_at.to_rfc3339(),
        updated_at: conversation.updated_at.to_rfc3339(),
    }))
}

async fn delete_session_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> StatusCode {
    if state.sessions.write().await.remove(&id) {
        info!(session = %id, "Session deleted");
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn facilities_handler(
    State(state): State<SharedApiState>,
    Query(query): Query<FacilitiesQuery>,
) -> Json<MapView> {
    let q = query.q.unwrap_or_default();
    Json(state.engine.preview(&q))
}

// ── Tests ─────────────────────────────────────────────────────────────────
