//! HTTP API routes.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

use langbot_chat::{resolve_session_id, ChatError, ConversationHandler};

use crate::error::ApiError;

/// Application state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<ConversationHandler>,
}

impl AppState {
    pub fn new(handler: ConversationHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

/// Build the application router: `POST /chat`, open CORS, request tracing.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(chat))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============ Chat ============

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    // An unreadable body carries no message
    let Json(request) = payload.map_err(|rejection| {
        debug!(error = %rejection, "rejected chat request body");
        ChatError::InvalidInput
    })?;

    let message = request.message.as_deref().unwrap_or_default();
    let session_id = resolve_session_id(request.session_id.as_deref());

    let response = state.handler.handle(message, session_id).await?;
    Ok(Json(ChatResponse { response }))
}
