//! API routes for the chat server

pub mod chat;
pub mod stats;

use axum::{
    extract::rejection::JsonRejection,
    routing::{get, post},
    Json, Router,
};
use crate::error::{Error, Result};
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(stats::health))
        .route("/chat", post(chat::chat))
        .route("/clear", post(chat::clear_conversation))
        .route("/stats", get(stats::stats))
        .route("/info", get(info))
}

/// Unwrap a JSON body, reporting malformed or mistyped bodies as invalid input
pub(crate) fn json_body<T>(
    payload: std::result::Result<Json<T>, JsonRejection>,
    expected: &str,
) -> Result<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        Error::invalid_input(format!("Request body must be a JSON object with {}", expected))
    })
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "juniper-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Bilingual (English / Roman Urdu) medical research assistant",
        "endpoints": {
            "GET /api/health": "Service health with engine statistics",
            "POST /api/chat": "Ask a question: {message, conversation_id?, language?}",
            "POST /api/clear": "Forget a conversation: {conversation_id}",
            "GET /api/stats": "Engine statistics",
            "GET /api/info": "This listing"
        },
        "languages": ["en", "ur"]
    }))
}
