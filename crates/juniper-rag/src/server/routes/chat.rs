//! Chat and conversation endpoints

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};
use std::time::Instant;

use super::json_body;
use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{ChatRequest, ChatResponse, ClearRequest};

/// POST /api/chat - Answer a question
pub async fn chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let start = Instant::now();
    let mut request = json_body(
        payload,
        r#"a "message" string, optional "conversation_id" and optional "language" ("en" or "ur")"#,
    )?;
    let message = request.validate(state.config().validation.max_message_length)?;
    let language = request.language();

    let result = state
        .engine()
        .query(&message, request.conversation_id.as_deref(), language)
        .await;

    if let Some(kind) = result.error {
        tracing::warn!("Chat request answered with apology ({:?})", kind);
    }
    tracing::info!("Chat request processed in {}ms", start.elapsed().as_millis());

    Ok(Json(result.into()))
}

/// POST /api/clear - Forget a conversation
pub async fn clear_conversation(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ClearRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let request = json_body(payload, r#"a "conversation_id" string"#)?;
    let conversation_id = request.conversation_id()?;
    state.engine().clear_conversation(conversation_id);

    Ok(Json(json!({
        "message": "Conversation cleared successfully"
    })))
}
