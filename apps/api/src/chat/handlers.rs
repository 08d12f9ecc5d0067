//! Axum route handler for the chat assistant.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use chrono::Local;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::chat::models::{parse_history, ChatRequest};
use crate::chat::relay::relay_chat;
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/chat
///
/// Body: `{"messages": [{"role": "user"|"assistant", "content": "..."}]}`.
/// Success and advisory replies are `text/plain`; failures are JSON errors.
/// The raw body is taken as bytes so every malformed input becomes a 400.
pub async fn handle_chat(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let request_id = Uuid::new_v4();

    async move {
        let request: ChatRequest = serde_json::from_slice(&body).map_err(|_| {
            AppError::Validation("Request body must be a JSON object".to_string())
        })?;
        let history = parse_history(request.messages.as_ref())?;
        info!("Received {} messages", history.len());

        let reply = relay_chat(&state, history, Local::now().date_naive()).await?;
        Ok(plain_text(reply.text().to_string()))
    }
    .instrument(info_span!("chat", %request_id))
    .await
}

fn plain_text(text: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        text,
    )
        .into_response()
}
