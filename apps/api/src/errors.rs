use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::llm_client::LlmError;

/// Max characters of an upstream error body echoed back to the caller.
pub const MAX_UPSTREAM_DETAILS: usize = 500;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// The upstream credential is missing. Carries no detail on purpose:
    /// neither the variable names nor any value reach the response.
    #[error("Chat service is not configured")]
    Configuration,

    #[error("Upstream API error (status {status})")]
    Upstream { status: u16, details: String },

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::Configuration => {
                tracing::error!("Upstream credential is not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    "Chat service is not configured".to_string(),
                    None,
                )
            }
            AppError::Upstream { status, details } => {
                tracing::error!("Upstream API error {status}: {details}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPSTREAM_ERROR",
                    format!("API error: {status}"),
                    Some(truncate_details(details)),
                )
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                    None,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        (status, Json(error_body(code, &message, details))).into_response()
    }
}

/// Builds the `{"error": {...}}` envelope shared by every failure response.
pub fn error_body(code: &str, message: &str, details: Option<String>) -> Value {
    let mut error = json!({
        "code": code,
        "message": message,
    });
    if let Some(details) = details {
        error["details"] = Value::String(details);
    }
    json!({ "error": error })
}

fn truncate_details(details: &str) -> String {
    details.chars().take(MAX_UPSTREAM_DETAILS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_maps_to_400() {
        let (status, body) = body_json(AppError::Validation("Messages array required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Messages array required");
    }

    #[tokio::test]
    async fn test_configuration_error_names_no_variable() {
        let (status, body) = body_json(AppError::Configuration).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let rendered = body.to_string();
        assert!(!rendered.contains("HF_TOKEN"));
        assert!(!rendered.contains("HUGGINGFACE"));
    }

    #[tokio::test]
    async fn test_upstream_details_truncated() {
        let (status, body) = body_json(AppError::Upstream {
            status: 502,
            details: "x".repeat(2_000),
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "API error: 502");
        assert_eq!(
            body["error"]["details"].as_str().unwrap().len(),
            MAX_UPSTREAM_DETAILS
        );
    }
}
