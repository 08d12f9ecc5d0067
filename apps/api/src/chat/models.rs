use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of the conversation, in the shape the upstream API expects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Request body for `POST /api/chat`. `messages` stays untyped until
/// `parse_history` so malformed input maps to a 400, not an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Option<Value>,
}

/// Validates the visitor-supplied history: a non-empty array of
/// `{role: "user"|"assistant", content: string}` objects, order preserved.
pub fn parse_history(messages: Option<&Value>) -> Result<Vec<ChatMessage>, AppError> {
    let items = messages
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::Validation("Messages array required".to_string()))?;

    if items.is_empty() {
        return Err(AppError::Validation(
            "Messages array must not be empty".to_string(),
        ));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let message: ChatMessage = serde_json::from_value(item.clone()).map_err(|_| {
                AppError::Validation(format!("Message {i} must be an object with role and content"))
            })?;
            if message.role == Role::System {
                return Err(AppError::Validation(format!(
                    "Message {i} has a role other than user or assistant"
                )));
            }
            Ok(message)
        })
        .collect()
}
