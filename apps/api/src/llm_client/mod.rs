/// LLM Client — the single point of entry for all upstream chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the upstream API directly.
/// All LLM interactions MUST go through this module.
///
/// Speaks the OpenAI-compatible `/v1/chat/completions` protocol. One request per
/// call, no retries: an unavailable model is reported back to the visitor as an
/// advisory instead of being retried server-side.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::chat::models::ChatMessage;

pub mod prompts;

const MAX_TOKENS: u32 = 600;
const TEMPERATURE: f32 = 0.7;
const TOP_P: f32 = 0.9;
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl CompletionResponse {
    /// Content of the first choice, if any.
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
    }
}

/// What the upstream said, before any caller-facing mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamReply {
    /// 2xx; content of the first choice (possibly missing or blank).
    Completed(Option<String>),
    /// Any non-2xx status with the raw response body.
    Failed { status: u16, body: String },
}

/// The single upstream client. Cheap to clone; shares the connection pool.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_url: String, model: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_url,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends the full message list (system message first) and returns the raw outcome.
    pub async fn complete(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
    ) -> Result<UpstreamReply, LlmError> {
        let request_body = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            stream: false,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        debug!("Upstream responded with {status}");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Ok(UpstreamReply::Failed {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let parsed: CompletionResponse = serde_json::from_slice(&body)?;
        Ok(UpstreamReply::Completed(parsed.into_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::models::Role;

    #[test]
    fn test_request_body_carries_fixed_parameters() {
        let messages = vec![ChatMessage::new(Role::User, "hello")];
        let body = CompletionRequest {
            model: "m",
            messages: &messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            stream: false,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "m");
        assert_eq!(value["max_tokens"], 600);
        assert_eq!(value["stream"], false);
        assert!((value["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((value["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hello");
    }

    #[test]
    fn test_first_choice_content_extracted() {
        let parsed: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Hi!"}},{"message":{"content":"ignored"}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("Hi!"));
    }

    #[test]
    fn test_missing_choices_yields_none() {
        let parsed: CompletionResponse = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert!(parsed.into_text().is_none());

        let parsed: CompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(parsed.into_text().is_none());
    }
}
