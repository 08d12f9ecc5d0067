//! Chat Relay — assembles the system prompt and forwards the conversation upstream.
//!
//! Flow: check credential → load portfolio → summarize + analyze structure →
//!       build system prompt → call upstream → map outcome to a caller reply.
//!
//! Stateless: every request carries the full history and nothing survives it.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::chat::models::{ChatMessage, Role};
use crate::chat::prompts::{build_system_prompt, CalendarContext};
use crate::errors::AppError;
use crate::llm_client::UpstreamReply;
use crate::portfolio::cv::load_cv_text;
use crate::portfolio::summarizer::summarize_portfolio;
use crate::portfolio::RawPortfolio;
use crate::site::analyze_structure;
use crate::state::AppState;

pub const MODEL_LOADING_MESSAGE: &str = "Model sedang loading, tunggu 20 detik lalu coba lagi... \
     (Model is loading, wait 20 seconds and try again...)";
pub const INVALID_TOKEN_MESSAGE: &str = "Token tidak valid. Periksa konfigurasi token. \
     (Invalid token. Check the token configuration.)";
pub const NO_RESPONSE_MESSAGE: &str = "Maaf, tidak ada respons. Coba lagi! (Sorry, no response. Try again!)";

/// A plain-text reply for the widget. Advisory variants are delivered with
/// 200 OK so the widget shows them like any other answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayReply {
    Answer(String),
    /// Upstream returned 503.
    ModelLoading,
    /// Upstream rejected the credential (401).
    InvalidToken,
    /// Upstream succeeded with no usable content.
    NoResponse,
}

impl RelayReply {
    pub fn text(&self) -> &str {
        match self {
            RelayReply::Answer(text) => text,
            RelayReply::ModelLoading => MODEL_LOADING_MESSAGE,
            RelayReply::InvalidToken => INVALID_TOKEN_MESSAGE,
            RelayReply::NoResponse => NO_RESPONSE_MESSAGE,
        }
    }
}

/// Maps the raw upstream outcome to what the caller sees.
pub fn map_upstream(reply: UpstreamReply) -> Result<RelayReply, AppError> {
    match reply {
        UpstreamReply::Completed(Some(content)) if !content.trim().is_empty() => {
            Ok(RelayReply::Answer(content))
        }
        UpstreamReply::Completed(_) => {
            warn!("Upstream returned an empty completion");
            Ok(RelayReply::NoResponse)
        }
        UpstreamReply::Failed { status: 503, body } => {
            warn!("Upstream model unavailable: {body}");
            Ok(RelayReply::ModelLoading)
        }
        UpstreamReply::Failed { status: 401, .. } => {
            warn!("Upstream rejected the credential");
            Ok(RelayReply::InvalidToken)
        }
        UpstreamReply::Failed { status, body } => Err(AppError::Upstream {
            status,
            details: body,
        }),
    }
}

/// Pure prompt assembly: summary, structure analysis and directives for `today`.
pub fn assemble_system_prompt(
    portfolio: &RawPortfolio,
    pages: &[String],
    cv_text: Option<&str>,
    today: NaiveDate,
) -> String {
    let summary = summarize_portfolio(portfolio, cv_text);
    let structure = analyze_structure(pages, portfolio).render();
    debug!(
        "Portfolio summary length: {}, structure block length: {}",
        summary.len(),
        structure.len()
    );
    build_system_prompt(&CalendarContext::from_date(today), &structure, &summary)
}

/// Full relay for one request. `history` must already be validated.
pub async fn relay_chat(
    state: &AppState,
    history: Vec<ChatMessage>,
    today: NaiveDate,
) -> Result<RelayReply, AppError> {
    let api_key = state
        .config
        .api_key
        .as_deref()
        .ok_or(AppError::Configuration)?;

    let portfolio = state
        .portfolio
        .load()
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    let pages = state.site.pages().await;
    let cv_text = match &state.config.cv_pdf_path {
        Some(path) => load_cv_text(path).await,
        None => None,
    };

    let system_prompt = assemble_system_prompt(&portfolio, &pages, cv_text.as_deref(), today);

    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::new(Role::System, system_prompt));
    messages.extend(history);

    info!(
        "Calling upstream model {} with {} messages",
        state.llm.model(),
        messages.len()
    );
    let reply = state.llm.complete(api_key, &messages).await?;

    let reply = map_upstream(reply)?;
    if let RelayReply::Answer(text) = &reply {
        info!("Upstream answered, response length: {}", text.len());
    }
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::summarizer::ORGANIZATIONS_HEADING;
    use serde_json::json;

    fn fixture() -> RawPortfolio {
        [
            (
                "organizations".to_string(),
                json!([{"name": "Student Council", "role": "Secretary", "period": "2022 - 2023"}]),
            ),
            (
                "experience".to_string(),
                json!([{
                    "title": "Research Assistant",
                    "company": "Universitas Negeri Yogyakarta",
                    "type": "research",
                    "period": "May 2024 - July 2024"
                }]),
            ),
        ]
        .into_iter()
        .collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn test_success_passes_content_through() {
        let reply = map_upstream(UpstreamReply::Completed(Some("Halo!".into()))).unwrap();
        assert_eq!(reply, RelayReply::Answer("Halo!".into()));
        assert_eq!(reply.text(), "Halo!");
    }

    #[test]
    fn test_empty_success_is_never_empty() {
        for reply in [
            UpstreamReply::Completed(None),
            UpstreamReply::Completed(Some(String::new())),
            UpstreamReply::Completed(Some("  \n ".into())),
        ] {
            let mapped = map_upstream(reply).unwrap();
            assert_eq!(mapped, RelayReply::NoResponse);
            assert!(!mapped.text().is_empty());
        }
    }

    #[test]
    fn test_503_is_model_loading_advisory() {
        let reply = map_upstream(UpstreamReply::Failed {
            status: 503,
            body: "loading".into(),
        })
        .unwrap();
        assert_eq!(reply, RelayReply::ModelLoading);
        assert!(reply.text().contains("Model sedang loading"));
        assert!(reply.text().contains("Model is loading"));
    }

    #[test]
    fn test_401_is_invalid_token_advisory() {
        let reply = map_upstream(UpstreamReply::Failed {
            status: 401,
            body: String::new(),
        })
        .unwrap();
        assert_eq!(reply, RelayReply::InvalidToken);
        assert!(!reply.text().contains("HF_TOKEN"));
    }

    #[test]
    fn test_other_failures_are_errors() {
        let err = map_upstream(UpstreamReply::Failed {
            status: 429,
            body: "slow down".into(),
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Upstream { status: 429, ref details } if details == "slow down"));
    }

    #[test]
    fn test_organizations_section_lists_only_organizations() {
        let pages = vec!["education".to_string(), "experience".to_string()];
        let prompt = assemble_system_prompt(&fixture(), &pages, None, today());

        let organizations: Vec<&str> = prompt
            .lines()
            .skip_while(|l| *l != ORGANIZATIONS_HEADING)
            .skip(1)
            .take_while(|l| !l.starts_with("---") && !l.starts_with("==="))
            .collect();
        let organizations = organizations.join("\n");

        assert!(organizations.contains("Secretary at Student Council"));
        assert!(!organizations.contains("Research Assistant"));
        assert!(prompt.contains("--- RESEARCH EXPERIENCE ---\n• Research Assistant at Universitas Negeri Yogyakarta"));
    }

    #[test]
    fn test_prompt_embeds_date_and_structure() {
        let pages = vec!["experience".to_string()];
        let prompt = assemble_system_prompt(&fixture(), &pages, None, today());
        assert!(prompt.contains("CURRENT DATE: October 2026"));
        assert!(prompt.contains("--- WEBSITE STRUCTURE ANALYSIS ---"));
        assert!(prompt.contains("PAGE: Experience"));
        assert!(prompt.contains("PAGE: Organizations"));
    }
}
