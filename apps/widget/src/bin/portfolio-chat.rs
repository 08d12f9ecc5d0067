//! Terminal front-end for the portfolio chat widget.
//!
//! Commands: `/suggest [n]`, `/clear`, `/quit`. Ctrl-C while a reply is
//! streaming abandons it; at the prompt it exits.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use portfolio_widget::{
    ChatWidget, FileSessionStore, HttpTransport, Rejection, SendOutcome, SUGGESTED_QUESTIONS,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_CHAT_ENDPOINT: &str = "http://localhost:8080/api/chat";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let endpoint =
        std::env::var("CHAT_ENDPOINT").unwrap_or_else(|_| DEFAULT_CHAT_ENDPOINT.to_string());

    // History lives as long as this session's directory.
    let session_dir = tempfile::Builder::new()
        .prefix("portfolio-chat-")
        .tempdir()?;
    info!("Session storage at {}", session_dir.path().display());

    let widget = Arc::new(ChatWidget::mount(
        Arc::new(FileSessionStore::new(session_dir.path())),
        Arc::new(HttpTransport::new(endpoint.clone())),
    ));
    widget.open();

    println!("Chat with Zizi ({endpoint}). /suggest, /clear, /quit");
    print_suggestions(&widget);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };
        let line = line.trim();

        match line.split_once(' ').map_or((line, ""), |(cmd, rest)| (cmd, rest.trim())) {
            ("/quit", _) => break,
            ("/clear", _) => match widget.clear() {
                Ok(()) => {
                    println!("(conversation cleared)");
                    print_suggestions(&widget);
                }
                Err(rejection) => println!("(cannot clear: {rejection:?})"),
            },
            ("/suggest", "") => print_suggestions(&widget),
            ("/suggest", n) => match n.parse::<usize>() {
                Ok(n) if n >= 1 => {
                    println!("> {}", SUGGESTED_QUESTIONS.get(n - 1).copied().unwrap_or(""));
                    let outcome = run_send(&widget, SendInput::Suggestion(n - 1)).await;
                    report(&widget, outcome);
                }
                _ => println!("(usage: /suggest <1-{}>)", SUGGESTED_QUESTIONS.len()),
            },
            _ => {
                let outcome = run_send(&widget, SendInput::Text(line)).await;
                report(&widget, outcome);
            }
        }
    }

    Ok(())
}

enum SendInput<'a> {
    Text(&'a str),
    Suggestion(usize),
}

/// Streams the reply to stdout as it arrives. Ctrl-C closes the panel,
/// which cancels the read.
async fn run_send(widget: &Arc<ChatWidget>, input: SendInput<'_>) -> (SendOutcome, String) {
    let watcher = {
        let widget = widget.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                widget.close();
            }
        })
    };

    let mut shown = String::new();
    let on_update = |full: &str| {
        print!("{}", &full[shown.len()..]);
        let _ = std::io::stdout().flush();
        shown.replace_range(.., full);
    };
    let outcome = match input {
        SendInput::Text(text) => widget.send(text, on_update).await,
        SendInput::Suggestion(index) => widget.send_suggestion(index, on_update).await,
    };
    watcher.abort();

    (outcome, shown)
}

fn report(widget: &ChatWidget, (outcome, shown): (SendOutcome, String)) {
    match outcome {
        // Already printed while streaming.
        SendOutcome::Committed(message) if message.content == shown => println!(),
        SendOutcome::Committed(message) if shown.is_empty() => println!("{}", message.content),
        SendOutcome::Committed(message) => println!("\n{}", message.content),
        SendOutcome::Cancelled => {
            println!("\n(reply cancelled)");
            widget.open();
        }
        SendOutcome::Rejected(Rejection::EmptyInput) => {}
        SendOutcome::Rejected(rejection) => println!("(not sent: {rejection:?})"),
    }
}

fn print_suggestions(widget: &ChatWidget) {
    let suggestions = widget.suggested_questions();
    if suggestions.is_empty() {
        return;
    }
    println!("Suggested questions:");
    for (i, question) in suggestions.iter().enumerate() {
        println!("  /suggest {}  {question}", i + 1);
    }
}
