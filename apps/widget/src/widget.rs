//! Chat widget state machine.
//!
//! `Closed → Open → (Idle ⇄ Sending ⇄ Streaming) → Idle`. One send at a time:
//! the busy flag rejects overlapping sends and is released when the send
//! finishes, however it finishes. Closing the panel abandons an in-flight
//! reply. History is written to the session store after every mutation and
//! read back on mount; storage failures are logged and otherwise ignored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::StreamExt;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::message::Message;
use crate::store::{SessionStore, HISTORY_KEY};
use crate::transport::{ChatTransport, Utf8Decoder};

pub const EMPTY_REPLY_APOLOGY: &str = "Maaf, tidak ada respons. Silakan coba lagi.";
pub const NETWORK_APOLOGY: &str = "Maaf, terjadi kesalahan. Silakan coba lagi nanti.";

/// Shortcuts offered while the conversation is empty.
pub const SUGGESTED_QUESTIONS: [&str; 4] = [
    "Apa saja project yang pernah dikerjakan Restu?",
    "What are Restu's main skills?",
    "Tell me about Restu's education background",
    "Apa pengalaman kerja Restu?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Request sent, waiting for response headers.
    Sending,
    /// Reading the reply body.
    Streaming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmptyInput,
    Busy,
    PanelClosed,
    UnknownSuggestion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was sent and history is unchanged.
    Rejected(Rejection),
    /// The assistant message (reply or apology) appended to history.
    Committed(Message),
    /// The panel was closed before the reply completed; only the user
    /// message remains in history.
    Cancelled,
}

#[derive(Debug)]
struct WidgetState {
    panel: Panel,
    phase: Phase,
    messages: Vec<Message>,
    streaming: String,
}

pub struct ChatWidget {
    store: Arc<dyn SessionStore>,
    transport: Arc<dyn ChatTransport>,
    state: Mutex<WidgetState>,
    busy: AtomicBool,
    closed: watch::Sender<bool>,
}

/// Releases the busy flag and resets the phase when a send ends.
struct SendGuard<'a>(&'a ChatWidget);

impl Drop for SendGuard<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.0.lock();
            state.phase = Phase::Idle;
            state.streaming.clear();
        }
        self.0.busy.store(false, Ordering::SeqCst);
    }
}

impl ChatWidget {
    /// Creates a closed widget, restoring any history saved for this session.
    pub fn mount(store: Arc<dyn SessionStore>, transport: Arc<dyn ChatTransport>) -> Self {
        let messages = match store.get(HISTORY_KEY) {
            Ok(Some(saved)) => serde_json::from_str(&saved).unwrap_or_else(|e| {
                debug!("Ignoring unreadable saved history: {e}");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                debug!("Could not read saved history: {e}");
                Vec::new()
            }
        };

        let (closed, _) = watch::channel(true);
        Self {
            store,
            transport,
            state: Mutex::new(WidgetState {
                panel: Panel::Closed,
                phase: Phase::Idle,
                messages,
                streaming: String::new(),
            }),
            busy: AtomicBool::new(false),
            closed,
        }
    }

    fn lock(&self) -> MutexGuard<'_, WidgetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn open(&self) {
        self.lock().panel = Panel::Open;
        self.closed.send_replace(false);
    }

    /// Closes the panel. A reply still being received is abandoned.
    pub fn close(&self) {
        self.lock().panel = Panel::Closed;
        self.closed.send_replace(true);
    }

    pub fn panel(&self) -> Panel {
        self.lock().panel
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    /// Reply text received so far for the in-flight send.
    pub fn streaming_text(&self) -> String {
        self.lock().streaming.clone()
    }

    pub fn suggested_questions(&self) -> &'static [&'static str] {
        if self.lock().messages.is_empty() {
            &SUGGESTED_QUESTIONS[..]
        } else {
            &[]
        }
    }

    /// Empties the conversation and drops the saved copy. Refused while a
    /// send is in flight.
    pub fn clear(&self) -> Result<(), Rejection> {
        if self.is_busy() {
            return Err(Rejection::Busy);
        }
        self.lock().messages.clear();
        if let Err(e) = self.store.remove(HISTORY_KEY) {
            debug!("Could not remove saved history: {e}");
        }
        Ok(())
    }

    pub async fn send_suggestion<F>(&self, index: usize, on_update: F) -> SendOutcome
    where
        F: FnMut(&str),
    {
        match SUGGESTED_QUESTIONS.get(index) {
            Some(question) => self.send(question, on_update).await,
            None => SendOutcome::Rejected(Rejection::UnknownSuggestion),
        }
    }

    /// Sends `content` with the whole conversation. `on_update` receives the
    /// accumulated reply text each time more of it arrives.
    pub async fn send<F>(&self, content: &str, mut on_update: F) -> SendOutcome
    where
        F: FnMut(&str),
    {
        let content = content.trim();
        if content.is_empty() {
            return SendOutcome::Rejected(Rejection::EmptyInput);
        }
        if self.panel() == Panel::Closed {
            return SendOutcome::Rejected(Rejection::PanelClosed);
        }
        if self.busy.swap(true, Ordering::SeqCst) {
            return SendOutcome::Rejected(Rejection::Busy);
        }
        let _guard = SendGuard(self);

        let history = {
            let mut state = self.lock();
            state.messages.push(Message::user(content));
            state.phase = Phase::Sending;
            state.streaming.clear();
            state.messages.clone()
        };
        self.persist(&history);

        let mut closed = self.closed.subscribe();

        let response = tokio::select! {
            biased;
            _ = closed.wait_for(|closed| *closed) => return SendOutcome::Cancelled,
            response = self.transport.post_chat(&history) => response,
        };

        let reply = match response {
            Ok(mut stream) => {
                self.lock().phase = Phase::Streaming;
                let mut decoder = Utf8Decoder::new();
                let mut full = String::new();
                let mut failed = false;

                loop {
                    let chunk = tokio::select! {
                        biased;
                        _ = closed.wait_for(|closed| *closed) => return SendOutcome::Cancelled,
                        chunk = stream.next() => chunk,
                    };
                    let text = match chunk {
                        Some(Ok(bytes)) => decoder.push(&bytes),
                        Some(Err(e)) => {
                            warn!("Chat reply interrupted: {e}");
                            failed = true;
                            break;
                        }
                        None => {
                            full.push_str(&decoder.finish());
                            break;
                        }
                    };
                    if !text.is_empty() {
                        full.push_str(&text);
                        self.lock().streaming.clone_from(&full);
                        on_update(&full);
                    }
                }

                if failed {
                    Message::assistant(NETWORK_APOLOGY)
                } else if full.trim().is_empty() {
                    Message::assistant(EMPTY_REPLY_APOLOGY)
                } else {
                    Message::assistant(full)
                }
            }
            Err(e) => {
                warn!("Chat request failed: {e}");
                Message::assistant(NETWORK_APOLOGY)
            }
        };

        let history = {
            let mut state = self.lock();
            state.messages.push(reply.clone());
            state.messages.clone()
        };
        self.persist(&history);

        SendOutcome::Committed(reply)
    }

    fn persist(&self, messages: &[Message]) {
        let result = if messages.is_empty() {
            self.store.remove(HISTORY_KEY)
        } else {
            serde_json::to_string(messages)
                .map_err(Into::into)
                .and_then(|json| self.store.set(HISTORY_KEY, &json))
        };
        if let Err(e) = result {
            debug!("Could not save history: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;

    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::stream;

    use super::*;
    use crate::error::WidgetError;
    use crate::message::Role;
    use crate::store::MemorySessionStore;
    use crate::transport::ChunkStream;

    enum Script {
        Chunks(Vec<&'static str>),
        Status(u16),
        /// Sends one chunk, then never finishes.
        Stall(&'static [u8]),
        /// Sends one chunk, then the connection drops.
        Break(&'static [u8]),
    }

    #[derive(Default)]
    struct ScriptedTransport {
        scripts: Mutex<VecDeque<Script>>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedTransport {
        fn new(scripts: Vec<Script>) -> Arc<Self> {
            Arc::new(Self {
                scripts: Mutex::new(scripts.into()),
                seen: Mutex::default(),
            })
        }

        fn seen(&self) -> Vec<Vec<Message>> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn post_chat(&self, messages: &[Message]) -> Result<ChunkStream, WidgetError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            let script = self.scripts.lock().unwrap().pop_front().unwrap();
            match script {
                Script::Chunks(chunks) => Ok(stream::iter(
                    chunks.into_iter().map(|c| Ok(Bytes::from_static(c.as_bytes()))),
                )
                .boxed()),
                Script::Status(status) => Err(WidgetError::Status(status)),
                Script::Stall(chunk) => Ok(stream::iter([Ok(Bytes::from_static(chunk))])
                    .chain(stream::pending())
                    .boxed()),
                Script::Break(chunk) => Ok(stream::iter([
                    Ok(Bytes::from_static(chunk)),
                    Err(WidgetError::Storage(io::Error::new(
                        io::ErrorKind::ConnectionReset,
                        "reset",
                    ))),
                ])
                .boxed()),
            }
        }
    }

    fn open_widget(
        store: Arc<MemorySessionStore>,
        transport: Arc<ScriptedTransport>,
    ) -> ChatWidget {
        let widget = ChatWidget::mount(store, transport);
        widget.open();
        widget
    }

    async fn wait_for_streaming(widget: &ChatWidget) {
        while widget.streaming_text().is_empty() {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_send_commits_streamed_reply() {
        let transport = ScriptedTransport::new(vec![Script::Chunks(vec![
            "Halo, ",
            "saya Zizi",
        ])]);
        let widget = open_widget(Arc::new(MemorySessionStore::new()), transport.clone());

        let mut updates = Vec::new();
        let outcome = widget
            .send("  Siapa kamu?  ", |text| updates.push(text.to_string()))
            .await;

        assert_eq!(
            outcome,
            SendOutcome::Committed(Message::assistant("Halo, saya Zizi"))
        );
        assert_eq!(updates, vec!["Halo, ", "Halo, saya Zizi"]);
        assert_eq!(
            widget.messages(),
            vec![
                Message::user("Siapa kamu?"),
                Message::assistant("Halo, saya Zizi")
            ]
        );
        assert_eq!(transport.seen(), vec![vec![Message::user("Siapa kamu?")]]);
        assert_eq!(widget.phase(), Phase::Idle);
        assert!(!widget.is_busy());
        assert!(widget.streaming_text().is_empty());
    }

    #[tokio::test]
    async fn test_each_send_carries_full_history() {
        let transport = ScriptedTransport::new(vec![
            Script::Chunks(vec!["satu"]),
            Script::Chunks(vec!["dua"]),
        ]);
        let widget = open_widget(Arc::new(MemorySessionStore::new()), transport.clone());

        widget.send("pertama", |_| {}).await;
        widget.send("kedua", |_| {}).await;

        let seen = transport.seen();
        assert_eq!(seen[1].len(), 3);
        assert_eq!(seen[1][1], Message::assistant("satu"));
        assert_eq!(widget.messages().len(), 4);
    }

    #[tokio::test]
    async fn test_rejections_leave_history_untouched() {
        let transport = ScriptedTransport::new(vec![]);
        let widget = ChatWidget::mount(Arc::new(MemorySessionStore::new()), transport.clone());

        assert_eq!(
            widget.send("hi", |_| {}).await,
            SendOutcome::Rejected(Rejection::PanelClosed)
        );
        widget.open();
        assert_eq!(
            widget.send("   ", |_| {}).await,
            SendOutcome::Rejected(Rejection::EmptyInput)
        );
        assert_eq!(
            widget.send_suggestion(9, |_| {}).await,
            SendOutcome::Rejected(Rejection::UnknownSuggestion)
        );
        assert!(widget.messages().is_empty());
        assert!(transport.seen().is_empty());
    }

    #[tokio::test]
    async fn test_empty_reply_gets_apology() {
        let transport = ScriptedTransport::new(vec![Script::Chunks(vec!["  ", "\n"])]);
        let widget = open_widget(Arc::new(MemorySessionStore::new()), transport);

        let outcome = widget.send("halo", |_| {}).await;
        assert_eq!(
            outcome,
            SendOutcome::Committed(Message::assistant(EMPTY_REPLY_APOLOGY))
        );
    }

    #[tokio::test]
    async fn test_failures_get_network_apology() {
        let transport = ScriptedTransport::new(vec![
            Script::Status(500),
            Script::Break(b"Restu pernah"),
        ]);
        let widget = open_widget(Arc::new(MemorySessionStore::new()), transport);

        for _ in 0..2 {
            let outcome = widget.send("halo", |_| {}).await;
            assert_eq!(
                outcome,
                SendOutcome::Committed(Message::assistant(NETWORK_APOLOGY))
            );
            assert!(!widget.is_busy());
        }
        let roles: Vec<Role> = widget.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
    }

    #[tokio::test]
    async fn test_history_survives_remount() {
        let store = Arc::new(MemorySessionStore::new());
        let transport = ScriptedTransport::new(vec![Script::Chunks(vec!["Data Scientist"])]);
        let widget = open_widget(store.clone(), transport.clone());
        widget.send("Apa pekerjaan Restu?", |_| {}).await;

        let remounted = ChatWidget::mount(store, transport);
        assert_eq!(remounted.messages(), widget.messages());
        assert_eq!(remounted.panel(), Panel::Closed);
        assert!(remounted.suggested_questions().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_saved_history_is_ignored() {
        let store = Arc::new(MemorySessionStore::new());
        store.set(HISTORY_KEY, "{not json").unwrap();

        let widget = ChatWidget::mount(store, ScriptedTransport::new(vec![]));
        assert!(widget.messages().is_empty());
        assert_eq!(widget.suggested_questions(), &SUGGESTED_QUESTIONS[..]);
    }

    #[tokio::test]
    async fn test_close_mid_stream_cancels() {
        let transport = ScriptedTransport::new(vec![Script::Stall(b"Sebentar")]);
        let widget = open_widget(Arc::new(MemorySessionStore::new()), transport);

        let (outcome, _) = tokio::join!(widget.send("halo", |_| {}), async {
            wait_for_streaming(&widget).await;
            assert_eq!(widget.phase(), Phase::Streaming);
            widget.close();
        });

        assert_eq!(outcome, SendOutcome::Cancelled);
        assert_eq!(widget.messages(), vec![Message::user("halo")]);
        assert!(!widget.is_busy());
        assert_eq!(widget.phase(), Phase::Idle);
        assert_eq!(widget.panel(), Panel::Closed);
    }

    #[tokio::test]
    async fn test_busy_rejects_second_send() {
        let transport = ScriptedTransport::new(vec![Script::Stall(b"...")]);
        let widget = open_widget(Arc::new(MemorySessionStore::new()), transport.clone());

        let (first, _) = tokio::join!(widget.send("satu", |_| {}), async {
            wait_for_streaming(&widget).await;
            assert!(widget.is_busy());
            assert_eq!(
                widget.send("dua", |_| {}).await,
                SendOutcome::Rejected(Rejection::Busy)
            );
            assert_eq!(widget.clear(), Err(Rejection::Busy));
            widget.close();
        });

        assert_eq!(first, SendOutcome::Cancelled);
        assert_eq!(transport.seen().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_forgets_saved_history() {
        let store = Arc::new(MemorySessionStore::new());
        let transport = ScriptedTransport::new(vec![Script::Chunks(vec!["ok"])]);
        let widget = open_widget(store.clone(), transport);

        widget.send_suggestion(1, |_| {}).await;
        assert_eq!(widget.messages()[0], Message::user(SUGGESTED_QUESTIONS[1]));

        widget.clear().unwrap();
        assert!(widget.messages().is_empty());
        assert_eq!(store.get(HISTORY_KEY).unwrap(), None);
        assert_eq!(widget.suggested_questions().len(), 4);
    }
}
