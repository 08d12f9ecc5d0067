// Chat widget client
// Implements: panel/phase state machine, session-scoped history persistence,
// and streaming consumption of the chat endpoint's plain-text replies.

pub mod error;
pub mod message;
pub mod store;
pub mod transport;
pub mod widget;

pub use error::WidgetError;
pub use message::{Message, Role};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, HISTORY_KEY};
pub use transport::{ChatTransport, ChunkStream, HttpTransport};
pub use widget::{ChatWidget, Panel, Phase, Rejection, SendOutcome, SUGGESTED_QUESTIONS};
