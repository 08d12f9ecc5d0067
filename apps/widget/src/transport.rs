//! Outbound side of the widget: POST the history, hand back the reply body as
//! a stream of byte chunks.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::error::WidgetError;
use crate::message::Message;

pub type ChunkStream = BoxStream<'static, Result<Bytes, WidgetError>>;

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends the full conversation. A non-2xx status is an error; the body
    /// of a successful response is returned unread.
    async fn post_chat(&self, messages: &[Message]) -> Result<ChunkStream, WidgetError>;
}

#[derive(Serialize)]
struct ChatBody<'a> {
    messages: &'a [Message],
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn post_chat(&self, messages: &[Message]) -> Result<ChunkStream, WidgetError> {
        debug!("POST {} with {} messages", self.endpoint, messages.len());

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&ChatBody { messages })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(WidgetError::Status(resp.status().as_u16()));
        }

        Ok(resp.bytes_stream().map(|c| c.map_err(WidgetError::from)).boxed())
    }
}

/// Incremental UTF-8 decoding across chunk boundaries. A multi-byte
/// character split between two chunks is held back until it is complete;
/// invalid sequences become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::new();

        loop {
            let (valid, invalid_len) = match std::str::from_utf8(&self.pending) {
                Ok(_) => (self.pending.len(), None),
                Err(e) => (e.valid_up_to(), e.error_len()),
            };
            out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));

            match invalid_len {
                Some(len) => {
                    out.push(char::REPLACEMENT_CHARACTER);
                    self.pending.drain(..valid + len);
                }
                None => {
                    // Either everything decoded or only an incomplete tail is left.
                    self.pending.drain(..valid);
                    return out;
                }
            }
        }
    }

    /// Flushes whatever is still buffered at end of stream.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_decoder_holds_split_character() {
        let bytes = "Halo 👋 Restu".as_bytes();
        let split = 7; // inside the 4-byte emoji
        let mut decoder = Utf8Decoder::new();

        let first = decoder.push(&bytes[..split]);
        assert_eq!(first, "Halo ");
        let second = decoder.push(&bytes[split..]);
        assert_eq!(format!("{first}{second}"), "Halo 👋 Restu");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_decoder_replaces_invalid_bytes() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.push(b"a\xffb"), "a\u{FFFD}b");
    }

    #[test]
    fn test_decoder_flushes_truncated_tail() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.push(&"é".as_bytes()[..1]), "");
        assert_eq!(decoder.finish(), "\u{FFFD}");
    }

    /// Minimal HTTP/1.1 server answering one request with a canned response.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= head_end + 4 + content_length || n == 0 {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}/api/chat")
    }

    #[tokio::test]
    async fn test_http_transport_streams_body() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: text/plain; charset=utf-8\r\ncontent-length: 11\r\nconnection: close\r\n\r\nHalo dunia!",
        )
        .await;

        let transport = HttpTransport::new(url);
        let mut stream = transport
            .post_chat(&[Message::user("Halo")])
            .await
            .unwrap();

        let mut body = Vec::new();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(body, b"Halo dunia!");
    }

    #[tokio::test]
    async fn test_http_transport_non_success_is_error() {
        let url = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}",
        )
        .await;

        let result = HttpTransport::new(url).post_chat(&[Message::user("Halo")]).await;
        assert!(matches!(result, Err(WidgetError::Status(500))));
    }
}
