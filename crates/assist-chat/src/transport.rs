//! Transport abstraction for the streaming chat endpoint

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::StatusCode;
use tokio_stream::Stream;

use crate::error::{Error, Result};
use crate::types::ChatMessage;

/// Path of the streaming endpoint, relative to the server base URL
pub const CHAT_STREAM_PATH: &str = "/api/chat-stream";

/// Raw reply body, chunk by chunk
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Opens a streamed reply for a request window
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Post `messages` and return the body stream.
    ///
    /// Fails with [`Error::Status`] when the endpoint does not answer 200 and
    /// with [`Error::Network`] when the request never completes.
    async fn open(&self, messages: &[ChatMessage]) -> Result<ChunkStream>;
}

/// Posts windows to `<base_url>/api/chat-stream` with reqwest
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Create a transport for the server at `base_url`
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create with a preconfigured client
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), CHAT_STREAM_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn open(&self, messages: &[ChatMessage]) -> Result<ChunkStream> {
        tracing::debug!("POST {} with {} messages", self.endpoint, messages.len());

        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(messages)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Status {
                status: status.as_u16(),
            });
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| Error::Stream(e.to_string())));

        Ok(Box::pin(stream))
    }
}
