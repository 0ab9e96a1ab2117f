//! Chat session: history, request windowing and streamed reply accumulation

use std::sync::Arc;

use futures::StreamExt;

use crate::decode::Utf8Decoder;
use crate::error::{Error, Result};
use crate::store::HistoryStore;
use crate::tokenizer::Tokenizer;
use crate::transport::ChatTransport;
use crate::types::{ChatMessage, Message};
use crate::window::{DEFAULT_TOKEN_BUDGET, select_window};

/// What happened to a sent message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The reply streamed to completion
    Replied { chars: usize },
    /// The endpoint answered with a non-200 status; no assistant message was created
    NoReply { status: u16 },
}

/// A single conversation backed by a history store.
///
/// Every mutation of the history (user message, assistant message creation,
/// each streamed chunk, clear) is followed by a full save.
pub struct ChatSession {
    messages: Vec<Message>,
    input: String,
    budget: usize,
    store: Box<dyn HistoryStore>,
    transport: Arc<dyn ChatTransport>,
    tokenizer: Arc<dyn Tokenizer>,
}

impl ChatSession {
    /// Open a session, loading the stored history once
    pub fn open(
        store: Box<dyn HistoryStore>,
        transport: Arc<dyn ChatTransport>,
        tokenizer: Arc<dyn Tokenizer>,
    ) -> Self {
        let messages = store.load();
        tracing::debug!("Loaded {} messages from history", messages.len());
        Self {
            messages,
            input: String::new(),
            budget: DEFAULT_TOKEN_BUDGET,
            store,
            transport,
            tokenizer,
        }
    }

    /// Set the token budget for request windows
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input buffer
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// The messages the next request would carry, given the current history
    pub fn window(&self) -> &[Message] {
        select_window(&self.messages, self.budget, self.tokenizer.as_ref())
    }

    /// Token count of a piece of text under this session's tokenizer
    pub fn count_tokens(&self, text: &str) -> usize {
        self.tokenizer.count(text)
    }

    /// Send the input buffer and stream the reply into a new assistant message.
    ///
    /// `on_delta` sees each decoded piece of the reply as it is appended.
    /// A failure while reading the body returns [`Error::Stream`]; the
    /// assistant message keeps whatever had arrived.
    pub async fn send(&mut self, mut on_delta: impl FnMut(&str)) -> Result<SendOutcome> {
        if self.input.trim().is_empty() {
            return Err(Error::EmptyInput);
        }

        let text = std::mem::take(&mut self.input);
        self.messages.push(Message::user(text));
        self.persist()?;

        let window: Vec<ChatMessage> = self.window().iter().map(Message::to_chat).collect();
        tracing::debug!(
            "Sending {} of {} messages (budget {})",
            window.len(),
            self.messages.len(),
            self.budget
        );

        let mut stream = match self.transport.open(&window).await {
            Ok(stream) => stream,
            Err(Error::Status { status }) => {
                tracing::debug!("No reply: endpoint returned status {}", status);
                return Ok(SendOutcome::NoReply { status });
            }
            Err(e) => return Err(e),
        };

        self.messages.push(Message::assistant_empty());
        self.persist()?;

        let mut decoder = Utf8Decoder::new();
        let mut chars = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            let text = decoder.decode(&chunk);
            if text.is_empty() {
                continue;
            }
            chars += self.append_reply(&text)?;
            on_delta(&text);
        }

        let rest = decoder.finish();
        if !rest.is_empty() {
            chars += self.append_reply(&rest)?;
            on_delta(&rest);
        }

        Ok(SendOutcome::Replied { chars })
    }

    /// Remove every message
    pub fn clear(&mut self) -> Result<()> {
        self.messages.clear();
        self.persist()
    }

    /// All message contents joined by newlines
    pub fn transcript(&self) -> Result<String> {
        if self.messages.is_empty() {
            return Err(Error::EmptyHistory);
        }
        Ok(self
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn append_reply(&mut self, text: &str) -> Result<usize> {
        if let Some(reply) = self.messages.last_mut() {
            reply.content.push_str(text);
        }
        self.persist()?;
        Ok(text.chars().count())
    }

    fn persist(&self) -> Result<()> {
        self.store.save(&self.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::tokenizer::CharEstimate;
    use crate::transport::ChunkStream;
    use crate::types::Role;
    use async_trait::async_trait;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    enum Reply {
        Chunks(Vec<Vec<u8>>),
        Status(u16),
        /// Yields the chunks and then a read error
        Broken(Vec<Vec<u8>>),
    }

    struct MockTransport {
        replies: Mutex<VecDeque<Reply>>,
        requests: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl MockTransport {
        fn new(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<Vec<ChatMessage>> {
            self.requests.lock().clone()
        }
    }

    #[async_trait]
    impl ChatTransport for MockTransport {
        async fn open(&self, messages: &[ChatMessage]) -> Result<ChunkStream> {
            self.requests.lock().push(messages.to_vec());
            let reply = self
                .replies
                .lock()
                .pop_front()
                .unwrap_or(Reply::Chunks(vec![]));
            let items: Vec<Result<Bytes>> = match reply {
                Reply::Status(status) => return Err(Error::Status { status }),
                Reply::Chunks(chunks) => chunks.into_iter().map(|c| Ok(Bytes::from(c))).collect(),
                Reply::Broken(chunks) => chunks
                    .into_iter()
                    .map(|c| Ok(Bytes::from(c)))
                    .chain(std::iter::once(Err(Error::Stream("connection reset".into()))))
                    .collect(),
            };
            Ok(Box::pin(futures::stream::iter(items)))
        }
    }

    fn text(parts: &[&str]) -> Vec<Vec<u8>> {
        parts.iter().map(|p| p.as_bytes().to_vec()).collect()
    }

    fn make_session(transport: Arc<MockTransport>, store: Arc<MemoryStore>) -> ChatSession {
        ChatSession::open(Box::new(store), transport, Arc::new(CharEstimate))
    }

    #[tokio::test]
    async fn test_chunks_accumulate_in_order() {
        let transport = MockTransport::new(vec![Reply::Chunks(text(&["Hel", "lo", " world"]))]);
        let store = Arc::new(MemoryStore::new());
        let mut session = make_session(transport.clone(), store.clone());

        session.set_input("hi");
        let mut deltas = Vec::new();
        let outcome = session.send(|d| deltas.push(d.to_string())).await.unwrap();

        assert_eq!(outcome, SendOutcome::Replied { chars: 11 });
        assert_eq!(deltas, vec!["Hel", "lo", " world"]);
        assert_eq!(session.input(), "");

        let msgs = session.messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, Role::User);
        assert_eq!(msgs[0].content, "hi");
        assert_eq!(msgs[1].role, Role::Assistant);
        assert_eq!(msgs[1].content, "Hello world");
        assert_eq!(store.messages(), msgs);
    }

    #[tokio::test]
    async fn test_persists_after_every_mutation() {
        let transport = MockTransport::new(vec![Reply::Chunks(text(&["a", "b", "c"]))]);
        let store = Arc::new(MemoryStore::new());
        let mut session = make_session(transport, store.clone());

        session.set_input("go");
        session.send(|_| {}).await.unwrap();
        // user append + assistant creation + 3 chunks
        assert_eq!(store.save_count(), 5);

        session.clear().unwrap();
        assert_eq!(store.save_count(), 6);
        assert!(store.messages().is_empty());
    }

    #[tokio::test]
    async fn test_request_carries_window_without_ids() {
        let transport = MockTransport::new(vec![Reply::Chunks(text(&["ok"]))]);
        let store = Arc::new(MemoryStore::with_messages(vec![
            Message::user("first"),
            Message::new(Role::Assistant, "reply"),
        ]));
        let mut session = make_session(transport.clone(), store);

        session.set_input("second");
        session.send(|_| {}).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let contents: Vec<&str> = requests[0].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "reply", "second"]);
    }

    #[tokio::test]
    async fn test_window_respects_budget() {
        let transport = MockTransport::new(vec![Reply::Chunks(vec![])]);
        let store = Arc::new(MemoryStore::with_messages(vec![Message::user(
            "an older message that is far too long for the budget",
        )]));
        let mut session = make_session(transport.clone(), store).with_budget(2);

        session.set_input("short");
        session.send(|_| {}).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].len(), 1);
        assert_eq!(requests[0][0].content, "short");
    }

    #[tokio::test]
    async fn test_oversized_message_sends_empty_window() {
        let transport = MockTransport::new(vec![Reply::Chunks(text(&["?"]))]);
        let store = Arc::new(MemoryStore::new());
        let mut session = make_session(transport.clone(), store).with_budget(1);

        session.set_input("this message is well over one token");
        session.send(|_| {}).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].is_empty());
    }

    #[tokio::test]
    async fn test_non_ok_status_keeps_user_message_only() {
        let transport = MockTransport::new(vec![Reply::Status(500)]);
        let store = Arc::new(MemoryStore::new());
        let mut session = make_session(transport, store.clone());

        session.set_input("hello?");
        let outcome = session.send(|_| {}).await.unwrap();

        assert_eq!(outcome, SendOutcome::NoReply { status: 500 });
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, Role::User);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_stream_failure_keeps_partial_reply() {
        let transport = MockTransport::new(vec![Reply::Broken(text(&["par", "tial"]))]);
        let store = Arc::new(MemoryStore::new());
        let mut session = make_session(transport, store.clone());

        session.set_input("tell me");
        let err = session.send(|_| {}).await.unwrap_err();

        assert!(matches!(err, Error::Stream(_)));
        let msgs = session.messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[1].content, "partial");
        assert_eq!(store.messages()[1].content, "partial");
    }

    #[tokio::test]
    async fn test_split_utf8_chunk() {
        // "é" is 0xC3 0xA9
        let chunks = vec![b"caf\xc3".to_vec(), b"\xa9!".to_vec()];
        let transport = MockTransport::new(vec![Reply::Chunks(chunks)]);
        let store = Arc::new(MemoryStore::new());
        let mut session = make_session(transport, store);

        session.set_input("coffee");
        session.send(|_| {}).await.unwrap();
        assert_eq!(session.messages()[1].content, "café!");
    }

    #[tokio::test]
    async fn test_blank_input_is_rejected_without_io() {
        let transport = MockTransport::new(vec![]);
        let store = Arc::new(MemoryStore::new());
        let mut session = make_session(transport.clone(), store.clone());

        session.set_input("   \n");
        let err = session.send(|_| {}).await.unwrap_err();

        assert!(matches!(err, Error::EmptyInput));
        assert!(session.messages().is_empty());
        assert!(transport.requests().is_empty());
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_reply_leaves_empty_assistant_message() {
        let transport = MockTransport::new(vec![Reply::Chunks(vec![])]);
        let store = Arc::new(MemoryStore::new());
        let mut session = make_session(transport, store);

        session.set_input("anyone?");
        let outcome = session.send(|_| {}).await.unwrap();
        assert_eq!(outcome, SendOutcome::Replied { chars: 0 });
        assert_eq!(session.messages()[1].content, "");
    }

    #[test]
    fn test_transcript() {
        let store = Arc::new(MemoryStore::with_messages(vec![
            Message::user("q"),
            Message::new(Role::Assistant, "a"),
        ]));
        let session = make_session(MockTransport::new(vec![]), store);
        assert_eq!(session.transcript().unwrap(), "q\na");
    }

    #[test]
    fn test_transcript_empty_guard() {
        let session = make_session(MockTransport::new(vec![]), Arc::new(MemoryStore::new()));
        assert!(matches!(session.transcript(), Err(Error::EmptyHistory)));
    }

    #[test]
    fn test_open_loads_history() {
        let store = Arc::new(MemoryStore::with_messages(vec![Message::user("saved")]));
        let session = make_session(MockTransport::new(vec![]), store);
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.budget(), DEFAULT_TOKEN_BUDGET);
    }
}
