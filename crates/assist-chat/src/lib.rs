//! assist-chat: Streaming chat session with token-bounded context windows
//!
//! This crate keeps a conversation history, selects the most recent messages
//! that fit a token budget, posts them to a streaming endpoint and accumulates
//! the streamed reply into a single assistant message.

pub mod decode;
pub mod error;
pub mod session;
pub mod store;
pub mod tokenizer;
pub mod transport;
pub mod types;
pub mod window;

pub use error::{Error, Result};
pub use session::{ChatSession, SendOutcome};
pub use store::{FileStore, HistoryStore, MemoryStore};
pub use tokenizer::{CharEstimate, Gpt3Tokenizer, Tokenizer};
pub use transport::{ChatTransport, ChunkStream, HttpTransport};
pub use types::*;
pub use window::select_window;
