//! History persistence
//!
//! The whole conversation is stored under a single key as one JSON array and
//! rewritten in full on every change.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::Result;
use crate::types::Message;

/// Storage key (and file stem) for the conversation history
pub const HISTORY_KEY: &str = "ai-assist-chat-history";

/// Whole-history persistence
pub trait HistoryStore: Send + Sync {
    /// Read the stored history. Missing or unreadable data is an empty history.
    fn load(&self) -> Vec<Message>;

    /// Replace the stored history with `messages`
    fn save(&self, messages: &[Message]) -> Result<()>;
}

/// History kept in a JSON file
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/ai-assist-chat-history.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{}.json", HISTORY_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for FileStore {
    fn load(&self) -> Vec<Message> {
        if !self.path.exists() {
            return Vec::new();
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read history {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!("Ignoring corrupt history {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    fn save(&self, messages: &[Message]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string(messages)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// In-memory history, for `--no-history` sessions and tests
#[derive(Default)]
pub struct MemoryStore {
    messages: Mutex<Vec<Message>>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing history
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages: Mutex::new(messages),
            saves: Mutex::new(0),
        }
    }

    /// Snapshot of what was last saved
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().clone()
    }

    /// Number of `save` calls so far
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Vec<Message> {
        self.messages.lock().clone()
    }

    fn save(&self, messages: &[Message]) -> Result<()> {
        *self.messages.lock() = messages.to_vec();
        *self.saves.lock() += 1;
        Ok(())
    }
}

impl<S: HistoryStore + ?Sized> HistoryStore for std::sync::Arc<S> {
    fn load(&self) -> Vec<Message> {
        (**self).load()
    }

    fn save(&self, messages: &[Message]) -> Result<()> {
        (**self).save(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path().join("nested"));
        let messages = vec![
            Message::user("hi"),
            Message::new(Role::Assistant, "hello"),
        ];
        store.save(&messages).unwrap();
        assert_eq!(store.load(), messages);
        assert!(store.path().ends_with("ai-assist-chat-history.json"));
    }

    #[test]
    fn test_save_overwrites_whole_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        store.save(&[Message::user("a"), Message::user("b")]).unwrap();
        store.save(&[]).unwrap();
        assert!(store.load().is_empty());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let store = MemoryStore::new();
        store.save(&[Message::user("x")]).unwrap();
        store.save(&[]).unwrap();
        assert_eq!(store.save_count(), 2);
        assert!(store.load().is_empty());
    }
}
