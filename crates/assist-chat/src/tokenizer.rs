//! Token counting used for context windowing

use tiktoken_rs::CoreBPE;

use crate::error::{Error, Result};

/// Counts tokenizer units in a piece of text.
///
/// Implementations must be deterministic: the same text always yields the
/// same count, otherwise windows are not reproducible.
pub trait Tokenizer: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// The GPT-3 (`r50k_base`) byte-pair encoding.
pub struct Gpt3Tokenizer {
    bpe: CoreBPE,
}

impl Gpt3Tokenizer {
    /// Load the BPE tables
    pub fn new() -> Result<Self> {
        let bpe = tiktoken_rs::r50k_base().map_err(|e| Error::Tokenizer(e.to_string()))?;
        Ok(Self { bpe })
    }
}

impl Tokenizer for Gpt3Tokenizer {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

/// chars/4 heuristic, rounded up so that any non-empty text costs at least one token
#[derive(Debug, Clone, Copy, Default)]
pub struct CharEstimate;

impl Tokenizer for CharEstimate {
    fn count(&self, text: &str) -> usize {
        text.chars().count().div_ceil(4)
    }
}
