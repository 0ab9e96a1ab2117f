//! Context windowing
//!
//! Picks the newest messages that fit a token budget. The budget is never
//! exceeded: if the newest message alone is too large, the window is empty.

use crate::tokenizer::Tokenizer;
use crate::types::Message;

/// Default token budget for a request window
pub const DEFAULT_TOKEN_BUDGET: usize = 3000;

/// Select the longest suffix of `history` whose token total is at most `max_tokens`.
///
/// Walks from the newest message backwards and stops at the first message that
/// would push the running total over the budget; older messages are never
/// considered after that point, so the result is always contiguous.
pub fn select_window<'a>(
    history: &'a [Message],
    max_tokens: usize,
    tokenizer: &dyn Tokenizer,
) -> &'a [Message] {
    let mut sum = 0usize;
    let mut start = history.len();

    for (index, message) in history.iter().enumerate().rev() {
        let count = tokenizer.count(&message.content);
        if sum + count > max_tokens {
            break;
        }
        sum += count;
        start = index;
    }

    &history[start..]
}

/// Total tokens of a slice of messages
pub fn total_tokens(messages: &[Message], tokenizer: &dyn Tokenizer) -> usize {
    messages.iter().map(|m| tokenizer.count(&m.content)).sum()
}
