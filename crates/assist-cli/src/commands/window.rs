//! /window command - show what the next request would carry

use super::CommandResult;
use assist_chat::ChatSession;

pub struct WindowCommand;

impl WindowCommand {
    pub fn execute(session: &ChatSession) -> CommandResult {
        let window = session.window();
        let tokens: usize = window.iter().map(|m| session.count_tokens(&m.content)).sum();

        CommandResult::Message(format!(
            "Context window: {} of {} messages, ~{} of {} tokens",
            window.len(),
            session.messages().len(),
            tokens,
            session.budget()
        ))
    }
}
