//! /copy command - export the conversation text

use super::CommandResult;
use assist_chat::{ChatSession, Error};

pub struct CopyCommand;

impl CopyCommand {
    pub fn execute(args: &str, session: &ChatSession) -> CommandResult {
        let text = match session.transcript() {
            Ok(text) => text,
            Err(Error::EmptyHistory) => {
                return CommandResult::Message("No messages to copy.".to_string());
            }
            Err(e) => return CommandResult::Message(format!("Copy failed: {}", e)),
        };
        let count = session.messages().len();

        if !args.is_empty() {
            return match std::fs::write(args, &text) {
                Ok(()) => CommandResult::Message(format!("Wrote {} messages to {}", count, args)),
                Err(e) => CommandResult::Message(format!("Failed to write {}: {}", args, e)),
            };
        }

        match copy_to_clipboard(&text) {
            Ok(()) => CommandResult::Message(format!("Copied {} messages.", count)),
            Err(e) => CommandResult::Message(format!(
                "Clipboard unavailable ({}). Use /copy <file> instead.",
                e
            )),
        }
    }
}

#[cfg(feature = "clipboard")]
fn copy_to_clipboard(text: &str) -> Result<(), String> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| e.to_string())?;
    clipboard.set_text(text.to_string()).map_err(|e| e.to_string())
}

#[cfg(not(feature = "clipboard"))]
fn copy_to_clipboard(_text: &str) -> Result<(), String> {
    Err("built without clipboard support".to_string())
}
