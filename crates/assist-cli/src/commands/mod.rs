//! Slash commands for the chat REPL

mod copy;
mod window;

pub use copy::CopyCommand;
pub use window::WindowCommand;

use assist_chat::ChatSession;

/// Result of executing a slash command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Clear the conversation
    Clear,
    /// Show a message to the user (not sent to the endpoint)
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command
pub fn execute_command(input: &str, session: &ChatSession) -> Option<CommandResult> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next().unwrap_or("").to_lowercase();
    let args = parts.next().map(str::trim).unwrap_or("");

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "clear" | "c" => CommandResult::Clear,

        "copy" | "y" => CopyCommand::execute(args, session),

        "window" | "w" => WindowCommand::execute(session),

        "history" => CommandResult::Message(history_text(session)),

        "quit" | "exit" | "q" => CommandResult::Exit,

        _ => CommandResult::Unknown(command),
    })
}

fn history_text(session: &ChatSession) -> String {
    let messages = session.messages();
    if messages.is_empty() {
        return "No messages.".to_string();
    }

    let mut out = String::new();
    for (i, msg) in messages.iter().enumerate() {
        let preview = crate::utils::truncate_chars(&msg.content.replace('\n', " "), 60);
        out.push_str(&format!("  {}: [{}] {}\n", i, msg.role.as_str(), preview));
    }
    out.pop();
    out
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?        Show this help message
  /clear, /c           Clear conversation history
  /copy, /y [file]     Copy all messages to the clipboard, or write them to a file
  /window, /w          Show how much history the next message will carry
  /history             List messages in the conversation
  /quit, /exit, /q     Exit

Anything else is sent as a message."#
        .to_string()
}
