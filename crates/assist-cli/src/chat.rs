//! Interactive chat (simple stdin/stdout)

use std::io::{self, Write};
use std::sync::Arc;

use assist_chat::{
    CharEstimate, ChatSession, Error, FileStore, Gpt3Tokenizer, HistoryStore, HttpTransport,
    MemoryStore, SendOutcome, Tokenizer,
};

use crate::commands::{self, CommandResult};
use crate::config::{Config, DEFAULT_CHAT_URL};

/// Options for `assist chat`
#[derive(clap::Args, Debug, Default)]
pub struct ChatArgs {
    /// Server exposing /api/chat-stream (default: http://localhost:3000)
    #[arg(short, long)]
    pub url: Option<String>,

    /// Token budget for the history sent with each message
    #[arg(short, long)]
    pub budget: Option<usize>,

    /// History file
    #[arg(long)]
    pub history: Option<String>,

    /// Keep history in memory only
    #[arg(long)]
    pub no_history: bool,

    /// Tokenizer for windowing (gpt3, estimate)
    #[arg(long)]
    pub tokenizer: Option<String>,

    /// Send a single message and exit
    #[arg(short = 'c', long)]
    pub message: Option<String>,
}

/// Pick the tokenizer by name, falling back to the estimate when BPE tables fail to load
pub fn make_tokenizer(name: &str) -> Arc<dyn Tokenizer> {
    match name.to_lowercase().as_str() {
        "estimate" | "chars" => Arc::new(CharEstimate),
        _ => match Gpt3Tokenizer::new() {
            Ok(tokenizer) => Arc::new(tokenizer),
            Err(e) => {
                tracing::warn!("{}; falling back to character estimate", e);
                Arc::new(CharEstimate)
            }
        },
    }
}

/// Build a session from flags and config (flags take precedence)
pub fn build_session(args: &ChatArgs, cfg: &Config) -> ChatSession {
    let base_url = args
        .url
        .clone()
        .or(cfg.chat.base_url.clone())
        .unwrap_or_else(|| DEFAULT_CHAT_URL.to_string());

    let budget = args
        .budget
        .or(cfg.chat.token_budget)
        .unwrap_or(assist_chat::window::DEFAULT_TOKEN_BUDGET);

    let tokenizer_name = args
        .tokenizer
        .clone()
        .or(cfg.chat.tokenizer.clone())
        .unwrap_or_else(|| "gpt3".to_string());

    let store: Box<dyn HistoryStore> = if args.no_history {
        Box::new(MemoryStore::new())
    } else {
        let path = args
            .history
            .as_ref()
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|| cfg.history_path());
        tracing::debug!("History file: {}", path.display());
        Box::new(FileStore::new(path))
    };

    ChatSession::open(
        store,
        Arc::new(HttpTransport::new(&base_url)),
        make_tokenizer(&tokenizer_name),
    )
    .with_budget(budget)
}

/// Send whatever is in the input buffer and print the reply as it streams
pub async fn send_and_print(session: &mut ChatSession) -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    let result = session
        .send(|delta| {
            print!("{}", delta);
            let _ = stdout.flush();
        })
        .await;

    match result {
        Ok(SendOutcome::Replied { .. }) => println!(),
        // the assistant simply does not answer
        Ok(SendOutcome::NoReply { .. }) => {}
        Err(Error::Stream(e)) => {
            println!();
            eprintln!("Reply interrupted: {}", e);
        }
        Err(e) if e.is_guard() || e.is_request_failure() => eprintln!("Error: {}", e),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Run a single message (non-interactive)
pub async fn run_message(session: &mut ChatSession, message: &str) -> anyhow::Result<()> {
    session.set_input(message);
    send_and_print(session).await
}

/// Run the REPL until EOF or /quit
pub async fn run_interactive(session: &mut ChatSession) -> anyhow::Result<()> {
    if io::IsTerminal::is_terminal(&io::stderr()) {
        eprintln!(
            "assist chat ({} messages in history, budget {} tokens). /help for commands.",
            session.messages().len(),
            session.budget()
        );
        eprintln!();
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let line = input.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }

        if let Some(result) = commands::execute_command(line, session) {
            match result {
                CommandResult::Clear => {
                    session.clear()?;
                    println!("Cleared conversation.");
                }
                CommandResult::Exit => break,
                CommandResult::Message(msg) => println!("{}", msg),
                CommandResult::Unknown(cmd) => {
                    println!("Unknown command: /{}", cmd);
                    println!("Type /help for available commands.");
                }
            }
            continue;
        }

        session.set_input(line);
        send_and_print(session).await?;
    }

    Ok(())
}
