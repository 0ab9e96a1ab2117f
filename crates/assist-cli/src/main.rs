//! assist - streaming chat REPL and usage downloader

mod chat;
mod commands;
mod config;
mod usage;
mod utils;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// assist - chat with a streaming endpoint and export API usage
#[derive(Parser, Debug)]
#[command(name = "assist")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chat with the streaming endpoint (history is kept between runs)
    Chat(chat::ChatArgs),
    /// Download per-day usage as JSON or CSV
    Usage(usage::UsageArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("assist=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(args.verbose);

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();

    match args.command {
        Some(Command::Chat(chat_args)) => {
            let mut session = chat::build_session(&chat_args, &cfg);
            match chat_args.message {
                Some(ref message) => chat::run_message(&mut session, message).await,
                None => chat::run_interactive(&mut session).await,
            }
        }
        Some(Command::Usage(usage_args)) => usage::run_usage(usage_args, &cfg).await,
        None => {
            let mut session = chat::build_session(&chat::ChatArgs::default(), &cfg);
            chat::run_interactive(&mut session).await
        }
    }
}
