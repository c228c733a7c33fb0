//! FinRAG CLI
//!
//! Main entry point for the finrag command-line tool.
//! A client for asking natural-language questions against a live-RAG
//! backend and viewing the generated answer alongside its sources.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, HealthCommand, StatsCommand};
use finrag_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// FinRAG CLI - ask questions against a live-RAG news backend
#[derive(Parser, Debug)]
#[command(name = "finrag")]
#[command(about = "Ask questions against a live-RAG news backend", long_about = None)]
#[command(version)]
struct Cli {
    /// Backend API base URL
    #[arg(short, long, global = true, env = "FINRAG_API_BASE")]
    api_base: Option<String>,

    /// Path to config file
    #[arg(short, long, global = true, env = "FINRAG_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a single question and print the answer with its sources
    Ask(AskCommand),

    /// Interactive chat session against the backend
    Chat(ChatCommand),

    /// Show backend vector store statistics
    Stats(StatsCommand),

    /// Check backend reachability
    Health(HealthCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration; an explicit --config path must be known
    // before the YAML merge, so it goes into load() rather than the
    // override pass.
    let config = AppConfig::load(cli.config)?;

    // Apply CLI overrides
    let config = config.with_overrides(cli.api_base, cli.log_level, cli.verbose, cli.no_color);

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("FinRAG CLI starting");
    tracing::debug!("API base: {}", config.api_base);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Stats(_) => "stats",
        Commands::Health(_) => "health",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
        Commands::Health(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
