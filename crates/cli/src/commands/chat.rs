//! Chat command handler.
//!
//! Interactive loop over one query session: questions are submitted as
//! typed, slash commands manage the conversation. This is the CLI
//! counterpart of the original long-lived search UI, including its
//! startup stats fetch and "new chat" action.

use std::sync::Arc;

use clap::Args;
use finrag_backend::HttpBackend;
use finrag_core::{config::AppConfig, AppResult};
use finrag_session::{QuerySession, ALLOWED_TOP_K};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::{parse_top_k, print_snapshot};

/// Interactive chat session against the backend
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Number of sources to retrieve per question
    #[arg(short = 'k', long = "top-k", value_parser = parse_top_k)]
    pub top_k: Option<u32>,

    /// Answer from the existing index only (skip live crawling)
    #[arg(long)]
    pub fast: bool,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let backend = Arc::new(HttpBackend::from_config(config));
        let session = QuerySession::new(backend);

        let mut top_k = self.top_k.unwrap_or(config.top_k);
        let mut fast = self.fast || config.fast;

        // Startup stats fetch, best-effort like everything stats-related.
        session.refresh_stats().await;

        let snapshot = session.snapshot();
        println!("FinRAG chat — backend {}", config.api_base);
        println!(
            "Conversation {} | indexed items: {}",
            snapshot.session_id, snapshot.stats_count
        );
        println!("Type a question, or /help for commands.");

        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let input = line.trim();

            if input.is_empty() {
                continue;
            }

            if let Some(command) = input.strip_prefix('/') {
                if !self.handle_command(command, &session, &mut top_k, &mut fast).await {
                    break;
                }
                continue;
            }

            session.submit(input, top_k, fast).await;
            print_snapshot(&session.snapshot());
            println!();
        }

        Ok(())
    }

    /// Handle a slash command. Returns false when the loop should exit.
    async fn handle_command(
        &self,
        command: &str,
        session: &QuerySession,
        top_k: &mut u32,
        fast: &mut bool,
    ) -> bool {
        let mut parts = command.split_whitespace();
        match parts.next() {
            Some("quit") | Some("exit") => return false,
            Some("new") => {
                let id = session.start_new_conversation();
                println!("Started new conversation: {}", id);
            }
            Some("fast") => {
                *fast = !*fast;
                println!("Fast mode: {}", if *fast { "on" } else { "off" });
            }
            Some("k") => match parts.next().map(str::parse::<u32>) {
                Some(Ok(k)) if ALLOWED_TOP_K.contains(&k) => {
                    *top_k = k;
                    println!("Top-k set to {}", k);
                }
                _ => println!("Usage: /k <n> where n is one of {:?}", ALLOWED_TOP_K),
            },
            Some("stats") => {
                session.refresh_stats().await;
                println!("Indexed items: {}", session.snapshot().stats_count);
            }
            Some("help") => {
                println!("/new        start a new conversation");
                println!("/fast       toggle fast mode (skip live crawling)");
                println!("/k <n>      set top-k ({:?})", ALLOWED_TOP_K);
                println!("/stats      refresh and show the indexed item count");
                println!("/quit       exit");
            }
            _ => println!("Unknown command: /{} (try /help)", command),
        }
        true
    }
}
