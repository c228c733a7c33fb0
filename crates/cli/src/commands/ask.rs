//! Ask command handler.
//!
//! Drives a single submission through the query session and prints the
//! published outcome.

use std::sync::Arc;

use clap::Args;
use finrag_backend::HttpBackend;
use finrag_core::{config::AppConfig, AppError, AppResult};
use finrag_session::{QuerySession, SessionStatus};

use super::{parse_top_k, print_snapshot};

/// Ask a single question and print the answer with its sources
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Number of sources to retrieve
    #[arg(short = 'k', long = "top-k", value_parser = parse_top_k)]
    pub top_k: Option<u32>,

    /// Answer from the existing index only (skip live crawling)
    #[arg(long)]
    pub fast: bool,

    /// Output the published state as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let backend = Arc::new(HttpBackend::from_config(config));
        let session = QuerySession::new(backend);

        let top_k = self.top_k.unwrap_or(config.top_k);
        let fast = self.fast || config.fast;

        session.submit(&self.question, top_k, fast).await;

        let snapshot = session.snapshot();

        if snapshot.status == SessionStatus::Idle {
            return Err(AppError::Config("Question must not be empty".to_string()));
        }

        if self.json {
            let json = serde_json::to_string_pretty(&snapshot)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            print_snapshot(&snapshot);
        }

        if snapshot.status == SessionStatus::Error {
            return Err(AppError::Backend(snapshot.error_message));
        }

        Ok(())
    }
}
