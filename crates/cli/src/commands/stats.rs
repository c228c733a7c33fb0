//! Stats command handler.
//!
//! Displays the backend vector store statistics.

use clap::Args;
use finrag_backend::{Backend, HttpBackend};
use finrag_core::{config::AppConfig, AppError, AppResult};

/// Show backend vector store statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let backend = HttpBackend::from_config(config);
        let stats = backend.stats().await?;

        if self.json {
            let json = serde_json::to_string_pretty(&stats)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("Indexed items: {}", stats.count);
            if let Some(collection) = &stats.collection {
                println!("Collection:    {}", collection);
            }
            if let Some(persist_dir) = &stats.persist_dir {
                println!("Persist dir:   {}", persist_dir);
            }
        }

        Ok(())
    }
}
