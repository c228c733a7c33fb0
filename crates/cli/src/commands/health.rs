//! Health command handler.
//!
//! Connectivity check against the backend before interactive use.

use clap::Args;
use finrag_backend::{Backend, HttpBackend};
use finrag_core::{config::AppConfig, AppError, AppResult};

/// Check backend reachability
#[derive(Args, Debug)]
pub struct HealthCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl HealthCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing health command");

        let backend = HttpBackend::from_config(config);
        let health = backend.health().await?;

        if self.json {
            let json = serde_json::to_string_pretty(&health)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else if health.is_ok() {
            println!("Backend at {} is up", config.api_base);
        } else {
            println!("Backend at {} reported: {}", config.api_base, health.status);
        }

        Ok(())
    }
}
