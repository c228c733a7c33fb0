//! Command handlers for the FinRAG CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod chat;
pub mod health;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use health::HealthCommand;
pub use stats::StatsCommand;

use finrag_session::{SessionSnapshot, ALLOWED_TOP_K};

/// Clap value parser for top-k, restricted to the values the backend is
/// tuned for.
pub(crate) fn parse_top_k(value: &str) -> Result<u32, String> {
    let k: u32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if ALLOWED_TOP_K.contains(&k) {
        Ok(k)
    } else {
        Err(format!(
            "top-k must be one of {:?}",
            ALLOWED_TOP_K
        ))
    }
}

/// Print a published session snapshot as human-readable text.
pub(crate) fn print_snapshot(snapshot: &SessionSnapshot) {
    if !snapshot.error_message.is_empty() {
        eprintln!("Request failed: {}", snapshot.error_message);
    }

    if !snapshot.answer.is_empty() {
        println!("{}", snapshot.answer);
    }

    if !snapshot.sources.is_empty() {
        println!();
        println!("Sources:");
        for (i, source) in snapshot.sources.iter().enumerate() {
            let label = source.title.as_deref().unwrap_or(&source.url);
            println!("  {}. {}", i + 1, label);
            println!("     {}", source.url);
            if let Some(preview) = &source.preview {
                println!("     {}", preview);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_top_k_accepts_allowed_values() {
        assert_eq!(parse_top_k("4"), Ok(4));
        assert_eq!(parse_top_k("8"), Ok(8));
    }

    #[test]
    fn test_parse_top_k_rejects_others() {
        assert!(parse_top_k("7").is_err());
        assert!(parse_top_k("0").is_err());
        assert!(parse_top_k("four").is_err());
    }
}
