//! Configuration management for the FinRAG client.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (.finrag/config.yaml)
//!
//! Precedence: CLI flags > environment variables > config file > defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Default backend base URL (the FastAPI dev server).
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// Default timeout for query requests. Answer generation can be slow,
/// especially when the backend crawls live content, so this is generous.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 60;

/// Default timeout for the conversation-clear request.
pub const DEFAULT_CLEAR_TIMEOUT_SECS: u64 = 15;

/// Default timeout for the vector-stats request.
pub const DEFAULT_STATS_TIMEOUT_SECS: u64 = 10;

/// Main application configuration.
///
/// This struct holds all global configuration options that affect
/// client behavior across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend API base URL
    pub api_base: String,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Timeout for query requests, in seconds
    pub query_timeout_secs: u64,

    /// Timeout for conversation-clear requests, in seconds
    pub clear_timeout_secs: u64,

    /// Timeout for stats requests, in seconds
    pub stats_timeout_secs: u64,

    /// Default number of sources to retrieve per question
    pub top_k: u32,

    /// Default fast mode (skip live crawling, answer from the index only)
    pub fast: bool,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure (camelCase keys).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    api: Option<ApiConfig>,
    search: Option<SearchConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApiConfig {
    #[serde(rename = "baseUrl")]
    base_url: Option<String>,
    #[serde(rename = "queryTimeoutSecs")]
    query_timeout_secs: Option<u64>,
    #[serde(rename = "clearTimeoutSecs")]
    clear_timeout_secs: Option<u64>,
    #[serde(rename = "statsTimeoutSecs")]
    stats_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SearchConfig {
    #[serde(rename = "topK")]
    top_k: Option<u32>,
    fast: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            config_file: None,
            query_timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
            clear_timeout_secs: DEFAULT_CLEAR_TIMEOUT_SECS,
            stats_timeout_secs: DEFAULT_STATS_TIMEOUT_SECS,
            top_k: 4,
            fast: false,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// `config_file` is the path from the `--config` flag; it takes
    /// precedence over the `FINRAG_CONFIG` environment variable and must
    /// be resolved here, before the YAML merge happens.
    ///
    /// Environment variables:
    /// - `FINRAG_API_BASE`: Backend API base URL
    /// - `FINRAG_CONFIG`: Path to config file
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load(config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        config.config_file = config_file;
        if config.config_file.is_none() {
            if let Ok(config_file) = std::env::var("FINRAG_CONFIG") {
                config.config_file = Some(PathBuf::from(config_file));
            }
        }

        // Load from YAML config file if it exists
        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".finrag/config.yaml")
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(api_base) = std::env::var("FINRAG_API_BASE") {
            config.api_base = api_base;
        }

        if config.log_level.is_none() {
            config.log_level = std::env::var("RUST_LOG").ok();
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        Ok(self.apply_file(config_file))
    }

    /// Apply a parsed config file on top of this config.
    fn apply_file(&self, file: ConfigFile) -> Self {
        let mut result = self.clone();

        if let Some(api) = file.api {
            if let Some(base_url) = api.base_url {
                result.api_base = base_url;
            }
            if let Some(secs) = api.query_timeout_secs {
                result.query_timeout_secs = secs;
            }
            if let Some(secs) = api.clear_timeout_secs {
                result.clear_timeout_secs = secs;
            }
            if let Some(secs) = api.stats_timeout_secs {
                result.stats_timeout_secs = secs;
            }
        }

        if let Some(search) = file.search {
            if let Some(top_k) = search.top_k {
                result.top_k = top_k;
            }
            if let Some(fast) = search.fast {
                result.fast = fast;
            }
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        result
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables.
    pub fn with_overrides(
        mut self,
        api_base: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(api_base) = api_base {
            self.api_base = api_base;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Timeout for query requests.
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    /// Timeout for conversation-clear requests.
    pub fn clear_timeout(&self) -> Duration {
        Duration::from_secs(self.clear_timeout_secs)
    }

    /// Timeout for stats requests.
    pub fn stats_timeout(&self) -> Duration {
        Duration::from_secs(self.stats_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.query_timeout_secs, 60);
        assert_eq!(config.top_k, 4);
        assert!(!config.fast);
    }

    #[test]
    fn test_apply_file() {
        let yaml = r#"
api:
  baseUrl: "http://backend:8000"
  queryTimeoutSecs: 120
search:
  topK: 6
  fast: true
logging:
  level: debug
  color: false
"#;
        let file: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        let config = AppConfig::default().apply_file(file);

        assert_eq!(config.api_base, "http://backend:8000");
        assert_eq!(config.query_timeout_secs, 120);
        assert_eq!(config.clear_timeout_secs, DEFAULT_CLEAR_TIMEOUT_SECS);
        assert_eq!(config.top_k, 6);
        assert!(config.fast);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(config.no_color);
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default().with_overrides(
            Some("http://other:9000".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(config.api_base, "http://other:9000");
        assert!(config.verbose);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_load_merges_explicit_config_file() {
        let path = std::env::temp_dir().join(format!(
            "finrag-config-test-{}.yaml",
            std::process::id()
        ));
        std::fs::write(&path, "api:\n  baseUrl: \"http://from-file:8000\"\n").unwrap();

        let config = AppConfig::load(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.config_file.as_deref(), Some(path.as_path()));
        assert_eq!(config.api_base, "http://from-file:8000");
    }

    #[test]
    fn test_load_skips_missing_config_file() {
        let path = std::env::temp_dir().join("finrag-config-test-missing.yaml");
        let config = AppConfig::load(Some(path)).unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }
}
