//! CLI configuration.

use std::path::PathBuf;

use talent_client::ClientConfig;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, coloured
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Front-end configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Backend client settings
    pub client: ClientConfig,
    /// Directory holding the persisted credential
    pub state_dir: PathBuf,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            state_dir: default_state_dir(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl CliConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            client: ClientConfig::from_env(),
            state_dir: std::env::var("TALENT_STATE_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_state_dir),
            log_format: std::env::var("LOG_FORMAT")
                .map(|v| {
                    if v.to_lowercase() == "json" {
                        LogFormat::Json
                    } else {
                        LogFormat::Pretty
                    }
                })
                .unwrap_or_default(),
        }
    }
}

/// `$HOME/.talent-match`, or `./.talent-match` without a home directory.
fn default_state_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".talent-match")
}
