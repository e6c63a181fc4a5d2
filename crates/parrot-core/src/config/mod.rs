mod channels;
mod defaults;


pub use channels::*;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ParrotError;
use defaults::*;

/// Top-level Parrot configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub parrot: ParrotConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub reply: ReplyConfig,
}

/// General relay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParrotConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ParrotConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Administrator authorization.
///
/// Every command — mutations and listings alike — passes this gate.
/// An empty admin set means open mode: every requester is authorized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Sender IDs permitted to issue commands. Empty = allow all.
    #[serde(default)]
    pub admins: Vec<String>,
    /// Message sent to unauthorized requesters.
    #[serde(default = "default_deny_message")]
    pub deny_message: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admins: Vec::new(),
            deny_message: default_deny_message(),
        }
    }
}

/// Durable store config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Auto-reply behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyConfig {
    /// Pause before a secondary-channel auto-reply, in seconds.
    #[serde(default = "default_reply_delay_secs")]
    pub delay_secs: u64,
    /// Default country code prefixed to bare phone numbers.
    #[serde(default = "default_country_code")]
    pub country_code: String,
    /// Trigger overlap policy: "first" (storage order) or "longest".
    #[serde(default = "default_match_mode")]
    pub match_mode: String,
    /// Hard deadline for a single outbound send, in seconds.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            delay_secs: default_reply_delay_secs(),
            country_code: default_country_code(),
            match_mode: default_match_mode(),
            send_timeout_secs: default_send_timeout_secs(),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, ParrotError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ParrotError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| ParrotError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
