use serde::{Deserialize, Serialize};

use super::defaults::*;

/// Channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelConfig {
    pub telegram: Option<TelegramConfig>,
    pub whatsapp: Option<WhatsAppConfig>,
}

/// Telegram bot config — the primary (command) channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
}

/// WhatsApp bridge config — the secondary (auto-reply) channel.
///
/// The bridge is an externally run gateway speaking the WhatsApp Web
/// protocol; this process talks to it over a small local REST surface.
/// Pairing is done by scanning a QR code relayed through the bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of the bridge, e.g. `http://127.0.0.1:8077`.
    #[serde(default = "default_bridge_url")]
    pub bridge_url: String,
    /// Bearer token for the bridge API. Empty = no auth (local-only bridge).
    #[serde(default)]
    pub api_token: String,
    /// Inbound poll interval in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

pub fn default_bridge_url() -> String {
    "http://127.0.0.1:8077".to_string()
}
