//! WhatsApp channel — the secondary (auto-reply) channel.
//!
//! Talks to an externally run bridge process that speaks the WhatsApp Web
//! protocol, over a small local REST surface:
//!
//! - `GET  /status`   — connection state plus the current pairing QR payload
//! - `GET  /messages` — inbound messages after a cursor
//! - `POST /send`     — outbound text send
//!
//! Pairing works like WhatsApp Web: the bridge rotates QR payloads until one
//! is scanned; this channel buffers the latest so the binary can render it.

mod polling;
pub(crate) mod send;
pub(crate) mod types;


use parrot_core::config::WhatsAppConfig;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// WhatsApp channel backed by a web-protocol bridge.
pub struct WhatsAppChannel {
    pub(super) config: WhatsAppConfig,
    pub(super) client: reqwest::Client,
    /// Whether the bridge reports a linked, connected session.
    pub(super) connected: Arc<AtomicBool>,
    /// Last QR payload seen from the bridge — buffered so the pairing
    /// display can replay it even if it arrived before anyone was looking.
    pub(super) last_qr: Arc<Mutex<Option<String>>>,
    /// Inbound cursor: highest bridge message id already forwarded.
    pub(super) cursor: Arc<AtomicI64>,
}

impl WhatsAppChannel {
    /// Create a new WhatsApp channel from config.
    pub fn new(config: WhatsAppConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            connected: Arc::new(AtomicBool::new(false)),
            last_qr: Arc::new(Mutex::new(None)),
            cursor: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Check if the bridge session is currently linked and connected.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// The most recent pairing QR payload, if the session is unlinked.
    pub async fn current_qr(&self) -> Option<String> {
        self.last_qr.lock().await.clone()
    }

    /// One-shot bridge status probe (used by `parrot status`).
    ///
    /// Returns `Ok(true)` when the bridge is reachable and linked,
    /// `Ok(false)` when reachable but awaiting pairing.
    pub async fn probe(&self) -> Result<bool, parrot_core::error::ParrotError> {
        let url = format!("{}/status", self.config.bridge_url);
        let status: types::BridgeStatus = self
            .authorize(self.client.get(&url))
            .timeout(std::time::Duration::from_secs(5))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                parrot_core::error::ParrotError::Channel(format!("bridge unreachable: {e}"))
            })?
            .json()
            .await
            .map_err(|e| {
                parrot_core::error::ParrotError::Channel(format!("bridge status parse failed: {e}"))
            })?;
        Ok(status.connected)
    }

    /// Attach the bridge bearer token, when configured.
    pub(super) fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.config.api_token.is_empty() {
            req
        } else {
            req.bearer_auth(&self.config.api_token)
        }
    }
}
