//! Outbound sends through the bridge — chunking and retry logic.

use super::WhatsAppChannel;
use crate::utils::split_message;
use parrot_core::error::ParrotError;
use tracing::{error, warn};

/// Retry delays for exponential backoff: 500ms, 1s, 2s.
pub(super) const RETRY_DELAYS_MS: [u64; 3] = [500, 1000, 2000];

impl WhatsAppChannel {
    /// Send a text message to a phone-number target, chunked to WhatsApp's
    /// 4096-character limit, with up to 3 attempts per chunk.
    pub(super) async fn send_text(&self, to: &str, text: &str) -> Result<(), ParrotError> {
        for chunk in split_message(text, 4096) {
            self.send_chunk(to, chunk).await?;
        }
        Ok(())
    }

    async fn send_chunk(&self, to: &str, body: &str) -> Result<(), ParrotError> {
        let url = format!("{}/send", self.config.bridge_url);
        let payload = serde_json::json!({ "to": to, "body": body });
        let mut last_err = None;

        for (attempt, delay_ms) in RETRY_DELAYS_MS.iter().enumerate() {
            let result = self
                .authorize(self.client.post(&url).json(&payload))
                .send()
                .await
                .and_then(|r| r.error_for_status());

            match result {
                Ok(_) => return Ok(()),
                Err(e) => {
                    let attempt_num = attempt + 1;
                    if attempt_num < RETRY_DELAYS_MS.len() {
                        warn!(
                            "whatsapp send attempt {attempt_num}/{} failed: {e}, retrying in {delay_ms}ms",
                            RETRY_DELAYS_MS.len()
                        );
                        tokio::time::sleep(std::time::Duration::from_millis(*delay_ms)).await;
                    } else {
                        error!(
                            "whatsapp send attempt {attempt_num}/{} failed: {e}, giving up",
                            RETRY_DELAYS_MS.len()
                        );
                    }
                    last_err = Some(e);
                }
            }
        }

        Err(ParrotError::Channel(format!(
            "whatsapp send failed after {} attempts: {}",
            RETRY_DELAYS_MS.len(),
            last_err.map(|e| e.to_string()).unwrap_or_default()
        )))
    }
}
