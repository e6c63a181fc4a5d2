//! Outbound sends to the Telegram Bot API.

use super::types::TgResponse;
use super::TelegramChannel;
use crate::utils::split_message;
use parrot_core::error::ParrotError;

impl TelegramChannel {
    /// Send a text message to a specific chat, chunked to Telegram's
    /// 4096-character limit.
    pub(super) async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), ParrotError> {
        for chunk in split_message(text, 4096) {
            let url = format!("{}/sendMessage", self.base_url);
            let body = serde_json::json!({
                "chat_id": chat_id,
                "text": chunk,
            });

            let resp = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| ParrotError::Channel(format!("telegram send failed: {e}")))?;

            let body: TgResponse<serde_json::Value> = resp
                .json()
                .await
                .map_err(|e| ParrotError::Channel(format!("telegram send parse failed: {e}")))?;

            if !body.ok {
                return Err(ParrotError::Channel(format!(
                    "telegram API rejected send: {}",
                    body.description.unwrap_or_default()
                )));
            }
        }

        Ok(())
    }
}
