//! Long-polling update loop and Channel trait implementation.

use super::types::{TgResponse, TgUpdate};
use super::TelegramChannel;
use async_trait::async_trait;
use parrot_core::{
    error::ParrotError,
    message::{IncomingMessage, OutgoingMessage},
    traits::Channel,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, ParrotError> {
        if self.config.bot_token.is_empty() {
            return Err(ParrotError::Channel("telegram bot_token is empty".into()));
        }

        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let last_update_id = self.last_update_id.clone();

        info!("Telegram channel starting long polling...");

        tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;

            loop {
                let last = last_update_id.lock().await;
                let offset = last.map(|id| id + 1);
                drop(last);

                let mut url = format!("{base_url}/getUpdates?timeout=30");
                if let Some(off) = offset {
                    url.push_str(&format!("&offset={off}"));
                }

                let resp = match client
                    .get(&url)
                    .timeout(std::time::Duration::from_secs(35))
                    .send()
                    .await
                {
                    Ok(r) => r,
                    Err(e) => {
                        error!("telegram poll error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                let body: TgResponse<Vec<TgUpdate>> = match resp.json().await {
                    Ok(b) => b,
                    Err(e) => {
                        error!("telegram parse error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                if !body.ok {
                    error!(
                        "telegram API error (retry in {backoff_secs}s): {}",
                        body.description.unwrap_or_default()
                    );
                    tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(60);
                    continue;
                }

                // Successful poll -- reset backoff.
                backoff_secs = 1;

                let updates = body.result.unwrap_or_default();

                if let Some(last_update) = updates.last() {
                    *last_update_id.lock().await = Some(last_update.update_id);
                }

                for update in updates {
                    let msg = match update.message {
                        Some(m) => m,
                        None => continue,
                    };

                    let text = match msg.text {
                        Some(t) => t,
                        None => continue,
                    };

                    let user = match msg.from {
                        Some(u) => u,
                        None => continue,
                    };

                    // Drop group messages -- commands are person-to-person.
                    if matches!(msg.chat.chat_type.as_str(), "group" | "supergroup") {
                        debug!("telegram: ignoring group message from chat {}", msg.chat.id);
                        continue;
                    }

                    let sender_name = if let Some(ref un) = user.username {
                        format!("@{un}")
                    } else if let Some(ref ln) = user.last_name {
                        format!("{} {ln}", user.first_name)
                    } else {
                        user.first_name.clone()
                    };

                    let incoming = IncomingMessage {
                        id: Uuid::new_v4(),
                        channel: "telegram".to_string(),
                        sender_id: user.id.to_string(),
                        sender_name: Some(sender_name),
                        text,
                        timestamp: chrono::Utc::now(),
                        reply_target: Some(msg.chat.id.to_string()),
                        is_group: false,
                    };

                    if tx.send(incoming).await.is_err() {
                        info!("telegram channel receiver dropped, stopping poll");
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), ParrotError> {
        let chat_id_str = message
            .reply_target
            .as_deref()
            .ok_or_else(|| ParrotError::Channel("no reply_target on outgoing message".into()))?;

        let chat_id: i64 = chat_id_str.parse().map_err(|e| {
            ParrotError::Channel(format!("invalid telegram chat_id '{chat_id_str}': {e}"))
        })?;

        self.send_text(chat_id, &message.text).await
    }

    async fn is_ready(&self) -> bool {
        // The Bot API is stateless over HTTPS; a configured token is as
        // ready as this channel gets. Sends report their own failures.
        !self.config.bot_token.is_empty()
    }

    async fn stop(&self) -> Result<(), ParrotError> {
        info!("Telegram channel stopped");
        Ok(())
    }
}
