//! Bridge poll loop and Channel trait implementation.

use super::types::{BridgeInbox, BridgeMessage, BridgeStatus};
use super::WhatsAppChannel;
use async_trait::async_trait;
use parrot_core::{
    error::ParrotError,
    message::{IncomingMessage, OutgoingMessage},
    traits::Channel,
};
use std::sync::atomic::Ordering;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[async_trait]
impl Channel for WhatsAppChannel {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, ParrotError> {
        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let config = self.config.clone();
        let connected = self.connected.clone();
        let last_qr = self.last_qr.clone();
        let cursor = self.cursor.clone();
        let token = self.config.api_token.clone();

        info!(
            "WhatsApp channel starting bridge polling ({})...",
            config.bridge_url
        );

        tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;
            let authorize = |req: reqwest::RequestBuilder| {
                if token.is_empty() {
                    req
                } else {
                    req.bearer_auth(&token)
                }
            };

            loop {
                // --- Status: connection state + pairing QR ---
                let status_url = format!("{}/status", config.bridge_url);
                let status: BridgeStatus = match authorize(client.get(&status_url))
                    .timeout(std::time::Duration::from_secs(10))
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                {
                    Ok(resp) => match resp.json().await {
                        Ok(s) => s,
                        Err(e) => {
                            error!("bridge status parse error (retry in {backoff_secs}s): {e}");
                            tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                            backoff_secs = (backoff_secs * 2).min(60);
                            continue;
                        }
                    },
                    Err(e) => {
                        error!("bridge unreachable (retry in {backoff_secs}s): {e}");
                        connected.store(false, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                // Successful poll -- reset backoff.
                backoff_secs = 1;

                let was_connected = connected.swap(status.connected, Ordering::SeqCst);
                if status.connected && !was_connected {
                    info!("WhatsApp bridge connected");
                    // Session is valid, no more QR needed.
                    *last_qr.lock().await = None;
                } else if !status.connected && was_connected {
                    warn!("WhatsApp bridge disconnected");
                }

                if let Some(qr) = status.qr {
                    *last_qr.lock().await = Some(qr);
                }

                // --- Inbound messages ---
                if status.connected {
                    let after = cursor.load(Ordering::SeqCst);
                    let inbox_url = format!("{}/messages?after={after}", config.bridge_url);
                    match authorize(client.get(&inbox_url))
                        .timeout(std::time::Duration::from_secs(10))
                        .send()
                        .await
                        .and_then(|r| r.error_for_status())
                    {
                        Ok(resp) => match resp.json::<BridgeInbox>().await {
                            Ok(inbox) => {
                                for msg in inbox.messages {
                                    cursor.fetch_max(msg.id, Ordering::SeqCst);
                                    if let Some(incoming) = to_incoming(msg) {
                                        if tx.send(incoming).await.is_err() {
                                            info!("whatsapp channel receiver dropped, stopping poll");
                                            return;
                                        }
                                    }
                                }
                            }
                            Err(e) => error!("bridge inbox parse error: {e}"),
                        },
                        Err(e) => error!("bridge inbox fetch error: {e}"),
                    }
                }

                tokio::time::sleep(std::time::Duration::from_secs(config.poll_interval_secs)).await;
            }
        });

        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), ParrotError> {
        if !self.is_connected() {
            return Err(ParrotError::Channel(
                "whatsapp bridge not connected".into(),
            ));
        }

        let target = message
            .reply_target
            .as_deref()
            .ok_or_else(|| ParrotError::Channel("no reply_target on outgoing message".into()))?;

        self.send_text(target, &message.text).await
    }

    async fn is_ready(&self) -> bool {
        self.is_connected()
    }

    async fn stop(&self) -> Result<(), ParrotError> {
        info!("WhatsApp channel stopped");
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Convert a bridge message into the relay's inbound form.
///
/// Filters echoes of our own sends and group traffic; both are invisible to
/// the rule engine.
pub(super) fn to_incoming(msg: BridgeMessage) -> Option<IncomingMessage> {
    if msg.from_me {
        debug!("whatsapp: skipping own echo {}", msg.id);
        return None;
    }
    if msg.is_group {
        debug!("whatsapp: ignoring group message {}", msg.id);
        return None;
    }
    if msg.text.is_empty() {
        return None;
    }

    Some(IncomingMessage {
        id: Uuid::new_v4(),
        channel: "whatsapp".to_string(),
        sender_id: msg.sender.clone(),
        sender_name: msg.sender_name,
        text: msg.text,
        timestamp: chrono::Utc::now(),
        reply_target: Some(msg.sender),
        is_group: false,
    })
}
