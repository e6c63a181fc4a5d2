//! Gateway — the event loop connecting channels, the rule store, and the
//! scheduler.
//!
//! Includes: uniform command authorization, the auto-reply path, schedule
//! reconciliation at startup, and graceful shutdown.

mod auth;
mod autoreply;
mod commands;
mod scheduler;


use parrot_core::{
    config::{AuthConfig, ReplyConfig},
    matcher::MatchMode,
    message::{IncomingMessage, OutgoingMessage},
    traits::Channel,
};
use parrot_store::Store;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use commands::Command;
use scheduler::Scheduler;

/// Channel administrative commands arrive on.
const PRIMARY_CHANNEL: &str = "telegram";
/// Channel allow-listed auto-replies and scheduled sends go out on.
const SECONDARY_CHANNEL: &str = "whatsapp";

/// The central gateway that routes messages between channels and the
/// rule engine.
pub struct Gateway {
    pub(super) channels: HashMap<String, Arc<dyn Channel>>,
    pub(super) store: Store,
    pub(super) auth: AuthConfig,
    pub(super) reply: ReplyConfig,
    pub(super) match_mode: MatchMode,
    pub(super) scheduler: Scheduler,
    /// Delayed auto-replies still waiting out their pause; aborted on shutdown.
    pub(super) pending_replies: Mutex<Vec<JoinHandle<()>>>,
}

impl Gateway {
    /// Create a new gateway.
    pub fn new(
        channels: HashMap<String, Arc<dyn Channel>>,
        store: Store,
        auth: AuthConfig,
        reply: ReplyConfig,
    ) -> Self {
        let scheduler = Scheduler::new(
            store.clone(),
            channels.clone(),
            SECONDARY_CHANNEL,
            Duration::from_secs(reply.send_timeout_secs),
        );
        let match_mode = MatchMode::from_config(&reply.match_mode);
        Self {
            channels,
            store,
            auth,
            reply,
            match_mode,
            scheduler,
            pending_replies: Mutex::new(Vec::new()),
        }
    }

    /// Run the main event loop.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "Parrot gateway running | channels: {} | auth: {}",
            self.channels.keys().cloned().collect::<Vec<_>>().join(", "),
            if self.auth.admins.is_empty() {
                "open"
            } else {
                "enforced"
            },
        );

        let (tx, mut rx) = mpsc::channel::<IncomingMessage>(256);

        for (name, channel) in &self.channels {
            let mut channel_rx = channel
                .start()
                .await
                .map_err(|e| anyhow::anyhow!("failed to start channel {name}: {e}"))?;
            let tx = tx.clone();
            let channel_name = name.clone();

            tokio::spawn(async move {
                while let Some(msg) = channel_rx.recv().await {
                    if tx.send(msg).await.is_err() {
                        info!("gateway receiver dropped, stopping {channel_name} forwarder");
                        break;
                    }
                }
            });

            info!("Channel started: {name}");
        }

        drop(tx);

        // Rebuild live timers from durable schedule rows. Failing to read
        // the table at all is fatal; individual rows are skipped inside.
        let timers = self
            .scheduler
            .reconcile()
            .await
            .map_err(|e| anyhow::anyhow!("schedule reconciliation failed: {e}"))?;
        info!("Reconciled {timers} schedule timer(s)");

        // Main event loop with graceful shutdown.
        loop {
            tokio::select! {
                Some(incoming) = rx.recv() => {
                    let gw = self.clone();
                    tokio::spawn(async move {
                        gw.handle_message(incoming).await;
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Route one inbound message: primary-channel commands through the
    /// authorization gate, everything else through the matcher.
    pub(super) async fn handle_message(self: Arc<Self>, incoming: IncomingMessage) {
        if incoming.channel == PRIMARY_CHANNEL {
            if let Some(parsed) = Command::parse(&incoming.text) {
                // One uniform gate: listings are checked like mutations.
                let response = if !auth::is_authorized(&self.auth.admins, &incoming.sender_id) {
                    warn!(
                        "refused command from unauthorized sender {}",
                        incoming.sender_id
                    );
                    self.auth.deny_message.clone()
                } else {
                    match parsed {
                        Ok(cmd) => self.handle_command(cmd).await,
                        Err(e) => commands::user_message(&e, &self.auth.deny_message),
                    }
                };
                self.send_text(&incoming, &response).await;
                return;
            }
            self.autoreply_primary(&incoming).await;
        } else {
            self.autoreply_secondary(&incoming).await;
        }
    }

    /// Graceful shutdown: abort delayed replies and timers, stop channels.
    async fn shutdown(&self) {
        info!("Shutting down...");

        for handle in self.pending_replies.lock().await.drain(..) {
            handle.abort();
        }
        self.scheduler.shutdown().await;

        for (name, channel) in &self.channels {
            if let Err(e) = channel.stop().await {
                warn!("failed to stop channel {name}: {e}");
            }
        }

        info!("Shutdown complete.");
    }

    /// Send a plain text message back to the sender.
    async fn send_text(&self, incoming: &IncomingMessage, text: &str) {
        let msg = OutgoingMessage {
            text: text.to_string(),
            reply_target: incoming.reply_target.clone(),
        };

        if let Some(channel) = self.channels.get(&incoming.channel) {
            if let Err(e) = channel.send(msg).await {
                error!("failed to send message: {e}");
            }
        }
    }
}
