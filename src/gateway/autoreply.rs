//! The auto-reply path: match inbound text against the rule set and send
//! the configured reply.
//!
//! Primary-channel traffic replies immediately and is never allow-list
//! filtered. Secondary-channel traffic is gated by the allow-list and
//! paused for a few seconds before sending, so replies read as typed by a
//! person rather than fired by a machine.

use super::{Gateway, SECONDARY_CHANNEL};
use parrot_core::{
    matcher::find_reply,
    message::{IncomingMessage, OutgoingMessage},
    phone,
};
use std::time::Duration;
use tracing::{debug, error, info, warn};

impl Gateway {
    /// Primary-channel auto-reply: immediate, unfiltered.
    pub(super) async fn autoreply_primary(&self, incoming: &IncomingMessage) {
        let Some(reply) = self.match_reply(&incoming.text).await else {
            return;
        };
        self.send_text(incoming, &reply).await;
    }

    /// Secondary-channel auto-reply: allow-list gated and delayed.
    pub(super) async fn autoreply_secondary(&self, incoming: &IncomingMessage) {
        let contact = match phone::normalize_contact(&incoming.sender_id, &self.reply.country_code)
        {
            Ok(c) => c,
            Err(e) => {
                debug!("unparseable whatsapp sender '{}': {e}", incoming.sender_id);
                return;
            }
        };

        match self.store.is_allowed(&contact).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("{contact} is not on the allow-list, ignoring");
                return;
            }
            Err(e) => {
                error!("allow-list lookup failed: {e}");
                return;
            }
        }

        let Some(reply) = self.match_reply(&incoming.text).await else {
            return;
        };

        let Some(channel) = self.channels.get(SECONDARY_CHANNEL).cloned() else {
            error!("no '{SECONDARY_CHANNEL}' channel for auto-reply");
            return;
        };

        // Route back to the raw transport target, not the normalized id.
        let target = incoming
            .reply_target
            .clone()
            .unwrap_or_else(|| contact.clone());
        let msg = OutgoingMessage::to_target(target, reply);
        let delay = Duration::from_secs(self.reply.delay_secs);
        let send_timeout = self.send_timeout();

        // Tracked so shutdown can abort replies still waiting out the pause.
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !channel.is_ready().await {
                warn!("whatsapp not ready, dropping auto-reply to {contact}");
                return;
            }
            match tokio::time::timeout(send_timeout, channel.send(msg)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("auto-reply send failed: {e}"),
                Err(_) => error!("auto-reply send timed out"),
            }
        });

        let mut pending = self.pending_replies.lock().await;
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Match inbound text against one consistent snapshot of the rule set.
    async fn match_reply(&self, text: &str) -> Option<String> {
        let snapshot = match self.store.rules_snapshot().await {
            Ok(s) => s,
            Err(e) => {
                error!("failed to load rules for matching: {e}");
                return None;
            }
        };

        find_reply(text, &snapshot, self.match_mode).map(|(trigger, reply)| {
            info!("rule \"{trigger}\" fired");
            reply.to_string()
        })
    }
}
