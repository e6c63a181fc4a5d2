use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An incoming message from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Channel name (e.g. "telegram", "whatsapp").
    pub channel: String,
    /// Platform-specific user ID (Telegram user id, WhatsApp phone number).
    pub sender_id: String,
    /// Human-readable sender name.
    pub sender_name: Option<String>,
    /// Message text content.
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Platform-specific target for routing the response (e.g. Telegram chat_id).
    #[serde(default)]
    pub reply_target: Option<String>,
    /// Whether this message comes from a group chat.
    #[serde(default)]
    pub is_group: bool,
}

/// An outgoing message to send through a channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    /// Platform-specific target for routing (e.g. Telegram chat_id, phone number).
    #[serde(default)]
    pub reply_target: Option<String>,
}

impl OutgoingMessage {
    /// Build an outgoing message addressed to a specific target.
    pub fn to_target(target: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reply_target: Some(target.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verify that `#[serde(default)]` fields get their defaults when omitted from JSON.
    #[test]
    fn test_incoming_message_serde_defaults() {
        let json = serde_json::json!({
            "id": "00000000-0000-0000-0000-000000000000",
            "channel": "telegram",
            "sender_id": "123",
            "sender_name": null,
            "text": "hello",
            "timestamp": "2026-01-01T00:00:00Z"
        });
        let msg: IncomingMessage = serde_json::from_value(json).unwrap();
        assert_eq!(msg.channel, "telegram");
        assert_eq!(msg.sender_id, "123");
        assert_eq!(msg.text, "hello");
        assert!(
            msg.reply_target.is_none(),
            "reply_target should default to None"
        );
        assert!(!msg.is_group, "is_group should default to false");
    }

    #[test]
    fn test_outgoing_to_target() {
        let msg = OutgoingMessage::to_target("919876543210", "Good morning!");
        assert_eq!(msg.text, "Good morning!");
        assert_eq!(msg.reply_target.as_deref(), Some("919876543210"));
    }
}
