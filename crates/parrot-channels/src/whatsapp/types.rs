//! Bridge REST wire types.

use serde::Deserialize;

/// `GET /status` response.
#[derive(Debug, Deserialize)]
pub(super) struct BridgeStatus {
    pub connected: bool,
    /// Current pairing QR payload; present only while unlinked.
    #[serde(default)]
    pub qr: Option<String>,
}

/// `GET /messages` response.
#[derive(Debug, Deserialize)]
pub(super) struct BridgeInbox {
    #[serde(default)]
    pub messages: Vec<BridgeMessage>,
}

/// A single inbound message relayed by the bridge.
#[derive(Debug, Deserialize)]
pub(super) struct BridgeMessage {
    /// Monotonic bridge-side id, used as the poll cursor.
    pub id: i64,
    /// Sender JID (e.g. `919876543210@s.whatsapp.net`).
    pub sender: String,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub text: String,
    /// Echo of our own outbound sends.
    #[serde(default)]
    pub from_me: bool,
    #[serde(default)]
    pub is_group: bool,
}
