use crate::{
    error::ParrotError,
    message::{IncomingMessage, OutgoingMessage},
};
use async_trait::async_trait;

/// Messaging Channel trait — the transport boundary.
///
/// Every messaging platform (Telegram, the WhatsApp bridge, test doubles)
/// implements this trait to receive and send messages. The relay core only
/// ever talks to transports through it.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    /// Returns a receiver that yields incoming messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, ParrotError>;

    /// Send a message through this channel.
    async fn send(&self, message: OutgoingMessage) -> Result<(), ParrotError>;

    /// Whether the channel is connected and authenticated, i.e. a send
    /// issued right now would be attempted rather than dropped.
    async fn is_ready(&self) -> bool;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), ParrotError>;
}
