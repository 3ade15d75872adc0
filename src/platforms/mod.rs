// src/platforms/mod.rs

pub mod telegram;

use thiserror::Error;

pub use telegram::TelegramApi;

/// Per-call failure classification for the outbound transport. `Blocked`
/// is terminal for that recipient (they denied delivery); everything else
/// is lumped into `Other` and treated the same for batch purposes.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("recipient has blocked the sender")]
    Blocked,

    #[error("transport failure: {0}")]
    Other(String),
}

/// Outbound messaging surface. No batch primitive exists; the dispatcher
/// supplies batching and pacing on top of these per-recipient calls.
#[async_trait::async_trait]
pub trait Messaging: Send + Sync {
    /// Send a text message; returns the platform message id.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64, TransportError>;

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), TransportError>;

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TransportError>;
}
