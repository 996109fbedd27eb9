//! Channel error types.

use thiserror::Error;

/// Errors that can occur on the push channel.
///
/// These are recorded into [`crate::ChannelStatus`] and drive reconnection;
/// they are never surfaced to the availability consumer.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The underlying transport failed (connect, send, or receive).
    #[error("transport error: {0}")]
    Transport(String),

    /// An inbound message did not parse; it is dropped, the stream continues.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The connection was closed by the peer.
    #[error("connection closed")]
    Closed,
}

impl ChannelError {
    /// Returns true for errors that only invalidate one message, not the
    /// connection.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ChannelError::Malformed(_))
    }
}
