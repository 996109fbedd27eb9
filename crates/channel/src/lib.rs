//! Persistent availability push channel.
//!
//! This crate owns the client side of the live inventory feed:
//! - [`ConnectionState`]: explicit connection state machine
//! - [`ReconnectPolicy`]: bounded backoff between reconnection attempts
//! - [`Transport`] / [`Connection`]: the pluggable wire, with an in-memory
//!   implementation for tests and a WebSocket implementation for production
//! - [`AvailabilityChannel`]: the running channel task: subscription
//!   diffing, keepalive, reconnection, and delivery of normalized
//!   [`DeltaNotification`]s to the consumer

pub mod backoff;
pub mod channel;
pub mod error;
pub mod state;
pub mod transport;
pub mod websocket;

pub use backoff::ReconnectPolicy;
pub use channel::{AvailabilityChannel, ChannelConfig, DeltaNotification};
pub use error::ChannelError;
pub use state::{ChannelStatus, ConnectionState};
pub use transport::{Connection, InMemoryConnection, InMemoryTransport, ServerHandle, Transport};
pub use websocket::WebSocketTransport;
