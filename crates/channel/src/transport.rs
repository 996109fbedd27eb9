//! Pluggable wire for the push channel.
//!
//! The channel task only ever talks to a [`Transport`]; production wires a
//! WebSocket implementation, tests wire [`InMemoryTransport`] and script the
//! server side through [`ServerHandle`].

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use availability::{ClientFrame, ServerMessage};
use common::RouteCode;
use tokio::sync::mpsc;

use crate::error::ChannelError;

/// Factory for push-channel connections.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    type Conn: Connection;

    /// Opens a connection, registering the route filter with the server as a
    /// connection-time parameter.
    async fn connect(&self, route_filter: &[RouteCode]) -> Result<Self::Conn, ChannelError>;
}

/// One established push-channel connection.
#[async_trait]
pub trait Connection: Send {
    /// Sends a control frame to the server.
    async fn send(&mut self, frame: &ClientFrame) -> Result<(), ChannelError>;

    /// Receives the next message; `None` means the connection is gone.
    ///
    /// A `Some(Err(_))` with [`ChannelError::is_malformed`] invalidates only
    /// that message, not the connection.
    async fn next_message(&mut self) -> Option<Result<ServerMessage, ChannelError>>;

    /// Closes the connection.
    async fn close(&mut self);
}

#[derive(Debug, Default)]
struct TransportState {
    fail_connects: u32,
    connect_attempts: usize,
    servers: Vec<ServerHandle>,
}

/// In-memory transport for tests.
///
/// Each successful `connect` produces a connection whose server side is
/// scripted through the matching [`ServerHandle`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransport {
    state: Arc<Mutex<TransportState>>,
}

impl InMemoryTransport {
    /// Creates a new in-memory transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` connection attempts fail.
    pub fn fail_next_connects(&self, count: u32) {
        self.state.lock().unwrap().fail_connects = count;
    }

    /// Returns the total number of connection attempts, failed ones included.
    pub fn connect_attempts(&self) -> usize {
        self.state.lock().unwrap().connect_attempts
    }

    /// Returns the server handle for the `index`-th successful connection.
    pub fn server(&self, index: usize) -> Option<ServerHandle> {
        self.state.lock().unwrap().servers.get(index).cloned()
    }

    /// Returns the server handle for the most recent successful connection.
    pub fn last_server(&self) -> Option<ServerHandle> {
        self.state.lock().unwrap().servers.last().cloned()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    type Conn = InMemoryConnection;

    async fn connect(&self, route_filter: &[RouteCode]) -> Result<Self::Conn, ChannelError> {
        let mut state = self.state.lock().unwrap();
        state.connect_attempts += 1;

        if state.fail_connects > 0 {
            state.fail_connects -= 1;
            return Err(ChannelError::Transport("connection refused".to_string()));
        }

        let (to_client, incoming) = mpsc::unbounded_channel();
        let frames = Arc::new(Mutex::new(Vec::new()));
        let handle = ServerHandle {
            to_client: Arc::new(Mutex::new(Some(to_client))),
            frames: Arc::clone(&frames),
            route_filter: route_filter.to_vec(),
        };
        state.servers.push(handle);

        Ok(InMemoryConnection { incoming, frames })
    }
}

/// Test-side handle to one in-memory connection.
#[derive(Debug, Clone)]
pub struct ServerHandle {
    to_client: Arc<Mutex<Option<mpsc::UnboundedSender<Result<ServerMessage, ChannelError>>>>>,
    frames: Arc<Mutex<Vec<ClientFrame>>>,
    route_filter: Vec<RouteCode>,
}

impl ServerHandle {
    /// Pushes a message to the client.
    pub fn push(&self, message: ServerMessage) {
        if let Some(sender) = self.to_client.lock().unwrap().as_ref() {
            let _ = sender.send(Ok(message));
        }
    }

    /// Pushes a receive-side error to the client.
    pub fn push_error(&self, error: ChannelError) {
        if let Some(sender) = self.to_client.lock().unwrap().as_ref() {
            let _ = sender.send(Err(error));
        }
    }

    /// Severs the connection; the client sees end-of-stream.
    pub fn drop_connection(&self) {
        self.to_client.lock().unwrap().take();
    }

    /// Returns every control frame the client has sent so far.
    pub fn sent_frames(&self) -> Vec<ClientFrame> {
        self.frames.lock().unwrap().clone()
    }

    /// Returns the route filter the client connected with.
    pub fn route_filter(&self) -> &[RouteCode] {
        &self.route_filter
    }
}

/// Client side of an in-memory connection.
pub struct InMemoryConnection {
    incoming: mpsc::UnboundedReceiver<Result<ServerMessage, ChannelError>>,
    frames: Arc<Mutex<Vec<ClientFrame>>>,
}

#[async_trait]
impl Connection for InMemoryConnection {
    async fn send(&mut self, frame: &ClientFrame) -> Result<(), ChannelError> {
        self.frames.lock().unwrap().push(frame.clone());
        Ok(())
    }

    async fn next_message(&mut self) -> Option<Result<ServerMessage, ChannelError>> {
        self.incoming.recv().await
    }

    async fn close(&mut self) {
        self.incoming.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_and_exchange() {
        let transport = InMemoryTransport::new();
        let mut conn = transport.connect(&["HEL-TAL".into()]).await.unwrap();
        let server = transport.last_server().unwrap();

        assert_eq!(server.route_filter(), &[RouteCode::new("HEL-TAL")]);

        conn.send(&ClientFrame::Ping).await.unwrap();
        assert_eq!(server.sent_frames(), vec![ClientFrame::Ping]);

        server.push(ServerMessage::Connected);
        let message = conn.next_message().await.unwrap().unwrap();
        assert_eq!(message, ServerMessage::Connected);
    }

    #[tokio::test]
    async fn test_failed_connects_then_success() {
        let transport = InMemoryTransport::new();
        transport.fail_next_connects(2);

        assert!(transport.connect(&[]).await.is_err());
        assert!(transport.connect(&[]).await.is_err());
        assert!(transport.connect(&[]).await.is_ok());
        assert_eq!(transport.connect_attempts(), 3);
    }

    #[tokio::test]
    async fn test_dropped_connection_ends_stream() {
        let transport = InMemoryTransport::new();
        let mut conn = transport.connect(&[]).await.unwrap();
        let server = transport.last_server().unwrap();

        server.drop_connection();
        assert!(conn.next_message().await.is_none());
    }
}
