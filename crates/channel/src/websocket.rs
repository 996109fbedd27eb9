//! WebSocket transport backed by tokio-tungstenite.

use async_trait::async_trait;
use availability::{ClientFrame, ServerMessage};
use common::RouteCode;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::error::ChannelError;
use crate::transport::{Connection, Transport};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport for the availability push endpoint.
///
/// The route filter is passed at connect time as a comma-joined `routes`
/// query parameter; messages are JSON text frames.
#[derive(Debug, Clone)]
pub struct WebSocketTransport {
    endpoint: String,
}

impl WebSocketTransport {
    /// Creates a transport for the given `ws://`/`wss://` endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    fn url_for(&self, route_filter: &[RouteCode]) -> String {
        if route_filter.is_empty() {
            return self.endpoint.clone();
        }
        let routes = route_filter
            .iter()
            .map(RouteCode::as_str)
            .collect::<Vec<_>>()
            .join(",");
        format!("{}?routes={routes}", self.endpoint)
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    type Conn = WebSocketConnection;

    async fn connect(&self, route_filter: &[RouteCode]) -> Result<Self::Conn, ChannelError> {
        let url = self.url_for(route_filter);
        tracing::debug!(%url, "opening websocket");

        let (stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;
        let (sink, stream) = stream.split();

        Ok(WebSocketConnection { sink, stream })
    }
}

/// One established WebSocket connection.
pub struct WebSocketConnection {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

#[async_trait]
impl Connection for WebSocketConnection {
    async fn send(&mut self, frame: &ClientFrame) -> Result<(), ChannelError> {
        let text = serde_json::to_string(frame)?;
        self.sink
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))
    }

    async fn next_message(&mut self) -> Option<Result<ServerMessage, ChannelError>> {
        loop {
            let frame = self.stream.next().await?;
            match frame {
                Ok(Message::Text(text)) => {
                    return Some(
                        serde_json::from_str::<ServerMessage>(&text).map_err(ChannelError::from),
                    );
                }
                // Protocol-level frames carry no availability payload.
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => continue,
                Ok(Message::Binary(_)) => {
                    tracing::warn!("unexpected binary frame on availability channel");
                    continue;
                }
                Ok(Message::Close(_)) => return None,
                Err(e) => return Some(Err(ChannelError::Transport(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.sink.send(Message::Close(None)).await;
        let _ = self.sink.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_without_filter() {
        let transport = WebSocketTransport::new("wss://push.example.com/availability");
        assert_eq!(
            transport.url_for(&[]),
            "wss://push.example.com/availability"
        );
    }

    #[test]
    fn test_url_joins_routes_with_commas() {
        let transport = WebSocketTransport::new("wss://push.example.com/availability");
        let url = transport.url_for(&["HEL-TAL".into(), "STO-TKU".into()]);
        assert_eq!(
            url,
            "wss://push.example.com/availability?routes=HEL-TAL,STO-TKU"
        );
    }
}
