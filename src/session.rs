//! Connection session over a SockJS websocket.
//!
//! A session owns one websocket for exactly one query/response exchange. It
//! knows about transport framing only: it opens the socket, sends the DDP
//! connect frame, and moves text frames in and out. Deciding which frames
//! matter is the codec's job.
//!
//! # Lifecycle
//!
//! ```text
//! Disconnected → TransportOpen → HandshakeSent → Ready
//!                                                  │
//!                         ┌────────────────────────┘
//!                         ▼
//!                  (FrameSent → AwaitingFrame)* → Closed
//!
//! any non-terminal state ──I/O error──► Failed
//! ```
//!
//! # Seams
//!
//! [`FrameTransport`] and [`Connector`] are the points where tests substitute
//! scripted sessions for a real socket.

use std::sync::Once;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite;

use crate::codec;
use crate::constants::DEFAULT_CONNECT_TIMEOUT;
use crate::error::ConnectionError;

/// Install the process-wide rustls crypto provider before the first TLS dial.
///
/// Another component may have installed one already; that provider is kept.
fn ensure_crypto_provider() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        if rustls::crypto::ring::default_provider().install_default().is_err() {
            log::debug!("[Session] Keeping the already installed rustls crypto provider");
        }
    });
}

/// Concrete websocket stream type.
type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No socket yet.
    #[default]
    Disconnected,
    /// Websocket upgrade completed.
    TransportOpen,
    /// DDP connect frame written.
    HandshakeSent,
    /// Application frames may flow.
    Ready,
    /// An application frame was written.
    FrameSent,
    /// Blocked waiting for the next frame.
    AwaitingFrame,
    /// Released by the caller.
    Closed,
    /// An I/O error occurred; the session is unusable.
    Failed,
}

impl SessionState {
    /// Whether the session can no longer move frames.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }

    /// Whether application frames may be written in this state.
    #[must_use]
    pub const fn can_send(self) -> bool {
        matches!(self, Self::Ready | Self::FrameSent | Self::AwaitingFrame)
    }
}

/// One open session that moves whole text frames.
#[async_trait]
pub trait FrameTransport: Send {
    /// Write one application frame.
    async fn send_frame(&mut self, payload: &str) -> Result<(), ConnectionError>;

    /// Wait for the next text frame. The frame is returned unclassified.
    async fn receive_frame(&mut self) -> Result<String, ConnectionError>;

    /// Release the socket. Safe to call more than once; never fails.
    async fn close(&mut self);
}

/// Opens sessions against an endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a session and complete the transport handshake.
    async fn open(&self, endpoint: &str) -> Result<Box<dyn FrameTransport>, ConnectionError>;
}

/// [`Connector`] backed by `tokio-tungstenite`.
#[derive(Debug, Clone, Copy)]
pub struct WebSocketConnector {
    connect_timeout: Duration,
}

impl WebSocketConnector {
    /// Create a connector that gives up on the upgrade after `connect_timeout`.
    #[must_use]
    pub const fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for WebSocketConnector {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn open(&self, endpoint: &str) -> Result<Box<dyn FrameTransport>, ConnectionError> {
        let session = WebSocketSession::open(endpoint, self.connect_timeout).await?;
        Ok(Box::new(session))
    }
}

/// A session over a real websocket.
#[derive(Debug)]
pub struct WebSocketSession {
    sink: SplitSink<WsStream, tungstenite::Message>,
    stream: SplitStream<WsStream>,
    state: SessionState,
}

impl WebSocketSession {
    /// Connect to `endpoint` and send the DDP connect frame.
    ///
    /// The underlying cause of any failure is logged, not returned.
    pub async fn open(endpoint: &str, connect_timeout: Duration) -> Result<Self, ConnectionError> {
        use tungstenite::client::IntoClientRequest;

        ensure_crypto_provider();

        let request = endpoint.into_client_request().map_err(|e| {
            log::warn!("[Session] Invalid websocket endpoint {}: {}", endpoint, e);
            ConnectionError
        })?;

        let ws_stream = match tokio::time::timeout(
            connect_timeout,
            tokio_tungstenite::connect_async(request),
        )
        .await
        {
            Ok(Ok((ws_stream, _response))) => ws_stream,
            Ok(Err(e)) => {
                log::warn!("[Session] Unable to dial the websocket {}: {}", endpoint, e);
                return Err(ConnectionError);
            }
            Err(_elapsed) => {
                log::warn!(
                    "[Session] Websocket upgrade to {} timed out after {:?}",
                    endpoint,
                    connect_timeout
                );
                return Err(ConnectionError);
            }
        };

        let (sink, stream) = ws_stream.split();
        let mut session = Self {
            sink,
            stream,
            state: SessionState::TransportOpen,
        };

        if let Err(e) = session.write_text(codec::handshake_frame()).await {
            log::warn!("[Session] Unable to write connect message: {}", e);
            session.state = SessionState::Failed;
            return Err(ConnectionError);
        }
        session.state = SessionState::HandshakeSent;

        log::debug!("[Session] Connected to {}", endpoint);
        session.state = SessionState::Ready;
        Ok(session)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    async fn write_text(&mut self, text: String) -> Result<(), tungstenite::Error> {
        self.sink.send(tungstenite::Message::Text(text.into())).await
    }

    fn fail(&mut self) -> ConnectionError {
        self.state = SessionState::Failed;
        ConnectionError
    }
}

#[async_trait]
impl FrameTransport for WebSocketSession {
    async fn send_frame(&mut self, payload: &str) -> Result<(), ConnectionError> {
        if !self.state.can_send() {
            log::warn!("[Session] Refusing to send in state {:?}", self.state);
            return Err(ConnectionError);
        }

        if let Err(e) = self.write_text(payload.to_owned()).await {
            log::warn!("[Session] Unable to write frame: {}", e);
            return Err(self.fail());
        }

        self.state = SessionState::FrameSent;
        Ok(())
    }

    async fn receive_frame(&mut self) -> Result<String, ConnectionError> {
        if self.state.is_terminal() {
            log::warn!("[Session] Refusing to receive in state {:?}", self.state);
            return Err(ConnectionError);
        }
        self.state = SessionState::AwaitingFrame;

        loop {
            match self.stream.next().await {
                Some(Ok(tungstenite::Message::Text(text))) => {
                    return Ok(text.to_string());
                }
                Some(Ok(tungstenite::Message::Binary(data))) => {
                    return Ok(String::from_utf8_lossy(&data).into_owned());
                }
                Some(Ok(tungstenite::Message::Ping(data))) => {
                    if let Err(e) = self.sink.send(tungstenite::Message::Pong(data)).await {
                        log::warn!("[Session] Unable to answer ping: {}", e);
                        return Err(self.fail());
                    }
                }
                Some(Ok(tungstenite::Message::Pong(_) | tungstenite::Message::Frame(_))) => {}
                Some(Ok(tungstenite::Message::Close(close_frame))) => {
                    match close_frame {
                        Some(cf) => log::warn!(
                            "[Session] Server closed the websocket ({}): {}",
                            u16::from(cf.code),
                            cf.reason
                        ),
                        None => log::warn!("[Session] Server closed the websocket"),
                    }
                    return Err(self.fail());
                }
                Some(Err(e)) => {
                    log::warn!("[Session] Unable to read message from server: {}", e);
                    return Err(self.fail());
                }
                None => {
                    log::warn!("[Session] Websocket stream ended");
                    return Err(self.fail());
                }
            }
        }
    }

    async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }

        if let Err(e) = self.sink.close().await {
            log::debug!("[Session] Error while closing websocket: {}", e);
        }
        self.state = SessionState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_disconnected() {
        assert_eq!(SessionState::default(), SessionState::Disconnected);
    }

    #[test]
    fn test_send_allowed_only_after_handshake() {
        assert!(!SessionState::Disconnected.can_send());
        assert!(!SessionState::TransportOpen.can_send());
        assert!(!SessionState::HandshakeSent.can_send());
        assert!(SessionState::Ready.can_send());
        assert!(SessionState::FrameSent.can_send());
        assert!(SessionState::AwaitingFrame.can_send());
        assert!(!SessionState::Closed.can_send());
        assert!(!SessionState::Failed.can_send());
    }

    #[test]
    fn test_terminal_states() {
        assert!(SessionState::Closed.is_terminal());
        assert!(SessionState::Failed.is_terminal());
        assert!(!SessionState::Ready.is_terminal());
    }

    #[tokio::test]
    async fn test_open_invalid_url_returns_error() {
        let result = WebSocketSession::open("not-a-url", Duration::from_secs(1)).await;
        assert_eq!(result.err(), Some(ConnectionError));
    }

    #[tokio::test]
    async fn test_open_unreachable_host_returns_error() {
        let connector = WebSocketConnector::new(Duration::from_secs(2));
        let result = connector.open("ws://127.0.0.1:1/sockjs/a/b/websocket").await;
        assert!(result.is_err());
    }
}
