//! Transport seam between the connection manager and the socket provider.
//!
//! The manager owns lifecycle and event semantics; everything that actually
//! moves bytes sits behind these traits so tests can exercise the state
//! machine with a scripted transport. The production implementation is
//! [`TungsteniteConnector`](super::connector::TungsteniteConnector).

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use url::Url;

use crate::config::SessionConfig;
use crate::error::Result;
use crate::session::event::EventSink;

// ============================================================================
// Frame
// ============================================================================

/// One inbound WebSocket frame as the receive loop classifies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Text payload.
    Text(String),

    /// Binary payload, decoded best-effort by the receive loop.
    Binary(Vec<u8>),

    /// Close frame with the peer's close code, when present.
    Close(Option<u16>),

    /// Any frame kind the client does not recognize.
    Other,
}

// ============================================================================
// HandshakeInfo
// ============================================================================

/// Details negotiated during the opening handshake.
#[derive(Debug, Clone, Default)]
pub struct HandshakeInfo {
    /// Sub-protocol accepted by the server, when any.
    pub subprotocol: Option<String>,
}

// ============================================================================
// Traits
// ============================================================================

/// Write half of an established connection.
#[async_trait]
pub trait FrameSink: Send {
    /// Submits one text frame.
    async fn send_text(&mut self, text: &str) -> Result<()>;

    /// Performs the closing handshake.
    async fn close(&mut self) -> Result<()>;
}

/// Read half of an established connection.
#[async_trait]
pub trait FrameSource: Send {
    /// Waits for the next inbound frame.
    ///
    /// `Ok(None)` means the stream ended without a close frame.
    async fn receive(&mut self) -> Result<Option<Frame>>;
}

/// Opens WebSocket connections according to a session configuration.
///
/// Transport-level occurrences during the handshake (redirects, auth
/// challenges) are reported through the supplied event sink so they land in
/// the log in transport order.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establishes a connection to `url`.
    async fn connect(
        &self,
        url: &Url,
        config: &SessionConfig,
        events: &EventSink,
    ) -> Result<(Box<dyn FrameSink>, Box<dyn FrameSource>, HandshakeInfo)>;
}

// ============================================================================
// Tests
// ============================================================================
