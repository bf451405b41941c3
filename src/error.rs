//! Error types for the proxy test bench.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use ws_proxy_bench::{Result, Error};
//!
//! async fn example(connector: &TungsteniteConnector) -> Result<()> {
//!     let parts = connector.connect(&url, &config, &events).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Endpoint | [`Error::InvalidUrl`] |
//! | Tunnel | [`Error::Proxy`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`], [`Error::TooManyRedirects`] |
//! | External | [`Error::Io`], [`Error::WebSocket`] |
//!
//! A benign cancellation (the direct result of an explicit disconnect) is not
//! an error variant; the connection manager tracks it with an internal flag
//! and suppresses the corresponding events.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for the event log.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Endpoint Errors
    // ========================================================================
    /// Endpoint string is not a well-formed ws/wss URL.
    ///
    /// Returned when `connect` is given input that does not parse, or that
    /// parses with a scheme other than `ws`/`wss`.
    #[error("invalid URL \"{input}\"")]
    InvalidUrl {
        /// The rejected input, verbatim.
        input: String,
    },

    // ========================================================================
    // Tunnel Errors
    // ========================================================================
    /// Proxy tunnel establishment failed.
    ///
    /// Returned when a SOCKSv5 or HTTP CONNECT handshake is rejected.
    #[error("proxy error: {message}")]
    Proxy {
        /// Description of the tunnel failure.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Connection could not be established.
    #[error("connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection closed while an operation was in flight.
    #[error("connection closed")]
    ConnectionClosed,

    /// Handshake redirect chain exceeded the limit.
    #[error("redirect limit exceeded after {limit} redirects")]
    TooManyRedirects {
        /// Number of redirects that were followed.
        limit: u32,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// WebSocket protocol error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an invalid URL error.
    #[inline]
    pub fn invalid_url(input: impl Into<String>) -> Self {
        Self::InvalidUrl {
            input: input.into(),
        }
    }

    /// Creates a proxy tunnel error.
    #[inline]
    pub fn proxy(message: impl Into<String>) -> Self {
        Self::Proxy {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a redirect limit error.
    #[inline]
    pub fn too_many_redirects(limit: u32) -> Self {
        Self::TooManyRedirects { limit }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is an invalid endpoint error.
    #[inline]
    #[must_use]
    pub fn is_invalid_url(&self) -> bool {
        matches!(self, Self::InvalidUrl { .. })
    }

    /// Returns `true` if this is a connection-level error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionClosed
                | Self::TooManyRedirects { .. }
                | Self::Proxy { .. }
                | Self::WebSocket(_)
        )
    }

    /// Returns the underlying OS error code, if any.
    ///
    /// Walks into IO errors (direct or wrapped by the WebSocket layer) so
    /// log lines can be enriched with a symbolic errno name.
    #[must_use]
    pub fn os_error_code(&self) -> Option<i32> {
        match self {
            Self::Io(err) => err.raw_os_error(),
            Self::WebSocket(WsError::Io(err)) => err.raw_os_error(),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
