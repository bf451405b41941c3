//! ws-proxy-bench - Diagnostic WebSocket client for proxy configurations.
//!
//! This library exercises a WebSocket connection through configurable network
//! proxies and surfaces the full lifecycle as an ordered, human-readable
//! event log. It exists for engineers validating client behavior through
//! legacy per-protocol proxy settings (HTTP, HTTPS, SOCKS) and the modern
//! declarative proxy list (SOCKS v5, HTTP CONNECT), including authentication
//! challenges.
//!
//! # Architecture
//!
//! Settings flow one way into a single owned connection:
//!
//! - [`SettingsStore`] holds the raw fields and rebuilds the derived
//!   [`SessionConfig`] atomically on every save
//! - [`ConnectionManager`] owns the one live connection and funnels every
//!   lifecycle and transport event through one emission path
//! - [`EventLog`] collects the rendered events for the presentation layer
//!
//! Key design principles:
//!
//! - One session and one socket task at a time, exclusively owned
//! - Every event delivered through a single hook, in transport order
//! - Transport failures reported once and never retried automatically
//! - Explicit disconnects suppress their own cancellation noise
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ws_proxy_bench::{ConnectionManager, Settings, SettingsStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(SettingsStore::new());
//!     store.save(Settings {
//!         endpoint_url: "wss://echo.example.test/".into(),
//!         ..Default::default()
//!     });
//!
//!     let manager = ConnectionManager::new(Arc::clone(&store));
//!     manager.set_event_listener(Box::new(|message| println!("{message}")));
//!
//!     manager.connect(&store.endpoint_url());
//!     manager.send_message("ping");
//!     manager.disconnect();
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`settings`] | User-entered fields and the atomic [`SettingsStore`] |
//! | [`config`] | Pure builders for proxy/auth session configuration |
//! | [`session`] | [`ConnectionManager`], events, transport |
//! | [`log`] | Append-only [`EventLog`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`errname`] | Symbolic names for platform error codes |

// ============================================================================
// Modules
// ============================================================================

/// Pure builders for the session configuration.
///
/// Transforms settings snapshots into the proxy and credential artifacts a
/// new connection consumes.
pub mod config;

/// Symbolic names for platform networking error codes.
///
/// Static lookup used only to enrich log lines.
pub mod errname;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Append-only event log.
///
/// Formatting contract for the presentation layer's log view.
pub mod log;

/// Connection lifecycle, events, and transport.
///
/// The core: one owned connection, one emission path.
pub mod session;

/// User-entered settings.
///
/// Raw field values plus the atomic store that holds them.
pub mod settings;

// ============================================================================
// Re-exports
// ============================================================================

// Configuration types
pub use config::{
    Credential, HostPort, LegacyProxyConfig, ModernProxyConfig, ProxyDescriptor, SessionConfig,
};

// Error types
pub use error::{Error, Result};

// Log types
pub use log::EventLog;

// Session types
pub use session::{
    ConnectionManager, Connector, EventListener, EventSink, Frame, FrameSink, FrameSource,
    HandshakeInfo, SessionEvent, TungsteniteConnector,
};

// Settings types
pub use settings::{AuthMethod, AuthSettings, ProxyEndpoint, ProxySettings, Settings, SettingsStore};
