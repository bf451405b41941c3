//! Session events and the single emission path.
//!
//! Every lifecycle and transport occurrence is modeled as one variant of a
//! closed [`SessionEvent`] set, rendered to a human-readable block, and
//! delivered through one [`EventSink`]: structured diagnostics, the event
//! log, and the registered listener, in that order. Nothing else in the
//! crate appends to the log.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::errname::symbolic_name;
use crate::error::Error;
use crate::log::EventLog;

// ============================================================================
// Types
// ============================================================================

/// Per-event callback for the presentation layer.
pub type EventListener = Box<dyn Fn(&str) + Send + Sync>;

// ============================================================================
// SessionEvent
// ============================================================================

/// One observable occurrence in a connection's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Socket task spawned for a connection attempt.
    TaskCreated,

    /// Opening handshake completed.
    Opened {
        /// Sub-protocol negotiated with the server, when any.
        subprotocol: Option<String>,
    },

    /// Peer sent a close frame.
    Closed {
        /// Close code from the peer, when present.
        code: Option<u16>,
    },

    /// Text (or best-effort decoded binary) frame received.
    Received {
        /// Decoded payload.
        text: String,
    },

    /// Frame of an unrecognized kind received.
    ReceivedUnknown,

    /// Text frame delivered to the transport.
    Sent {
        /// The submitted payload, echoed back.
        text: String,
    },

    /// Text frame submission failed.
    SendFailed {
        /// Failure description.
        error: String,
    },

    /// Stream ended without a close frame.
    Invalidated {
        /// Failure description, when the teardown carried one.
        error: Option<ErrorDetail>,
    },

    /// Authentication challenge encountered during connection setup.
    AuthChallenge,

    /// Handshake redirect being followed.
    Redirect {
        /// Redirect target.
        location: String,
    },

    /// Connection establishment failed.
    ConnectFailed {
        /// Failure description.
        detail: ErrorDetail,
    },

    /// Receive loop terminated on a transport error.
    ReceiveFailed {
        /// Failure description.
        detail: ErrorDetail,
    },

    /// Endpoint string rejected before any connection attempt.
    InvalidUrl {
        /// The rejected input, verbatim.
        input: String,
    },
}

// ============================================================================
// ErrorDetail
// ============================================================================

/// Rendered failure description plus the OS code backing it, when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    /// Human-readable description.
    pub message: String,

    /// Raw OS error code for symbolic enrichment.
    pub os_code: Option<i32>,
}

impl ErrorDetail {
    /// Captures an error's description and OS code.
    #[must_use]
    pub fn from_error(error: &Error) -> Self {
        Self {
            message: error.to_string(),
            os_code: error.os_error_code(),
        }
    }

    /// Renders `error = "<message>"` with the symbolic name when known.
    fn render(&self) -> String {
        let mut rendered = format!("error = \"{}\"", self.message);
        if let Some(name) = self.os_code.and_then(symbolic_name) {
            rendered.push_str(&format!(" (a.k.a. {name})"));
        }
        rendered
    }
}

// ============================================================================
// SessionEvent - Constructors
// ============================================================================

impl SessionEvent {
    /// Event for a failed connection attempt.
    #[inline]
    #[must_use]
    pub fn connect_failed(error: &Error) -> Self {
        Self::ConnectFailed {
            detail: ErrorDetail::from_error(error),
        }
    }

    /// Event for a receive-loop failure.
    #[inline]
    #[must_use]
    pub fn receive_failed(error: &Error) -> Self {
        Self::ReceiveFailed {
            detail: ErrorDetail::from_error(error),
        }
    }
}

// ============================================================================
// SessionEvent - Rendering
// ============================================================================

impl SessionEvent {
    /// Renders the log block for this event.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::TaskCreated => "Socket task created".to_string(),
            Self::Opened {
                subprotocol: Some(protocol),
            } => {
                format!("Socket opened, protocol: \"{protocol}\"")
            }
            Self::Opened { subprotocol: None } => "Socket opened, protocol: none".to_string(),
            Self::Closed { code: Some(code) } => format!("Socket closed, code: {code}"),
            Self::Closed { code: None } => "Socket closed, code: none".to_string(),
            Self::Received { text } => format!("Received: {text}"),
            Self::ReceivedUnknown => "Received unknown data.".to_string(),
            Self::Sent { text } => format!("Sent: {text}"),
            Self::SendFailed { error } => format!("Error sending: {error}"),
            Self::Invalidated { error: Some(detail) } => {
                format!("Session invalidated\n{}", detail.render())
            }
            Self::Invalidated { error: None } => "Session invalidated".to_string(),
            Self::AuthChallenge => {
                "Authentication challenge received, using default handling".to_string()
            }
            Self::Redirect { location } => format!("Redirect to {location}, following"),
            Self::ConnectFailed { detail } => format!("Connect failed\n{}", detail.render()),
            Self::ReceiveFailed { detail } => format!("Receive failed\n{}", detail.render()),
            Self::InvalidUrl { input } => format!("Error: invalid URL \"{input}\""),
        }
    }
}

// ============================================================================
// EventSink
// ============================================================================

/// The single emission path for session events.
///
/// Cheap to clone; clones share the same log and listener.
#[derive(Clone)]
pub struct EventSink {
    log: Arc<EventLog>,
    listener: Arc<Mutex<Option<EventListener>>>,
}

impl EventSink {
    /// Creates a sink appending to the given log.
    #[must_use]
    pub fn new(log: Arc<EventLog>) -> Self {
        Self {
            log,
            listener: Arc::new(Mutex::new(None)),
        }
    }

    /// Emits one event: renders it, logs it, and notifies the listener.
    pub fn emit(&self, event: SessionEvent) {
        let message = event.render();
        debug!(event = ?event, "session event");
        self.log.append(&message);
        if let Some(listener) = self.listener.lock().as_ref() {
            listener(&message);
        }
    }

    /// Registers the per-event callback.
    pub fn set_listener(&self, listener: EventListener) {
        *self.listener.lock() = Some(listener);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::{ErrorDetail, EventSink, SessionEvent};
    use crate::error::Error;
    use crate::log::EventLog;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ------------------------------------------------------------------------
    // Rendering Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_render_open_and_close() {
        let opened = SessionEvent::Opened {
            subprotocol: Some("chat".into()),
        };
        assert_eq!(opened.render(), "Socket opened, protocol: \"chat\"");

        let opened_plain = SessionEvent::Opened { subprotocol: None };
        assert_eq!(opened_plain.render(), "Socket opened, protocol: none");

        let closed = SessionEvent::Closed { code: Some(1000) };
        assert_eq!(closed.render(), "Socket closed, code: 1000");
    }

    #[test]
    fn test_render_frames() {
        assert_eq!(
            SessionEvent::Received { text: "pong".into() }.render(),
            "Received: pong"
        );
        assert_eq!(
            SessionEvent::Sent { text: "ping".into() }.render(),
            "Sent: ping"
        );
        assert_eq!(SessionEvent::ReceivedUnknown.render(), "Received unknown data.");
    }

    #[test]
    fn test_render_invalid_url_mentions_input() {
        let event = SessionEvent::InvalidUrl {
            input: "not a url".into(),
        };
        let rendered = event.render();
        assert!(rendered.contains("invalid URL"));
        assert!(rendered.contains("not a url"));
    }

    #[test]
    fn test_render_enriches_known_os_codes() {
        let error = Error::Io(std::io::Error::from_raw_os_error(111));
        let rendered = SessionEvent::receive_failed(&error).render();
        assert!(rendered.starts_with("Receive failed\nerror = \""));
        assert!(rendered.ends_with("(a.k.a. ECONNREFUSED)"));
    }

    #[test]
    fn test_render_skips_unknown_os_codes() {
        let detail = ErrorDetail {
            message: "boom".into(),
            os_code: None,
        };
        let rendered = SessionEvent::ReceiveFailed { detail }.render();
        assert_eq!(rendered, "Receive failed\nerror = \"boom\"");
    }

    // ------------------------------------------------------------------------
    // EventSink Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_sink_appends_and_notifies() {
        let log = Arc::new(EventLog::new());
        let sink = EventSink::new(Arc::clone(&log));
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        sink.set_listener(Box::new(move |message| {
            assert_eq!(message, "Sent: hello");
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        sink.emit(SessionEvent::Sent {
            text: "hello".into(),
        });

        assert_eq!(log.snapshot(), "Sent: hello\n");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sink_clones_share_log() {
        let log = Arc::new(EventLog::new());
        let sink = EventSink::new(Arc::clone(&log));
        let clone = sink.clone();

        sink.emit(SessionEvent::TaskCreated);
        clone.emit(SessionEvent::Opened { subprotocol: None });

        assert_eq!(log.entry_count(), 2);
    }
}
