//! Connection lifecycle and event emission.
//!
//! [`ConnectionManager`] owns at most one live connection: a command channel
//! plus the tokio task driving the socket. The task performs the handshake,
//! runs the receive loop, and reports every occurrence through the single
//! event sink, so the presentation layer has exactly one place to subscribe.
//!
//! # Event Loop
//!
//! The session task multiplexes two inputs:
//!
//! - Commands from the public API (send a frame, disconnect)
//! - Inbound frames from the transport
//!
//! The receive side re-arms only after the current frame's processing
//! completes, so received events never race each other out of order. A
//! failure on the receive side terminates the loop; the connection is then
//! dead from the application's perspective and `connect` must be issued
//! again.
//!
//! # Cancellation
//!
//! `disconnect` is the only cancellation path. It flips an internal flag
//! before dropping the handles; the session task consults that flag when a
//! wait resolves with a failure, so teardown caused by an explicit
//! disconnect never produces error noise in the log.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use crate::config::SessionConfig;
use crate::log::EventLog;
use crate::session::connector::TungsteniteConnector;
use crate::session::event::{EventListener, EventSink, SessionEvent};
use crate::session::transport::{Connector, Frame, FrameSink};
use crate::settings::SettingsStore;

// ============================================================================
// SessionCommand
// ============================================================================

/// Commands accepted by the session task.
enum SessionCommand {
    /// Submit a text frame.
    Send(String),
    /// Close the socket and end the task.
    Disconnect,
}

// ============================================================================
// ActiveSession
// ============================================================================

/// Handles for the one live connection.
struct ActiveSession {
    /// Command channel into the session task.
    command_tx: mpsc::UnboundedSender<SessionCommand>,
    /// The session task itself.
    task: JoinHandle<()>,
}

// ============================================================================
// ConnectionManager
// ============================================================================

/// Owns a single WebSocket connection's lifecycle.
///
/// Public operations are non-blocking; outcomes surface asynchronously
/// through the event log and the registered listener.
///
/// # Thread Safety
///
/// `ConnectionManager` is `Send + Sync`. Connect/disconnect/save are
/// expected to be driven by explicit user actions, one at a time.
pub struct ConnectionManager {
    /// Transport used to open connections.
    connector: Arc<dyn Connector>,
    /// Source of the session configuration snapshotted at connect time.
    store: Arc<SettingsStore>,
    /// Event log owned by this manager.
    log: Arc<EventLog>,
    /// The single emission path.
    events: EventSink,
    /// Handles for the live connection, if any.
    active: Mutex<Option<ActiveSession>>,
    /// Set immediately before an explicit teardown.
    disconnecting: Arc<AtomicBool>,
}

impl ConnectionManager {
    /// Creates a manager using the production transport.
    #[must_use]
    pub fn new(store: Arc<SettingsStore>) -> Self {
        Self::with_connector(store, Arc::new(TungsteniteConnector::new()))
    }

    /// Creates a manager with an explicit transport.
    #[must_use]
    pub fn with_connector(store: Arc<SettingsStore>, connector: Arc<dyn Connector>) -> Self {
        let log = Arc::new(EventLog::new());
        let events = EventSink::new(Arc::clone(&log));
        Self {
            connector,
            store,
            log,
            events,
            active: Mutex::new(None),
            disconnecting: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns `true` while a connection is live.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.active
            .lock()
            .as_ref()
            .is_some_and(|session| !session.task.is_finished())
    }

    /// Returns the event log.
    #[must_use]
    pub fn log(&self) -> Arc<EventLog> {
        Arc::clone(&self.log)
    }

    /// Clears the event log.
    pub fn clear_log(&self) {
        self.log.clear();
    }

    /// Registers the per-event callback.
    pub fn set_event_listener(&self, listener: EventListener) {
        self.events.set_listener(listener);
    }

    /// Opens a connection to `url`.
    ///
    /// No-op while already connected. A string that does not parse as a
    /// `ws`/`wss` URL produces a single error event and no state change.
    /// Otherwise the current session configuration is snapshotted and the
    /// session task is spawned; the outcome arrives through the event log.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&self, url: &str) {
        if self.is_connected() {
            debug!("connect ignored while connected");
            return;
        }

        self.log.note_new_attempt();

        let endpoint = match Url::parse(url) {
            Ok(endpoint) if matches!(endpoint.scheme(), "ws" | "wss") => endpoint,
            _ => {
                warn!(input = url, "rejecting malformed endpoint");
                self.events.emit(SessionEvent::InvalidUrl {
                    input: url.to_owned(),
                });
                return;
            }
        };

        self.disconnecting.store(false, Ordering::SeqCst);

        let config = self.store.session_config();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_session(
            Arc::clone(&self.connector),
            endpoint,
            config,
            command_rx,
            self.events.clone(),
            Arc::clone(&self.disconnecting),
        ));

        *self.active.lock() = Some(ActiveSession { command_tx, task });
    }

    /// Tears down the live connection.
    ///
    /// Idempotent; a second call is a silent no-op. The resulting
    /// cancellation of any in-flight wait is suppressed from the log.
    pub fn disconnect(&self) {
        let mut active = self.active.lock();
        if active.is_none() {
            return;
        }

        // Mark before teardown so in-flight waits classify as benign.
        self.disconnecting.store(true, Ordering::SeqCst);

        if let Some(session) = active.take() {
            let _ = session.command_tx.send(SessionCommand::Disconnect);
        }

        debug!("disconnect requested");
    }

    /// Submits a text frame, fire-and-forget.
    ///
    /// No-op while disconnected. The outcome surfaces as a "Sent" or
    /// "Error sending" event.
    pub fn send_message(&self, text: impl Into<String>) {
        let text = text.into();
        let active = self.active.lock();
        match active.as_ref() {
            Some(session) if !session.task.is_finished() => {
                let _ = session.command_tx.send(SessionCommand::Send(text));
            }
            _ => debug!("send ignored while disconnected"),
        }
    }
}

// ============================================================================
// Session Task
// ============================================================================

/// Drives one connection from handshake to teardown.
async fn run_session(
    connector: Arc<dyn Connector>,
    endpoint: Url,
    config: SessionConfig,
    mut command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    events: EventSink,
    disconnecting: Arc<AtomicBool>,
) {
    events.emit(SessionEvent::TaskCreated);

    // Sends submitted while the handshake is in flight are queued and
    // flushed once the socket opens.
    let mut pending: Vec<String> = Vec::new();

    let handshake = connector.connect(&endpoint, &config, &events);
    tokio::pin!(handshake);

    let (mut sink, mut source, info) = loop {
        tokio::select! {
            result = &mut handshake => match result {
                Ok(parts) => break parts,
                Err(error) => {
                    if !disconnecting.load(Ordering::SeqCst) {
                        events.emit(SessionEvent::connect_failed(&error));
                    }
                    return;
                }
            },
            command = command_rx.recv() => match command {
                Some(SessionCommand::Send(text)) => pending.push(text),
                Some(SessionCommand::Disconnect) | None => return,
            },
        }
    };

    events.emit(SessionEvent::Opened {
        subprotocol: info.subprotocol,
    });

    for text in pending.drain(..) {
        send_frame(&mut *sink, &text, &events).await;
    }

    loop {
        tokio::select! {
            command = command_rx.recv() => match command {
                Some(SessionCommand::Send(text)) => {
                    send_frame(&mut *sink, &text, &events).await;
                }
                Some(SessionCommand::Disconnect) | None => {
                    let _ = sink.close().await;
                    break;
                }
            },
            frame = source.receive() => match frame {
                Ok(Some(Frame::Text(text))) => {
                    events.emit(SessionEvent::Received { text });
                }
                Ok(Some(Frame::Binary(data))) => {
                    // Best-effort UTF-8, surfaced like a text frame.
                    events.emit(SessionEvent::Received {
                        text: String::from_utf8_lossy(&data).into_owned(),
                    });
                }
                Ok(Some(Frame::Close(code))) => {
                    events.emit(SessionEvent::Closed { code });
                    break;
                }
                Ok(Some(Frame::Other)) => {
                    events.emit(SessionEvent::ReceivedUnknown);
                }
                Ok(None) => {
                    if !disconnecting.load(Ordering::SeqCst) {
                        events.emit(SessionEvent::Invalidated { error: None });
                    }
                    break;
                }
                Err(error) => {
                    if !disconnecting.load(Ordering::SeqCst) {
                        events.emit(SessionEvent::receive_failed(&error));
                    }
                    break;
                }
            },
        }
    }

    debug!("session task terminated");
}

/// Submits one frame and reports the outcome.
async fn send_frame(sink: &mut dyn FrameSink, text: &str, events: &EventSink) {
    match sink.send_text(text).await {
        Ok(()) => events.emit(SessionEvent::Sent {
            text: text.to_owned(),
        }),
        Err(error) => events.emit(SessionEvent::SendFailed {
            error: error.to_string(),
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================
