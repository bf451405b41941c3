//! Append-only event log.
//!
//! Collects the rendered session events into one text buffer for the
//! presentation layer. Each appended message forms its own visual block:
//! the first entry carries no leading newline, every later entry is
//! preceded by a blank line, and every entry ends with a newline.
//!
//! A new connection attempt tidies leftover output: a log holding more than
//! one entry gains a separator row, a log holding exactly one entry is
//! cleared outright so a single stray message cannot accumulate across
//! reconnects. Entries are counted discretely, so messages containing
//! newlines count once.

// ============================================================================
// Imports
// ============================================================================

use parking_lot::Mutex;

// ============================================================================
// Constants
// ============================================================================

/// Separator row inserted between connection attempts.
const ATTEMPT_SEPARATOR: &str = "————————————————————";

// ============================================================================
// Types
// ============================================================================

/// Callback fired with the full log text after every mutation.
pub type LogListener = Box<dyn Fn(&str) + Send + Sync>;

// ============================================================================
// EventLog
// ============================================================================

/// Shared append-only log of session events.
///
/// # Thread Safety
///
/// Appends are serialized by an internal lock; the change listener is
/// invoked outside that lock with a snapshot of the full text.
pub struct EventLog {
    state: Mutex<LogState>,
    listener: Mutex<Option<LogListener>>,
}

#[derive(Default)]
struct LogState {
    text: String,
    entries: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LogState::default()),
            listener: Mutex::new(None),
        }
    }

    /// Appends one message as its own block.
    pub fn append(&self, message: &str) {
        let snapshot = {
            let mut state = self.state.lock();
            if !state.text.is_empty() {
                state.text.push('\n');
            }
            state.text.push_str(message);
            state.text.push('\n');
            state.entries += 1;
            state.text.clone()
        };
        self.notify(&snapshot);
    }

    /// Prepares the log for a new connection attempt.
    ///
    /// More than one leftover entry gains a separator row; exactly one
    /// leftover entry is cleared outright; an empty log is left untouched.
    pub fn note_new_attempt(&self) {
        let entries = self.state.lock().entries;
        match entries {
            0 => {}
            1 => self.clear(),
            _ => self.append(ATTEMPT_SEPARATOR),
        }
    }

    /// Resets the log to empty.
    pub fn clear(&self) {
        {
            let mut state = self.state.lock();
            state.text.clear();
            state.entries = 0;
        }
        self.notify("");
    }

    /// Returns the full log text.
    #[must_use]
    pub fn snapshot(&self) -> String {
        self.state.lock().text.clone()
    }

    /// Returns the number of appended entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.state.lock().entries
    }

    /// Returns `true` if nothing has been appended since the last clear.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Registers the log-changed callback.
    pub fn set_on_changed(&self, listener: LogListener) {
        *self.listener.lock() = Some(listener);
    }

    fn notify(&self, snapshot: &str) {
        if let Some(listener) = self.listener.lock().as_ref() {
            listener(snapshot);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::{ATTEMPT_SEPARATOR, EventLog};

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use proptest::prelude::*;

    // ------------------------------------------------------------------------
    // Append Contract Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_first_append_has_no_leading_newline() {
        let log = EventLog::new();
        log.append("A");
        assert_eq!(log.snapshot(), "A\n");
    }

    #[test]
    fn test_second_append_is_separated_by_blank_line() {
        let log = EventLog::new();
        log.append("A");
        log.append("B");
        assert_eq!(log.snapshot(), "A\n\nB\n");
    }

    #[test]
    fn test_multiline_message_counts_as_one_entry() {
        let log = EventLog::new();
        log.append("Receive failed\nerror = \"reset\"");
        assert_eq!(log.entry_count(), 1);
        assert_eq!(log.snapshot(), "Receive failed\nerror = \"reset\"\n");
    }

    #[test]
    fn test_clear_resets_log() {
        let log = EventLog::new();
        log.append("A");
        log.append("B");
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.snapshot(), "");
    }

    // ------------------------------------------------------------------------
    // Reconnect Rule Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_new_attempt_on_empty_log_is_noop() {
        let log = EventLog::new();
        log.note_new_attempt();
        assert_eq!(log.snapshot(), "");
        assert_eq!(log.entry_count(), 0);
    }

    #[test]
    fn test_new_attempt_clears_single_entry() {
        let log = EventLog::new();
        log.append("stray");
        log.note_new_attempt();
        assert!(log.is_empty());
    }

    #[test]
    fn test_new_attempt_separates_multiple_entries() {
        let log = EventLog::new();
        log.append("A");
        log.append("B");
        log.note_new_attempt();

        let snapshot = log.snapshot();
        assert!(snapshot.ends_with(&format!("\n{ATTEMPT_SEPARATOR}\n")));
        assert_eq!(log.entry_count(), 3);
    }

    #[test]
    fn test_single_stray_entry_does_not_accumulate() {
        let log = EventLog::new();
        for _ in 0..5 {
            log.note_new_attempt();
            log.append("Error: invalid URL \"x\"");
        }
        assert_eq!(log.entry_count(), 1);
    }

    // ------------------------------------------------------------------------
    // Listener Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_listener_receives_full_text() {
        let log = EventLog::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        log.set_on_changed(Box::new(move |text| {
            assert!(text.is_empty() || text.ends_with('\n'));
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        log.append("A");
        log.clear();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    // ------------------------------------------------------------------------
    // Property Tests
    // ------------------------------------------------------------------------

    proptest! {
        #[test]
        fn prop_append_contract(messages in proptest::collection::vec("[a-z0-9 ]{1,20}", 1..12)) {
            let log = EventLog::new();
            for message in &messages {
                log.append(message);
            }

            let snapshot = log.snapshot();
            prop_assert_eq!(log.entry_count(), messages.len());
            prop_assert!(!snapshot.starts_with('\n'));
            prop_assert!(snapshot.ends_with('\n'));

            // Single-line messages reproduce as blank-line separated blocks.
            let blocks: Vec<&str> = snapshot.trim_end_matches('\n').split("\n\n").collect();
            prop_assert_eq!(&blocks, &messages.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }
}
