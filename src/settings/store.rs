//! Atomic settings store.
//!
//! Holds the current field values and the derived [`SessionConfig`]. The
//! single `save` operation replaces every field and rebuilds the derived
//! configuration under one lock, so the connection manager can never observe
//! a torn, half-edited configuration.

// ============================================================================
// Imports
// ============================================================================

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SessionConfig;
use crate::settings::{AuthSettings, ProxySettings};

// ============================================================================
// Types
// ============================================================================

/// Callback fired after every successful save.
pub type SettingsListener = Box<dyn Fn() + Send + Sync>;

// ============================================================================
// Settings
// ============================================================================

/// The complete set of user-entered fields, saved wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// WebSocket endpoint URL text.
    pub endpoint_url: String,

    /// Proxy field groups.
    pub proxy: ProxySettings,

    /// Authentication fields.
    pub auth: AuthSettings,
}

// ============================================================================
// SettingsStore
// ============================================================================

/// Shared store for the current settings and their derived configuration.
///
/// # Thread Safety
///
/// `SettingsStore` is `Send + Sync`. Saves happen only on explicit user
/// action; reads return snapshots.
pub struct SettingsStore {
    /// Current fields plus the configuration derived from them.
    state: Mutex<StoreState>,
    /// Change listener for the presentation layer.
    listener: Mutex<Option<SettingsListener>>,
}

struct StoreState {
    settings: Settings,
    derived: SessionConfig,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore {
    /// Creates a store with empty settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Creates a store seeded with the given settings.
    #[must_use]
    pub fn with_settings(settings: Settings) -> Self {
        let derived = SessionConfig::from_settings(&settings.proxy, &settings.auth);
        Self {
            state: Mutex::new(StoreState { settings, derived }),
            listener: Mutex::new(None),
        }
    }

    /// Replaces every field and rebuilds the derived configuration.
    ///
    /// The replacement and the rebuild happen under one lock; partial
    /// updates are not supported.
    pub fn save(&self, settings: Settings) {
        {
            let mut state = self.state.lock();
            state.derived = SessionConfig::from_settings(&settings.proxy, &settings.auth);
            state.settings = settings;
        }

        debug!("settings saved");

        if let Some(listener) = self.listener.lock().as_ref() {
            listener();
        }
    }

    /// Returns a snapshot of the current fields.
    #[must_use]
    pub fn settings(&self) -> Settings {
        self.state.lock().settings.clone()
    }

    /// Returns the configuration derived from the last save.
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        self.state.lock().derived.clone()
    }

    /// Returns the current endpoint URL text.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        self.state.lock().settings.endpoint_url.clone()
    }

    /// Registers the settings-changed callback.
    pub fn set_on_settings_changed(&self, listener: SettingsListener) {
        *self.listener.lock() = Some(listener);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::{Settings, SettingsStore};
    use crate::settings::{AuthSettings, ProxyEndpoint, ProxySettings};

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_settings() -> Settings {
        Settings {
            endpoint_url: "wss://example.test/echo".into(),
            proxy: ProxySettings {
                override_enabled: true,
                legacy_http: ProxyEndpoint::new("127.0.0.1", 9090),
                modern_socks5: ProxyEndpoint::new("127.0.0.1", 8889),
                ..Default::default()
            },
            auth: AuthSettings {
                method: "basic".into(),
                username: "user".into(),
                password: "pass".into(),
            },
        }
    }

    #[test]
    fn test_save_round_trip() {
        let store = SettingsStore::new();
        let saved = sample_settings();

        store.save(saved.clone());

        assert_eq!(store.settings(), saved);
        assert_eq!(store.endpoint_url(), "wss://example.test/echo");
    }

    #[test]
    fn test_save_rebuilds_derived_config() {
        let store = SettingsStore::new();
        assert!(!store.session_config().uses_proxy());

        store.save(sample_settings());
        let config = store.session_config();
        assert!(config.legacy.is_some());
        assert!(config.modern.is_some());
        assert!(config.credential.is_some());

        // Turning the override off drops both proxy groups on the next save.
        let mut settings = sample_settings();
        settings.proxy.override_enabled = false;
        store.save(settings);
        assert!(!store.session_config().uses_proxy());
    }

    #[test]
    fn test_listener_fires_on_save() {
        let store = SettingsStore::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        store.set_on_settings_changed(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        store.save(sample_settings());
        store.save(Settings::default());
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_default_store_is_empty() {
        let store = SettingsStore::new();
        assert_eq!(store.settings(), Settings::default());
        assert!(!store.session_config().uses_proxy());
    }
}
