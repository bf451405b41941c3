//! Legacy protocol-keyed proxy configuration.
//!
//! The OS-level proxy dictionary shape: one optional entry per protocol
//! (HTTP, HTTPS, SOCKS). Disabled protocols are omitted entirely rather
//! than carried with empty values.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::{Value, json};

use crate::settings::{ProxyEndpoint, ProxySettings};

// ============================================================================
// HostPort
// ============================================================================

/// A resolved host/port entry in a built configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostPort {
    /// Proxy hostname or address literal.
    pub host: String,

    /// Proxy port.
    pub port: u16,
}

impl HostPort {
    /// Creates a new entry.
    #[inline]
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

// ============================================================================
// LegacyProxyConfig
// ============================================================================

/// Legacy proxy configuration with exactly the enabled protocol entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LegacyProxyConfig {
    /// HTTP proxy entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<HostPort>,

    /// HTTPS proxy entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https: Option<HostPort>,

    /// SOCKS proxy entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socks: Option<HostPort>,
}

impl LegacyProxyConfig {
    /// Renders the OS-style protocol-keyed dictionary for diagnostics.
    ///
    /// Only enabled protocols appear; each contributes its `Enable`,
    /// `Proxy`, and `Port` keys.
    #[must_use]
    pub fn to_dictionary(&self) -> Value {
        let mut dictionary = serde_json::Map::new();

        let mut insert = |prefix: &str, entry: &Option<HostPort>| {
            if let Some(entry) = entry {
                dictionary.insert(format!("{prefix}Enable"), json!(1));
                dictionary.insert(format!("{prefix}Proxy"), json!(entry.host));
                dictionary.insert(format!("{prefix}Port"), json!(entry.port));
            }
        };

        insert("HTTP", &self.http);
        insert("HTTPS", &self.https);
        insert("SOCKS", &self.socks);

        Value::Object(dictionary)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builds the legacy configuration from a settings snapshot.
///
/// Returns `None` when the override flag is off or no legacy entry is
/// enabled.
#[must_use]
pub fn build_legacy_proxy_config(settings: &ProxySettings) -> Option<LegacyProxyConfig> {
    if !settings.override_enabled || !settings.has_enabled_legacy() {
        return None;
    }

    let entry = |endpoint: &ProxyEndpoint| {
        endpoint
            .host_port()
            .map(|(host, port)| HostPort::new(host, port))
    };

    Some(LegacyProxyConfig {
        http: entry(&settings.legacy_http),
        https: entry(&settings.legacy_https),
        socks: entry(&settings.legacy_socks),
    })
}

// ============================================================================
// Tests
// ============================================================================
