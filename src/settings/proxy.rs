//! Proxy setting groups.
//!
//! Two independent groups of per-protocol proxy endpoints:
//!
//! - **Legacy**: OS-level, protocol-keyed entries (HTTP, HTTPS, SOCKS).
//! - **Modern**: the declarative proxy-configuration list (HTTP CONNECT,
//!   SOCKS v5), restricted to IPv4 literal hosts at build time.
//!
//! Both groups are gated by a single override flag; either, both, or neither
//! may be populated.
//!
//! # Example
//!
//! ```
//! use ws_proxy_bench::settings::{ProxyEndpoint, ProxySettings};
//!
//! let settings = ProxySettings {
//!     override_enabled: true,
//!     legacy_http: ProxyEndpoint::new("127.0.0.1", 9090),
//!     ..Default::default()
//! };
//! assert!(settings.legacy_http.is_enabled());
//! assert!(!settings.legacy_socks.is_enabled());
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// ProxyEndpoint
// ============================================================================

/// A single host/port proxy field pair.
///
/// An endpoint is *enabled* only when the host is non-empty and a port is
/// present; anything less is treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    /// Proxy hostname or address literal.
    pub host: String,

    /// Proxy port.
    pub port: Option<u16>,
}

impl ProxyEndpoint {
    /// Creates an endpoint with both fields populated.
    #[inline]
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port: Some(port),
        }
    }

    /// Returns `true` if this endpoint has a host and a port.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.host.is_empty() && self.port.is_some()
    }

    /// Returns the host/port pair when the endpoint is enabled.
    #[must_use]
    pub fn host_port(&self) -> Option<(&str, u16)> {
        match self.port {
            Some(port) if !self.host.is_empty() => Some((self.host.as_str(), port)),
            _ => None,
        }
    }
}

// ============================================================================
// ProxySettings
// ============================================================================

/// The full set of user-entered proxy fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySettings {
    /// Gates whether either proxy group is applied to new connections.
    pub override_enabled: bool,

    /// Legacy HTTP proxy.
    pub legacy_http: ProxyEndpoint,

    /// Legacy HTTPS proxy.
    pub legacy_https: ProxyEndpoint,

    /// Legacy SOCKS proxy.
    pub legacy_socks: ProxyEndpoint,

    /// Modern HTTP CONNECT proxy (IPv4 literal host).
    pub modern_http_connect: ProxyEndpoint,

    /// Modern SOCKS v5 proxy (IPv4 literal host).
    pub modern_socks5: ProxyEndpoint,
}

impl ProxySettings {
    /// Returns `true` if any legacy entry is enabled.
    #[inline]
    #[must_use]
    pub fn has_enabled_legacy(&self) -> bool {
        self.legacy_http.is_enabled()
            || self.legacy_https.is_enabled()
            || self.legacy_socks.is_enabled()
    }

    /// Returns `true` if any modern entry is enabled.
    #[inline]
    #[must_use]
    pub fn has_enabled_modern(&self) -> bool {
        self.modern_http_connect.is_enabled() || self.modern_socks5.is_enabled()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::{ProxyEndpoint, ProxySettings};

    // ------------------------------------------------------------------------
    // ProxyEndpoint Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_endpoint_enabled() {
        assert!(ProxyEndpoint::new("127.0.0.1", 9090).is_enabled());
    }

    #[test]
    fn test_endpoint_disabled_without_host() {
        let endpoint = ProxyEndpoint {
            host: String::new(),
            port: Some(9090),
        };
        assert!(!endpoint.is_enabled());
        assert_eq!(endpoint.host_port(), None);
    }

    #[test]
    fn test_endpoint_disabled_without_port() {
        let endpoint = ProxyEndpoint {
            host: "127.0.0.1".into(),
            port: None,
        };
        assert!(!endpoint.is_enabled());
        assert_eq!(endpoint.host_port(), None);
    }

    #[test]
    fn test_endpoint_host_port() {
        let endpoint = ProxyEndpoint::new("proxy.internal", 8889);
        assert_eq!(endpoint.host_port(), Some(("proxy.internal", 8889)));
    }

    #[test]
    fn test_endpoint_default_is_disabled() {
        assert!(!ProxyEndpoint::default().is_enabled());
    }

    // ------------------------------------------------------------------------
    // ProxySettings Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_group_predicates() {
        let settings = ProxySettings {
            override_enabled: true,
            legacy_socks: ProxyEndpoint::new("127.0.0.1", 8889),
            ..Default::default()
        };
        assert!(settings.has_enabled_legacy());
        assert!(!settings.has_enabled_modern());
    }

    #[test]
    fn test_groups_are_independent() {
        let settings = ProxySettings {
            override_enabled: true,
            legacy_http: ProxyEndpoint::new("127.0.0.1", 9090),
            modern_socks5: ProxyEndpoint::new("127.0.0.1", 8889),
            ..Default::default()
        };
        assert!(settings.has_enabled_legacy());
        assert!(settings.has_enabled_modern());
    }
}
