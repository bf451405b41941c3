//! Modern structured proxy descriptors.
//!
//! The declarative proxy-configuration list: an ordered set of SOCKS v5 and
//! HTTP CONNECT descriptors, each addressed by an IPv4 literal. Entries whose
//! host fails to parse as an IPv4 address are dropped individually so a
//! partially-invalid form never blocks connecting through the valid proxy.

// ============================================================================
// Imports
// ============================================================================

use std::net::{Ipv4Addr, SocketAddrV4};

use serde::Serialize;
use tracing::warn;

use crate::settings::{ProxyEndpoint, ProxySettings};

// ============================================================================
// ProxyDescriptor
// ============================================================================

/// One entry in the modern proxy list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProxyDescriptor {
    /// SOCKS v5 proxy.
    Socks5 {
        /// Proxy address.
        addr: SocketAddrV4,
    },

    /// HTTP CONNECT proxy.
    HttpConnect {
        /// Proxy address.
        addr: SocketAddrV4,
    },
}

impl ProxyDescriptor {
    /// Returns the proxy address.
    #[inline]
    #[must_use]
    pub fn addr(&self) -> SocketAddrV4 {
        match self {
            Self::Socks5 { addr } | Self::HttpConnect { addr } => *addr,
        }
    }
}

// ============================================================================
// ModernProxyConfig
// ============================================================================

/// Ordered list of modern proxy descriptors.
///
/// Descriptors are tried in order at connect time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModernProxyConfig {
    /// Descriptors in attempt order.
    pub proxies: Vec<ProxyDescriptor>,
}

// ============================================================================
// Builder
// ============================================================================

/// Builds the modern configuration from a settings snapshot.
///
/// Returns `None` when the override flag is off, no modern entry is enabled,
/// or no enabled entry survives IPv4 validation. SOCKS v5 precedes HTTP
/// CONNECT in the resulting list.
#[must_use]
pub fn build_modern_proxy_config(settings: &ProxySettings) -> Option<ModernProxyConfig> {
    if !settings.override_enabled || !settings.has_enabled_modern() {
        return None;
    }

    let mut proxies = Vec::with_capacity(2);

    if let Some(addr) = parse_ipv4_endpoint(&settings.modern_socks5, "SOCKS5") {
        proxies.push(ProxyDescriptor::Socks5 { addr });
    }

    if let Some(addr) = parse_ipv4_endpoint(&settings.modern_http_connect, "HTTP CONNECT") {
        proxies.push(ProxyDescriptor::HttpConnect { addr });
    }

    if proxies.is_empty() {
        return None;
    }

    Some(ModernProxyConfig { proxies })
}

/// Parses an enabled endpoint into an IPv4 socket address.
///
/// A host that is not an IPv4 literal drops the entry rather than failing
/// the whole build.
fn parse_ipv4_endpoint(endpoint: &ProxyEndpoint, kind: &str) -> Option<SocketAddrV4> {
    let (host, port) = endpoint.host_port()?;

    match host.parse::<Ipv4Addr>() {
        Ok(ip) => Some(SocketAddrV4::new(ip, port)),
        Err(_) => {
            warn!(kind, host, "dropping proxy entry with non-IPv4 host");
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::{ProxyDescriptor, build_modern_proxy_config};
    use crate::settings::{ProxyEndpoint, ProxySettings};

    fn both_enabled() -> ProxySettings {
        ProxySettings {
            override_enabled: true,
            modern_socks5: ProxyEndpoint::new("127.0.0.1", 8889),
            modern_http_connect: ProxyEndpoint::new("10.0.0.2", 9090),
            ..Default::default()
        }
    }

    #[test]
    fn test_override_disabled_yields_none() {
        let mut settings = both_enabled();
        settings.override_enabled = false;
        assert_eq!(build_modern_proxy_config(&settings), None);
    }

    #[test]
    fn test_no_enabled_entries_yields_none() {
        let settings = ProxySettings {
            override_enabled: true,
            ..Default::default()
        };
        assert_eq!(build_modern_proxy_config(&settings), None);
    }

    #[test]
    fn test_socks_precedes_http_connect() {
        let config = build_modern_proxy_config(&both_enabled()).expect("config should build");
        assert_eq!(config.proxies.len(), 2);
        assert!(matches!(config.proxies[0], ProxyDescriptor::Socks5 { .. }));
        assert!(matches!(
            config.proxies[1],
            ProxyDescriptor::HttpConnect { .. }
        ));
    }

    #[test]
    fn test_invalid_host_drops_only_that_entry() {
        let mut settings = both_enabled();
        settings.modern_http_connect = ProxyEndpoint::new("proxy.example.com", 9090);

        let config = build_modern_proxy_config(&settings).expect("config should build");
        assert_eq!(config.proxies.len(), 1);
        assert!(matches!(config.proxies[0], ProxyDescriptor::Socks5 { .. }));
    }

    #[test]
    fn test_all_hosts_invalid_yields_none() {
        let settings = ProxySettings {
            override_enabled: true,
            modern_socks5: ProxyEndpoint::new("not-an-ip", 8889),
            modern_http_connect: ProxyEndpoint::new("::1", 9090),
            ..Default::default()
        };
        assert_eq!(build_modern_proxy_config(&settings), None);
    }

    #[test]
    fn test_descriptor_addr() {
        let config = build_modern_proxy_config(&both_enabled()).expect("config should build");
        assert_eq!(config.proxies[0].addr().port(), 8889);
        assert_eq!(config.proxies[1].addr().to_string(), "10.0.0.2:9090");
    }
}
