//! Session configuration built from the current settings.
//!
//! Pure transformations from user-entered fields into the artifacts a new
//! connection consumes: the legacy protocol-keyed proxy config, the modern
//! ordered proxy list, and the optional credential/method pair. Builders
//! have no side effects and operate on a settings snapshot.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `legacy` | OS-style protocol-keyed proxy configuration |
//! | `modern` | Ordered list of structured proxy descriptors |
//! | `credentials` | Credential and authentication-method builders |

// ============================================================================
// Submodules
// ============================================================================

/// Legacy protocol-keyed proxy configuration.
pub mod legacy;

/// Modern structured proxy descriptors.
pub mod modern;

/// Credential and method builders.
pub mod credentials;

// ============================================================================
// Re-exports
// ============================================================================

pub use credentials::{Credential, build_auth_method, build_credential};
pub use legacy::{HostPort, LegacyProxyConfig, build_legacy_proxy_config};
pub use modern::{ModernProxyConfig, ProxyDescriptor, build_modern_proxy_config};

use crate::settings::{AuthMethod, AuthSettings, ProxySettings};

// ============================================================================
// SessionConfig
// ============================================================================

/// Everything a new session needs from the settings, snapshotted at connect
/// time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Legacy proxy configuration, when built.
    pub legacy: Option<LegacyProxyConfig>,

    /// Modern proxy configuration, when built.
    pub modern: Option<ModernProxyConfig>,

    /// Authentication credential, when both fields were supplied.
    pub credential: Option<Credential>,

    /// Recognized authentication method, when one was selected.
    pub auth_method: Option<AuthMethod>,
}

impl SessionConfig {
    /// Builds the full configuration from a settings snapshot.
    #[must_use]
    pub fn from_settings(proxy: &ProxySettings, auth: &AuthSettings) -> Self {
        Self {
            legacy: build_legacy_proxy_config(proxy),
            modern: build_modern_proxy_config(proxy),
            credential: build_credential(auth),
            auth_method: build_auth_method(auth),
        }
    }

    /// A configuration with no proxies and no credential.
    #[inline]
    #[must_use]
    pub fn direct() -> Self {
        Self::default()
    }

    /// Returns `true` if any proxy group was built.
    #[inline]
    #[must_use]
    pub fn uses_proxy(&self) -> bool {
        self.legacy.is_some() || self.modern.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::SessionConfig;
    use crate::settings::{AuthSettings, ProxyEndpoint, ProxySettings};

    #[test]
    fn test_direct_config() {
        let config = SessionConfig::direct();
        assert!(!config.uses_proxy());
        assert!(config.credential.is_none());
        assert!(config.auth_method.is_none());
    }

    #[test]
    fn test_from_settings_builds_all_parts() {
        let proxy = ProxySettings {
            override_enabled: true,
            legacy_http: ProxyEndpoint::new("127.0.0.1", 9090),
            modern_socks5: ProxyEndpoint::new("127.0.0.1", 8889),
            ..Default::default()
        };
        let auth = AuthSettings {
            method: "basic".into(),
            username: "user".into(),
            password: "pass".into(),
        };

        let config = SessionConfig::from_settings(&proxy, &auth);
        assert!(config.uses_proxy());
        assert!(config.legacy.is_some());
        assert!(config.modern.is_some());
        assert!(config.credential.is_some());
        assert!(config.auth_method.is_some());
    }

    #[test]
    fn test_override_disabled_builds_no_proxies() {
        let proxy = ProxySettings {
            override_enabled: false,
            legacy_http: ProxyEndpoint::new("127.0.0.1", 9090),
            modern_socks5: ProxyEndpoint::new("127.0.0.1", 8889),
            ..Default::default()
        };

        let config = SessionConfig::from_settings(&proxy, &AuthSettings::default());
        assert!(!config.uses_proxy());
    }
}
