//! Credential and authentication-method builders.
//!
//! A credential is built only when both the username and the password are
//! non-empty; a method token is built only for a recognized method value.
//! Both are independent of each other.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::settings::{AuthMethod, AuthSettings};

// ============================================================================
// Credential
// ============================================================================

/// A username/password pair for proxy or endpoint authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Account name.
    pub username: String,

    /// Account secret.
    pub password: String,
}

impl Credential {
    /// Creates a credential.
    #[inline]
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Renders the `Basic` authorization header value.
    #[must_use]
    pub fn basic_authorization(&self) -> String {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {encoded}")
    }
}

// Keep the password out of Debug output.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Builds a credential from the authentication fields.
///
/// Returns `None` unless both the username and the password are non-empty.
#[must_use]
pub fn build_credential(auth: &AuthSettings) -> Option<Credential> {
    if auth.username.is_empty() || auth.password.is_empty() {
        return None;
    }
    Some(Credential::new(auth.username.clone(), auth.password.clone()))
}

/// Builds the authentication-method token from the authentication fields.
///
/// Unrecognized method values collapse to `None`.
#[inline]
#[must_use]
pub fn build_auth_method(auth: &AuthSettings) -> Option<AuthMethod> {
    AuthMethod::parse(&auth.method)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::{build_auth_method, build_credential};
    use crate::settings::{AuthMethod, AuthSettings};

    #[test]
    fn test_credential_requires_both_fields() {
        let mut auth = AuthSettings {
            method: String::new(),
            username: "user".into(),
            password: String::new(),
        };
        assert!(build_credential(&auth).is_none());

        auth.username = String::new();
        auth.password = "pass".into();
        assert!(build_credential(&auth).is_none());

        auth.username = "user".into();
        let credential = build_credential(&auth).expect("credential should build");
        assert_eq!(credential.username, "user");
        assert_eq!(credential.password, "pass");
    }

    #[test]
    fn test_basic_authorization_rendering() {
        let auth = AuthSettings {
            method: "basic".into(),
            username: "aladdin".into(),
            password: "opensesame".into(),
        };
        let credential = build_credential(&auth).expect("credential should build");
        // "aladdin:opensesame" in RFC 4648 standard alphabet.
        assert_eq!(
            credential.basic_authorization(),
            "Basic YWxhZGRpbjpvcGVuc2VzYW1l"
        );
    }

    #[test]
    fn test_method_builder_recognizes_known_values() {
        let auth = AuthSettings {
            method: "negotiate".into(),
            ..Default::default()
        };
        assert_eq!(build_auth_method(&auth), Some(AuthMethod::Negotiate));
    }

    #[test]
    fn test_method_builder_collapses_unknown_values() {
        let auth = AuthSettings {
            method: "kerberos".into(),
            ..Default::default()
        };
        assert_eq!(build_auth_method(&auth), None);
    }

    #[test]
    fn test_debug_redacts_password() {
        let credential = super::Credential::new("user", "hunter2");
        let rendered = format!("{credential:?}");
        assert!(rendered.contains("user"));
        assert!(!rendered.contains("hunter2"));
    }
}
