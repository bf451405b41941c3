//! Authentication settings.
//!
//! The raw method/username/password fields entered by the user. The method is
//! stored as free text and only collapses to a recognized [`AuthMethod`] at
//! build time; unrecognized values mean "no method".

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// AuthMethod
// ============================================================================

/// Recognized authentication methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// HTTP Basic authentication.
    Basic,

    /// NT LAN Manager challenge/response.
    Ntlm,

    /// SPNEGO negotiation.
    Negotiate,
}

impl AuthMethod {
    /// Parses a user-entered method string.
    ///
    /// Matching is case-insensitive; anything unrecognized yields `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "basic" => Some(Self::Basic),
            "ntlm" => Some(Self::Ntlm),
            "negotiate" => Some(Self::Negotiate),
            _ => None,
        }
    }

    /// Returns the protocol-level scheme token.
    #[inline]
    #[must_use]
    pub fn scheme_token(&self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Ntlm => "NTLM",
            Self::Negotiate => "Negotiate",
        }
    }
}

// ============================================================================
// AuthSettings
// ============================================================================

/// User-entered authentication fields.
///
/// Set wholesale on save, consumed at connect time, never mutated
/// mid-connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Method name as typed (`"basic"`, `"ntlm"`, `"negotiate"`, or other).
    pub method: String,

    /// Username; a credential is built only when this is non-empty.
    pub username: String,

    /// Password; a credential is built only when this is non-empty.
    pub password: String,
}

// ============================================================================
// Tests
// ============================================================================
