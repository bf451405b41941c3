//! Symbolic names for platform networking error codes.
//!
//! Static lookup used to enrich event-log lines with the errno mnemonic
//! behind an opaque OS error number. The table covers the codes a socket
//! client can realistically hit; anything else simply yields no enrichment.
//! Never consulted for control flow.
//!
//! Codes use Linux errno numbering.

// ============================================================================
// Lookup
// ============================================================================

/// Returns the symbolic name for a platform networking error code.
///
/// # Example
///
/// ```
/// use ws_proxy_bench::errname::symbolic_name;
///
/// assert_eq!(symbolic_name(111), Some("ECONNREFUSED"));
/// assert_eq!(symbolic_name(-1), None);
/// ```
#[must_use]
pub fn symbolic_name(code: i32) -> Option<&'static str> {
    let name = match code {
        1 => "EPERM",
        4 => "EINTR",
        9 => "EBADF",
        11 => "EAGAIN",
        13 => "EACCES",
        22 => "EINVAL",
        24 => "EMFILE",
        32 => "EPIPE",
        98 => "EADDRINUSE",
        99 => "EADDRNOTAVAIL",
        100 => "ENETDOWN",
        101 => "ENETUNREACH",
        102 => "ENETRESET",
        103 => "ECONNABORTED",
        104 => "ECONNRESET",
        105 => "ENOBUFS",
        106 => "EISCONN",
        107 => "ENOTCONN",
        110 => "ETIMEDOUT",
        111 => "ECONNREFUSED",
        112 => "EHOSTDOWN",
        113 => "EHOSTUNREACH",
        115 => "EINPROGRESS",
        _ => return None,
    };
    Some(name)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::symbolic_name;

    #[test]
    fn test_known_codes() {
        assert_eq!(symbolic_name(104), Some("ECONNRESET"));
        assert_eq!(symbolic_name(110), Some("ETIMEDOUT"));
        assert_eq!(symbolic_name(111), Some("ECONNREFUSED"));
        assert_eq!(symbolic_name(113), Some("EHOSTUNREACH"));
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(symbolic_name(0), None);
        assert_eq!(symbolic_name(-7), None);
        assert_eq!(symbolic_name(9999), None);
    }
}
