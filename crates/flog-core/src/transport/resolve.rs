use super::TransportSocketAddr;
use crate::error::CoreError;
use std::io;
use std::net::SocketAddr;

/// Orders resolved candidates IPv6-first, IPv4-second — `bind`/`connect`
/// implementations walk this order and fall back from IPv6 to IPv4
/// specifically on `EAFNOSUPPORT` (not on arbitrary connect failures,
/// which should simply propagate).
///
/// Design note: whether the blocking-mode choice should be preserved
/// across the IPv6→IPv4 recreate. This crate standardises on "yes,
/// always" — see `DESIGN.md` for the rationale; callers that recreate a
/// socket after `is_eafnosupport` fires must copy the original socket's
/// blocking flag onto the replacement.
pub fn resolve_with_ipv4_fallback(candidates: &[SocketAddr]) -> Vec<TransportSocketAddr> {
    let mut v6: Vec<TransportSocketAddr> = Vec::new();
    let mut v4: Vec<TransportSocketAddr> = Vec::new();
    for addr in candidates {
        if addr.is_ipv6() {
            v6.push((*addr).into());
        } else {
            v4.push((*addr).into());
        }
    }
    v6.extend(v4);
    v6
}

/// `true` if `err` is the platform's "address family not supported"
/// failure — the only error that triggers an IPv6→IPv4 retry (as opposed
/// to, say, `ECONNREFUSED`, which must propagate as a normal transport
/// failure).
pub fn is_eafnosupport(err: &io::Error) -> bool {
    // `std::io::ErrorKind` has no dedicated variant for EAFNOSUPPORT; match
    // on the raw OS error code where available, falling back to the kind
    // that `socket2`/Tokio surface for the condition on most platforms.
    #[cfg(unix)]
    {
        matches!(err.raw_os_error(), Some(libc_eafnosupport) if libc_eafnosupport == 97)
    }
    #[cfg(not(unix))]
    {
        err.kind() == io::ErrorKind::Unsupported
    }
}

/// Whether a bind/connect loop over [`resolve_with_ipv4_fallback`]'s
/// candidates should try the next one after `err`, versus propagating
/// `err` immediately. Only an `EAFNOSUPPORT` io cause retries; everything
/// else — connection refused, timed out, cancelled — is an "arbitrary
/// connect failure" per this module's own fallback contract and must
/// propagate instead of silently moving on to a different address family.
pub fn should_retry_candidate(err: &CoreError) -> bool {
    err.cause()
        .and_then(|cause| cause.downcast_ref::<io::Error>())
        .is_some_and(is_eafnosupport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn orders_ipv6_candidates_before_ipv4() {
        let v4: SocketAddr = (Ipv4Addr::new(127, 0, 0, 1), 80).into();
        let v6: SocketAddr = (Ipv6Addr::LOCALHOST, 80).into();
        let ordered = resolve_with_ipv4_fallback(&[v4, v6]);
        assert!(ordered[0].is_ipv6());
        assert!(ordered[1].is_ipv4());
    }

    #[test]
    fn a_connection_refused_cause_does_not_retry() {
        let io_err = io::Error::from(io::ErrorKind::ConnectionRefused);
        let err = CoreError::from_io(crate::error::codes::CONNECT, io_err);
        assert!(!should_retry_candidate(&err));
    }

    #[test]
    fn an_error_with_no_io_cause_does_not_retry() {
        let err = CoreError::timeout();
        assert!(!should_retry_candidate(&err));
    }
}
