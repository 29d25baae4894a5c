//! Single-instance guard
//!
//! Checks a listen address before the server binds it. The check is
//! advisory: the address is released right away, so another process can
//! still win the race between the check and the real bind.

use std::io;
use std::net::TcpListener;

use tracing::debug;

/// Outcome of probing a listen address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// Nobody holds the address; the caller may start its listener.
    Free,
    /// A listener already owns the address.
    AlreadyInUse,
}

/// Try to bind `(host, port)` and release it immediately.
///
/// Returns `Ok(Claim::AlreadyInUse)` when the address is owned. Any other
/// bind failure (unknown host, address not available locally) is an `Err`.
pub fn try_claim(host: &str, port: u16) -> io::Result<Claim> {
    match TcpListener::bind((host, port)) {
        Ok(listener) => {
            debug!(%host, port, "address is free");
            drop(listener);
            Ok(Claim::Free)
        }
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
            debug!(%host, port, error = %e, "address already in use");
            Ok(Claim::AlreadyInUse)
        }
        Err(e) => Err(e),
    }
}
