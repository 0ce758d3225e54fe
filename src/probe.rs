use log::trace;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, TcpListener};

/// Decides whether a local TCP port is occupied.
#[cfg_attr(test, mockall::automock)]
pub trait Prober: Send + Sync {
    /// Returns `true` when the port cannot be claimed locally.
    fn is_in_use(&self, port: u16) -> bool;
}

/// Probes a port by binding a listener on the wildcard address.
///
/// The dual-stack `[::]` wildcard is tried first so listeners on either IPv4
/// or IPv6 addresses block the bind. `0.0.0.0` is only used when the host
/// has no IPv6. A successful bind means the port is free; the listener is
/// dropped before returning so the probe never holds the port. Any other
/// bind failure, including missing privilege for ports below 1024, counts
/// as "in use".
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpProber;

impl Prober for TcpProber {
    fn is_in_use(&self, port: u16) -> bool {
        match TcpListener::bind((Ipv6Addr::UNSPECIFIED, port)) {
            // Dropping the listener closes the socket.
            Ok(_listener) => false,
            Err(err) if ipv6_unavailable(&err) => {
                trace!("IPv6 bind on port {} unavailable ({}), using IPv4", port, err);
                match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)) {
                    Ok(_listener) => false,
                    Err(err) => {
                        trace!("Bind on port {} failed: {}", port, err);
                        true
                    }
                }
            }
            Err(err) => {
                trace!("Bind on port {} failed: {}", port, err);
                true
            }
        }
    }
}

fn ipv6_unavailable(err: &io::Error) -> bool {
    #[cfg(unix)]
    let unsupported = err.raw_os_error() == Some(libc::EAFNOSUPPORT);
    #[cfg(not(unix))]
    let unsupported = false;

    unsupported || err.kind() == io::ErrorKind::AddrNotAvailable
}
