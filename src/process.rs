//! Mapping a listening port to the process that owns it.

use std::fmt;

/// Name reported when the owner was found but its command name is unreadable.
pub const UNKNOWN_PROCESS_NAME: &str = "unknown";

/// The process holding a listening socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: i32,
    pub name: String,
}

impl ProcessInfo {
    pub fn new(pid: i32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }
}

impl fmt::Display for ProcessInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (PID {})", self.name, self.pid)
    }
}

/// Best-effort lookup of the owner of a listening TCP port.
///
/// Every failure (missing tables, permission denied, owner exited) is
/// reported as `None`; resolution never aborts the caller.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessResolver: Send + Sync {
    fn resolve(&self, port: u16) -> Option<ProcessInfo>;
}

/// Resolver for platforms without a supported socket table.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedResolver;

impl ProcessResolver for UnsupportedResolver {
    fn resolve(&self, _port: u16) -> Option<ProcessInfo> {
        None
    }
}

/// Returns the resolver for the platform this binary was built for.
#[cfg(target_os = "linux")]
pub fn native_resolver() -> Box<dyn ProcessResolver> {
    Box::new(crate::linux::ProcfsResolver::default())
}

/// Returns the resolver for the platform this binary was built for.
#[cfg(not(target_os = "linux"))]
pub fn native_resolver() -> Box<dyn ProcessResolver> {
    log::debug!("Process resolution is not supported on this platform");
    Box::new(UnsupportedResolver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_resolver_never_finds_owner() {
        assert_eq!(UnsupportedResolver.resolve(22), None);
        assert_eq!(UnsupportedResolver.resolve(65535), None);
    }

    #[test]
    fn process_info_display() {
        assert_eq!(ProcessInfo::new(4321, "testproc").to_string(), "testproc (PID 4321)");
    }
}
