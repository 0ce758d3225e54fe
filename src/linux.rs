use crate::process::{ProcessInfo, ProcessResolver, UNKNOWN_PROCESS_NAME};
use log::debug;
use procfs::net::{read_tcp_table, TcpState};
use procfs::process::FDTarget;
use procfs::{ProcError, ProcResult};
use std::{
    fs::{self, File},
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

/// Socket tables searched in order; IPv6 is only consulted when IPv4 has no match.
const TCP_TABLES: [&str; 2] = ["net/tcp", "net/tcp6"];

/// Resolves port owners from the proc filesystem.
///
/// The TCP socket tables give the inode of the listening socket, and every
/// process's `fd` directory is then searched for a `socket:[<inode>]` link.
#[derive(Debug, Clone)]
pub struct ProcfsResolver {
    root: PathBuf,
}

impl Default for ProcfsResolver {
    fn default() -> Self {
        Self::with_root("/proc")
    }
}

impl ProcfsResolver {
    /// Uses an alternate proc tree instead of `/proc`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Finds the inode of the socket listening on `port`.
    fn find_listening_inode(&self, port: u16) -> Option<u64> {
        for table in TCP_TABLES {
            let path = self.root.join(table);
            let found = File::open(&path)
                .map_err(ProcError::from)
                .and_then(|file| listening_inode(file, port));

            match found {
                Ok(Some(inode)) => {
                    debug!("Port {} is socket inode {} in {}", port, inode, path.display());
                    return Some(inode);
                }
                Ok(None) => {}
                Err(err) => debug!("Unable to read {}: {}", path.display(), err),
            }
        }

        None
    }

    /// Finds the first process holding a descriptor for the socket `inode`.
    fn find_process_by_inode(&self, inode: u64) -> Option<ProcessInfo> {
        let processes = match procfs::process::all_processes_with_root(&self.root) {
            Ok(processes) => processes,
            Err(err) => {
                debug!("Unable to enumerate processes: {}", err);
                return None;
            }
        };

        let mut denied = 0usize;

        // Processes may exit while we walk the tree; those entries are skipped.
        for process in processes.flatten() {
            let fds = match process.fd() {
                Ok(fds) => fds,
                Err(ProcError::PermissionDenied(_)) => {
                    denied += 1;
                    continue;
                }
                Err(err) => {
                    debug!("Skipping PID {}: {}", process.pid, err);
                    continue;
                }
            };

            let owns_socket = fds
                .flatten()
                .any(|fd| matches!(fd.target, FDTarget::Socket(target) if target == inode));

            if owns_socket {
                debug!("Found process with PID {}", process.pid);
                let name = self.command_name(process.pid);
                return Some(ProcessInfo::new(process.pid, name));
            }
        }

        if denied > 0 {
            debug!(
                "No owner found for inode {}; {} process(es) could not be inspected, elevated privileges may be required",
                inode, denied
            );
        }

        None
    }

    fn command_name(&self, pid: i32) -> String {
        let path = self.root.join(pid.to_string()).join("comm");
        fs::read_to_string(path)
            .map(|comm| comm.trim().to_string())
            .ok()
            .filter(|comm| !comm.is_empty())
            .unwrap_or_else(|| UNKNOWN_PROCESS_NAME.to_string())
    }
}

impl ProcessResolver for ProcfsResolver {
    fn resolve(&self, port: u16) -> Option<ProcessInfo> {
        let inode = self.find_listening_inode(port)?;
        self.find_process_by_inode(inode)
    }
}

/// Returns the inode of the first LISTEN entry for `port` in a
/// `/proc/net/tcp` or `/proc/net/tcp6` style table.
fn listening_inode<R: Read>(table: R, port: u16) -> ProcResult<Option<u64>> {
    let entries = read_tcp_table(BufReader::new(table))?;

    Ok(entries
        .into_iter()
        .find(|entry| {
            entry.local_address.port() == port && matches!(entry.state, TcpState::Listen)
        })
        .map(|entry| entry.inode))
}
