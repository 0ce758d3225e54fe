//! Single-port checks and the bounded-concurrency range scan.

use crate::port::PortRange;
use crate::probe::Prober;
use crate::process::{ProcessInfo, ProcessResolver};
use log::{debug, warn};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{mpsc, Semaphore};

/// Default number of ports probed at the same time during a range scan.
pub const DEFAULT_CONCURRENCY: usize = 100;

/// Ownership information attached to a [`PortResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    /// Resolution was not requested, or the port is available.
    NotQueried,
    /// Resolution succeeded.
    Found(ProcessInfo),
    /// Resolution was requested for an in-use port and failed.
    Unavailable,
}

/// Outcome of checking one port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortResult {
    pub port: u16,
    pub in_use: bool,
    pub owner: Owner,
}

impl PortResult {
    pub fn available(port: u16) -> Self {
        Self {
            port,
            in_use: false,
            owner: Owner::NotQueried,
        }
    }

    pub fn owner_pid(&self) -> Option<i32> {
        match &self.owner {
            Owner::Found(info) => Some(info.pid),
            _ => None,
        }
    }

    pub fn owner_name(&self) -> Option<&str> {
        match &self.owner {
            Owner::Found(info) => Some(&info.name),
            _ => None,
        }
    }
}

/// Totals for a completed range scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub total: usize,
    pub in_use: usize,
    pub available: usize,
    pub elapsed: Duration,
}

impl ScanSummary {
    fn from_results(results: &[PortResult], elapsed: Duration) -> Self {
        let in_use = results.iter().filter(|result| result.in_use).count();
        Self {
            total: results.len(),
            in_use,
            available: results.len() - in_use,
            elapsed,
        }
    }
}

/// Results of a range scan, ordered by ascending port.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub results: Vec<PortResult>,
    pub summary: ScanSummary,
}

impl ScanReport {
    pub fn in_use(&self) -> impl Iterator<Item = &PortResult> {
        self.results.iter().filter(|result| result.in_use)
    }
}

/// Probes one port and, if asked to, looks up the owner of an occupied port.
#[derive(Clone)]
pub struct PortChecker {
    prober: Arc<dyn Prober>,
    resolver: Option<Arc<dyn ProcessResolver>>,
}

impl PortChecker {
    pub fn new(prober: impl Prober + 'static) -> Self {
        Self {
            prober: Arc::new(prober),
            resolver: None,
        }
    }

    /// Enables owner lookup for in-use ports.
    pub fn with_resolver(mut self, resolver: Arc<dyn ProcessResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn resolves_owner(&self) -> bool {
        self.resolver.is_some()
    }

    pub fn check(&self, port: u16) -> PortResult {
        if !self.prober.is_in_use(port) {
            return PortResult::available(port);
        }

        let owner = match &self.resolver {
            None => Owner::NotQueried,
            Some(resolver) => match resolver.resolve(port) {
                Some(info) => Owner::Found(info),
                None => Owner::Unavailable,
            },
        };

        PortResult {
            port,
            in_use: true,
            owner,
        }
    }
}

/// Checks every port of a range with at most `concurrency` probes in flight.
#[derive(Clone)]
pub struct RangeScanner {
    checker: PortChecker,
    concurrency: usize,
}

impl RangeScanner {
    /// `concurrency` is clamped to `1..=Semaphore::MAX_PERMITS`.
    pub fn new(checker: PortChecker, concurrency: usize) -> Self {
        Self {
            checker,
            concurrency: concurrency.clamp(1, Semaphore::MAX_PERMITS),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Scans `range` and returns exactly one result per port, sorted by port.
    ///
    /// One task is spawned per port. Each task holds a semaphore permit
    /// for the duration of its probe and sends its result over a channel.
    /// The channel only closes once every task has dropped its sender,
    /// so draining it waits for the whole scan.
    pub async fn scan(&self, range: PortRange) -> ScanReport {
        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let (tx, mut rx) = mpsc::unbounded_channel();

        debug!(
            "Scanning {} ports ({}) with concurrency {}",
            range.len(),
            range,
            self.concurrency
        );

        for port in range.ports() {
            let semaphore = Arc::clone(&semaphore);
            let checker = self.checker.clone();
            let tx = tx.clone();
            let fallback_owner = if checker.resolves_owner() {
                Owner::Unavailable
            } else {
                Owner::NotQueried
            };

            tokio::spawn(async move {
                // The semaphore is never closed, so this always holds a permit.
                let _permit = semaphore.acquire_owned().await;

                let result = match tokio::task::spawn_blocking(move || checker.check(port)).await {
                    Ok(result) => result,
                    Err(err) => {
                        warn!("Check of port {} did not complete: {}", port, err);
                        PortResult {
                            port,
                            in_use: true,
                            owner: fallback_owner,
                        }
                    }
                };

                let _ = tx.send(result);
            });
        }
        drop(tx);

        let mut results = Vec::with_capacity(range.len());
        while let Some(result) = rx.recv().await {
            results.push(result);
        }
        let elapsed = started.elapsed();

        results.sort_by_key(|result| result.port);
        let summary = ScanSummary::from_results(&results, elapsed);

        debug!(
            "Scanned {} ports in {:?}: {} in use",
            summary.total, summary.elapsed, summary.in_use
        );

        ScanReport { results, summary }
    }
}
