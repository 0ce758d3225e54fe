//! Plain text rendering of port results.

use crate::port::PortRange;
use crate::scanner::{Owner, PortResult, ScanReport, ScanSummary};
use std::io::{self, Write};
use std::time::Duration;

/// One line describing a single port.
pub fn format_result(result: &PortResult) -> String {
    if !result.in_use {
        return format!("○ Port {} is available", result.port);
    }

    let mut line = format!("● Port {} is in use", result.port);
    match &result.owner {
        Owner::Found(info) => {
            line.push_str(&format!(" (PID: {}, Process: {})", info.pid, info.name));
        }
        Owner::Unavailable => line.push_str(" (process info unavailable - may need root)"),
        Owner::NotQueried => {}
    }
    line
}

/// The elapsed time is rounded to the millisecond, e.g. `12ms` or `1.234s`.
pub fn format_summary(summary: &ScanSummary) -> String {
    format!(
        "{} ports scanned in {:?} | {} in use, {} available",
        summary.total,
        round_to_millis(summary.elapsed),
        summary.in_use,
        summary.available
    )
}

fn round_to_millis(elapsed: Duration) -> Duration {
    let millis = (elapsed.as_micros() + 500) / 1000;
    Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
}

pub fn write_result<W: Write>(out: &mut W, result: &PortResult) -> io::Result<()> {
    writeln!(out, "{}", format_result(result))
}

pub fn write_scan_header<W: Write>(out: &mut W, range: PortRange) -> io::Result<()> {
    writeln!(out, "Scanning ports {}...", range)?;
    writeln!(out)
}

/// Writes the in-use ports of a scan followed by the summary line.
pub fn write_scan_report<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    for result in report.in_use() {
        write_result(out, result)?;
    }
    writeln!(out)?;
    writeln!(out, "{}", format_summary(&report.summary))
}
