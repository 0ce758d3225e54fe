//! The `portcheck` command-line utility reports whether local TCP ports are
//! in use.
//!
//! It accepts a single port or an inclusive range. Ranges are scanned
//! concurrently and the occupied ports are listed in ascending order,
//! followed by a summary. With `--pid`, the owning process of each occupied
//! port is looked up where the platform allows it.

use anyhow::Context;
use clap::Parser;
use log::error;
use portcheck::cli::PortCheckArgs;
use portcheck::port::{PortQuery, PortRange};
use portcheck::probe::TcpProber;
use portcheck::process::native_resolver;
use portcheck::report;
use portcheck::scanner::{PortChecker, RangeScanner};
use std::io::{self, Write};
use std::process::exit;
use std::sync::Arc;

/// The `main` function is the entry point of the `portcheck` utility.
///
/// It parses command-line arguments, sets up the logging environment, and
/// checks the requested port or range.
fn main() {
    // Parse command-line arguments
    let args = PortCheckArgs::parse();

    // Set up logging environment
    let log_level = args
        .verbose
        .log_level()
        .map(|level| level.to_level_filter())
        .unwrap_or(log::LevelFilter::Off);

    env_logger::Builder::new()
        .format_module_path(log_level == log::LevelFilter::Trace)
        .format_target(log_level == log::LevelFilter::Trace)
        .format_timestamp(Option::None)
        .filter_level(log_level)
        .init();

    if let Err(err) = run(&args) {
        error!("{:#}", err);
        exit(1);
    }
}

fn run(args: &PortCheckArgs) -> anyhow::Result<()> {
    let mut checker = PortChecker::new(TcpProber);
    if args.pid {
        checker = checker.with_resolver(Arc::from(native_resolver()));
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.query {
        PortQuery::Single(port) => {
            let result = checker.check(port);
            report::write_result(&mut out, &result).context("Failed to write result")?;
        }
        PortQuery::Range(range) => scan_range(&mut out, checker, range, args.concurrency)?,
    }

    out.flush().context("Failed to flush output")
}

fn scan_range<W: Write>(
    out: &mut W,
    checker: PortChecker,
    range: PortRange,
    concurrency: usize,
) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the scan runtime")?;

    report::write_scan_header(out, range).context("Failed to write output")?;
    out.flush().context("Failed to flush output")?;

    let scanner = RangeScanner::new(checker, concurrency);
    let scan_report = runtime.block_on(scanner.scan(range));

    report::write_scan_report(out, &scan_report).context("Failed to write scan report")
}
