use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};

use crate::port::{PortQuery, MAX_PORT};
use crate::scanner::DEFAULT_CONCURRENCY;

/// `portcheck` utility.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct PortCheckArgs {
    /// A single port or an inclusive range of ports.
    #[arg(
        name = "PORTS",
        help = "Port to check (e.g. 8080) or range to scan (e.g. 3000-3010)",
        value_parser = parse_query
    )]
    pub query: PortQuery,

    /// Look up the process owning each in-use port.
    #[arg(
        long,
        short = 'p',
        help = "Show the process ID and name using the port"
    )]
    pub pid: bool,

    /// Maximum number of ports probed at once during a range scan.
    #[arg(
        long,
        short = 'c',
        help = "Maximum number of ports probed at the same time",
        default_value_t = DEFAULT_CONCURRENCY,
        value_parser = parse_concurrency
    )]
    pub concurrency: usize,

    /// A verbosity flag to control the level of logging output.
    #[command(flatten)]
    pub verbose: Verbosity<WarnLevel>,
}

fn parse_query(arg: &str) -> Result<PortQuery, crate::port::PortQueryError> {
    arg.parse()
}

/// No scan has more than `MAX_PORT` ports, so a larger ceiling is meaningless.
fn parse_concurrency(arg: &str) -> Result<usize, String> {
    let max = usize::from(MAX_PORT);
    match arg.parse::<usize>() {
        Ok(value) if (1..=max).contains(&value) => Ok(value),
        Ok(_) => Err(format!("concurrency must be between 1 and {max}")),
        Err(err) => Err(err.to_string()),
    }
}
