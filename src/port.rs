//! Parsing of the port argument: either a single port or an inclusive range.

use std::{fmt, ops::RangeInclusive, str::FromStr};

/// Lowest port that can be queried.
pub const MIN_PORT: u16 = 1;

/// Highest port that can be queried.
pub const MAX_PORT: u16 = 65535;

/// A closed interval of ports, `start <= end`, both within `MIN_PORT..=MAX_PORT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: u16,
    end: u16,
}

impl PortRange {
    /// Creates a new range, rejecting port 0 and reversed bounds.
    pub fn new(start: u16, end: u16) -> Result<Self, PortQueryError> {
        if start < MIN_PORT {
            return Err(PortQueryError::OutOfRange(start.into()));
        }
        if end < MIN_PORT {
            return Err(PortQueryError::OutOfRange(end.into()));
        }
        if start > end {
            return Err(PortQueryError::ReversedRange { start, end });
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    /// Number of ports in the range, always at least one.
    pub fn len(&self) -> usize {
        usize::from(self.end - self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn ports(&self) -> RangeInclusive<u16> {
        self.start..=self.end
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// What the user asked to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortQuery {
    Single(u16),
    Range(PortRange),
}

impl FromStr for PortQuery {
    type Err = PortQueryError;

    /// Accepts `<port>` or `<start>-<end>`, both decimal.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        if value.contains('-') {
            let mut bounds = value.split('-');
            match (bounds.next(), bounds.next(), bounds.next()) {
                (Some(start), Some(end), None) => {
                    let range = PortRange::new(parse_port(start)?, parse_port(end)?)?;
                    Ok(PortQuery::Range(range))
                }
                _ => Err(PortQueryError::MalformedRange(value.to_string())),
            }
        } else {
            Ok(PortQuery::Single(parse_port(value)?))
        }
    }
}

/// Decimal digits with an optional leading `+`.
fn parse_port(value: &str) -> Result<u16, PortQueryError> {
    let digits = value.strip_prefix('+').unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PortQueryError::InvalidNumber(value.to_string()));
    }

    // Digits only, so the only failure left is overflow.
    let number: u64 = digits
        .parse()
        .map_err(|_| PortQueryError::OutOfRange(u64::MAX))?;

    match u16::try_from(number) {
        Ok(port) if port >= MIN_PORT => Ok(port),
        _ => Err(PortQueryError::OutOfRange(number)),
    }
}

/// Error returned for a malformed or out-of-bounds port argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortQueryError {
    /// Not a decimal number.
    InvalidNumber(String),
    /// A number outside `1-65535`.
    OutOfRange(u64),
    /// More than one `-` separator, or a missing bound.
    MalformedRange(String),
    /// Start bound greater than end bound.
    ReversedRange { start: u16, end: u16 },
}

impl fmt::Display for PortQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortQueryError::InvalidNumber(value) => {
                write!(f, "invalid port number: '{value}'")
            }
            PortQueryError::OutOfRange(value) => {
                write!(f, "port {value} is out of range (must be {MIN_PORT}-{MAX_PORT})")
            }
            PortQueryError::MalformedRange(value) => {
                write!(f, "invalid port range format: '{value}' (expected <start>-<end>)")
            }
            PortQueryError::ReversedRange { start, end } => {
                write!(f, "invalid port range: start {start} is greater than end {end}")
            }
        }
    }
}

impl std::error::Error for PortQueryError {}
