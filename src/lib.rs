pub mod cli;
pub mod port;
pub mod probe;
pub mod process;
pub mod report;
pub mod scanner;

#[cfg(target_os = "linux")]
pub mod linux;
