//! Subcommand implementations

pub mod check;
pub mod generate;
pub mod request;

use banker_core::ScanOrder;
use clap::ValueEnum;

/// Scan order override on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScanOrderArg {
    /// Lowest process id first
    Ascending,
    /// Highest process id first
    Descending,
}

impl From<ScanOrderArg> for ScanOrder {
    fn from(arg: ScanOrderArg) -> Self {
        match arg {
            ScanOrderArg::Ascending => ScanOrder::Ascending,
            ScanOrderArg::Descending => ScanOrder::Descending,
        }
    }
}
