//! Analyzer Protocol - report records and host aggregation
//!
//! Typed records for the analyzer report API, decoded once at the network
//! boundary with defaults applied, plus the pure derivations the console
//! renders from them (unique remote hosts, summary statistics, labels).

pub mod constants;
pub mod error;
pub mod format;
pub mod hosts;
pub mod lenient;
pub mod stats;
pub mod types;

pub use constants::*;
pub use error::*;
pub use hosts::{aggregate_hosts, remote_host, HostStats, HostSummary};
pub use stats::SummaryStats;
pub use types::*;
