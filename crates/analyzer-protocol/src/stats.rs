use std::collections::HashSet;

use serde::Deserialize;

use crate::lenient;
use crate::types::ReportSummary;

/// Counters shown in the console header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SummaryStats {
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_reports: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_connections: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_ports: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub unique_hosts: u64,
}

impl SummaryStats {
    /// Local substitute for the stats endpoint, computed from the loaded list.
    ///
    /// Unique hosts counts distinct hostnames; reports without a hostname
    /// share one bucket.
    pub fn from_reports(reports: &[ReportSummary]) -> Self {
        let hostnames: HashSet<Option<&str>> =
            reports.iter().map(|r| r.hostname.as_deref()).collect();
        Self {
            total_reports: reports.len() as u64,
            total_connections: reports
                .iter()
                .map(|r| r.total_connections)
                .fold(0, u64::saturating_add),
            total_ports: reports
                .iter()
                .map(ReportSummary::total_ports)
                .fold(0, u64::saturating_add),
            unique_hosts: hostnames.len() as u64,
        }
    }
}
