//! View models built from decoded records.
//!
//! Everything here is pure: the ratatui console and the plain-text renderer
//! both draw from these structs, so labels and fallbacks live in one place.

use analyzer_protocol::format::{
    format_date, format_file_size, format_os, NOT_AVAILABLE, UNKNOWN, UNKNOWN_HOST, UNKNOWN_OS,
    UNKNOWN_PROTOCOLS, UNKNOWN_SERVICE,
};
use analyzer_protocol::{
    aggregate_hosts, ConnectionRecord, Direction, HostStats, PortRecord, ReportDetail,
    ReportSummary, SummaryStats,
};

/// Semantic color of a label; renderers map it onto their palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Primary,
    Success,
    Warning,
    Danger,
    Secondary,
}

pub fn protocol_tone(protocol: Option<&str>) -> Tone {
    match protocol.map(str::to_ascii_lowercase).as_deref() {
        Some("tcp") => Tone::Primary,
        Some("udp") => Tone::Success,
        Some("icmp") => Tone::Danger,
        _ => Tone::Secondary,
    }
}

pub fn state_tone(state: Option<&str>) -> Tone {
    match state.map(str::to_ascii_lowercase).as_deref() {
        Some("established") => Tone::Success,
        Some("listening") => Tone::Primary,
        Some("time_wait") => Tone::Warning,
        Some("close_wait") => Tone::Danger,
        _ => Tone::Secondary,
    }
}

/// One card of the report list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportCard {
    pub id: Option<String>,
    pub title: String,
    pub date: String,
    pub os: String,
    pub connections: u64,
    pub ports: u64,
}

impl ReportCard {
    pub fn from_summary(summary: &ReportSummary) -> Self {
        let os = summary
            .os_name
            .clone()
            .or_else(|| summary.os.as_ref().map(format_os))
            .unwrap_or_else(|| UNKNOWN_OS.to_string());
        Self {
            id: summary.id.clone(),
            title: summary
                .hostname
                .clone()
                .unwrap_or_else(|| UNKNOWN_HOST.to_string()),
            date: format_date(summary.generated_at.as_deref()),
            os,
            connections: summary.total_connections,
            ports: summary.total_ports(),
        }
    }
}

/// Reports whose hostname or OS name contains `query`, ignoring case.
/// A blank query matches everything.
pub fn filter_reports<'a>(reports: &'a [ReportSummary], query: &str) -> Vec<&'a ReportSummary> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return reports.iter().collect();
    }
    let matches = |field: &Option<String>| {
        field
            .as_deref()
            .is_some_and(|v| v.to_lowercase().contains(&needle))
    };
    reports
        .iter()
        .filter(|r| matches(&r.hostname) || matches(&r.os_name))
        .collect()
}

/// Counters of the console header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderStats {
    pub total_reports: u64,
    pub total_connections: u64,
    pub total_ports: u64,
    pub unique_hosts: u64,
}

impl From<SummaryStats> for HeaderStats {
    fn from(stats: SummaryStats) -> Self {
        Self {
            total_reports: stats.total_reports,
            total_connections: stats.total_connections,
            total_ports: stats.total_ports,
            unique_hosts: stats.unique_hosts,
        }
    }
}

/// Tabs of the detail screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DetailTab {
    #[default]
    Overview,
    Connections,
    Ports,
    Hosts,
}

impl DetailTab {
    pub const ALL: [DetailTab; 4] = [
        DetailTab::Overview,
        DetailTab::Connections,
        DetailTab::Ports,
        DetailTab::Hosts,
    ];

    pub fn title(self) -> &'static str {
        match self {
            DetailTab::Overview => "Overview",
            DetailTab::Connections => "Connections",
            DetailTab::Ports => "Ports",
            DetailTab::Hosts => "Hosts",
        }
    }

    pub fn index(self) -> usize {
        match self {
            DetailTab::Overview => 0,
            DetailTab::Connections => 1,
            DetailTab::Ports => 2,
            DetailTab::Hosts => 3,
        }
    }

    /// Tab for a 1-based number key.
    pub fn from_number(n: u32) -> Option<Self> {
        let idx = usize::try_from(n).ok()?.checked_sub(1)?;
        Self::ALL.get(idx).copied()
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Title and metadata block of the detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailHeader {
    pub title: String,
    pub hostname: String,
    pub os: String,
    pub created: String,
    pub file_size: String,
    pub total_connections: u64,
    pub total_ports: u64,
}

impl DetailHeader {
    pub fn build(detail: &ReportDetail) -> Self {
        let host = detail.hostname.as_deref();
        Self {
            title: format!("Analysis: {}", host.unwrap_or(UNKNOWN_HOST)),
            hostname: host.unwrap_or(NOT_AVAILABLE).to_string(),
            os: format_os(&detail.os),
            created: format_date(detail.created_at.as_deref()),
            file_size: format_file_size(detail.file_size),
            total_connections: detail.total_connections,
            total_ports: detail.total_ports,
        }
    }
}

/// Overview tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewView {
    pub tcp: u64,
    pub udp: u64,
    pub icmp: u64,
    pub listening: u64,
    pub established: u64,
    pub hostname: String,
    pub os: String,
    pub created: String,
    pub file_size: String,
}

impl OverviewView {
    pub fn build(detail: &ReportDetail) -> Self {
        Self {
            tcp: detail.tcp_connections,
            udp: detail.udp_connections,
            icmp: detail.icmp_connections,
            listening: detail.listening_ports,
            established: detail.established_connections,
            hostname: detail
                .hostname
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            os: format_os(&detail.os),
            created: format_date(detail.created_at.as_deref()),
            file_size: format_file_size(detail.file_size),
        }
    }
}

/// One row of the connections table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRow {
    pub incoming: bool,
    pub direction: &'static str,
    pub protocol: String,
    pub protocol_tone: Tone,
    pub local: String,
    pub remote: String,
    pub process: String,
    pub packets: u64,
}

impl ConnectionRow {
    pub fn build(conn: &ConnectionRecord) -> Self {
        // Anything not explicitly incoming is shown as outgoing.
        let incoming = conn.direction() == Some(Direction::Incoming);
        Self {
            incoming,
            direction: if incoming { "Incoming" } else { "Outgoing" },
            protocol: conn.protocol.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            protocol_tone: protocol_tone(conn.protocol.as_deref()),
            local: or_na(&conn.local_address),
            remote: or_na(&conn.remote_address),
            process: conn.process.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            packets: conn.packet_count,
        }
    }
}

/// One card of the ports tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortCard {
    pub port: String,
    pub protocol: String,
    pub protocol_tone: Tone,
    pub service: String,
    pub state: String,
    pub state_tone: Tone,
    pub process: Option<String>,
}

impl PortCard {
    pub fn build(port: &PortRecord) -> Self {
        Self {
            port: port
                .port_number
                .filter(|n| *n != 0)
                .map(|n| n.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            protocol: port
                .protocol
                .as_deref()
                .unwrap_or(UNKNOWN)
                .to_uppercase(),
            protocol_tone: protocol_tone(port.protocol.as_deref()),
            service: port
                .description
                .clone()
                .or_else(|| port.service_name.clone())
                .unwrap_or_else(|| UNKNOWN_SERVICE.to_string()),
            state: or_na(&port.status),
            state_tone: state_tone(port.status.as_deref()),
            process: port.process.clone(),
        }
    }
}

/// One card of the hosts tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCard {
    pub address: String,
    pub protocols: String,
    pub connections: usize,
    pub incoming: bool,
    pub outgoing: bool,
}

/// Hosts tab: aggregated remote hosts plus their counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsView {
    pub cards: Vec<HostCard>,
    pub stats: HostStats,
}

impl HostsView {
    pub fn build(connections: &[ConnectionRecord]) -> Self {
        let hosts = aggregate_hosts(connections);
        let stats = HostStats::from_hosts(&hosts);
        let cards = hosts
            .iter()
            .map(|host| HostCard {
                address: host.address.clone(),
                protocols: if host.protocols.is_empty() {
                    UNKNOWN_PROTOCOLS.to_string()
                } else {
                    host.protocols.join(", ")
                },
                connections: host.connections.len(),
                incoming: host.has_incoming(),
                outgoing: host.has_outgoing(),
            })
            .collect();
        Self { cards, stats }
    }
}

fn or_na(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
