//! Plain-text rendering for the one-shot CLI commands.

use analyzer_protocol::{AppInfo, HealthStatus, ReportDetail, UploadReceipt};

use crate::views::{
    ConnectionRow, DetailHeader, DetailTab, HeaderStats, HostsView, OverviewView, PortCard,
    ReportCard,
};

pub fn render_app_info(info: &AppInfo) -> String {
    let mut lines = vec![info.title().unwrap_or_else(|| "Analyzer".to_string())];
    if let Some(env) = &info.environment {
        lines.push(format!("Environment: {env}"));
    }
    if let Some(desc) = &info.description {
        lines.push(desc.clone());
    }
    lines.join("\n")
}

pub fn render_stats(stats: &HeaderStats) -> String {
    format!(
        "Reports: {}  Connections: {}  Ports: {}  Hosts: {}",
        stats.total_reports, stats.total_connections, stats.total_ports, stats.unique_hosts
    )
}

pub fn render_report_list(cards: &[ReportCard]) -> String {
    if cards.is_empty() {
        return "No reports found.".to_string();
    }
    let mut lines = vec![format!(
        "{:<10} {:<24} {:<22} {:<24} {:>11} {:>6}",
        "ID", "HOST", "DATE", "OS", "CONNECTIONS", "PORTS"
    )];
    for card in cards {
        lines.push(format!(
            "{:<10} {:<24} {:<22} {:<24} {:>11} {:>6}",
            card.id.as_deref().unwrap_or("-"),
            clip(&card.title, 24),
            card.date,
            clip(&card.os, 24),
            card.connections,
            card.ports
        ));
    }
    lines.join("\n")
}

pub fn render_detail(detail: &ReportDetail, tab: DetailTab) -> String {
    let header = DetailHeader::build(detail);
    let mut lines = vec![
        header.title.clone(),
        format!("  Hostname:          {}", header.hostname),
        format!("  Operating system:  {}", header.os),
        format!("  Created:           {}", header.created),
        format!("  File size:         {}", header.file_size),
        format!("  Total connections: {}", header.total_connections),
        format!("  Total ports:       {}", header.total_ports),
        String::new(),
        format!("[{}]", tab.title()),
    ];
    let body = match tab {
        DetailTab::Overview => render_overview(&OverviewView::build(detail)),
        DetailTab::Connections => render_connections(detail),
        DetailTab::Ports => render_ports(detail),
        DetailTab::Hosts => render_hosts(&HostsView::build(&detail.connections)),
    };
    lines.push(body);
    lines.join("\n")
}

fn render_overview(view: &OverviewView) -> String {
    [
        format!(
            "Connections  TCP: {}  UDP: {}  ICMP: {}",
            view.tcp, view.udp, view.icmp
        ),
        format!(
            "Activity     Listening: {}  Established: {}",
            view.listening, view.established
        ),
        format!("Hostname:    {}", view.hostname),
        format!("OS:          {}", view.os),
        format!("Analysed:    {}", view.created),
        format!("Report size: {}", view.file_size),
    ]
    .join("\n")
}

fn render_connections(detail: &ReportDetail) -> String {
    let rows: Vec<ConnectionRow> = detail.connections.iter().map(ConnectionRow::build).collect();
    let mut lines = vec![format!("Active connections ({})", rows.len())];
    if rows.is_empty() {
        lines.push("No connection data".to_string());
        return lines.join("\n");
    }
    lines.push(format!(
        "{:<9} {:<8} {:<24} {:<24} {:<20} {:>8}",
        "TYPE", "PROTO", "LOCAL", "REMOTE", "PROCESS", "PACKETS"
    ));
    for row in rows {
        lines.push(format!(
            "{:<9} {:<8} {:<24} {:<24} {:<20} {:>8}",
            row.direction,
            row.protocol,
            clip(&row.local, 24),
            clip(&row.remote, 24),
            clip(&row.process, 20),
            row.packets
        ));
    }
    lines.join("\n")
}

fn render_ports(detail: &ReportDetail) -> String {
    let cards: Vec<PortCard> = detail.ports.iter().map(PortCard::build).collect();
    let mut lines = vec![format!("Open ports ({})", cards.len())];
    if cards.is_empty() {
        lines.push("No port data".to_string());
        return lines.join("\n");
    }
    for card in cards {
        let mut line = format!(
            "{:>6}/{:<5} {:<28} state: {}",
            card.port,
            card.protocol,
            clip(&card.service, 28),
            card.state
        );
        if let Some(process) = &card.process {
            line.push_str(&format!("  process: {process}"));
        }
        lines.push(line);
    }
    lines.join("\n")
}

pub fn render_hosts(view: &HostsView) -> String {
    let mut lines = vec![format!("Unique hosts ({})", view.cards.len())];
    if view.cards.is_empty() {
        lines.push("No unique host data".to_string());
        return lines.join("\n");
    }
    for card in &view.cards {
        let mut flags = Vec::new();
        if card.incoming {
            flags.push("incoming");
        }
        if card.outgoing {
            flags.push("outgoing");
        }
        lines.push(format!(
            "{:<32} {:>5}  {:<20} {}",
            card.address,
            card.connections,
            card.protocols,
            flags.join(" ")
        ));
    }
    lines.push(format!(
        "Hosts: {}  With incoming: {}  With outgoing: {}",
        view.stats.unique_hosts, view.stats.with_incoming, view.stats.with_outgoing
    ));
    lines.join("\n")
}

pub fn render_upload(receipt: &UploadReceipt) -> String {
    let mut lines = vec![receipt
        .message
        .clone()
        .unwrap_or_else(|| "Report uploaded".to_string())];
    if let Some(id) = &receipt.report_id {
        lines.push(format!("Report ID:   {id}"));
    }
    if let Some(host) = &receipt.hostname {
        lines.push(format!("Hostname:    {host}"));
    }
    lines.push(format!("Connections: {}", receipt.connections_count));
    if receipt.is_replacement {
        lines.push("Replaced an existing report for this host".to_string());
    }
    lines.join("\n")
}

pub fn render_health(health: &HealthStatus) -> String {
    format!(
        "{} (api {})",
        health.status.as_deref().unwrap_or("unknown"),
        health.api_version.as_deref().unwrap_or("?")
    )
}

/// Cut `s` to `width` characters, marking the cut with `…`.
pub fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let kept: String = s.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}
