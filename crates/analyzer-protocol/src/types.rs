use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::constants::{DIRECTION_INCOMING, DIRECTION_OUTGOING};
use crate::lenient;
use crate::ProtocolError;

/// Decode a response body into `T`, applying the lenient field defaults.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(body)?)
}

/// Application name and version shown in the console title.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppInfo {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub environment: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
}

impl AppInfo {
    /// `name version`, or whichever half is known.
    pub fn title(&self) -> Option<String> {
        match (&self.name, &self.version) {
            (Some(name), Some(version)) => Some(format!("{name} {version}")),
            (Some(name), None) => Some(name.clone()),
            (None, Some(version)) => Some(version.clone()),
            (None, None) => None,
        }
    }
}

/// Operating system of the analysed host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsInfo {
    pub name: String,
    pub version: String,
}

/// One row of the report list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportSummary {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub hostname: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub generated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub os_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::os")]
    pub os: Option<OsInfo>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_connections: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub file_size: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub tcp_ports_count: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub udp_ports_count: u64,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub file_exists: bool,
    #[serde(default, deserialize_with = "lenient::text")]
    pub processing_status: Option<String>,
}

impl ReportSummary {
    pub fn total_ports(&self) -> u64 {
        self.tcp_ports_count.saturating_add(self.udp_ports_count)
    }
}

/// The report list response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportList {
    pub reports: Vec<ReportSummary>,
    pub total: u64,
}

#[derive(Deserialize)]
struct ReportListWire {
    #[serde(default, deserialize_with = "lenient::records")]
    reports: Vec<ReportSummary>,
    #[serde(default, deserialize_with = "lenient::opt_count")]
    total: Option<u64>,
}

impl ReportList {
    /// Accepts `{"reports": [...], "total": n}` or a bare array of summaries.
    pub fn decode(body: &[u8]) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_slice(body)?;
        match value {
            Value::Array(_) => {
                let reports: Vec<ReportSummary> = lenient::records_from(value);
                let total = reports.len() as u64;
                Ok(Self { reports, total })
            }
            Value::Object(_) => {
                let wire: ReportListWire = serde_json::from_value(value)?;
                let total = wire.total.unwrap_or(wire.reports.len() as u64);
                Ok(Self {
                    reports: wire.reports,
                    total,
                })
            }
            other => Err(ProtocolError::Shape(format!(
                "report list must be an object or array, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn find(&self, report_id: &str) -> Option<&ReportSummary> {
        self.reports
            .iter()
            .find(|r| r.id.as_deref() == Some(report_id))
    }
}

/// Direction of a connection as the analyzer classified it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// A single observed connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectionRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    /// Raw `type` value; kept verbatim for host aggregation.
    #[serde(rename = "type", default, deserialize_with = "lenient::text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub protocol: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub local_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub remote_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub remote_hostname: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub process: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub packet_count: u64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub first_seen: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub last_seen: Option<String>,
}

impl ConnectionRecord {
    pub fn direction(&self) -> Option<Direction> {
        match self.kind.as_deref() {
            Some(DIRECTION_INCOMING) => Some(Direction::Incoming),
            Some(DIRECTION_OUTGOING) => Some(Direction::Outgoing),
            _ => None,
        }
    }
}

/// An open port found on the analysed host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PortRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_count")]
    pub port_number: Option<u64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub protocol: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub service_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub process: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: Option<String>,
}

/// Full report detail exactly as the backend sends it.
///
/// Use [`ReportDetail::from_wire`] to obtain the record the console renders.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportDetailWire {
    #[serde(default, deserialize_with = "lenient::text")]
    pub hostname: Option<String>,
    #[serde(default, deserialize_with = "lenient::os")]
    pub os: Option<OsInfo>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub file_size: u64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_connections: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub tcp_connections: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub udp_connections: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub icmp_connections: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub listening_ports: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub established_connections: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_ports: u64,
    #[serde(default, deserialize_with = "lenient::records")]
    pub connections: Vec<ConnectionRecord>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub ports: Vec<PortRecord>,
}

/// A report opened for detailed viewing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportDetail {
    pub id: String,
    pub hostname: Option<String>,
    pub os: OsInfo,
    pub file_size: u64,
    pub status: String,
    pub created_at: Option<String>,
    pub total_connections: u64,
    pub tcp_connections: u64,
    pub udp_connections: u64,
    pub icmp_connections: u64,
    pub listening_ports: u64,
    pub established_connections: u64,
    pub total_ports: u64,
    pub connections: Vec<ConnectionRecord>,
    pub ports: Vec<PortRecord>,
}

impl ReportDetail {
    /// Merge the backend detail with the list summary it was opened from.
    ///
    /// Zero and absent detail values fall back to the summary, the same
    /// precedence the card list uses, so a sparse detail never shows less
    /// than the card that led to it.
    pub fn from_wire(id: &str, wire: ReportDetailWire, summary: Option<&ReportSummary>) -> Self {
        let hostname = wire
            .hostname
            .or_else(|| summary.and_then(|s| s.hostname.clone()));
        let os = wire
            .os
            .or_else(|| summary.and_then(|s| s.os.clone()))
            .unwrap_or_else(|| OsInfo {
                name: summary
                    .and_then(|s| s.os_name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                version: String::new(),
            });
        let created_at = wire
            .created_at
            .or_else(|| summary.and_then(|s| s.generated_at.clone()));

        Self {
            id: id.to_string(),
            hostname,
            os,
            file_size: nonzero_or(wire.file_size, summary.map(|s| s.file_size)),
            status: wire.status.unwrap_or_else(|| "unknown".to_string()),
            created_at,
            total_connections: nonzero_or(
                wire.total_connections,
                summary.map(|s| s.total_connections),
            ),
            tcp_connections: wire.tcp_connections,
            udp_connections: wire.udp_connections,
            icmp_connections: wire.icmp_connections,
            listening_ports: wire.listening_ports,
            established_connections: wire.established_connections,
            total_ports: nonzero_or(wire.total_ports, summary.map(ReportSummary::total_ports)),
            connections: wire.connections,
            ports: wire.ports,
        }
    }

    /// Decode a detail body and merge it with `summary`.
    pub fn decode(
        id: &str,
        body: &[u8],
        summary: Option<&ReportSummary>,
    ) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(ProtocolError::Shape(format!(
                "report detail must be an object, got {}",
                json_kind(&value)
            )));
        }
        let wire: ReportDetailWire = serde_json::from_value(value)?;
        Ok(Self::from_wire(id, wire, summary))
    }
}

/// Backend answer to a report upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    #[serde(default, deserialize_with = "lenient::text")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub report_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub hostname: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub file_size: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub connections_count: u64,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_replacement: bool,
}

/// Backend answer to a report deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeleteReceipt {
    #[serde(default, deserialize_with = "lenient::text")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub report_id: Option<String>,
}

/// Backend liveness answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub api_version: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.as_deref() == Some("healthy")
    }
}

fn nonzero_or(value: u64, fallback: Option<u64>) -> u64 {
    if value != 0 {
        value
    } else {
        fallback.unwrap_or(0)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
