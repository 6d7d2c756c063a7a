//! Display helpers shared by the console and the plain-text renderer.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::types::OsInfo;

pub const NOT_AVAILABLE: &str = "N/A";
pub const UNKNOWN_HOST: &str = "Unknown host";
pub const UNKNOWN_OS: &str = "Unknown OS";
pub const UNKNOWN_SERVICE: &str = "Unknown service";
pub const UNKNOWN_PROTOCOLS: &str = "Unknown protocols";
pub const UNKNOWN: &str = "unknown";

const DATE_FORMAT: &str = "%d.%m.%Y, %H:%M:%S";
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Render a backend timestamp as `DD.MM.YYYY, HH:MM:SS`.
///
/// Timestamps with an offset are shown in that offset's wall time. Values
/// that do not parse are returned unchanged.
pub fn format_date(value: Option<&str>) -> String {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return NOT_AVAILABLE.to_string();
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.naive_local().format(DATE_FORMAT).to_string();
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return dt.format(DATE_FORMAT).to_string();
        }
    }
    if let Some(dt) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return dt.format(DATE_FORMAT).to_string();
    }
    raw.to_string()
}

/// Human size with base 1024, e.g. `1.5 KB`. Zero is `N/A`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return NOT_AVAILABLE.to_string();
    }
    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }
    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

/// `name version`, `name`, or `Unknown OS` for a missing or `Unknown` name.
pub fn format_os(os: &OsInfo) -> String {
    let name = os.name.trim();
    if name.is_empty() || name == "Unknown" {
        return UNKNOWN_OS.to_string();
    }
    let version = os.version.trim();
    if version.is_empty() {
        name.to_string()
    } else {
        format!("{name} {version}")
    }
}
