/// Backend address used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:18000";

pub const APP_INFO_PATH: &str = "/api/v1/app/info";
pub const REPORTS_PATH: &str = "/api/v1/reports";
pub const UPLOAD_PATH: &str = "/api/v1/reports/upload";
pub const SUMMARY_STATS_PATH: &str = "/api/v1/reports/stats/summary";
pub const HEALTH_PATH: &str = "/api/v1/health";

/// Multipart field the upload endpoint reads the report file from.
pub const UPLOAD_FIELD: &str = "file";

/// Extension (lowercase, no dot) accepted for report uploads.
pub const REPORT_EXTENSION: &str = "html";

/// File name used when a download response names no file.
pub const DEFAULT_DOWNLOAD_NAME: &str = "report.html";

/// Remote address values meaning "no real remote peer".
pub const EXCLUDED_REMOTE_ADDRESSES: [&str; 2] = ["N/A", "-"];

/// Host keys that never count as a remote host.
pub const EXCLUDED_HOSTS: [&str; 3] = ["*", "0.0.0.0", "127.0.0.1"];

pub const DIRECTION_INCOMING: &str = "incoming";
pub const DIRECTION_OUTGOING: &str = "outgoing";

/// Path of a single report.
pub fn report_path(report_id: &str) -> String {
    format!("{REPORTS_PATH}/{report_id}")
}

/// Path of a report's original file.
pub fn download_path(report_id: &str) -> String {
    format!("{REPORTS_PATH}/{report_id}/download")
}
