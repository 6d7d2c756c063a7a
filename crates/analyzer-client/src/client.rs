//! HTTP client for the analyzer report API.
//!
//! Every response body goes through the protocol crate's lenient decode, so
//! callers only ever see fully defaulted records. No retries and no timeouts:
//! a failed call is returned to the caller as-is.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use analyzer_protocol::{
    constants, decode, AppInfo, DeleteReceipt, HealthStatus, ReportDetail, ReportList,
    ReportSummary, SummaryStats, UploadReceipt, REPORT_EXTENSION, UPLOAD_FIELD,
};

use crate::disposition::filename_from_disposition;
use crate::error::ClientError;

/// A downloaded report file, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct DownloadedReport {
    pub filename: String,
    pub content: Bytes,
}

impl DownloadedReport {
    /// Write the file into `dir` (created if missing) and return its path.
    pub async fn save_into(&self, dir: &Path) -> Result<PathBuf, ClientError> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &self.content).await?;
        tracing::info!(path = %path.display(), bytes = self.content.len(), "report saved");
        Ok(path)
    }
}

/// Client for one analyzer backend.
#[derive(Debug, Clone)]
pub struct ReportClient {
    http: Client,
    base_url: String,
}

impl ReportClient {
    /// Create a client for `base_url` (scheme and host, e.g. `http://localhost:18000`).
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Application name and version.
    pub async fn app_info(&self) -> Result<AppInfo, ClientError> {
        self.get_json(constants::APP_INFO_PATH).await
    }

    /// All stored report summaries.
    pub async fn list_reports(&self) -> Result<ReportList, ClientError> {
        let body = self.get_body(constants::REPORTS_PATH).await?;
        let list = ReportList::decode(&body)?;
        tracing::debug!(count = list.reports.len(), total = list.total, "reports loaded");
        Ok(list)
    }

    /// Full detail of one report, merged with the summary it was opened from.
    pub async fn report_detail(
        &self,
        report_id: &str,
        summary: Option<&ReportSummary>,
    ) -> Result<ReportDetail, ClientError> {
        let body = self.get_body(&constants::report_path(report_id)).await?;
        let detail = ReportDetail::decode(report_id, &body, summary)?;
        tracing::debug!(
            report_id = %report_id,
            connections = detail.connections.len(),
            ports = detail.ports.len(),
            "report detail loaded"
        );
        Ok(detail)
    }

    /// Upload an HTML report file.
    ///
    /// Files that are not `.html` or cannot be read are rejected before any
    /// request is sent.
    pub async fn upload_report(&self, path: &Path) -> Result<UploadReceipt, ClientError> {
        let file_name = check_upload_path(path)?;
        let content = tokio::fs::read(path).await.map_err(|e| {
            ClientError::InvalidUpload(format!("cannot read {}: {e}", path.display()))
        })?;
        let size = content.len();

        let part = Part::bytes(content)
            .file_name(file_name.clone())
            .mime_str("text/html")?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let request = self
            .http
            .post(self.url(constants::UPLOAD_PATH))
            .multipart(form);
        let response = send(request).await?;
        let receipt: UploadReceipt = decode(&response.bytes().await?)?;

        tracing::info!(
            file = %file_name,
            bytes = size,
            report_id = ?receipt.report_id,
            replaced = receipt.is_replacement,
            "report uploaded"
        );
        Ok(receipt)
    }

    /// Original HTML file of a report.
    pub async fn download_report(&self, report_id: &str) -> Result<DownloadedReport, ClientError> {
        let request = self.http.get(self.url(&constants::download_path(report_id)));
        let response = send(request).await?;
        let disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let filename = filename_from_disposition(disposition.as_deref());
        let content = response.bytes().await?;
        tracing::info!(report_id = %report_id, file = %filename, bytes = content.len(), "report downloaded");
        Ok(DownloadedReport { filename, content })
    }

    /// Header statistics. Never fails: when the endpoint is unusable the
    /// counters are computed from `fallback` instead.
    pub async fn summary_stats(&self, fallback: &[ReportSummary]) -> SummaryStats {
        match self.get_json::<SummaryStats>(constants::SUMMARY_STATS_PATH).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(error = %e, "summary stats unavailable, computing locally");
                SummaryStats::from_reports(fallback)
            }
        }
    }

    /// Delete a stored report.
    pub async fn delete_report(&self, report_id: &str) -> Result<DeleteReceipt, ClientError> {
        let request = self.http.delete(self.url(&constants::report_path(report_id)));
        let response = send(request).await?;
        let receipt = decode(&response.bytes().await?)?;
        tracing::info!(report_id = %report_id, "report deleted");
        Ok(receipt)
    }

    /// Backend liveness.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.get_json(constants::HEALTH_PATH).await
    }

    async fn get_body(&self, path: &str) -> Result<Bytes, ClientError> {
        let response = send(self.http.get(self.url(path))).await?;
        Ok(response.bytes().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let body = self.get_body(path).await?;
        Ok(decode(&body)?)
    }
}

/// Send a request and turn non-success statuses into `ClientError::Status`.
async fn send(request: RequestBuilder) -> Result<Response, ClientError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "(no body)".to_string());
    tracing::warn!(status = status.as_u16(), message = %message, "request rejected");
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

/// The backend reports failures as `{"detail": "..."}`; fall back to the raw body.
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(analyzer_protocol::lenient::text_from));
    Some(detail.unwrap_or_else(|| body.to_string()))
}

fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|e| ClientError::InvalidBaseUrl(format!("{trimmed}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidBaseUrl(format!(
            "{trimmed}: scheme must be http or https"
        )));
    }
    if url.host_str().is_none() {
        return Err(ClientError::InvalidBaseUrl(format!("{trimmed}: missing host")));
    }
    Ok(trimmed.to_string())
}

fn check_upload_path(path: &Path) -> Result<String, ClientError> {
    let is_html = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(REPORT_EXTENSION));
    if !is_html {
        return Err(ClientError::InvalidUpload(format!(
            "{} is not an .{REPORT_EXTENSION} file",
            path.display()
        )));
    }
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| ClientError::InvalidUpload(format!("{} has no file name", path.display())))
}
