use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use analyzer_client::{ClientError, ReportClient};
use analyzer_protocol::ReportSummary;

async fn spawn_backend(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn summary(id: &str, host: &str, connections: u64) -> ReportSummary {
    ReportSummary {
        id: Some(id.into()),
        hostname: Some(host.into()),
        total_connections: connections,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_app_info_and_health() {
    let app = Router::new()
        .route(
            "/api/v1/app/info",
            get(|| async { Json(json!({"name": "Network Analyzer", "version": "2.1.0"})) }),
        )
        .route(
            "/api/v1/health",
            get(|| async { Json(json!({"status": "healthy", "api_version": "v1"})) }),
        );
    let client = ReportClient::new(&spawn_backend(app).await).unwrap();

    let info = client.app_info().await.unwrap();
    assert_eq!(info.title().as_deref(), Some("Network Analyzer 2.1.0"));
    let health = client.health().await.unwrap();
    assert!(health.is_healthy());
}

#[tokio::test]
async fn test_list_reports_decodes_sparse_rows() {
    let app = Router::new().route(
        "/api/v1/reports",
        get(|| async {
            Json(json!({
                "reports": [
                    {"id": "1", "hostname": "web-01", "total_connections": 25,
                     "tcp_ports_count": 4, "udp_ports_count": 2},
                    {"id": "2", "hostname": null}
                ],
                "total": 2
            }))
        }),
    );
    let client = ReportClient::new(&spawn_backend(app).await).unwrap();

    let list = client.list_reports().await.unwrap();
    assert_eq!(list.total, 2);
    assert_eq!(list.reports[0].total_ports(), 6);
    assert_eq!(list.reports[1].total_connections, 0);
}

#[tokio::test]
async fn test_report_detail_merges_summary() {
    let app = Router::new().route(
        "/api/v1/reports/:id",
        get(|Path(id): Path<String>| async move {
            if id == "7" {
                Json(json!({
                    "hostname": "db-01",
                    "total_connections": 0,
                    "connections": [{"type": "outgoing", "protocol": "tcp",
                                     "remote_address": "10.1.1.1:5432"}]
                }))
                .into_response()
            } else {
                (StatusCode::NOT_FOUND, Json(json!({"detail": "Report not found"})))
                    .into_response()
            }
        }),
    );
    let client = ReportClient::new(&spawn_backend(app).await).unwrap();
    let row = summary("7", "ignored", 19);

    let detail = client.report_detail("7", Some(&row)).await.unwrap();
    assert_eq!(detail.hostname.as_deref(), Some("db-01"));
    assert_eq!(detail.total_connections, 19);
    assert_eq!(detail.connections.len(), 1);

    let err = client.report_detail("404", None).await.unwrap_err();
    match err {
        ClientError::Status { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Report not found");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_body_is_decode_error() {
    let app = Router::new().route("/api/v1/reports", get(|| async { "<html>oops</html>" }));
    let client = ReportClient::new(&spawn_backend(app).await).unwrap();
    assert!(matches!(
        client.list_reports().await,
        Err(ClientError::Decode(_))
    ));
}

#[tokio::test]
async fn test_transport_failure() {
    let client = ReportClient::new(&closed_port_url().await).unwrap();
    assert!(matches!(
        client.list_reports().await,
        Err(ClientError::Transport(_))
    ));
}

#[tokio::test]
async fn test_summary_stats_from_backend() {
    let app = Router::new().route(
        "/api/v1/reports/stats/summary",
        get(|| async {
            Json(json!({"total_reports": 4, "total_connections": 100,
                        "total_ports": 9, "unique_hosts": 3}))
        }),
    );
    let client = ReportClient::new(&spawn_backend(app).await).unwrap();
    let stats = client.summary_stats(&[]).await;
    assert_eq!(stats.total_reports, 4);
    assert_eq!(stats.unique_hosts, 3);
}

#[tokio::test]
async fn test_summary_stats_fallback_on_error_status() {
    let app = Router::new().route(
        "/api/v1/reports/stats/summary",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let client = ReportClient::new(&spawn_backend(app).await).unwrap();
    let rows = vec![summary("1", "a", 10), summary("2", "a", 5), summary("3", "b", 1)];

    let stats = client.summary_stats(&rows).await;
    assert_eq!(stats.total_reports, 3);
    assert_eq!(stats.total_connections, 16);
    assert_eq!(stats.unique_hosts, 2);
}

#[tokio::test]
async fn test_summary_stats_fallback_on_missing_route_and_transport() {
    let rows = vec![summary("1", "a", 3)];

    let client = ReportClient::new(&spawn_backend(Router::new()).await).unwrap();
    assert_eq!(client.summary_stats(&rows).await.total_connections, 3);

    let client = ReportClient::new(&closed_port_url().await).unwrap();
    assert_eq!(client.summary_stats(&rows).await.total_reports, 1);
}

async fn accept_upload(
    State(hits): State<Arc<AtomicUsize>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    hits.fetch_add(1, Ordering::SeqCst);
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        return (
            StatusCode::OK,
            Json(json!({
                "message": "Report uploaded",
                "report_id": "42",
                "filename": filename,
                "file_size": size,
                "is_replacement": false
            })),
        );
    }
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"detail": "missing file field"})),
    )
}

#[tokio::test]
async fn test_upload_sends_file_field() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/api/v1/reports/upload", axum::routing::post(accept_upload))
        .with_state(hits.clone());
    let client = ReportClient::new(&spawn_backend(app).await).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("web-01.html");
    std::fs::write(&path, "<html><body>report</body></html>").unwrap();

    let receipt = client.upload_report(&path).await.unwrap();
    assert_eq!(receipt.report_id.as_deref(), Some("42"));
    assert_eq!(receipt.filename.as_deref(), Some("web-01.html"));
    assert_eq!(receipt.file_size, 32);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_upload_rejects_before_sending() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/api/v1/reports/upload", axum::routing::post(accept_upload))
        .with_state(hits.clone());
    let client = ReportClient::new(&spawn_backend(app).await).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let pdf = dir.path().join("report.pdf");
    std::fs::write(&pdf, "%PDF").unwrap();
    assert!(matches!(
        client.upload_report(&pdf).await,
        Err(ClientError::InvalidUpload(_))
    ));

    let missing = dir.path().join("missing.html");
    assert!(matches!(
        client.upload_report(&missing).await,
        Err(ClientError::InvalidUpload(_))
    ));

    assert_eq!(hits.load(Ordering::SeqCst), 0, "no request may reach the backend");
}

#[tokio::test]
async fn test_download_uses_disposition_filename() {
    let app = Router::new().route(
        "/api/v1/reports/:id/download",
        get(|Path(id): Path<String>| async move {
            if id == "named" {
                (
                    [(
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"web-01_2024.html\"",
                    )],
                    "<html>named</html>",
                )
                    .into_response()
            } else {
                "<html>plain</html>".into_response()
            }
        }),
    );
    let client = ReportClient::new(&spawn_backend(app).await).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let named = client.download_report("named").await.unwrap();
    assert_eq!(named.filename, "web-01_2024.html");
    let saved = named.save_into(&dir.path().join("downloads")).await.unwrap();
    assert_eq!(std::fs::read_to_string(saved).unwrap(), "<html>named</html>");

    let plain = client.download_report("plain").await.unwrap();
    assert_eq!(plain.filename, "report.html");
}

#[tokio::test]
async fn test_delete_report() {
    let app = Router::new().route(
        "/api/v1/reports/:id",
        axum::routing::delete(|Path(id): Path<String>| async move {
            Json::<Value>(json!({"message": "Report deleted", "report_id": id}))
        }),
    );
    let client = ReportClient::new(&spawn_backend(app).await).unwrap();
    let receipt = client.delete_report("5").await.unwrap();
    assert_eq!(receipt.report_id.as_deref(), Some("5"));

    let err = client.report_detail("5", None).await.unwrap_err();
    assert_eq!(err.status(), Some(405));
}
