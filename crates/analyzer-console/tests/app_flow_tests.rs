use std::time::{Duration, Instant};

use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use crossterm::event::{KeyCode, KeyModifiers};
use serde_json::json;

use analyzer_client::ReportClient;
use analyzer_console::app::{InputMode, ListPhase, Screen};
use analyzer_console::console::execute;
use analyzer_console::views::DetailTab;
use analyzer_console::{AppEvent, AppState, Command, Control, NotificationLevel};

async fn spawn_backend(app: Router) -> ReportClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    ReportClient::new(&format!("http://{addr}")).unwrap()
}

fn backend() -> Router {
    Router::new()
        .route(
            "/api/v1/app/info",
            get(|| async { Json(json!({"name": "Network Analyzer", "version": "3.0"})) }),
        )
        .route(
            "/api/v1/reports",
            get(|| async {
                Json(json!({
                    "reports": [
                        {"id": "1", "hostname": "web-01", "os_name": "Ubuntu",
                         "total_connections": 12, "generated_at": "2024-03-05T10:20:30"},
                        {"id": "2", "hostname": "db-01", "os_name": "Debian",
                         "total_connections": 4}
                    ],
                    "total": 2
                }))
            }),
        )
        .route(
            "/api/v1/reports/stats/summary",
            get(|| async {
                Json(json!({"total_reports": 2, "total_connections": 16,
                            "total_ports": 0, "unique_hosts": 2}))
            }),
        )
        .route(
            "/api/v1/reports/:id",
            get(|Path(id): Path<String>| async move {
                if id == "missing" {
                    return (StatusCode::NOT_FOUND, Json(json!({"detail": "Report not found"})))
                        .into_response();
                }
                Json(json!({
                    "hostname": format!("host-{id}"),
                    "connections": [
                        {"type": "incoming", "protocol": "tcp", "remote_address": "10.0.0.9:443"}
                    ]
                }))
                .into_response()
            }),
        )
        .route(
            "/api/v1/reports/:id/download",
            get(|| async {
                (
                    [(header::CONTENT_DISPOSITION, "attachment; filename=\"web-01.html\"")],
                    "<html>web-01</html>",
                )
            }),
        )
        .route(
            "/api/v1/reports/upload",
            post(|| async {
                Json(json!({"message": "Report uploaded", "report_id": "3",
                            "filename": "new.html", "is_replacement": false}))
            }),
        )
}

/// Run every command and apply the outcomes until no more work is produced.
async fn drive(app: &mut AppState, client: &ReportClient, dir: &std::path::Path, commands: Vec<Command>) {
    let mut pending = commands;
    while let Some(command) = pending.pop() {
        let event = execute(command, client, dir).await;
        pending.extend(app.apply(event, Instant::now()));
    }
}

fn ttl() -> Duration {
    Duration::from_secs(5)
}

#[tokio::test]
async fn test_startup_loads_list_stats_and_title() {
    let client = spawn_backend(backend()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = AppState::new(ttl());

    let commands = app.start();
    drive(&mut app, &client, dir.path(), commands).await;

    assert_eq!(app.list_phase, ListPhase::Ready);
    assert_eq!(app.reports.len(), 2);
    assert_eq!(app.header.total_connections, 16);
    assert_eq!(
        app.app_info.as_ref().and_then(|i| i.title()).as_deref(),
        Some("Network Analyzer 3.0")
    );
    let cards = app.visible_cards();
    assert_eq!(cards[0].title, "web-01");
    assert_eq!(cards[0].date, "05.03.2024, 10:20:30");
}

#[tokio::test]
async fn test_open_detail_and_return() {
    let client = spawn_backend(backend()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = AppState::new(ttl());
    let commands = app.start();
    drive(&mut app, &client, dir.path(), commands).await;

    app.select_next();
    let Control::Continue(commands) = app.on_key(KeyCode::Enter, KeyModifiers::NONE, Instant::now())
    else {
        panic!("enter must not quit");
    };
    drive(&mut app, &client, dir.path(), commands).await;

    assert_eq!(app.screen, Screen::Detail);
    assert_eq!(app.current_tab, DetailTab::Overview);
    let detail = app.current_report.as_ref().unwrap();
    assert_eq!(detail.id, "2");
    assert_eq!(detail.hostname.as_deref(), Some("host-2"));
    // Zero in the detail, so the list row's count is kept.
    assert_eq!(detail.total_connections, 4);

    app.on_key(KeyCode::Char('4'), KeyModifiers::NONE, Instant::now());
    assert_eq!(app.current_tab, DetailTab::Hosts);
    app.on_key(KeyCode::Esc, KeyModifiers::NONE, Instant::now());
    assert_eq!(app.screen, Screen::Reports);
    assert!(app.current_report.is_none());
}

#[tokio::test]
async fn test_failed_detail_keeps_list_and_notifies() {
    let client = spawn_backend(backend()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = AppState::new(ttl());

    let commands = app.open_report("missing".into(), None);
    drive(&mut app, &client, dir.path(), commands).await;

    assert_eq!(app.screen, Screen::Reports);
    let note = app.notifications.latest(Instant::now()).unwrap();
    assert_eq!(note.level, NotificationLevel::Error);
    assert!(note.message.contains("Report not found"), "{}", note.message);
}

#[tokio::test]
async fn test_stale_detail_response_is_dropped() {
    let client = spawn_backend(backend()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = AppState::new(ttl());

    let first = app.open_report("1".into(), None);
    let second = app.open_report("2".into(), None);
    let second_event = execute(second[0].clone(), &client, dir.path()).await;
    let first_event = execute(first[0].clone(), &client, dir.path()).await;

    // The newer request answers first; the older answer must not replace it.
    app.apply(second_event, Instant::now());
    app.apply(first_event, Instant::now());
    assert_eq!(app.current_report.as_ref().map(|d| d.id.as_str()), Some("2"));
}

#[tokio::test]
async fn test_detail_arriving_after_back_is_ignored() {
    let client = spawn_backend(backend()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = AppState::new(ttl());

    let commands = app.open_report("1".into(), None);
    app.back();
    drive(&mut app, &client, dir.path(), commands).await;

    assert_eq!(app.screen, Screen::Reports);
    assert!(app.current_report.is_none());
}

#[tokio::test]
async fn test_list_failure_shows_empty_state() {
    let failing = Router::new().route(
        "/api/v1/reports",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database down") }),
    );
    let client = spawn_backend(failing).await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = AppState::new(ttl());
    app.reports = vec![Default::default()];

    let commands = app.reload();
    drive(&mut app, &client, dir.path(), commands).await;

    assert_eq!(app.list_phase, ListPhase::Empty);
    assert!(app.reports.is_empty());
    let note = app.notifications.latest(Instant::now()).unwrap();
    assert_eq!(note.level, NotificationLevel::Error);
    assert!(note.message.starts_with("Failed to load reports"));
}

#[tokio::test]
async fn test_upload_success_reloads_list() {
    let client = spawn_backend(backend()).await;
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("new.html");
    std::fs::write(&file, "<html></html>").unwrap();

    let mut app = AppState::new(ttl());
    app.on_key(KeyCode::Char('u'), KeyModifiers::NONE, Instant::now());
    assert_eq!(app.input_mode, InputMode::Upload);
    app.upload_input = file.display().to_string();
    let Control::Continue(commands) = app.on_key(KeyCode::Enter, KeyModifiers::NONE, Instant::now())
    else {
        panic!("enter must not quit");
    };
    assert_eq!(commands, vec![Command::Upload(file.clone())]);

    let event = execute(commands[0].clone(), &client, dir.path()).await;
    let follow_up = app.apply(event, Instant::now());
    assert!(matches!(follow_up.as_slice(), [Command::LoadReports(_)]));
    let note = app.notifications.latest(Instant::now()).unwrap();
    assert_eq!(note.level, NotificationLevel::Success);
    assert_eq!(note.message, "File new.html uploaded successfully");

    drive(&mut app, &client, dir.path(), follow_up).await;
    assert_eq!(app.list_phase, ListPhase::Ready);
}

#[tokio::test]
async fn test_upload_of_non_html_file_notifies_error() {
    let client = spawn_backend(backend()).await;
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "plain").unwrap();

    let mut app = AppState::new(ttl());
    let event = execute(Command::Upload(file), &client, dir.path()).await;
    assert!(app.apply(event, Instant::now()).is_empty());
    let note = app.notifications.latest(Instant::now()).unwrap();
    assert_eq!(note.level, NotificationLevel::Error);
    assert!(note.message.starts_with("Upload failed"));
}

#[tokio::test]
async fn test_download_saves_into_directory() {
    let client = spawn_backend(backend()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = AppState::new(ttl());

    let commands = app.open_report("1".into(), None);
    drive(&mut app, &client, dir.path(), commands).await;
    let Control::Continue(commands) =
        app.on_key(KeyCode::Char('d'), KeyModifiers::NONE, Instant::now())
    else {
        panic!("d must not quit");
    };
    assert_eq!(commands, vec![Command::Download("1".into())]);

    let event = execute(commands[0].clone(), &client, dir.path()).await;
    let AppEvent::Downloaded(Ok(path)) = &event else {
        panic!("download failed: {event:?}");
    };
    assert_eq!(path, &dir.path().join("web-01.html"));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "<html>web-01</html>");

    app.apply(event, Instant::now());
    assert_eq!(
        app.notifications.latest(Instant::now()).map(|n| n.level),
        Some(NotificationLevel::Success)
    );
}
