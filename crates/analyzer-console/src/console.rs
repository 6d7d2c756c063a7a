//! Interactive report console.
//!
//! A ratatui TUI over [`AppState`]: a card list of stored reports, and a
//! tabbed detail view of one report. Network calls run on spawned tasks and
//! post their outcome back over a channel, so the UI never waits on the
//! backend.
//!
//! Launch with `analyzer-console` or `analyzer-console console`.

use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc::{self, UnboundedSender};

use analyzer_client::{ClientError, ReportClient};

use crate::app::{AppEvent, AppState, Command, Control, InputMode, ListPhase, Screen};
use crate::config::ConsoleConfig;
use crate::notify::NotificationLevel;
use crate::text::clip;
use crate::views::{
    ConnectionRow, DetailHeader, DetailTab, HostsView, OverviewView, PortCard, ReportCard, Tone,
};

/// Run one command against the backend and describe the outcome.
pub async fn execute(command: Command, client: &ReportClient, download_dir: &Path) -> AppEvent {
    match command {
        Command::LoadAppInfo => AppEvent::AppInfoLoaded(client.app_info().await.map_err(message)),
        Command::LoadReports(ticket) => AppEvent::ReportsLoaded {
            ticket,
            result: client.list_reports().await.map_err(message),
        },
        Command::LoadStats { ticket, fallback } => AppEvent::StatsLoaded {
            ticket,
            stats: client.summary_stats(&fallback).await,
        },
        Command::LoadDetail {
            ticket,
            report_id,
            summary,
        } => AppEvent::DetailLoaded {
            ticket,
            result: client
                .report_detail(&report_id, summary.as_ref())
                .await
                .map_err(message),
        },
        Command::Upload(path) => AppEvent::Uploaded(client.upload_report(&path).await.map_err(message)),
        Command::Download(report_id) => {
            AppEvent::Downloaded(download_to(client, &report_id, download_dir).await.map_err(message))
        }
    }
}

async fn download_to(
    client: &ReportClient,
    report_id: &str,
    dir: &Path,
) -> Result<PathBuf, ClientError> {
    let report = client.download_report(report_id).await?;
    report.save_into(dir).await
}

fn message(err: ClientError) -> String {
    err.to_string()
}

fn dispatch(
    commands: Vec<Command>,
    client: &ReportClient,
    download_dir: &Path,
    tx: &UnboundedSender<AppEvent>,
) {
    for command in commands {
        let client = client.clone();
        let download_dir = download_dir.to_path_buf();
        let tx = tx.clone();
        tokio::spawn(async move {
            let event = execute(command, &client, &download_dir).await;
            if tx.send(event).is_err() {
                tracing::debug!("console closed before response arrived");
            }
        });
    }
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Primary => Color::Blue,
        Tone::Success => Color::Green,
        Tone::Warning => Color::Yellow,
        Tone::Danger => Color::Red,
        Tone::Secondary => Color::Gray,
    }
}

fn label(text: &str) -> Span<'static> {
    Span::styled(text.to_string(), Style::default().fg(Color::Gray))
}

fn value(text: impl Into<String>, color: Color) -> Span<'static> {
    Span::styled(text.into(), Style::default().fg(color))
}

fn render(frame: &mut Frame, app: &AppState, now: Instant) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title + stats
            Constraint::Min(8),    // Screen body
            Constraint::Length(3), // Prompt / notification / hints
        ])
        .split(frame.area());

    render_header(frame, outer[0], app);
    match app.screen {
        Screen::Reports => render_reports(frame, outer[1], app),
        Screen::Detail => render_detail(frame, outer[1], app),
    }
    render_footer(frame, outer[2], app, now);
}

fn render_header(frame: &mut Frame, area: Rect, app: &AppState) {
    let title = app
        .app_info
        .as_ref()
        .and_then(|info| info.title())
        .unwrap_or_else(|| "Analyzer Console".to_string());
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let stats = &app.header;
    let line = Line::from(vec![
        label("  Reports: "),
        value(stats.total_reports.to_string(), Color::White),
        label("  |  Connections: "),
        value(stats.total_connections.to_string(), Color::Green),
        label("  |  Hosts: "),
        value(stats.unique_hosts.to_string(), Color::Magenta),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_reports(frame: &mut Frame, area: Rect, app: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(4)])
        .split(area);

    let searching = app.input_mode == InputMode::Search;
    let search_block = Block::default()
        .title(" Search (/) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if searching {
            Color::Green
        } else {
            Color::DarkGray
        }));
    let search_line = if app.search_query.is_empty() && !searching {
        Line::from(value("  hostname or OS...", Color::DarkGray))
    } else {
        Line::from(vec![
            value("  > ", Color::Green),
            value(app.search_query.clone(), Color::White),
        ])
    };
    frame.render_widget(Paragraph::new(search_line).block(search_block), rows[0]);
    if searching {
        let x = rows[0].x + 5 + app.search_query.chars().count() as u16;
        frame.set_cursor_position((x, rows[0].y + 1));
    }

    let cards = app.visible_cards();
    let block = Block::default()
        .title(format!(" Reports ({}) ", cards.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let placeholder = match app.list_phase {
        ListPhase::Loading => Some("  Loading reports..."),
        ListPhase::Empty => Some("  No reports yet. Press u to upload an HTML report."),
        ListPhase::Ready if cards.is_empty() => Some("  No reports match the search."),
        ListPhase::Ready => None,
    };
    if let Some(text) = placeholder {
        let paragraph = Paragraph::new(Line::from(value(text, Color::DarkGray))).block(block);
        frame.render_widget(paragraph, rows[1]);
        return;
    }

    // Keep the selection on screen.
    let visible = rows[1].height.saturating_sub(3) as usize;
    let offset = if visible == 0 {
        app.selected
    } else {
        app.selected.saturating_sub(visible - 1)
    };

    let table_rows: Vec<Row> = cards
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible.max(1))
        .map(|(i, card)| card_row(card, i == app.selected))
        .collect();

    let table = Table::new(
        table_rows,
        [
            Constraint::Percentage(30),
            Constraint::Percentage(22),
            Constraint::Percentage(26),
            Constraint::Percentage(12),
            Constraint::Percentage(10),
        ],
    )
    .block(block)
    .header(
        Row::new(vec!["  Host", "Date", "OS", "Connections", "Ports"])
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(table, rows[1]);
}

fn card_row(card: &ReportCard, selected: bool) -> Row<'static> {
    let marker = if selected { "> " } else { "  " };
    let row = Row::new(vec![
        Cell::from(format!("{marker}{}", card.title)),
        Cell::from(card.date.clone()),
        Cell::from(card.os.clone()),
        Cell::from(card.connections.to_string()),
        Cell::from(card.ports.to_string()),
    ]);
    if selected {
        row.style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        row.style(Style::default().fg(Color::White))
    }
}

fn render_detail(frame: &mut Frame, area: Rect, app: &AppState) {
    let Some(report) = &app.current_report else {
        return;
    };
    let header = DetailHeader::build(report);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Metadata
            Constraint::Length(3), // Tabs
            Constraint::Min(4),    // Tab body
        ])
        .split(area);

    let meta = vec![
        Line::from(vec![
            label("  Hostname: "),
            value(header.hostname.clone(), Color::White),
            label("   OS: "),
            value(header.os.clone(), Color::White),
        ]),
        Line::from(vec![
            label("  Created: "),
            value(header.created.clone(), Color::White),
            label("   File size: "),
            value(header.file_size.clone(), Color::White),
        ]),
        Line::from(vec![
            label("  Connections: "),
            value(header.total_connections.to_string(), Color::Green),
            label("   Ports: "),
            value(header.total_ports.to_string(), Color::Yellow),
        ]),
    ];
    let meta_block = Block::default()
        .title(format!(" {} ", header.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Paragraph::new(meta).block(meta_block), rows[0]);

    let titles: Vec<Line> = DetailTab::ALL
        .iter()
        .map(|tab| Line::from(format!("{} {}", tab.index() + 1, tab.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.current_tab.index())
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );
    frame.render_widget(tabs, rows[1]);

    let body = rows[2];
    match app.current_tab {
        DetailTab::Overview => render_overview(frame, body, &OverviewView::build(report)),
        DetailTab::Connections => render_connections(frame, body, app, report),
        DetailTab::Ports => render_ports(frame, body, app, report),
        DetailTab::Hosts => render_hosts(frame, body, app, &HostsView::build(&report.connections)),
    }
}

fn render_overview(frame: &mut Frame, area: Rect, view: &OverviewView) {
    let block = Block::default()
        .title(" Overview ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));
    let lines = vec![
        Line::from(vec![
            label("  Connections  TCP: "),
            value(view.tcp.to_string(), Color::Blue),
            label("  UDP: "),
            value(view.udp.to_string(), Color::Green),
            label("  ICMP: "),
            value(view.icmp.to_string(), Color::Yellow),
        ]),
        Line::from(vec![
            label("  Activity     Listening: "),
            value(view.listening.to_string(), Color::Yellow),
            label("  Established: "),
            value(view.established.to_string(), Color::Red),
        ]),
        Line::from(""),
        Line::from(vec![label("  Hostname:    "), value(view.hostname.clone(), Color::White)]),
        Line::from(vec![label("  OS:          "), value(view.os.clone(), Color::White)]),
        Line::from(vec![label("  Analysed:    "), value(view.created.clone(), Color::White)]),
        Line::from(vec![label("  Report size: "), value(view.file_size.clone(), Color::White)]),
        Line::from(""),
        Line::from(value("  Press d to download the original HTML report.", Color::DarkGray)),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_connections(frame: &mut Frame, area: Rect, app: &AppState, report: &analyzer_protocol::ReportDetail) {
    let block = Block::default()
        .title(format!(" Active connections ({}) ", report.connections.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    if report.connections.is_empty() {
        let text = Paragraph::new(Line::from(value("  No connection data", Color::DarkGray)))
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    let visible = area.height.saturating_sub(3) as usize;
    let rows: Vec<Row> = report
        .connections
        .iter()
        .skip(app.detail_scroll.min(report.connections.len().saturating_sub(1)))
        .take(visible.max(1))
        .map(|conn| {
            let row = ConnectionRow::build(conn);
            let direction_color = if row.incoming { Color::Green } else { Color::Blue };
            Row::new(vec![
                Cell::from(Span::styled(
                    format!("  {}", row.direction),
                    Style::default().fg(direction_color),
                )),
                Cell::from(Span::styled(
                    row.protocol.clone(),
                    Style::default()
                        .fg(tone_color(row.protocol_tone))
                        .add_modifier(Modifier::BOLD),
                )),
                Cell::from(row.local.clone()),
                Cell::from(row.remote.clone()),
                Cell::from(clip(&row.process, 24)),
                Cell::from(row.packets.to_string()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(12),
            Constraint::Percentage(8),
            Constraint::Percentage(24),
            Constraint::Percentage(24),
            Constraint::Percentage(22),
            Constraint::Percentage(10),
        ],
    )
    .block(block)
    .header(
        Row::new(vec!["  Type", "Proto", "Local", "Remote", "Process", "Packets"])
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(table, area);
}

fn render_ports(frame: &mut Frame, area: Rect, app: &AppState, report: &analyzer_protocol::ReportDetail) {
    let block = Block::default()
        .title(format!(" Open ports ({}) ", report.ports.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    if report.ports.is_empty() {
        let text =
            Paragraph::new(Line::from(value("  No port data", Color::DarkGray))).block(block);
        frame.render_widget(text, area);
        return;
    }

    let lines: Vec<Line> = report
        .ports
        .iter()
        .skip(app.detail_scroll)
        .map(|port| {
            let card = PortCard::build(port);
            let mut spans = vec![
                value(format!("  {:>6}", card.port), Color::Cyan),
                value(format!(" {:<5}", card.protocol), tone_color(card.protocol_tone)),
                value(format!(" {:<30}", clip(&card.service, 30)), Color::White),
                label(" state: "),
                value(card.state.clone(), tone_color(card.state_tone)),
            ];
            if let Some(process) = &card.process {
                spans.push(label("  process: "));
                spans.push(value(process.clone(), Color::White));
            }
            Line::from(spans)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_hosts(frame: &mut Frame, area: Rect, app: &AppState, view: &HostsView) {
    let block = Block::default()
        .title(format!(" Unique hosts ({}) ", view.cards.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    if view.cards.is_empty() {
        let text = Paragraph::new(Line::from(value("  No unique host data", Color::DarkGray)))
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    let mut lines = vec![
        Line::from(vec![
            label("  Hosts: "),
            value(view.stats.unique_hosts.to_string(), Color::Blue),
            label("   With incoming: "),
            value(view.stats.with_incoming.to_string(), Color::Green),
            label("   With outgoing: "),
            value(view.stats.with_outgoing.to_string(), Color::Yellow),
        ]),
        Line::from(""),
    ];
    for card in view.cards.iter().skip(app.detail_scroll) {
        let mut spans = vec![
            value(format!("  {:<32}", card.address), Color::White),
            value(format!(" {:>5} conn ", card.connections), Color::Blue),
            label(" "),
            value(format!("{:<18}", card.protocols), Color::Gray),
        ];
        if card.incoming {
            spans.push(value(" incoming", Color::Green));
        }
        if card.outgoing {
            spans.push(value(" outgoing", Color::Blue));
        }
        lines.push(Line::from(spans));
    }
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_footer(frame: &mut Frame, area: Rect, app: &AppState, now: Instant) {
    if app.input_mode == InputMode::Upload {
        let block = Block::default()
            .title(" Upload HTML report (Enter = upload, Esc = cancel) ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green));
        let line = Line::from(vec![
            value("  > ", Color::Green),
            value(app.upload_input.clone(), Color::White),
        ]);
        frame.render_widget(Paragraph::new(line).block(block), area);
        let x = area.x + 5 + app.upload_input.chars().count() as u16;
        frame.set_cursor_position((x, area.y + 1));
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let line = match app.notifications.latest(now) {
        Some(note) => {
            let color = match note.level {
                NotificationLevel::Success => Color::Green,
                NotificationLevel::Error => Color::Red,
                NotificationLevel::Info => Color::Cyan,
            };
            Line::from(vec![
                value(
                    format!("  [{}] ", note.stamped.format("%H:%M:%S")),
                    Color::DarkGray,
                ),
                value(note.message.clone(), color),
            ])
        }
        None => Line::from(value(
            match app.screen {
                Screen::Reports => {
                    "  Up/Down select | Enter open | / search | r refresh | u upload | q quit"
                }
                Screen::Detail => "  Tab/Left/Right or 1-4 switch tab | Up/Down scroll | d download | Esc back",
            },
            Color::DarkGray,
        )),
    };
    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

/// Restore the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the console until the user quits.
pub async fn run_console(config: &ConsoleConfig, client: ReportClient) -> anyhow::Result<()> {
    use std::io::IsTerminal;
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return Err(anyhow::anyhow!(
            "the console requires a terminal (TTY); use a subcommand such as `list` instead"
        ));
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, config, &client).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    config: &ConsoleConfig,
    client: &ReportClient,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = AppState::new(config.notification_ttl());
    let tick_rate = config.tick_rate();

    tracing::info!(api = %client.base_url(), "console started");
    dispatch(app.start(), client, &config.download_dir, &tx);

    loop {
        let now = Instant::now();
        while let Ok(event) = rx.try_recv() {
            let commands = app.apply(event, now);
            dispatch(commands, client, &config.download_dir, &tx);
        }
        app.notifications.prune(now);

        terminal.draw(|frame| render(frame, &app, now))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.on_key(key.code, key.modifiers, Instant::now()) {
                        Control::Quit => break,
                        Control::Continue(commands) => {
                            dispatch(commands, client, &config.download_dir, &tx)
                        }
                    }
                }
            }
        }
    }

    tracing::info!("console closed");
    Ok(())
}
