//! Console application state.
//!
//! `AppState` never performs I/O. User intents and network results go in,
//! [`Command`]s describing the network work to start come out. The console
//! runs each command on its own task and feeds the outcome back as an
//! [`AppEvent`], so responses may arrive in any order; request tickets decide
//! which ones still apply.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyModifiers};

use analyzer_client::{RequestSequencer, RequestTicket};
use analyzer_protocol::{AppInfo, ReportDetail, ReportList, ReportSummary, SummaryStats, UploadReceipt};

use crate::notify::NotificationCenter;
use crate::views::{filter_reports, DetailTab, HeaderStats, ReportCard};

/// Network work requested by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LoadAppInfo,
    LoadReports(RequestTicket),
    LoadStats {
        ticket: RequestTicket,
        fallback: Vec<ReportSummary>,
    },
    LoadDetail {
        ticket: RequestTicket,
        report_id: String,
        summary: Option<ReportSummary>,
    },
    Upload(PathBuf),
    Download(String),
}

/// Outcome of a command. Errors arrive as display strings.
#[derive(Debug, Clone)]
pub enum AppEvent {
    AppInfoLoaded(Result<AppInfo, String>),
    ReportsLoaded {
        ticket: RequestTicket,
        result: Result<ReportList, String>,
    },
    StatsLoaded {
        ticket: RequestTicket,
        stats: SummaryStats,
    },
    DetailLoaded {
        ticket: RequestTicket,
        result: Result<ReportDetail, String>,
    },
    Uploaded(Result<UploadReceipt, String>),
    Downloaded(Result<PathBuf, String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Reports,
    Detail,
}

/// What the report list area shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    Loading,
    Empty,
    Ready,
}

/// Which line editor, if any, owns the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Upload,
}

/// Result of a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Continue(Vec<Command>),
    Quit,
}

#[derive(Debug)]
pub struct AppState {
    pub app_info: Option<AppInfo>,
    pub reports: Vec<ReportSummary>,
    pub header: HeaderStats,
    pub current_report: Option<ReportDetail>,
    pub current_tab: DetailTab,
    pub screen: Screen,
    pub list_phase: ListPhase,
    pub input_mode: InputMode,
    pub search_query: String,
    pub upload_input: String,
    /// Index into the filtered card list.
    pub selected: usize,
    /// First visible row of the active detail tab.
    pub detail_scroll: usize,
    pub notifications: NotificationCenter,
    list_seq: RequestSequencer,
    detail_seq: RequestSequencer,
    stats_seq: RequestSequencer,
}

impl AppState {
    pub fn new(notification_ttl: Duration) -> Self {
        Self {
            app_info: None,
            reports: Vec::new(),
            header: HeaderStats::default(),
            current_report: None,
            current_tab: DetailTab::Overview,
            screen: Screen::Reports,
            list_phase: ListPhase::Loading,
            input_mode: InputMode::Normal,
            search_query: String::new(),
            upload_input: String::new(),
            selected: 0,
            detail_scroll: 0,
            notifications: NotificationCenter::new(notification_ttl),
            list_seq: RequestSequencer::new("reports"),
            detail_seq: RequestSequencer::new("detail"),
            stats_seq: RequestSequencer::new("stats"),
        }
    }

    /// Commands to run once at startup.
    pub fn start(&mut self) -> Vec<Command> {
        let mut commands = vec![Command::LoadAppInfo];
        commands.extend(self.reload());
        commands
    }

    /// Refetch the report list.
    pub fn reload(&mut self) -> Vec<Command> {
        self.list_phase = ListPhase::Loading;
        vec![Command::LoadReports(self.list_seq.issue())]
    }

    /// Summaries matching the current search, in list order.
    pub fn visible_reports(&self) -> Vec<&ReportSummary> {
        filter_reports(&self.reports, &self.search_query)
    }

    pub fn visible_cards(&self) -> Vec<ReportCard> {
        self.visible_reports()
            .into_iter()
            .map(ReportCard::from_summary)
            .collect()
    }

    pub fn selected_report(&self) -> Option<&ReportSummary> {
        self.visible_reports().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let len = self.visible_reports().len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_reports().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.selected = 0;
    }

    /// Fetch the detail of the selected card.
    pub fn open_selected(&mut self, now: Instant) -> Vec<Command> {
        let Some(summary) = self.selected_report().cloned() else {
            return Vec::new();
        };
        let Some(report_id) = summary.id.clone() else {
            self.notifications.error("Report has no id", now);
            return Vec::new();
        };
        self.open_report(report_id, Some(summary))
    }

    pub fn open_report(&mut self, report_id: String, summary: Option<ReportSummary>) -> Vec<Command> {
        let ticket = self.detail_seq.issue();
        tracing::debug!(report_id = %report_id, ticket = ticket.value(), "opening report");
        vec![Command::LoadDetail {
            ticket,
            report_id,
            summary,
        }]
    }

    /// Leave the detail screen. A detail still in flight is discarded.
    pub fn back(&mut self) {
        self.detail_seq.invalidate();
        self.screen = Screen::Reports;
        self.current_report = None;
        self.detail_scroll = 0;
    }

    pub fn select_tab(&mut self, tab: DetailTab) {
        if self.current_tab != tab {
            self.current_tab = tab;
            self.detail_scroll = 0;
        }
    }

    pub fn download_current(&mut self, now: Instant) -> Vec<Command> {
        match &self.current_report {
            Some(report) => {
                self.notifications.info("Downloading report...", now);
                vec![Command::Download(report.id.clone())]
            }
            None => Vec::new(),
        }
    }

    pub fn submit_upload(&mut self, now: Instant) -> Vec<Command> {
        let path = self.upload_input.trim().to_string();
        if path.is_empty() {
            self.notifications.error("Choose an HTML file to upload", now);
            return Vec::new();
        }
        self.input_mode = InputMode::Normal;
        self.upload_input.clear();
        self.notifications.info("Uploading file...", now);
        vec![Command::Upload(PathBuf::from(path))]
    }

    /// Apply a command outcome.
    pub fn apply(&mut self, event: AppEvent, now: Instant) -> Vec<Command> {
        match event {
            AppEvent::AppInfoLoaded(Ok(info)) => {
                self.app_info = Some(info);
                Vec::new()
            }
            AppEvent::AppInfoLoaded(Err(e)) => {
                tracing::warn!(error = %e, "app info unavailable");
                Vec::new()
            }
            AppEvent::ReportsLoaded { ticket, result } => {
                if !self.list_seq.accept(ticket) {
                    return Vec::new();
                }
                match result {
                    Ok(list) => {
                        self.reports = list.reports;
                        self.list_phase = if self.reports.is_empty() {
                            ListPhase::Empty
                        } else {
                            ListPhase::Ready
                        };
                        self.clamp_selection();
                        vec![Command::LoadStats {
                            ticket: self.stats_seq.issue(),
                            fallback: self.reports.clone(),
                        }]
                    }
                    Err(e) => {
                        self.reports.clear();
                        self.selected = 0;
                        self.list_phase = ListPhase::Empty;
                        self.notifications
                            .error(format!("Failed to load reports: {e}"), now);
                        Vec::new()
                    }
                }
            }
            AppEvent::StatsLoaded { ticket, stats } => {
                if self.stats_seq.accept(ticket) {
                    self.header = HeaderStats::from(stats);
                }
                Vec::new()
            }
            AppEvent::DetailLoaded { ticket, result } => {
                if !self.detail_seq.accept(ticket) {
                    return Vec::new();
                }
                match result {
                    Ok(detail) => {
                        self.current_report = Some(detail);
                        self.current_tab = DetailTab::Overview;
                        self.detail_scroll = 0;
                        self.screen = Screen::Detail;
                    }
                    Err(e) => {
                        self.notifications
                            .error(format!("Failed to load report details: {e}"), now);
                    }
                }
                Vec::new()
            }
            AppEvent::Uploaded(Ok(receipt)) => {
                let name = receipt
                    .filename
                    .or(receipt.hostname)
                    .unwrap_or_else(|| "report".to_string());
                let verb = if receipt.is_replacement {
                    "replaced"
                } else {
                    "uploaded"
                };
                self.notifications
                    .success(format!("File {name} {verb} successfully"), now);
                self.reload()
            }
            AppEvent::Uploaded(Err(e)) => {
                self.notifications.error(format!("Upload failed: {e}"), now);
                Vec::new()
            }
            AppEvent::Downloaded(Ok(path)) => {
                self.notifications
                    .success(format!("Report saved to {}", path.display()), now);
                Vec::new()
            }
            AppEvent::Downloaded(Err(e)) => {
                self.notifications.error(format!("Download failed: {e}"), now);
                Vec::new()
            }
        }
    }

    /// Translate a key press into state changes and commands.
    pub fn on_key(&mut self, code: KeyCode, modifiers: KeyModifiers, now: Instant) -> Control {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return Control::Quit;
        }
        match self.input_mode {
            InputMode::Search => {
                self.on_search_key(code);
                Control::Continue(Vec::new())
            }
            InputMode::Upload => Control::Continue(self.on_upload_key(code, now)),
            InputMode::Normal => match self.screen {
                Screen::Reports => self.on_reports_key(code, now),
                Screen::Detail => Control::Continue(self.on_detail_key(code, now)),
            },
        }
    }

    fn on_reports_key(&mut self, code: KeyCode, now: Instant) -> Control {
        let commands = match code {
            KeyCode::Char('q') => return Control::Quit,
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_previous();
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
                Vec::new()
            }
            KeyCode::Enter => self.open_selected(now),
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Search;
                Vec::new()
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('u') => {
                self.input_mode = InputMode::Upload;
                Vec::new()
            }
            KeyCode::Esc => {
                self.set_search("");
                Vec::new()
            }
            _ => Vec::new(),
        };
        Control::Continue(commands)
    }

    fn on_detail_key(&mut self, code: KeyCode, now: Instant) -> Vec<Command> {
        match code {
            KeyCode::Esc | KeyCode::Backspace => self.back(),
            KeyCode::Tab | KeyCode::Right => self.select_tab(self.current_tab.next()),
            KeyCode::BackTab | KeyCode::Left => self.select_tab(self.current_tab.previous()),
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if let Some(tab) = c.to_digit(10).and_then(DetailTab::from_number) {
                    self.select_tab(tab);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.detail_scroll = self.detail_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.detail_scroll = self.detail_scroll.saturating_add(1);
            }
            KeyCode::PageUp => self.detail_scroll = self.detail_scroll.saturating_sub(10),
            KeyCode::PageDown => self.detail_scroll = self.detail_scroll.saturating_add(10),
            KeyCode::Char('d') => return self.download_current(now),
            _ => {}
        }
        Vec::new()
    }

    fn on_search_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.input_mode = InputMode::Normal,
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.set_search("");
            }
            KeyCode::Backspace => {
                let mut query = self.search_query.clone();
                query.pop();
                self.set_search(query);
            }
            KeyCode::Char(c) => {
                let query = format!("{}{c}", self.search_query);
                self.set_search(query);
            }
            _ => {}
        }
    }

    fn on_upload_key(&mut self, code: KeyCode, now: Instant) -> Vec<Command> {
        match code {
            KeyCode::Enter => return self.submit_upload(now),
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.upload_input.clear();
            }
            KeyCode::Backspace => {
                self.upload_input.pop();
            }
            KeyCode::Char(c) => self.upload_input.push(c),
            _ => {}
        }
        Vec::new()
    }
}
