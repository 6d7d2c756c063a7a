//! Analyzer Console - terminal client for network-connection analysis reports
//!
//! The interactive console ([`console::run_console`]) and the one-shot CLI
//! commands share the same view models ([`views`]) and state machine
//! ([`app::AppState`]).

pub mod app;
pub mod cli;
pub mod config;
pub mod console;
pub mod logging;
pub mod notify;
pub mod text;
pub mod views;

pub use app::{AppEvent, AppState, Command, Control};
pub use cli::{Cli, Commands};
pub use config::ConsoleConfig;
pub use notify::{NotificationCenter, NotificationLevel};
