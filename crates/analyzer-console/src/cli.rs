//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::views::DetailTab;

/// Browse network-connection analysis reports from the terminal.
///
/// Without a subcommand the interactive console starts.
#[derive(Parser, Debug)]
#[command(name = "analyzer-console")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides config file and ANALYZER_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Config file (default: <config dir>/analyzer-console/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Interactive report console (default)
    Console,

    /// Show backend name and version
    Info,

    /// List stored reports
    List {
        /// Only reports whose hostname or OS contains this text
        #[arg(long, short)]
        search: Option<String>,
    },

    /// Show one report
    Show {
        id: String,

        #[arg(long, short, value_enum, default_value_t = DetailTab::Overview)]
        tab: DetailTab,
    },

    /// Unique remote hosts contacted in one report
    Hosts { id: String },

    /// Summary statistics over all reports
    Stats,

    /// Upload an HTML report file
    Upload { file: PathBuf },

    /// Download a report's original HTML file
    Download {
        id: String,

        /// Target directory (default: configured download directory)
        #[arg(long, short, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Delete a stored report
    Delete { id: String },

    /// Check backend health
    Health,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Console)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_console() {
        let cli = Cli::try_parse_from(["analyzer-console"]).unwrap();
        assert_eq!(cli.command(), Commands::Console);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "analyzer-console",
            "show",
            "12",
            "--tab",
            "hosts",
            "-vv",
            "--api-url",
            "http://10.0.0.2:18000",
        ])
        .unwrap();
        assert_eq!(
            cli.command(),
            Commands::Show {
                id: "12".into(),
                tab: DetailTab::Hosts
            }
        );
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.api_url.as_deref(), Some("http://10.0.0.2:18000"));
    }

    #[test]
    fn unknown_tab_is_rejected() {
        assert!(Cli::try_parse_from(["analyzer-console", "show", "1", "--tab", "graph"]).is_err());
    }
}
