//! Console configuration.
//!
//! Resolution order, later wins: built-in defaults, the TOML config file,
//! `ANALYZER_*` environment variables, then the `--api-url` flag.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use serde::Deserialize;

use analyzer_protocol::DEFAULT_API_BASE_URL;

pub const API_URL_ENV: &str = "ANALYZER_API_URL";
pub const DOWNLOAD_DIR_ENV: &str = "ANALYZER_DOWNLOAD_DIR";

const APP_DIR: &str = "analyzer-console";
const CONFIG_FILE: &str = "config.toml";

/// Settings for the console and the one-shot commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Backend base URL, e.g. `http://localhost:18000`.
    pub api_base_url: String,
    /// Directory downloaded reports are written into.
    pub download_dir: PathBuf,
    /// How long a notification stays on screen.
    pub notification_secs: u64,
    /// UI refresh / input poll interval.
    pub tick_millis: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            download_dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
            notification_secs: 5,
            tick_millis: 100,
        }
    }
}

/// On-disk form; every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub api_base_url: Option<String>,
    pub download_dir: Option<PathBuf>,
    pub notification_secs: Option<u64>,
    pub tick_millis: Option<u64>,
}

impl ConfigFile {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid config file")
    }

    /// Read `path`. A missing file is `None` unless `required`.
    pub fn load(path: &Path, required: bool) -> anyhow::Result<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text)
                .with_context(|| format!("failed to parse {}", path.display()))
                .map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                tracing::debug!(path = %path.display(), "no config file");
                Ok(None)
            }
            Err(e) => {
                Err(e).with_context(|| format!("failed to read config {}", path.display()))
            }
        }
    }
}

/// `<config dir>/analyzer-console/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR).join(CONFIG_FILE))
}

/// `<cache dir>/analyzer-console`, where the console writes its log.
pub fn default_log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

impl ConsoleConfig {
    /// Build the effective configuration.
    ///
    /// `config_path` is the `--config` flag; when given, the file must exist.
    /// `env` looks up environment variables (injected for tests).
    pub fn resolve(
        config_path: Option<&Path>,
        api_url_flag: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let mut config = Self::default();

        let file = match config_path {
            Some(path) => ConfigFile::load(path, true)?,
            None => match default_config_path() {
                Some(path) => ConfigFile::load(&path, false)?,
                None => None,
            },
        };
        if let Some(file) = file {
            config.apply_file(file);
        }

        if let Some(url) = env(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.api_base_url = url;
        }
        if let Some(dir) = env(DOWNLOAD_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            config.download_dir = PathBuf::from(dir);
        }
        if let Some(url) = api_url_flag {
            config.api_base_url = url.to_string();
        }

        config.api_base_url = config.api_base_url.trim().trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(url) = file.api_base_url {
            self.api_base_url = url;
        }
        if let Some(dir) = file.download_dir {
            self.download_dir = dir;
        }
        if let Some(secs) = file.notification_secs {
            self.notification_secs = secs;
        }
        if let Some(ms) = file.tick_millis {
            self.tick_millis = ms;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = self.api_base_url.as_str();
        if url.is_empty() {
            bail!("api_base_url must not be empty");
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("api_base_url must start with http:// or https://, got {url}");
        }
        if self.tick_millis == 0 {
            bail!("tick_millis must be greater than zero");
        }
        if self.notification_secs == 0 {
            bail!("notification_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_secs)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}
