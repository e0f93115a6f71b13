use crate::application::SubmissionTiming;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix for environment overrides, e.g. `PYRAMYD__SUBMISSION__DELAY_MS`.
pub const ENV_PREFIX: &str = "PYRAMYD";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Where the draft snapshot, theme and logs live. Defaults to the
    /// platform's local data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Simulated request latency (default: 2000)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// How long the success screen stays before the wizard resets (default: 5000)
    #[serde(default = "default_reset_grace_ms")]
    pub reset_grace_ms: u64,
    /// Make every submission fail, for exercising the error dialog
    #[serde(default)]
    pub simulate_failure: bool,
}

fn default_delay_ms() -> u64 {
    2000
}

fn default_reset_grace_ms() -> u64 {
    5000
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            reset_grace_ms: default_reset_grace_ms(),
            simulate_failure: false,
        }
    }
}

impl SubmissionConfig {
    pub fn timing(&self) -> SubmissionTiming {
        SubmissionTiming {
            delay: Duration::from_millis(self.delay_ms),
            reset_grace: Duration::from_millis(self.reset_grace_ms),
            simulate_failure: self.simulate_failure,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// How often the event loop wakes without input (default: 250)
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

fn default_tick_rate_ms() -> u64 {
    250
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

impl UiConfig {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }
}

impl Config {
    /// Layers built-in defaults, the user config file, an explicit file and
    /// `PYRAMYD__*` environment variables, later sources winning.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let defaults_json = serde_json::to_string(&Config::default())
            .context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::from(path.to_path_buf()));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// `~/.config/pyramyd/config.toml` on Linux, the platform equivalent elsewhere.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pyramyd").join("config.toml"))
    }

    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .or_else(|| dirs::data_local_dir().map(|dir| dir.join("pyramyd")))
            .unwrap_or_else(|| PathBuf::from(".pyramyd"))
    }

    pub fn logs_path(&self) -> PathBuf {
        self.data_dir().join("logs")
    }
}
