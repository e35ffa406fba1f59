use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub intervals: IntervalConfig,
    pub speech: SpeechConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Rolling log files are written only when this is set.
    pub directory: Option<String>,
    pub debug_file: String,
    pub info_file: String,
    pub warn_file: String,
    pub error_file: String,
    pub console_level: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct IntervalConfig {
    pub poll_interval_millis: u64,
    /// Omit to wait on the router forever.
    pub request_timeout_seconds: Option<u64>,
    /// Omit to wait on the speech command forever.
    pub speech_timeout_seconds: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct SpeechConfig {
    pub command: Option<String>,
    pub args: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            debug_file: "log_debug.log".to_string(),
            info_file: "log_info.log".to_string(),
            warn_file: "log_warn.log".to_string(),
            error_file: "log_error.log".to_string(),
            console_level: "warn".to_string(),
        }
    }
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            poll_interval_millis: 1000,
            request_timeout_seconds: Some(10),
            speech_timeout_seconds: Some(30),
        }
    }
}

impl IntervalConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds.map(Duration::from_secs)
    }

    pub fn speech_timeout(&self) -> Option<Duration> {
        self.speech_timeout_seconds.map(Duration::from_secs)
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_example(path: impl AsRef<Path>) -> Result<()> {
        let example_config = Config {
            logging: LoggingConfig {
                directory: Some("./logs".to_string()),
                console_level: "info".to_string(),
                ..LoggingConfig::default()
            },
            intervals: IntervalConfig::default(),
            speech: SpeechConfig {
                command: Some(if cfg!(target_os = "macos") { "say" } else { "espeak-ng" }.to_string()),
                args: Vec::new(),
            },
        };

        let toml_content = toml::to_string_pretty(&example_config)?;
        fs::write(path, toml_content)?;
        Ok(())
    }
}
