use chrono::format::{Item, StrftimeItems};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::errors::{LogError, LogResult};
use crate::log_event::Level;
use crate::router::DEFAULT_MODULE;
use crate::sanitizer::DEFAULT_MAX_DEPTH;

/// Config file read when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "logroute.toml";

/// Rendering options for the default error-log sink.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ErrorLogConfig {
    #[serde(default = "default_min_level")]
    pub min_level: Level,
    #[serde(default = "default_true")]
    pub print_context: bool,
    #[serde(default)]
    pub print_trace: bool,
    /// Offset from UTC for displayed timestamps. UTC when unset.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_min_level() -> Level {
    Level::Info
}

fn default_true() -> bool {
    true
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M:%S%.6f".to_string()
}

impl Default for ErrorLogConfig {
    fn default() -> Self {
        Self {
            min_level: default_min_level(),
            print_context: true,
            print_trace: false,
            utc_offset_minutes: None,
            date_format: default_date_format(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "default_module")]
    pub default_module: String,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default)]
    pub error_log: ErrorLogConfig,
}

fn default_module() -> String {
    DEFAULT_MODULE.to_string()
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_module: default_module(),
            max_depth: default_max_depth(),
            error_log: ErrorLogConfig::default(),
        }
    }
}

impl LogConfig {
    pub fn validate(&self) -> LogResult<()> {
        if self.default_module.trim().is_empty() {
            return Err(LogError::config("default_module cannot be empty"));
        }
        if self.max_depth == 0 {
            return Err(LogError::config("max_depth must be at least 1"));
        }
        if StrftimeItems::new(&self.error_log.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(LogError::config(format!(
                "invalid date_format '{}'",
                self.error_log.date_format
            )));
        }
        if let Some(minutes) = self.error_log.utc_offset_minutes {
            if minutes.abs() >= 24 * 60 {
                return Err(LogError::config(format!(
                    "utc_offset_minutes out of range: {minutes}"
                )));
            }
        }
        Ok(())
    }
}

/// Layered configuration: defaults, then the TOML file, then `LOGROUTE_*`
/// environment variables (`__` separates nested keys).
pub fn load_config(path: Option<&str>) -> LogResult<LogConfig> {
    let figment = Figment::from(Serialized::defaults(LogConfig::default()))
        .merge(Toml::file(path.unwrap_or(DEFAULT_CONFIG_FILE)))
        .merge(Env::prefixed("LOGROUTE_").split("__"));

    let config: LogConfig = figment.extract()?;
    config.validate()?;
    Ok(config)
}
