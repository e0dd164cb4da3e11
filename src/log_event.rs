// log_event.rs - Immutable log records and severity levels

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::panic::Location;
use std::str::FromStr;

use crate::errors::LogError;

/// Level classifies the severity of a log event. Ordering is numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    Debug = 1,
    Info = 2,
    Warning = 3,
    Error = 4,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Debug, Level::Info, Level::Warning, Level::Error];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "1" => Ok(Level::Debug),
            "info" | "2" => Ok(Level::Info),
            "warning" | "warn" | "3" => Ok(Level::Warning),
            "error" | "4" => Ok(Level::Error),
            other => Err(LogError::config(format!("unknown log level '{other}'"))),
        }
    }
}

// Accepts names in any case ("warn" included) and the numeric values.
impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LevelVisitor;

        impl Visitor<'_> for LevelVisitor {
            type Value = Level;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a log level name or a number from 1 to 4")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Level, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Level, E> {
                self.visit_str(&v.to_string())
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Level, E> {
                self.visit_str(&v.to_string())
            }
        }

        deserializer.deserialize_any(LevelVisitor)
    }
}

/// One call-site location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Frame {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Frame of whoever called the outermost `#[track_caller]` function.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from(Location::caller())
    }
}

impl From<&Location<'_>> for Frame {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line(), location.column())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Event is one immutable log occurrence.
///
/// The context has already been sanitized by the time an `Event` exists, so
/// every sink can serialize it without further checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub level: Level,
    pub message: String,
    pub context: Map<String, Value>,
    pub module: String,
    pub timestamp: DateTime<Utc>,
    pub origin: Vec<Frame>,
}

impl Event {
    /// Build an event from an already sanitized context, capturing the call site
    /// and the current time.
    #[track_caller]
    pub fn new(
        level: Level,
        message: impl Into<String>,
        context: Map<String, Value>,
        module: impl Into<String>,
    ) -> Self {
        Self::with_origin(level, message, context, module, vec![Frame::caller()])
    }

    pub fn with_origin(
        level: Level,
        message: impl Into<String>,
        context: Map<String, Value>,
        module: impl Into<String>,
        origin: Vec<Frame>,
    ) -> Self {
        Self {
            level,
            message: message.into(),
            context,
            module: module.into(),
            timestamp: Utc::now(),
            origin,
        }
    }

    /// Microseconds since the Unix epoch.
    pub fn micros(&self) -> i64 {
        self.timestamp.timestamp_micros()
    }

    /// Compact JSON with the fields most sinks care about.
    pub fn summary(&self) -> Value {
        serde_json::json!({
            "module": self.module,
            "level": self.level.value(),
            "message": self.message,
            "context": self.context,
        })
    }
}
