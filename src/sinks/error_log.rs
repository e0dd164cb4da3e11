// error_log.rs - Default sink: renders each event and writes it immediately
//
// Output shape:
//   2025-01-01 12:00:00.000000 app::[INFO] message
//     data:
//       { ...pretty json context... }
//     trace:
//       - src/main.rs:10

use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use crate::config_loader::ErrorLogConfig;
use crate::errors::{LogError, LogResult};
use crate::log_event::Event;
use crate::log_sink::Sink;

/// Replaces the message text of a rendered event.
pub type MessageDecorator = Arc<dyn Fn(&Event) -> String + Send + Sync>;

pub struct ErrorLogSink {
    config: ErrorLogConfig,
    writer: Box<dyn Write + Send>,
    decorator: Option<MessageDecorator>,
}

impl fmt::Debug for ErrorLogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorLogSink")
            .field("config", &self.config)
            .field("decorator", &self.decorator.is_some())
            .finish()
    }
}

impl ErrorLogSink {
    pub fn stderr(config: ErrorLogConfig) -> Self {
        Self::with_writer(config, io::stderr())
    }

    pub fn with_writer(config: ErrorLogConfig, writer: impl Write + Send + 'static) -> Self {
        Self {
            config,
            writer: Box::new(writer),
            decorator: None,
        }
    }

    pub fn with_decorator<F>(mut self, decorator: F) -> Self
    where
        F: Fn(&Event) -> String + Send + Sync + 'static,
    {
        self.decorator = Some(Arc::new(decorator));
        self
    }

    pub fn config(&self) -> &ErrorLogConfig {
        &self.config
    }

    pub fn render(&self, event: &Event) -> String {
        let message = match &self.decorator {
            Some(decorate) => decorate(event),
            None => event.message.clone(),
        };
        let mut lines = vec![format!(
            "{} {}::[{}] {}",
            self.format_time(&event.timestamp),
            event.module,
            event.level.name(),
            message
        )];

        if self.config.print_context && !event.context.is_empty() {
            lines.push("  data:".to_string());
            // A sanitized map always serializes.
            let pretty = serde_json::to_string_pretty(&event.context).unwrap_or_default();
            lines.extend(pretty.lines().map(|line| format!("    {line}")));
        }

        if self.config.print_trace {
            lines.push("  trace:".to_string());
            lines.extend(event.origin.iter().map(|frame| format!("    - {frame}")));
        }

        lines.join("\n")
    }

    fn format_time(&self, timestamp: &DateTime<Utc>) -> String {
        let offset = self
            .config
            .utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes.saturating_mul(60)))
            .unwrap_or_else(|| Utc.fix());
        let shifted = timestamp.with_timezone(&offset);

        let mut out = String::new();
        if fmt::write(&mut out, format_args!("{}", shifted.format(&self.config.date_format))).is_err() {
            return shifted.to_rfc3339();
        }
        out
    }
}

impl Sink for ErrorLogSink {
    fn append(&mut self, event: Arc<Event>) -> LogResult<()> {
        if event.level < self.config.min_level {
            return Ok(());
        }
        let rendered = self.render(&event);
        writeln!(self.writer, "{rendered}")
            .and_then(|_| self.writer.flush())
            .map_err(|e| LogError::io("error_log append", e))
    }

    fn name(&self) -> &str {
        "error_log"
    }
}
