// log_bridge.rs - Feeds records from the `log` crate into a router

use serde_json::Map;
use std::sync::Arc;

use crate::errors::{LogError, LogResult};
use crate::log_event::{Event, Frame, Level};
use crate::router::Router;

pub struct LogBridge {
    router: Arc<Router>,
}

impl LogBridge {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    /// Install as the global `log` logger.
    pub fn install(router: Arc<Router>, max_level: log::LevelFilter) -> LogResult<()> {
        log::set_boxed_logger(Box::new(Self::new(router)))
            .map_err(|e| LogError::config(format!("log bridge not installed: {e}")))?;
        log::set_max_level(max_level);
        Ok(())
    }

    pub fn level_for(level: log::Level) -> Level {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warning,
            log::Level::Info => Level::Info,
            log::Level::Debug | log::Level::Trace => Level::Debug,
        }
    }

    /// Translate a record; the target becomes the module.
    pub fn event_for(record: &log::Record<'_>) -> Event {
        let origin = match (record.file(), record.line()) {
            (Some(file), Some(line)) => vec![Frame::new(file, line, 0)],
            _ => Vec::new(),
        };
        Event::with_origin(
            Self::level_for(record.level()),
            record.args().to_string(),
            Map::new(),
            record.target(),
            origin,
        )
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        let event = Self::event_for(record);
        self.router.add_event(event);
    }

    fn flush(&self) {
        self.router.commit_all();
    }
}
