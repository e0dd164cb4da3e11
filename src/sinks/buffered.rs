//! Batching sink.
//!
//! Events are rendered on append and kept in memory. A batch is written when
//! it reaches the configured limit or when the sink is committed.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use crate::errors::{LogError, LogResult};
use crate::log_event::Event;
use crate::log_sink::Sink;

/// Turns an event into one rendered element of a batch.
pub type Render = Arc<dyn Fn(&Event) -> String + Send + Sync>;

pub struct BufferedSink {
    render: Render,
    element_separator: String,
    batch_separator: String,
    batch_header: Option<String>,
    batch_limit: usize,
    lines: Vec<String>,
    writer: Box<dyn Write + Send>,
}

impl fmt::Debug for BufferedSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferedSink")
            .field("batch_limit", &self.batch_limit)
            .field("pending", &self.lines.len())
            .finish()
    }
}

impl BufferedSink {
    /// Compact JSON per event, one event per batch.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            render: Arc::new(|event: &Event| event.summary().to_string()),
            element_separator: "\n".to_string(),
            batch_separator: "\n".to_string(),
            batch_header: None,
            batch_limit: 1,
            lines: Vec::new(),
            writer: Box::new(writer),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Append to `path`, creating it if needed.
    pub fn file(path: impl AsRef<Path>) -> LogResult<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| LogError::io(format!("open {}", path.display()), e))?;
        Ok(Self::new(file))
    }

    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&Event) -> String + Send + Sync + 'static,
    {
        self.render = Arc::new(render);
        self
    }

    pub fn with_element_separator(mut self, separator: impl Into<String>) -> Self {
        self.element_separator = separator.into();
        self
    }

    pub fn with_batch_separator(mut self, separator: impl Into<String>) -> Self {
        self.batch_separator = separator.into();
        self
    }

    /// Line written before every batch.
    pub fn with_batch_header(mut self, header: impl Into<String>) -> Self {
        self.batch_header = Some(header.into());
        self
    }

    /// Zero is treated as one.
    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = limit.max(1);
        self
    }

    pub fn pending(&self) -> usize {
        self.lines.len()
    }
}

impl Sink for BufferedSink {
    fn append(&mut self, event: Arc<Event>) -> LogResult<()> {
        self.lines.push((self.render)(&event));
        if self.lines.len() >= self.batch_limit {
            self.commit()?;
        }
        Ok(())
    }

    fn commit(&mut self) -> LogResult<()> {
        if self.lines.is_empty() {
            return Ok(());
        }
        let mut content = String::new();
        if let Some(header) = &self.batch_header {
            content.push_str(header);
            content.push('\n');
        }
        content.push_str(&self.lines.join(&self.element_separator));
        content.push_str(&self.batch_separator);
        self.lines.clear();

        self.writer
            .write_all(content.as_bytes())
            .and_then(|_| self.writer.flush())
            .map_err(|e| LogError::io("buffered commit", e))
    }

    fn name(&self) -> &str {
        "buffered"
    }
}
