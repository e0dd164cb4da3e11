// log_sink.rs - Destination contract consumed by the logger
// Purpose: Sinks receive immutable events and own any buffering they do.

use std::sync::{Arc, Mutex, PoisonError};

use crate::errors::LogResult;
use crate::log_event::Event;

/// Sink is where events end up.
///
/// `append` may buffer. `commit` flushes whatever is buffered and must be a
/// no-op when nothing is pending. A sink that never buffers can keep the
/// default `commit` and is treated as always flushed.
pub trait Sink: Send {
    fn append(&mut self, event: Arc<Event>) -> LogResult<()>;

    fn commit(&mut self) -> LogResult<()> {
        Ok(())
    }

    /// Label used in diagnostics when the sink fails.
    fn name(&self) -> &str {
        "sink"
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn append(&mut self, event: Arc<Event>) -> LogResult<()> {
        (**self).append(event)
    }

    fn commit(&mut self) -> LogResult<()> {
        (**self).commit()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// A sink shared with the caller, so the caller can keep inspecting or
/// reconfiguring it after handing it to a logger.
impl<S: Sink + ?Sized> Sink for Arc<Mutex<S>> {
    fn append(&mut self, event: Arc<Event>) -> LogResult<()> {
        self.lock().unwrap_or_else(PoisonError::into_inner).append(event)
    }

    fn commit(&mut self) -> LogResult<()> {
        self.lock().unwrap_or_else(PoisonError::into_inner).commit()
    }

    fn name(&self) -> &str {
        "shared"
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl Sink for NullSink {
    fn append(&mut self, _event: Arc<Event>) -> LogResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

/// Sink that keeps every event in memory, split into committed and pending.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    batch_limit: Option<usize>,
    pending: Vec<Arc<Event>>,
    committed: Vec<Vec<Arc<Event>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit automatically once `limit` events are pending.
    pub fn with_batch_limit(limit: usize) -> Self {
        Self {
            batch_limit: Some(limit.max(1)),
            ..Self::default()
        }
    }

    pub fn pending(&self) -> &[Arc<Event>] {
        &self.pending
    }

    /// Committed batches, oldest first.
    pub fn batches(&self) -> &[Vec<Arc<Event>>] {
        &self.committed
    }

    pub fn committed_messages(&self) -> Vec<String> {
        self.committed
            .iter()
            .flatten()
            .map(|event| event.message.clone())
            .collect()
    }
}

impl Sink for MemorySink {
    fn append(&mut self, event: Arc<Event>) -> LogResult<()> {
        self.pending.push(event);
        if Some(self.pending.len()) == self.batch_limit {
            self.commit()?;
        }
        Ok(())
    }

    fn commit(&mut self) -> LogResult<()> {
        if !self.pending.is_empty() {
            self.committed.push(std::mem::take(&mut self.pending));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
