// logger.rs - Owner of exactly one active sink
//
// The logger never buffers events itself. It is the one place that orders
// "commit the old sink" before "install the new sink", and it commits on drop.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::context::Context;
use crate::log_event::{Event, Frame, Level};
use crate::log_sink::Sink;
use crate::sanitizer::SharedSanitizer;

pub struct Logger {
    sink: Mutex<Box<dyn Sink>>,
    sanitizer: SharedSanitizer,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("sink", &self.lock_sink().name())
            .finish()
    }
}

impl Logger {
    pub fn new(sink: impl Sink + 'static) -> Self {
        Self::with_sanitizer(sink, SharedSanitizer::default())
    }

    /// Logger that sanitizes with `sanitizer`, picking up later changes to it.
    pub fn with_sanitizer(sink: impl Sink + 'static, sanitizer: SharedSanitizer) -> Self {
        Self::from_boxed(Box::new(sink), sanitizer)
    }

    pub(crate) fn from_boxed(sink: Box<dyn Sink>, sanitizer: SharedSanitizer) -> Self {
        Self {
            sink: Mutex::new(sink),
            sanitizer,
        }
    }

    pub fn sanitizer(&self) -> &SharedSanitizer {
        &self.sanitizer
    }

    fn lock_sink(&self) -> MutexGuard<'_, Box<dyn Sink>> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Build an event from raw context and hand it to the current sink.
    /// Sink failures are reported through tracing, never to the caller.
    #[track_caller]
    pub fn add(
        &self,
        level: Level,
        message: impl Into<String>,
        context: impl Into<Context>,
        module: impl Into<String>,
    ) -> Arc<Event> {
        let origin = vec![Frame::caller()];
        let context = self.sanitizer.context(&context.into());
        self.append(Event::with_origin(level, message, context, module, origin))
    }

    /// Hand an already built event to the current sink.
    pub fn append(&self, event: Event) -> Arc<Event> {
        let event = Arc::new(event);
        let mut sink = self.lock_sink();
        if let Err(e) = sink.append(Arc::clone(&event)) {
            warn!(sink = %sink.name(), module = %event.module, error = %e, "sink rejected event");
        }
        event
    }

    /// Commit the outgoing sink, then install `sink`. Both steps happen under
    /// the same lock, so no event is appended in between.
    pub fn set_sink(&self, sink: impl Sink + 'static) {
        self.replace_sink(Box::new(sink));
    }

    pub fn replace_sink(&self, sink: Box<dyn Sink>) -> Box<dyn Sink> {
        let mut current = self.lock_sink();
        commit_sink(current.as_mut());
        debug!(from = %current.name(), to = %sink.name(), "swapping sink");
        std::mem::replace(&mut *current, sink)
    }

    pub fn commit(&self) {
        commit_sink(self.lock_sink().as_mut());
    }

    pub fn sink_name(&self) -> String {
        self.lock_sink().name().to_string()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        let sink = self.sink.get_mut().unwrap_or_else(PoisonError::into_inner);
        commit_sink(sink.as_mut());
    }
}

fn commit_sink(sink: &mut dyn Sink) {
    if let Err(e) = sink.commit() {
        warn!(sink = %sink.name(), error = %e, "sink commit failed");
    }
}
