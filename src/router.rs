//! Module-to-logger routing.
//!
//! A `Router` maps module names to dedicated loggers and falls back to one
//! default logger. The default logger and its sink are only built when an
//! event actually needs them, and a deferred initializer can postpone all
//! wiring until the router is first used.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use tracing::{debug, warn};

use crate::config_loader::LogConfig;
use crate::context::Context;
use crate::errors::{LogError, LogResult};
use crate::log_event::{Event, Frame, Level};
use crate::log_sink::Sink;
use crate::logger::Logger;
use crate::sanitizer::{Sanitizer, SanitizerExtension, SharedSanitizer};
use crate::sinks::error_log::ErrorLogSink;

/// Module name used when the caller gives none.
pub const DEFAULT_MODULE: &str = "app";

/// Builds the sink for the lazily created default logger.
pub type SinkFactory = Arc<dyn Fn() -> Box<dyn Sink> + Send + Sync>;

type Initializer = Box<dyn FnOnce(&mut Routes) + Send>;

/// Routing table. Initializers receive it directly, so wiring done there
/// runs under the same lock that guards lazy construction.
pub struct Routes {
    default_logger: Option<Arc<Logger>>,
    module_loggers: BTreeMap<String, Arc<Logger>>,
    sanitizer: SharedSanitizer,
    default_sink_factory: SinkFactory,
}

impl Routes {
    /// Replace the default logger's sink, committing the old one first.
    pub fn set_default_sink(&mut self, sink: impl Sink + 'static) -> &mut Self {
        match &self.default_logger {
            Some(logger) => {
                logger.set_sink(sink);
            }
            None => {
                self.default_logger = Some(Arc::new(Logger::with_sanitizer(
                    sink,
                    self.sanitizer.clone(),
                )));
            }
        }
        self
    }

    /// Give `module` its own logger, or replace the sink of the one it has.
    pub fn set_module_sink(&mut self, module: impl Into<String>, sink: impl Sink + 'static) -> &mut Self {
        let module = module.into();
        match self.module_loggers.get(&module) {
            Some(logger) => {
                logger.set_sink(sink);
            }
            None => {
                debug!(module = %module, "routing module to dedicated sink");
                let logger = Logger::with_sanitizer(sink, self.sanitizer.clone());
                self.module_loggers.insert(module, Arc::new(logger));
            }
        }
        self
    }

    pub fn append_extension(&mut self, extension: impl SanitizerExtension + 'static) -> &mut Self {
        self.sanitizer.update(|s| s.append(Arc::new(extension)));
        self
    }

    pub fn prepend_extension(&mut self, extension: impl SanitizerExtension + 'static) -> &mut Self {
        self.sanitizer.update(|s| s.prepend(Arc::new(extension)));
        self
    }

    pub fn set_default_sink_factory<F>(&mut self, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Sink> + Send + Sync + 'static,
    {
        self.default_sink_factory = Arc::new(factory);
        self
    }

    fn default_logger(&mut self) -> Arc<Logger> {
        if let Some(logger) = &self.default_logger {
            return Arc::clone(logger);
        }
        debug!("constructing default logger");
        let sink = (self.default_sink_factory)();
        let logger = Arc::new(Logger::from_boxed(sink, self.sanitizer.clone()));
        self.default_logger = Some(Arc::clone(&logger));
        logger
    }

    fn logger_for(&mut self, module: &str) -> Arc<Logger> {
        match self.module_loggers.get(module) {
            Some(logger) => Arc::clone(logger),
            None => self.default_logger(),
        }
    }

    fn all_loggers(&self) -> Vec<Arc<Logger>> {
        self.default_logger
            .iter()
            .chain(self.module_loggers.values())
            .cloned()
            .collect()
    }
}

struct RouterState {
    routes: Routes,
    initializer: Option<Initializer>,
    in_use: bool,
}

/// Clears the initializing-thread marker, even if the initializer panics.
struct InitMarker<'a>(&'a Mutex<Option<ThreadId>>);

impl Drop for InitMarker<'_> {
    fn drop(&mut self) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

pub struct Router {
    default_module: String,
    sanitizer: SharedSanitizer,
    state: Mutex<RouterState>,
    initializing: Mutex<Option<ThreadId>>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(state) = self.try_state() else {
            return f
                .debug_struct("Router")
                .field("default_module", &self.default_module)
                .finish_non_exhaustive();
        };
        f.debug_struct("Router")
            .field("default_module", &self.default_module)
            .field("default_logger", &state.routes.default_logger.is_some())
            .field("modules", &state.routes.module_loggers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(DEFAULT_MODULE)
    }
}

impl Router {
    /// Router whose default sink is an `ErrorLogSink` on stderr.
    pub fn new(default_module: impl Into<String>) -> Self {
        Self::with_default_sink_factory(default_module, || {
            Box::new(ErrorLogSink::stderr(Default::default())) as Box<dyn Sink>
        })
    }

    pub fn with_default_sink_factory<F>(default_module: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Sink> + Send + Sync + 'static,
    {
        let sanitizer = SharedSanitizer::default();
        Self {
            default_module: default_module.into(),
            sanitizer: sanitizer.clone(),
            state: Mutex::new(RouterState {
                routes: Routes {
                    default_logger: None,
                    module_loggers: BTreeMap::new(),
                    sanitizer,
                    default_sink_factory: Arc::new(factory),
                },
                initializer: None,
                in_use: false,
            }),
            initializing: Mutex::new(None),
        }
    }

    /// Router configured from `LogConfig`; the default sink writes to stderr
    /// with the configured rendering options.
    pub fn from_config(config: &LogConfig) -> Self {
        let error_log = config.error_log.clone();
        let router = Self::with_default_sink_factory(config.default_module.clone(), move || {
            Box::new(ErrorLogSink::stderr(error_log.clone())) as Box<dyn Sink>
        });
        router.set_sanitizer(Sanitizer::new().with_max_depth(config.max_depth));
        router
    }

    /// True while the current thread is running this router's initializer.
    fn reentered(&self) -> bool {
        let initializing = self.initializing.lock().unwrap_or_else(PoisonError::into_inner);
        *initializing == Some(thread::current().id())
    }

    /// The router state, or `None` when called from inside the initializer,
    /// which already holds it.
    fn try_state(&self) -> Option<MutexGuard<'_, RouterState>> {
        if self.reentered() {
            return None;
        }
        Some(self.state.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Like `try_state`, but marks the router as used and runs a pending
    /// initializer first.
    fn ready_state(&self) -> Option<MutexGuard<'_, RouterState>> {
        let Some(mut state) = self.try_state() else {
            warn!("router used from inside its own initializer, call dropped");
            return None;
        };
        state.in_use = true;
        if let Some(init) = state.initializer.take() {
            debug!("running deferred router initializer");
            *self.initializing.lock().unwrap_or_else(PoisonError::into_inner) =
                Some(thread::current().id());
            let _marker = InitMarker(&self.initializing);
            init(&mut state.routes);
        }
        Some(state)
    }

    pub fn default_module(&self) -> &str {
        &self.default_module
    }

    /// Register wiring to run once, the first time the router is used.
    ///
    /// Fails if an initializer is already pending or the router has already
    /// been used, since the initializer could then never run before first use.
    ///
    /// The initializer configures the router through the `Routes` it is
    /// given. Calls it makes back into this router, directly or through the
    /// global facade, are dropped with a warning instead of deadlocking.
    pub fn lazy_init<F>(&self, init: F) -> LogResult<()>
    where
        F: FnOnce(&mut Routes) + Send + 'static,
    {
        let Some(mut state) = self.try_state() else {
            return Err(LogError::initializer("called from inside the initializer"));
        };
        if state.initializer.is_some() {
            return Err(LogError::initializer("an initializer is already registered"));
        }
        if state.in_use {
            return Err(LogError::initializer(
                "router is already in use, the initializer would never run",
            ));
        }
        state.initializer = Some(Box::new(init));
        Ok(())
    }

    pub fn set_default_sink(&self, sink: impl Sink + 'static) {
        if let Some(mut state) = self.ready_state() {
            state.routes.set_default_sink(sink);
        }
    }

    pub fn set_module_sink(&self, module: impl Into<String>, sink: impl Sink + 'static) {
        if let Some(mut state) = self.ready_state() {
            state.routes.set_module_sink(module, sink);
        }
    }

    /// Replace the sanitizer used by this router and all of its loggers.
    pub fn set_sanitizer(&self, sanitizer: Sanitizer) {
        self.sanitizer.replace(sanitizer);
    }

    pub fn append_extension(&self, extension: impl SanitizerExtension + 'static) {
        self.sanitizer.update(|s| s.append(Arc::new(extension)));
    }

    pub fn prepend_extension(&self, extension: impl SanitizerExtension + 'static) {
        self.sanitizer.update(|s| s.prepend(Arc::new(extension)));
    }

    pub fn sanitizer(&self) -> &SharedSanitizer {
        &self.sanitizer
    }

    /// Route one event. `module` falls back to the router's default module.
    ///
    /// The event is always built and returned; it is not delivered when the
    /// call comes from inside the router's own initializer.
    #[track_caller]
    pub fn add(
        &self,
        level: Level,
        message: impl Into<String>,
        context: impl Into<Context>,
        module: Option<&str>,
    ) -> Arc<Event> {
        let origin = vec![Frame::caller()];
        let module = module.unwrap_or(&self.default_module).to_string();

        let logger = self
            .ready_state()
            .map(|mut state| state.routes.logger_for(&module));

        let context = self.sanitizer.context(&context.into());
        let event = Event::with_origin(level, message, context, module, origin);
        match logger {
            Some(logger) => logger.append(event),
            None => Arc::new(event),
        }
    }

    /// Route an event that was built elsewhere, by its own module.
    pub fn add_event(&self, event: Event) -> Arc<Event> {
        let logger = self
            .ready_state()
            .map(|mut state| state.routes.logger_for(&event.module));
        match logger {
            Some(logger) => logger.append(event),
            None => Arc::new(event),
        }
    }

    /// Commit every logger that exists. Never builds the default logger.
    pub fn commit_all(&self) {
        let loggers = match self.ready_state() {
            Some(state) => state.routes.all_loggers(),
            None => return,
        };
        for logger in loggers {
            logger.commit();
        }
    }

    pub fn shutdown(&self) {
        self.commit_all();
    }

    /// Guard that commits every logger when dropped.
    pub fn flush_guard(&self) -> FlushGuard<'_> {
        FlushGuard { router: self }
    }

    pub fn has_default_logger(&self) -> bool {
        self.try_state()
            .is_some_and(|state| state.routes.default_logger.is_some())
    }

    pub fn module_names(&self) -> Vec<String> {
        self.try_state()
            .map(|state| state.routes.module_loggers.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn logger(&self, module: &str) -> Option<Arc<Logger>> {
        self.try_state()?.routes.module_loggers.get(module).cloned()
    }
}

/// Commits all of a router's loggers when it goes out of scope.
#[must_use = "the guard commits when dropped"]
pub struct FlushGuard<'a> {
    router: &'a Router,
}

impl FlushGuard<'_> {
    pub fn router(&self) -> &Router {
        self.router
    }
}

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.router.commit_all();
    }
}
