// facade.rs - Convenience entry points for call sites
//
// `Log` is a cheap handle over a shared router. The process-wide instance
// below exists only for call sites that cannot have a router injected.

use lazy_static::lazy_static;
use std::sync::Arc;

use crate::context::Context;
use crate::errors::LogResult;
use crate::log_event::{Event, Level};
use crate::router::{Router, Routes};

#[derive(Debug, Clone)]
pub struct Log {
    router: Arc<Router>,
    module: Option<String>,
}

impl Log {
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            router,
            module: None,
        }
    }

    /// Handle whose calls without an explicit module use `module`.
    pub fn with_module(&self, module: impl Into<String>) -> Self {
        Self {
            router: Arc::clone(&self.router),
            module: Some(module.into()),
        }
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Module used when a call names none.
    pub fn module(&self) -> &str {
        self.module
            .as_deref()
            .unwrap_or_else(|| self.router.default_module())
    }

    #[track_caller]
    pub fn add(
        &self,
        level: Level,
        message: impl Into<String>,
        context: impl Into<Context>,
        module: Option<&str>,
    ) -> Arc<Event> {
        let module = module.or(self.module.as_deref());
        self.router.add(level, message, context, module)
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) -> Arc<Event> {
        self.add(Level::Debug, message, Context::Null, None)
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) -> Arc<Event> {
        self.add(Level::Info, message, Context::Null, None)
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) -> Arc<Event> {
        self.add(Level::Warning, message, Context::Null, None)
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) -> Arc<Event> {
        self.add(Level::Error, message, Context::Null, None)
    }

    #[track_caller]
    pub fn debug_with(&self, message: impl Into<String>, context: impl Into<Context>, module: Option<&str>) -> Arc<Event> {
        self.add(Level::Debug, message, context, module)
    }

    #[track_caller]
    pub fn info_with(&self, message: impl Into<String>, context: impl Into<Context>, module: Option<&str>) -> Arc<Event> {
        self.add(Level::Info, message, context, module)
    }

    #[track_caller]
    pub fn warn_with(&self, message: impl Into<String>, context: impl Into<Context>, module: Option<&str>) -> Arc<Event> {
        self.add(Level::Warning, message, context, module)
    }

    #[track_caller]
    pub fn error_with(&self, message: impl Into<String>, context: impl Into<Context>, module: Option<&str>) -> Arc<Event> {
        self.add(Level::Error, message, context, module)
    }
}

lazy_static! {
    static ref GLOBAL_ROUTER: Arc<Router> = Arc::new(Router::default());
}

/// Handle over the process-wide router.
pub fn global() -> Log {
    Log::new(Arc::clone(&GLOBAL_ROUTER))
}

pub fn router() -> Arc<Router> {
    Arc::clone(&GLOBAL_ROUTER)
}

/// Defer wiring of the process-wide router until its first use.
pub fn lazy_init<F>(init: F) -> LogResult<()>
where
    F: FnOnce(&mut Routes) + Send + 'static,
{
    GLOBAL_ROUTER.lazy_init(init)
}

/// Commit everything the process-wide router holds. Statics are never
/// dropped, so hosts call this before exiting.
pub fn shutdown() {
    GLOBAL_ROUTER.shutdown();
}
