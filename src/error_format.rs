// error_format.rs - Sanitizer extension that turns captured errors into plain maps

use std::any::Any;

use crate::context::{CapturedError, Context};
use crate::sanitizer::SanitizerExtension;

/// Reduces a `CapturedError` to `{message, file, line, code, trace}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorFormat {
    include_sources: bool,
}

impl ErrorFormat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also emit `sources`, the messages of the error's source chain, when
    /// the chain is non-empty.
    pub fn with_sources(mut self) -> Self {
        self.include_sources = true;
        self
    }

    pub fn format(&self, err: &CapturedError) -> Context {
        let trace: Vec<Context> = err
            .trace
            .iter()
            .map(|frame| {
                Context::map()
                    .with("file", frame.file.as_str())
                    .with("line", frame.line)
            })
            .collect();

        let mut ctx = Context::map()
            .with("message", err.message.as_str())
            .with("file", err.file.as_str())
            .with("line", err.line)
            .with("code", err.code)
            .with("trace", trace);

        if self.include_sources && !err.sources.is_empty() {
            ctx = ctx.with("sources", err.sources.clone());
        }
        ctx
    }
}

impl SanitizerExtension for ErrorFormat {
    fn attempt(&self, value: &(dyn Any + Send + Sync)) -> Option<Context> {
        value
            .downcast_ref::<CapturedError>()
            .map(|err| self.format(err))
    }

    fn name(&self) -> &str {
        "error_format"
    }
}
