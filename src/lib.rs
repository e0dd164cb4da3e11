//! Library root for the `logroute` crate
//! Leveled logging that routes events per module to pluggable sinks

// Core error handling
pub mod errors;

// Events & context
pub mod context;
pub mod log_event;

// Sanitization
pub mod error_format;
pub mod sanitizer;

// Sinks, loggers & routing
pub mod log_sink;
pub mod logger;
pub mod router;
pub mod sinks;

// Call-site entry points
pub mod facade;
pub mod log_bridge;

// Configuration & CLI
pub mod cli;
pub mod config_loader;

#[cfg(test)]
mod tests {
    pub mod test_utils;
    pub mod sanitizer;
    pub mod logger;
    pub mod router;
    pub mod sinks;
    pub mod config;
}

pub use context::{CapturedError, Context};
pub use error_format::ErrorFormat;
pub use errors::{LogError, LogResult};
pub use facade::Log;
pub use log_event::{Event, Frame, Level};
pub use log_sink::{MemorySink, NullSink, Sink};
pub use logger::Logger;
pub use router::{FlushGuard, Router, Routes};
pub use sanitizer::{Sanitizer, SanitizerExtension, SharedSanitizer};
