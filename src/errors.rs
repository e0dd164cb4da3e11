//! Error handling for the logroute crate
//!
//! Configuration problems surface to the caller. Sink failures are reported
//! by sinks through these types too, but the logger swallows them so that a
//! log call never fails.

use thiserror::Error;

/// Main error type for logroute
#[derive(Error, Debug)]
pub enum LogError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Router initializer rejected: {message}")]
    Initializer { message: String },

    #[error("I/O operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Sink failure: {sink} - {message}")]
    Sink { sink: String, message: String },
}

/// Type alias for Result with LogError
pub type LogResult<T> = Result<T, LogError>;

impl LogError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an initializer registration error
    pub fn initializer(message: impl Into<String>) -> Self {
        Self::Initializer {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a serialization error
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// Create a sink error
    pub fn sink(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Sink {
            sink: sink.into(),
            message: message.into(),
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Initializer { .. })
    }
}

impl From<figment::Error> for LogError {
    fn from(err: figment::Error) -> Self {
        LogError::config(err.to_string())
    }
}
