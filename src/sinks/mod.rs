//! Concrete sinks shipped with the crate.

pub mod buffered;
pub mod error_log;

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

pub use buffered::BufferedSink;
pub use error_log::ErrorLogSink;

/// In-memory writer that can be cloned and read back while a sink owns it.
#[derive(Debug, Default, Clone)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Return the contents and empty the buffer.
    pub fn take(&self) -> String {
        let mut bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        let out = String::from_utf8_lossy(&bytes).into_owned();
        bytes.clear();
        out
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
