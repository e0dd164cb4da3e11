//! Raw, caller-supplied context data.
//!
//! A `Context` can carry anything a caller wants to attach to a log call,
//! including opaque objects. Nothing here is guaranteed to be serializable;
//! the sanitizer reduces it before it ever reaches an event.

use serde_json::Value;
use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::log_event::Frame;

/// Arbitrary context handed to a log call.
#[derive(Clone, Default)]
pub enum Context {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Unsigned values above `i64::MAX`.
    UInt(u64),
    Float(f64),
    Str(String),
    /// Ordered key/value pairs.
    Map(Vec<(String, Context)>),
    Seq(Vec<Context>),
    /// Anything else. Only a sanitizer extension can make sense of it.
    Object(Arc<dyn Any + Send + Sync>),
}

impl Context {
    /// An empty mapping.
    pub fn map() -> Self {
        Context::Map(Vec::new())
    }

    /// Builder-style insert; turns a non-map context into a map first.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Context>) -> Self {
        let key = key.into();
        let value = value.into();
        match &mut self {
            Context::Map(entries) => {
                if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
                    slot.1 = value;
                } else {
                    entries.push((key, value));
                }
                self
            }
            _ => Context::Map(vec![(key, value)]),
        }
    }

    /// Wrap an arbitrary value as an opaque object.
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Context::Object(Arc::new(value))
    }

    /// Capture an error at the caller's location as an opaque object.
    #[track_caller]
    pub fn error<E: StdError + ?Sized>(err: &E) -> Self {
        Context::Object(Arc::new(CapturedError::capture(err)))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Context::Null => true,
            Context::Map(entries) => entries.is_empty(),
            Context::Seq(items) => items.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Null => f.write_str("Null"),
            Context::Bool(v) => write!(f, "Bool({v})"),
            Context::Int(v) => write!(f, "Int({v})"),
            Context::UInt(v) => write!(f, "UInt({v})"),
            Context::Float(v) => write!(f, "Float({v})"),
            Context::Str(v) => write!(f, "Str({v:?})"),
            Context::Map(entries) => f.debug_map().entries(entries.iter().map(|(k, v)| (k, v))).finish(),
            Context::Seq(items) => f.debug_list().entries(items).finish(),
            Context::Object(_) => f.write_str("Object(..)"),
        }
    }
}

macro_rules! context_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Context {
            fn from(v: $t) -> Self {
                Context::Int(v as i64)
            }
        })*
    };
}

context_from_int!(i8, i16, i32, i64, u8, u16, u32, isize);

impl From<u64> for Context {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(v) => Context::Int(v),
            Err(_) => Context::UInt(v),
        }
    }
}

impl From<usize> for Context {
    fn from(v: usize) -> Self {
        Context::from(v as u64)
    }
}

/// 128-bit values outside the 64-bit range are kept exact as decimal text.
impl From<i128> for Context {
    fn from(v: i128) -> Self {
        if let Ok(i) = i64::try_from(v) {
            Context::Int(i)
        } else if let Ok(u) = u64::try_from(v) {
            Context::UInt(u)
        } else {
            Context::Str(v.to_string())
        }
    }
}

impl From<u128> for Context {
    fn from(v: u128) -> Self {
        match u64::try_from(v) {
            Ok(u) => Context::from(u),
            Err(_) => Context::Str(v.to_string()),
        }
    }
}

impl From<bool> for Context {
    fn from(v: bool) -> Self {
        Context::Bool(v)
    }
}

impl From<f32> for Context {
    fn from(v: f32) -> Self {
        Context::Float(v as f64)
    }
}

impl From<f64> for Context {
    fn from(v: f64) -> Self {
        Context::Float(v)
    }
}

impl From<&str> for Context {
    fn from(v: &str) -> Self {
        Context::Str(v.to_string())
    }
}

impl From<String> for Context {
    fn from(v: String) -> Self {
        Context::Str(v)
    }
}

impl<T: Into<Context>> From<Option<T>> for Context {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Context::Null)
    }
}

impl<T: Into<Context>> From<Vec<T>> for Context {
    fn from(items: Vec<T>) -> Self {
        Context::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<Context>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Context::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<Value> for Context {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Context::Null,
            Value::Bool(b) => Context::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Context::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Context::UInt(u)
                } else {
                    n.as_f64().map(Context::Float).unwrap_or(Context::Null)
                }
            }
            Value::String(s) => Context::Str(s),
            Value::Array(items) => Context::Seq(items.into_iter().map(Context::from).collect()),
            Value::Object(map) => Context::Map(map.into_iter().map(|(k, v)| (k, Context::from(v))).collect()),
        }
    }
}

impl From<CapturedError> for Context {
    fn from(err: CapturedError) -> Self {
        Context::Object(Arc::new(err))
    }
}

/// An error reduced to plain data at the moment it was caught.
///
/// Rust errors carry neither a location nor a numeric code, so both are
/// captured here: the location from the caller, the code from `with_code`.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedError {
    pub message: String,
    pub file: String,
    pub line: u32,
    pub code: i64,
    pub trace: Vec<Frame>,
    pub sources: Vec<String>,
}

impl CapturedError {
    #[track_caller]
    pub fn capture<E: StdError + ?Sized>(err: &E) -> Self {
        let frame = Frame::caller();
        let mut sources = Vec::new();
        let mut next = err.source();
        while let Some(source) = next {
            sources.push(source.to_string());
            next = source.source();
        }
        Self {
            message: err.to_string(),
            file: frame.file.clone(),
            line: frame.line,
            code: 0,
            trace: vec![frame],
            sources,
        }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    /// Add a frame below the capture site, e.g. when the error is re-raised.
    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.trace.push(frame);
        self
    }
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.message, self.file, self.line)
    }
}
