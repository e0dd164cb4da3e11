//! Reduction of arbitrary context to plain JSON data.
//!
//! Primitives pass through, maps and sequences are reduced element by
//! element, and everything else goes through the ordered extension list.
//! Values that nothing can reduce are omitted from their parent.

use serde_json::{Map, Number, Value};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::context::Context;

/// Nesting limit used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Pluggable reducer for values the sanitizer does not understand natively.
pub trait SanitizerExtension: Send + Sync {
    /// Reduce `value` to context data, or `None` when the type is not recognized.
    /// The result is sanitized again, so it may contain further objects.
    fn attempt(&self, value: &(dyn Any + Send + Sync)) -> Option<Context>;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> SanitizerExtension for F
where
    F: Fn(&(dyn Any + Send + Sync)) -> Option<Context> + Send + Sync,
{
    fn attempt(&self, value: &(dyn Any + Send + Sync)) -> Option<Context> {
        self(value)
    }

    fn name(&self) -> &str {
        "closure"
    }
}

/// Recursive sanitizer with an ordered list of extensions.
#[derive(Clone)]
pub struct Sanitizer {
    extensions: Vec<Arc<dyn SanitizerExtension>>,
    max_depth: usize,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sanitizer")
            .field("extensions", &self.extension_names())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl Sanitizer {
    pub fn new() -> Self {
        Self {
            extensions: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Values nested deeper than `max_depth` are omitted. Zero is raised to one.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn with_extension(mut self, extension: impl SanitizerExtension + 'static) -> Self {
        self.append(Arc::new(extension));
        self
    }

    /// Add an extension after the existing ones.
    pub fn append(&mut self, extension: Arc<dyn SanitizerExtension>) {
        self.extensions.push(extension);
    }

    /// Add an extension that is tried before the existing ones.
    pub fn prepend(&mut self, extension: Arc<dyn SanitizerExtension>) {
        self.extensions.insert(0, extension);
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn extension_names(&self) -> Vec<String> {
        self.extensions.iter().map(|e| e.name().to_string()).collect()
    }

    /// Reduce a value. `None` means it could not be sanitized, which is not
    /// the same as a sanitized `Value::Null`.
    pub fn normalize(&self, value: &Context) -> Option<Value> {
        self.normalize_at(value, 0)
    }

    /// Reduce a whole log context. Maps are kept, sequences are keyed by
    /// index, anything else yields an empty map.
    pub fn context(&self, value: &Context) -> Map<String, Value> {
        match self.normalize(value) {
            Some(Value::Object(map)) => map,
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            _ => Map::new(),
        }
    }

    fn normalize_at(&self, value: &Context, depth: usize) -> Option<Value> {
        match value {
            Context::Null => Some(Value::Null),
            Context::Bool(b) => Some(Value::Bool(*b)),
            Context::Int(i) => Some(Value::Number((*i).into())),
            Context::UInt(u) => Some(Value::Number((*u).into())),
            Context::Float(f) => Number::from_f64(*f).map(Value::Number),
            Context::Str(s) => Some(Value::String(s.clone())),
            Context::Map(entries) => {
                if depth >= self.max_depth {
                    return None;
                }
                let mut map = Map::new();
                for (key, entry) in entries {
                    if let Some(v) = self.normalize_at(entry, depth + 1) {
                        map.insert(key.clone(), v);
                    }
                }
                Some(Value::Object(map))
            }
            Context::Seq(items) => {
                if depth >= self.max_depth {
                    return None;
                }
                Some(Value::Array(
                    items
                        .iter()
                        .filter_map(|item| self.normalize_at(item, depth + 1))
                        .collect(),
                ))
            }
            Context::Object(object) => {
                if depth >= self.max_depth {
                    return None;
                }
                let object: &(dyn Any + Send + Sync) = &**object;
                self.extensions
                    .iter()
                    .find_map(|extension| extension.attempt(object))
                    .and_then(|reduced| self.normalize_at(&reduced, depth + 1))
            }
        }
    }
}

/// One sanitizer shared by a router and every logger it creates, so that
/// extension changes reach all of them at once.
///
/// Readers take a snapshot and sanitize without holding the lock.
#[derive(Debug, Clone, Default)]
pub struct SharedSanitizer {
    current: Arc<RwLock<Arc<Sanitizer>>>,
}

impl SharedSanitizer {
    pub fn new(sanitizer: Sanitizer) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(sanitizer))),
        }
    }

    pub fn snapshot(&self) -> Arc<Sanitizer> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*current)
    }

    /// Modify the sanitizer in place for every holder.
    pub fn update(&self, change: impl FnOnce(&mut Sanitizer)) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        change(Arc::make_mut(&mut *current));
    }

    pub fn replace(&self, sanitizer: Sanitizer) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(sanitizer);
    }

    pub fn context(&self, value: &Context) -> Map<String, Value> {
        self.snapshot().context(value)
    }
}
