//! Caller context carried alongside submitted work.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

/// Opaque, non-cancelable context handed to every unit of work.
///
/// A context carries:
/// - A short id used to correlate log lines
/// - The instant it was created
/// - Custom key-value storage for host data
///
/// Cloning is cheap; all clones share the same storage.
#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

struct Inner {
    id: String,
    created_at: Instant,
    values: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl Context {
    /// Create a context with a generated id and no values.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a context builder for more control.
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    /// Short id for logging.
    #[inline]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Get a stored value by key.
    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.inner
            .values
            .get(key)
            .and_then(|v| v.downcast_ref::<T>())
    }

    /// Returns true if a value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.values.contains_key(key)
    }

    /// Time since the context was created.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.inner.created_at.elapsed()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.inner.values.keys().map(String::as_str).collect();
        keys.sort_unstable();

        f.debug_struct("Context")
            .field("id", &self.inner.id)
            .field("keys", &keys)
            .finish()
    }
}

/// Builder for creating a [`Context`].
pub struct ContextBuilder {
    id: Option<String>,
    values: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl ContextBuilder {
    fn new() -> Self {
        Self {
            id: None,
            values: HashMap::new(),
        }
    }

    /// Use an explicit id instead of a generated one.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Store a value under `key`, replacing any previous value.
    pub fn value<T: Send + Sync + 'static>(mut self, key: impl Into<String>, value: T) -> Self {
        self.values.insert(key.into(), Box::new(value));
        self
    }

    /// Build the context.
    pub fn build(self) -> Context {
        Context {
            inner: Arc::new(Inner {
                id: self.id.unwrap_or_else(generate_id),
                created_at: Instant::now(),
                values: self.values,
            }),
        }
    }
}

/// 12 hex chars of a random v4 uuid.
fn generate_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(12);
    id
}
