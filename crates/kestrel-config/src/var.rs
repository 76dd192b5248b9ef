//! Config variables: named, typed cells with change listeners.
//!
//! [`ConfigVar<T>`] is the typed handle callers hold. The registry stores
//! every variable behind the object-safe [`ConfigVarBase`] and recovers the
//! typed handle with a checked downcast.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};

use crate::codec::ConfigValue;

/// Change callback, invoked with `(old, new)`.
pub type Listener<T> = Arc<dyn Fn(&T, &T) + Send + Sync>;

// ---------------------------------------------------------------------------
// Untyped interface
// ---------------------------------------------------------------------------

/// Type-erased view of a [`ConfigVar`].
pub trait ConfigVarBase: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    /// [`ConfigValue::type_name`] of the stored type.
    fn type_name(&self) -> &'static str;

    /// Current value in textual form; empty when encoding fails.
    fn to_string(&self) -> String;

    /// Parse `text` and store the result. Returns `false`, leaving the value
    /// unchanged, when `text` does not decode.
    fn from_string(&self, text: &str) -> bool;

    #[doc(hidden)]
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl fmt::Debug for dyn ConfigVarBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigVar")
            .field("name", &self.name())
            .field("type", &self.type_name())
            .field("value", &self.to_string())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Typed variable
// ---------------------------------------------------------------------------

/// A named, typed, mutable configuration value.
pub struct ConfigVar<T: ConfigValue> {
    name: String,
    description: String,
    value: RwLock<T>,
    listeners: RwLock<BTreeMap<u64, Listener<T>>>,
    // Serialises set_value across threads; re-entrant so listeners can write.
    update: ReentrantMutex<()>,
    // Bumped on every commit.
    version: AtomicU64,
}

impl<T: ConfigValue> ConfigVar<T> {
    /// Build a variable outside a registry. `name` is stored as given; use
    /// [`Registry::lookup_or_create`](crate::Registry::lookup_or_create) for
    /// validated, shared variables.
    pub fn new(name: impl Into<String>, default_value: T, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            value: RwLock::new(default_value),
            listeners: RwLock::new(BTreeMap::new()),
            update: ReentrantMutex::new(()),
            version: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn get_value(&self) -> T {
        self.value.read().clone()
    }

    /// Store `new_value`.
    ///
    /// Values that are [`same_value`](ConfigValue::same_value) as the
    /// current one are a no-op. Otherwise every listener runs in id order
    /// with `(old, new)` while [`get_value`](Self::get_value) still returns
    /// the old value, then the new value is committed. A panicking listener is
    /// logged and the remaining listeners still run.
    ///
    /// A listener may call `set_value` on the same variable. That nested
    /// write is committed first and wins: the outer `new_value` is dropped.
    pub fn set_value(&self, new_value: T) {
        let _update = self.update.lock();
        let old_value = self.value.read().clone();
        if old_value.same_value(&new_value) {
            return;
        }
        let version = self.version.load(Ordering::Acquire);

        let listeners: Vec<(u64, Listener<T>)> = self
            .listeners
            .read()
            .iter()
            .map(|(id, cb)| (*id, Arc::clone(cb)))
            .collect();
        for (id, cb) in listeners {
            let outcome = catch_unwind(AssertUnwindSafe(|| cb(&old_value, &new_value)));
            if outcome.is_err() {
                tracing::error!(name = %self.name, listener = id, "config listener panicked");
            }
        }

        if self.version.load(Ordering::Acquire) != version {
            tracing::debug!(name = %self.name, "config value rewritten by a listener");
            return;
        }
        *self.value.write() = new_value;
        self.version.fetch_add(1, Ordering::AcqRel);
    }

    /// Register `cb` under `id`, replacing any listener already using it.
    pub fn add_listener<F>(&self, id: u64, cb: F)
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        self.listeners.write().insert(id, Arc::new(cb));
    }

    pub fn del_listener(&self, id: u64) {
        self.listeners.write().remove(&id);
    }

    pub fn get_listener(&self, id: u64) -> Option<Listener<T>> {
        self.listeners.read().get(&id).cloned()
    }

    pub fn clear_listeners(&self) {
        self.listeners.write().clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Current value in textual form; empty when encoding fails.
    pub fn to_string(&self) -> String {
        let value = self.value.read();
        match value.encode() {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(name = %self.name, error = %err, "config value does not encode");
                String::new()
            }
        }
    }

    /// Parse `text` and [`set_value`](Self::set_value) the result.
    pub fn from_string(&self, text: &str) -> bool {
        match T::decode(text) {
            Ok(value) => {
                self.set_value(value);
                true
            }
            Err(err) => {
                tracing::error!(name = %self.name, error = %err, "config value does not decode");
                false
            }
        }
    }
}

impl<T: ConfigValue> ConfigVarBase for ConfigVar<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn type_name(&self) -> &'static str {
        T::type_name()
    }

    fn to_string(&self) -> String {
        ConfigVar::to_string(self)
    }

    fn from_string(&self, text: &str) -> bool {
        ConfigVar::from_string(self, text)
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl<T: ConfigValue + fmt::Debug> fmt::Debug for ConfigVar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigVar")
            .field("name", &self.name)
            .field("value", &*self.value.read())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
