//! Reactive formatting scope.
//!
//! A [`ReactiveScope`] holds the current localization file, a scope-level
//! variable map and function set, and a memo table of formatted values keyed
//! by message name and optional attribute. Handles for the same key share
//! one slot: one computation, one most-recent value. Any input change
//! (file swap, variable write, function registration) bumps the scope
//! version, recomputes live slots from the newest combined snapshot and
//! re-emits to subscribers; a recomputation that loses the race against a
//! newer change is discarded, so concurrent changes coalesce to the latest
//! snapshot.
//!
//! The memo table's mutex is the only lock the library takes anywhere.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use tracing::warn;

use ftl_eval::{ContextBuilder, FluentFunction};
use ftl_par::Expression;
use ftl_util::FxHashMap;

use crate::file::LocalizationFile;

/// A scope of reactive formatted values over one current file.
#[derive(Clone)]
pub struct ReactiveScope {
    inner: Arc<ScopeInner>,
}

struct ScopeInner {
    file: RwLock<Option<Arc<LocalizationFile>>>,
    variables: RwLock<FxHashMap<String, Expression>>,
    functions: RwLock<Vec<Arc<FluentFunction>>>,
    /// Monotonic input-change counter; slot values are stamped with it.
    version: AtomicU64,
    /// Shared formatted-value slots, keyed by name + optional attribute.
    memo: Mutex<FxHashMap<SlotKey, Arc<Slot>>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SlotKey {
    name: String,
    attribute: Option<String>,
}

impl SlotKey {
    fn placeholder(&self) -> String {
        match &self.attribute {
            None => format!("<{}>", self.name),
            Some(attribute) => format!("<{}.{attribute}>", self.name),
        }
    }
}

struct Slot {
    key: SlotKey,
    state: Mutex<SlotState>,
}

#[derive(Default)]
struct SlotState {
    version: u64,
    value: Option<String>,
    subscribers: Vec<Sender<String>>,
}

impl ReactiveScope {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                file: RwLock::new(None),
                variables: RwLock::new(FxHashMap::default()),
                functions: RwLock::new(Vec::new()),
                version: AtomicU64::new(0),
                memo: Mutex::new(FxHashMap::default()),
            }),
        }
    }

    /// Swaps the active file (e.g. on a locale change) and re-emits every
    /// live formatted value.
    pub fn set_file(&self, file: LocalizationFile) {
        self.set_shared_file(Arc::new(file));
    }

    pub fn set_shared_file(&self, file: Arc<LocalizationFile>) {
        *self.inner.file.write() = Some(file);
        self.refresh();
    }

    /// Binds a string variable and re-emits dependent values.
    pub fn set_string(&self, name: impl Into<String>, value: impl Into<String>) {
        self.set_expression(name, Expression::string(value));
    }

    pub fn set_integer(&self, name: impl Into<String>, value: i64) {
        self.set_expression(name, Expression::integer(value));
    }

    pub fn set_float(&self, name: impl Into<String>, value: f64) {
        self.set_expression(name, Expression::float(value));
    }

    pub fn set_expression(&self, name: impl Into<String>, expression: Expression) {
        self.inner.variables.write().insert(name.into(), expression);
        self.refresh();
    }

    /// Registers a scope-level function available to every formatted value.
    pub fn register_function(&self, function: FluentFunction) {
        self.inner.functions.write().push(Arc::new(function));
        self.refresh();
    }

    /// The reactive handle for a message. Handles for the same key share
    /// one computation and its most recent value.
    pub fn formatted(&self, name: impl Into<String>) -> FormattedValue {
        self.slot(SlotKey {
            name: name.into(),
            attribute: None,
        })
    }

    /// The reactive handle for an attribute of a message.
    pub fn formatted_attr(
        &self,
        name: impl Into<String>,
        attribute: impl Into<String>,
    ) -> FormattedValue {
        self.slot(SlotKey {
            name: name.into(),
            attribute: Some(attribute.into()),
        })
    }

    fn slot(&self, key: SlotKey) -> FormattedValue {
        let mut memo = self.inner.memo.lock();
        let slot = memo
            .entry(key.clone())
            .or_insert_with(|| {
                Arc::new(Slot {
                    key,
                    state: Mutex::new(SlotState::default()),
                })
            })
            .clone();
        FormattedValue {
            scope: Arc::clone(&self.inner),
            slot,
        }
    }

    /// Bumps the version and recomputes every live slot from the newest
    /// combined snapshot.
    fn refresh(&self) {
        let version = self.inner.version.fetch_add(1, Ordering::SeqCst) + 1;
        let slots: Vec<Arc<Slot>> = self.inner.memo.lock().values().cloned().collect();
        for slot in slots {
            recompute(&self.inner, &slot, version);
        }
    }
}

impl Default for ReactiveScope {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats a slot against the scope's current file, variables and
/// functions. Errors degrade to the missing-entry placeholder rather than
/// tearing the subscription down.
fn compute(inner: &ScopeInner, key: &SlotKey) -> String {
    let Some(file) = inner.file.read().clone() else {
        return key.placeholder();
    };
    let variables = inner.variables.read().clone();
    let functions = inner.functions.read().clone();
    let configure = |builder: &mut ContextBuilder| {
        for (name, expression) in &variables {
            builder.expression(name.clone(), expression.clone());
        }
        for function in &functions {
            builder.shared_function(Arc::clone(function));
        }
    };
    let result = match &key.attribute {
        None => file.format(&key.name, configure),
        Some(attribute) => file.format_attr(&key.name, attribute, configure),
    };
    match result {
        Ok(value) => value,
        Err(error) => {
            warn!(name = %key.name, %error, "reactive formatting failed");
            key.placeholder()
        }
    }
}

fn recompute(inner: &ScopeInner, slot: &Slot, version: u64) {
    let value = compute(inner, &slot.key);
    let mut state = slot.state.lock();
    if state.version > version {
        // A newer snapshot already landed; drop this computation.
        return;
    }
    state.version = version;
    state.value = Some(value.clone());
    state
        .subscribers
        .retain(|sender| sender.send(value.clone()).is_ok());
}

/// A shared handle to one reactively formatted value.
#[derive(Clone)]
pub struct FormattedValue {
    scope: Arc<ScopeInner>,
    slot: Arc<Slot>,
}

impl FormattedValue {
    /// The formatted value for the newest input snapshot, recomputing if an
    /// input changed since the cached value was produced.
    pub fn latest(&self) -> String {
        let version = self.scope.version.load(Ordering::SeqCst);
        {
            let state = self.slot.state.lock();
            if state.version == version {
                if let Some(value) = &state.value {
                    return value.clone();
                }
            }
        }
        let value = compute(&self.scope, &self.slot.key);
        let mut state = self.slot.state.lock();
        if state.version <= version {
            state.version = version;
            state.value = Some(value.clone());
        }
        value
    }

    /// Subscribes to re-emissions. The current value is delivered first;
    /// afterwards every input change delivers the latest formatted value.
    pub fn subscribe(&self) -> Receiver<String> {
        let (sender, receiver) = unbounded();
        let current = self.latest();
        let _ = sender.send(current);
        self.slot.state.lock().subscribers.push(sender);
        receiver
    }

    /// True if both handles share the same underlying slot (same key within
    /// the same scope).
    pub fn shares_computation(&self, other: &FormattedValue) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope_with(source: &str) -> ReactiveScope {
        let scope = ReactiveScope::new();
        scope.set_file(LocalizationFile::parse(source).unwrap());
        scope
    }

    #[test]
    fn test_placeholder_before_any_file() {
        let scope = ReactiveScope::new();
        assert_eq!(scope.formatted("greeting").latest(), "<greeting>");
        assert_eq!(
            scope.formatted_attr("m", "title").latest(),
            "<m.title>"
        );
    }

    #[test]
    fn test_variable_change_reemits() {
        let scope = scope_with("greeting = Hello {$who}!\n");
        scope.set_string("who", "fox");
        let value = scope.formatted("greeting");
        let updates = value.subscribe();
        assert_eq!(updates.recv().unwrap(), "Hello fox!");

        scope.set_string("who", "wolf");
        assert_eq!(updates.recv().unwrap(), "Hello wolf!");
        assert_eq!(value.latest(), "Hello wolf!");
    }

    #[test]
    fn test_file_swap_reemits() {
        let scope = scope_with("greeting = Hello!\n");
        let updates = scope.formatted("greeting").subscribe();
        assert_eq!(updates.recv().unwrap(), "Hello!");

        scope.set_file(LocalizationFile::parse("greeting = Hallo!\n").unwrap());
        assert_eq!(updates.recv().unwrap(), "Hallo!");
    }

    #[test]
    fn test_identical_subscriptions_share_a_slot() {
        let scope = scope_with("m = x\n");
        let a = scope.formatted("m");
        let b = scope.formatted("m");
        let c = scope.formatted_attr("m", "title");
        assert!(a.shares_computation(&b));
        assert!(!a.shares_computation(&c));
    }

    #[test]
    fn test_errors_degrade_to_placeholder() {
        let scope = scope_with("a = {b}\nb = {a}\nm = {a}\n");
        assert_eq!(scope.formatted("m").latest(), "<m>");
    }

    #[test]
    fn test_latest_is_lazy_for_unsubscribed_handles() {
        let scope = scope_with("m = {$n}\n");
        let value = scope.formatted("m");
        scope.set_integer("n", 1);
        assert_eq!(value.latest(), "1");
        scope.set_integer("n", 2);
        assert_eq!(value.latest(), "2");
    }
}
