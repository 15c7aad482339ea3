//! Global keyboard shortcuts.
//!
//! A [`KeyDispatcher`] is the one place key presses arrive. Views bind
//! shortcuts with [`KeyBinder::bind`]; the returned guard owns exactly one
//! listener and removes it, by the id it was registered with, when dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// A key press, identified by its key name ("Escape", "Enter", "a", ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    name: String,
}

impl KeyEvent {
    pub const ESCAPE: &'static str = "Escape";
    pub const ENTER: &'static str = "Enter";
    pub const TAB: &'static str = "Tab";
    pub const BACKSPACE: &'static str = "Backspace";
    pub const ARROW_UP: &'static str = "ArrowUp";
    pub const ARROW_DOWN: &'static str = "ArrowDown";
    pub const ARROW_LEFT: &'static str = "ArrowLeft";
    pub const ARROW_RIGHT: &'static str = "ArrowRight";
    pub const SPACE: &'static str = "Space";

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key names compare case-insensitively
    pub fn matches(&self, key_name: &str) -> bool {
        self.name.to_lowercase() == key_name.to_lowercase()
    }
}

type Callback = Arc<dyn Fn() + Send + Sync>;

struct Listener {
    id: u64,
    key_name: String,
    on_trigger: Callback,
}

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<Listener>>,
}

impl Registry {
    fn listeners(&self) -> MutexGuard<'_, Vec<Listener>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn add(&self, key_name: String, on_trigger: Callback) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        trace!(id, key = %key_name, "Key listener added");
        self.listeners().push(Listener { id, key_name, on_trigger });
        id
    }

    fn remove(&self, id: u64) -> bool {
        let mut listeners = self.listeners();
        let before = listeners.len();
        listeners.retain(|listener| listener.id != id);
        let removed = listeners.len() != before;
        trace!(id, removed, "Key listener removed");
        removed
    }
}

/// Shared entry point for key presses; clones share one registry
#[derive(Clone, Default)]
pub struct KeyDispatcher {
    registry: Arc<Registry>,
}

impl KeyDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every listener bound to this key; returns how many fired.
    ///
    /// Callbacks run after the registry lock is released, so a callback may
    /// bind or drop binders.
    pub fn dispatch(&self, event: &KeyEvent) -> usize {
        let matching: Vec<Callback> = self
            .registry
            .listeners()
            .iter()
            .filter(|listener| event.matches(&listener.key_name))
            .map(|listener| Arc::clone(&listener.on_trigger))
            .collect();

        for on_trigger in &matching {
            on_trigger();
        }
        matching.len()
    }

    pub fn listener_count(&self) -> usize {
        self.registry.listeners().len()
    }
}

/// One active shortcut. Dropping it unregisters the listener.
pub struct KeyBinder {
    registry: Arc<Registry>,
    key_name: String,
    id: u64,
}

impl KeyBinder {
    pub fn bind(dispatcher: &KeyDispatcher, key_name: &str, on_trigger: impl Fn() + Send + Sync + 'static) -> Self {
        let registry = Arc::clone(&dispatcher.registry);
        let id = registry.add(key_name.to_string(), Arc::new(on_trigger));
        Self {
            registry,
            key_name: key_name.to_string(),
            id,
        }
    }

    /// Swap key and callback; the old listener is gone before the new one is added
    pub fn rebind(&mut self, key_name: &str, on_trigger: impl Fn() + Send + Sync + 'static) {
        self.registry.remove(self.id);
        self.id = self.registry.add(key_name.to_string(), Arc::new(on_trigger));
        self.key_name = key_name.to_string();
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }
}

impl Drop for KeyBinder {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&count);
        (count, move || {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let dispatcher = KeyDispatcher::new();
        let (count, on_trigger) = counter();
        let _binder = KeyBinder::bind(&dispatcher, "escape", on_trigger);

        assert_eq!(dispatcher.dispatch(&KeyEvent::new("Escape")), 1);
        assert_eq!(dispatcher.dispatch(&KeyEvent::new("ESCAPE")), 1);
        assert_eq!(dispatcher.dispatch(&KeyEvent::new("Enter")), 0);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_drop_unregisters() {
        let dispatcher = KeyDispatcher::new();
        let (count, on_trigger) = counter();
        {
            let _binder = KeyBinder::bind(&dispatcher, KeyEvent::ESCAPE, on_trigger);
            assert_eq!(dispatcher.listener_count(), 1);
        }

        assert_eq!(dispatcher.listener_count(), 0);
        dispatcher.dispatch(&KeyEvent::new(KeyEvent::ESCAPE));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_rebind_replaces_listener() {
        let dispatcher = KeyDispatcher::new();
        let (old_count, old_trigger) = counter();
        let (new_count, new_trigger) = counter();

        let mut binder = KeyBinder::bind(&dispatcher, KeyEvent::ENTER, old_trigger);
        binder.rebind(KeyEvent::ESCAPE, new_trigger);
        assert_eq!(dispatcher.listener_count(), 1);
        assert_eq!(binder.key_name(), KeyEvent::ESCAPE);

        dispatcher.dispatch(&KeyEvent::new(KeyEvent::ENTER));
        dispatcher.dispatch(&KeyEvent::new(KeyEvent::ESCAPE));
        assert_eq!(old_count.load(Ordering::SeqCst), 0);
        assert_eq!(new_count.load(Ordering::SeqCst), 1);

        drop(binder);
        assert_eq!(dispatcher.listener_count(), 0);
    }

    #[test]
    fn test_binders_are_independent() {
        let dispatcher = KeyDispatcher::new();
        let (first_count, first) = counter();
        let (second_count, second) = counter();

        let first_binder = KeyBinder::bind(&dispatcher, KeyEvent::ESCAPE, first);
        let _second_binder = KeyBinder::bind(&dispatcher, KeyEvent::ESCAPE, second);
        assert_eq!(dispatcher.dispatch(&KeyEvent::new(KeyEvent::ESCAPE)), 2);

        drop(first_binder);
        assert_eq!(dispatcher.dispatch(&KeyEvent::new(KeyEvent::ESCAPE)), 1);
        assert_eq!(first_count.load(Ordering::SeqCst), 1);
        assert_eq!(second_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_callback_may_touch_registry() {
        let dispatcher = KeyDispatcher::new();
        let inner = dispatcher.clone();
        let _binder = KeyBinder::bind(&dispatcher, "a", move || {
            // Would deadlock if callbacks ran under the registry lock
            let _ = inner.listener_count();
        });
        assert_eq!(dispatcher.dispatch(&KeyEvent::new("A")), 1);
    }
}
