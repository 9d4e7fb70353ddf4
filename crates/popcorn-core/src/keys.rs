//! Keyboard shortcuts.
//!
//! The host owns the real key-press primitive and exposes it through
//! [`KeyHost`]. A [`KeyDispatcher`] is one call site holding at most one active
//! binding; rebinding always disposes the previous listener first.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, trace};

/// Named key, compared case-insensitively ("Escape" == "escape").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyName(String);

impl KeyName {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_ascii_lowercase())
    }

    pub fn escape() -> Self {
        Self::new("escape")
    }

    pub fn enter() -> Self {
        Self::new("enter")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for KeyName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Interactive element that can hold focus and consume keys itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusTarget {
    SearchField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type KeyListener = Arc<dyn Fn() + Send + Sync>;
pub type KeyAction = Arc<dyn Fn() + Send + Sync>;

/// Host capability for subscribing to named key presses.
pub trait KeyHost: Send + Sync {
    fn subscribe(&self, key: &KeyName, listener: KeyListener) -> ListenerId;
    fn unsubscribe(&self, id: ListenerId);
    fn focused(&self) -> Option<FocusTarget>;
}

/// A key plus the action it triggers.
#[derive(Clone)]
pub struct KeyBinding {
    key: KeyName,
    action: KeyAction,
    yield_to: Option<FocusTarget>,
}

impl KeyBinding {
    pub fn new(key: impl Into<KeyName>, action: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            key: key.into(),
            action: Arc::new(action),
            yield_to: None,
        }
    }

    /// Skip the action while `target` has focus, leaving the key to it.
    pub fn unless_focused(mut self, target: FocusTarget) -> Self {
        self.yield_to = Some(target);
        self
    }

    pub fn key(&self) -> &KeyName {
        &self.key
    }
}

/// Removes a listener when disposed or dropped.
pub struct Disposer {
    host: Weak<dyn KeyHost>,
    id: Option<ListenerId>,
    key: KeyName,
}

impl Disposer {
    pub fn dispose(mut self) {
        self.release();
    }

    pub fn key(&self) -> &KeyName {
        &self.key
    }

    fn release(&mut self) {
        if let Some(id) = self.id.take() {
            if let Some(host) = self.host.upgrade() {
                host.unsubscribe(id);
                trace!(key = %self.key, "Key listener removed");
            }
        }
    }
}

impl Drop for Disposer {
    fn drop(&mut self) {
        self.release();
    }
}

/// Install `binding` on `host`.
pub fn bind(host: &Arc<dyn KeyHost>, binding: KeyBinding) -> Disposer {
    let weak_host = Arc::downgrade(host);
    let focus_host = weak_host.clone();
    let KeyBinding { key, action, yield_to } = binding;
    let listener_key = key.clone();

    let listener: KeyListener = Arc::new(move || {
        if let (Some(target), Some(host)) = (yield_to, focus_host.upgrade()) {
            if host.focused() == Some(target) {
                trace!(key = %listener_key, ?target, "Key left to focused element");
                return;
            }
        }
        action();
    });

    let id = host.subscribe(&key, listener);
    Disposer {
        host: weak_host,
        id: Some(id),
        key,
    }
}

/// One call site with a single active binding.
pub struct KeyDispatcher {
    host: Arc<dyn KeyHost>,
    active: Option<Disposer>,
}

impl KeyDispatcher {
    pub fn new(host: Arc<dyn KeyHost>) -> Self {
        Self { host, active: None }
    }

    /// Replace the active binding. The old listener is removed before the new
    /// one is installed.
    pub fn rebind(&mut self, binding: KeyBinding) {
        if let Some(previous) = self.active.take() {
            previous.dispose();
        }
        debug!(key = %binding.key(), "Binding shortcut");
        self.active = Some(bind(&self.host, binding));
    }

    pub fn unbind(&mut self) {
        if let Some(previous) = self.active.take() {
            previous.dispose();
        }
    }

    pub fn is_bound(&self) -> bool {
        self.active.is_some()
    }

    pub fn bound_key(&self) -> Option<&KeyName> {
        self.active.as_ref().map(Disposer::key)
    }
}

#[derive(Default)]
struct Registry {
    listeners: HashMap<ListenerId, (KeyName, KeyListener)>,
    focused: Option<FocusTarget>,
}

/// In-process key host. Presses are delivered synchronously.
#[derive(Default)]
pub struct MemoryKeyHost {
    next_id: AtomicU64,
    registry: Mutex<Registry>,
}

impl MemoryKeyHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self, target: Option<FocusTarget>) {
        if let Ok(mut registry) = self.registry.lock() {
            registry.focused = target;
        }
    }

    /// Deliver a key press; returns how many listeners were notified.
    pub fn press(&self, key: impl Into<KeyName>) -> usize {
        let key = key.into();
        // Listeners may unsubscribe while running, so call them outside the lock
        let listeners: Vec<KeyListener> = match self.registry.lock() {
            Ok(registry) => registry
                .listeners
                .values()
                .filter(|(bound, _)| *bound == key)
                .map(|(_, listener)| Arc::clone(listener))
                .collect(),
            Err(_) => return 0,
        };

        for listener in &listeners {
            listener();
        }
        listeners.len()
    }

    pub fn listener_count(&self, key: impl Into<KeyName>) -> usize {
        let key = key.into();
        self.registry
            .lock()
            .map(|registry| registry.listeners.values().filter(|(bound, _)| *bound == key).count())
            .unwrap_or(0)
    }
}

impl KeyHost for MemoryKeyHost {
    fn subscribe(&self, key: &KeyName, listener: KeyListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut registry) = self.registry.lock() {
            registry.listeners.insert(id, (key.clone(), listener));
        }
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        if let Ok(mut registry) = self.registry.lock() {
            registry.listeners.remove(&id);
        }
    }

    fn focused(&self) -> Option<FocusTarget> {
        self.registry.lock().ok().and_then(|registry| registry.focused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn host() -> (Arc<MemoryKeyHost>, Arc<dyn KeyHost>) {
        let memory = Arc::new(MemoryKeyHost::new());
        let host: Arc<dyn KeyHost> = memory.clone();
        (memory, host)
    }

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&count);
        (count, move || {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_key_names_are_case_insensitive() {
        assert_eq!(KeyName::new("Escape"), KeyName::escape());
        assert_eq!(KeyName::from(" Enter "), KeyName::enter());
    }

    #[test]
    fn test_bind_invokes_action_until_disposed() {
        let (memory, host) = host();
        let (count, action) = counter();

        let disposer = bind(&host, KeyBinding::new("escape", action));
        memory.press("Escape");
        assert_eq!(count.load(Ordering::SeqCst), 1);

        disposer.dispose();
        assert_eq!(memory.press("escape"), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropping_disposer_unsubscribes() {
        let (memory, host) = host();
        let (_count, action) = counter();
        {
            let _disposer = bind(&host, KeyBinding::new("enter", action));
            assert_eq!(memory.listener_count("enter"), 1);
        }
        assert_eq!(memory.listener_count("enter"), 0);
    }

    #[test]
    fn test_rebind_never_accumulates_listeners() {
        let (memory, host) = host();
        let mut dispatcher = KeyDispatcher::new(host);

        for _ in 0..5 {
            let (_count, action) = counter();
            dispatcher.rebind(KeyBinding::new("escape", action));
        }
        assert_eq!(memory.listener_count("escape"), 1);

        let (count, action) = counter();
        dispatcher.rebind(KeyBinding::new("enter", action));
        assert_eq!(memory.listener_count("escape"), 0);
        assert_eq!(memory.listener_count("enter"), 1);
        assert_eq!(dispatcher.bound_key(), Some(&KeyName::enter()));

        memory.press("enter");
        assert_eq!(count.load(Ordering::SeqCst), 1);

        dispatcher.unbind();
        assert!(!dispatcher.is_bound());
        assert_eq!(memory.listener_count("enter"), 0);
    }

    #[test]
    fn test_action_skipped_while_guarded_target_focused() {
        let (memory, host) = host();
        let (count, action) = counter();
        let _disposer = bind(
            &host,
            KeyBinding::new("enter", action).unless_focused(FocusTarget::SearchField),
        );

        memory.focus(Some(FocusTarget::SearchField));
        memory.press("enter");
        assert_eq!(count.load(Ordering::SeqCst), 0);

        memory.focus(None);
        memory.press("enter");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_action_may_dispose_itself() {
        let (memory, host) = host();
        let slot: Arc<Mutex<Option<Disposer>>> = Arc::new(Mutex::new(None));
        let inner = Arc::clone(&slot);
        let disposer = bind(
            &host,
            KeyBinding::new("escape", move || {
                inner.lock().unwrap().take();
            }),
        );
        *slot.lock().unwrap() = Some(disposer);

        assert_eq!(memory.press("escape"), 1);
        assert_eq!(memory.listener_count("escape"), 0);
    }
}
