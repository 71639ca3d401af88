//! Reactive state container.
//!
//! A [`Store`] owns one immutable snapshot of some state `S`. Every mutation
//! builds the next snapshot and replaces the current one wholesale, then
//! notifies subscribers with the new snapshot. Subscribers never observe a
//! partially updated value.
//!
//! Listeners are notified only when the snapshot actually changed, so an
//! action that turns out to be a no-op is silent.

use std::fmt;

/// Handle identifying one registered listener.
///
/// Returned by [`Store::subscribe`] and [`crate::EventBus::on`]; pass it back
/// to unsubscribe exactly that listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw numeric value of this handle.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Allocator for listener handles, shared by stores and event buses.
#[derive(Debug, Default, Clone)]
pub(crate) struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub(crate) fn next(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next += 1;
        id
    }
}

/// Boxed state-change listener.
pub type Listener<S> = Box<dyn FnMut(&S) + Send>;

/// Immutable-snapshot state container with change subscriptions.
pub struct Store<S> {
    state: S,
    listeners: Vec<(SubscriptionId, Listener<S>)>,
    ids: IdAllocator,
    destroyed: bool,
}

impl<S: fmt::Debug> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl<S> Store<S>
where
    S: Clone + PartialEq,
{
    /// Create a store holding `initial`.
    pub fn new(initial: S) -> Self {
        Self { state: initial, listeners: Vec::new(), ids: IdAllocator::default(), destroyed: false }
    }

    /// Current snapshot.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Register a listener called with every new snapshot.
    ///
    /// Subscribing to a destroyed store returns a handle that is never
    /// notified.
    pub fn subscribe(&mut self, listener: impl FnMut(&S) + Send + 'static) -> SubscriptionId {
        let id = self.ids.next();
        if !self.destroyed {
            self.listeners.push((id, Box::new(listener)));
        }
        id
    }

    /// Remove the listener registered under `id`.
    ///
    /// Returns `false` if no such listener exists.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Build the next snapshot from a draft copy of the current one.
    ///
    /// The draft replaces the current snapshot only once `f` returns, and
    /// listeners run only if the result differs from the previous snapshot.
    /// Returns `true` if the state changed.
    pub fn update(&mut self, f: impl FnOnce(&mut S)) -> bool {
        if self.destroyed {
            return false;
        }
        let mut draft = self.state.clone();
        f(&mut draft);
        self.replace(draft)
    }

    /// Replace the snapshot with `next`.
    ///
    /// Returns `true` if the state changed.
    pub fn replace(&mut self, next: S) -> bool {
        if self.destroyed || next == self.state {
            return false;
        }
        self.state = next;
        self.notify();
        true
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Drop every listener and stop accepting updates.
    ///
    /// Idempotent. The last snapshot stays readable.
    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.listeners.clear();
    }

    /// Whether [`Store::destroy`] has been called.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn notify(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener(&self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl FnMut(&u32) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |value: &u32| {
            if let Ok(mut seen) = sink.lock() {
                seen.push(*value);
            }
        })
    }

    fn recorded(seen: &Arc<Mutex<Vec<u32>>>) -> Vec<u32> {
        seen.lock().map(|v| v.clone()).unwrap_or_default()
    }

    #[test]
    fn update_notifies_with_new_snapshot() {
        let mut store = Store::new(1_u32);
        let (seen, listener) = recorder();
        store.subscribe(listener);

        assert!(store.update(|s| *s += 1));
        assert_eq!(*store.state(), 2);
        assert_eq!(recorded(&seen), vec![2]);
    }

    #[test]
    fn unchanged_update_is_silent() {
        let mut store = Store::new(7_u32);
        let (seen, listener) = recorder();
        store.subscribe(listener);

        assert!(!store.update(|_| {}));
        assert!(recorded(&seen).is_empty());
    }

    #[test]
    fn unsubscribe_removes_exactly_one_listener() {
        let mut store = Store::new(0_u32);
        let (first_seen, first) = recorder();
        let (second_seen, second) = recorder();
        let first_id = store.subscribe(first);
        store.subscribe(second);

        assert!(store.unsubscribe(first_id));
        assert!(!store.unsubscribe(first_id));
        store.replace(5);

        assert!(recorded(&first_seen).is_empty());
        assert_eq!(recorded(&second_seen), vec![5]);
    }

    #[test]
    fn destroy_stops_notifications_and_updates() {
        let mut store = Store::new(0_u32);
        let (seen, listener) = recorder();
        store.subscribe(listener);

        store.destroy();
        store.destroy();

        assert!(!store.update(|s| *s = 9));
        assert_eq!(*store.state(), 0);
        assert!(recorded(&seen).is_empty());
        assert_eq!(store.listener_count(), 0);
    }
}
