//! The uniform engine contract.

use crate::SubscriptionId;

/// Contract shared by every pattern engine.
///
/// Actions are the engine's own `&mut self` methods; this trait covers the
/// parts every engine has in common so view-layer adapters can be written
/// once.
pub trait Pattern {
    /// Immutable state snapshot type.
    type State;

    /// Current snapshot.
    fn state(&self) -> &Self::State;

    /// Register a listener called with every new snapshot.
    fn subscribe(&mut self, listener: Box<dyn FnMut(&Self::State) + Send>) -> SubscriptionId;

    /// Remove exactly the listener registered under `id`.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;

    /// Release timers, listeners and composed behaviors.
    ///
    /// Idempotent. No listener is notified after this returns, and later
    /// actions are no-ops.
    fn destroy(&mut self);

    /// Whether [`Pattern::destroy`] has been called.
    fn is_destroyed(&self) -> bool;
}
