//! Typed publish/subscribe channel.
//!
//! Engines use an [`EventBus`] for discrete occurrences (a modal opened, a
//! breakpoint changed) that are distinct from full-state change
//! notifications. Past events are not retained: a handler registered after
//! an emit never sees it.

use std::fmt;

use crate::store::{IdAllocator, SubscriptionId};

/// An event that can travel over an [`EventBus`].
pub trait BusEvent: fmt::Debug {
    /// Stable event name, for example `"item:focused"`.
    fn kind(&self) -> &'static str;
}

/// Boxed event handler.
pub type Handler<E> = Box<dyn FnMut(&E) + Send>;

struct Registration<E> {
    id: SubscriptionId,
    /// `None` subscribes to every event kind.
    kind: Option<&'static str>,
    handler: Handler<E>,
}

/// Typed event emitter.
pub struct EventBus<E> {
    handlers: Vec<Registration<E>>,
    ids: IdAllocator,
    closed: bool,
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handlers.len())
            .field("closed", &self.closed)
            .finish()
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventBus<E> {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self { handlers: Vec::new(), ids: IdAllocator::default(), closed: false }
    }

    /// Register `handler` for events whose kind equals `kind`.
    pub fn on(
        &mut self,
        kind: &'static str,
        handler: impl FnMut(&E) + Send + 'static,
    ) -> SubscriptionId {
        self.register(Some(kind), Box::new(handler))
    }

    /// Register `handler` for every event.
    pub fn on_any(&mut self, handler: impl FnMut(&E) + Send + 'static) -> SubscriptionId {
        self.register(None, Box::new(handler))
    }

    /// Remove the handler registered under `id`.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|registration| registration.id != id);
        self.handlers.len() != before
    }

    /// Number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Drop every handler and ignore later emits. Idempotent.
    pub fn close(&mut self) {
        self.closed = true;
        self.handlers.clear();
    }

    /// Whether the bus was closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn register(&mut self, kind: Option<&'static str>, handler: Handler<E>) -> SubscriptionId {
        let id = self.ids.next();
        if !self.closed {
            self.handlers.push(Registration { id, kind, handler });
        }
        id
    }
}

impl<E: BusEvent> EventBus<E> {
    /// Deliver `event` to every matching handler in registration order.
    ///
    /// Returns the number of handlers invoked.
    pub fn emit(&mut self, event: &E) -> usize {
        if self.closed {
            return 0;
        }
        let kind = event.kind();
        let mut delivered = 0;
        for registration in &mut self.handlers {
            if registration.kind.is_none_or(|k| k == kind) {
                (registration.handler)(event);
                delivered += 1;
            }
        }
        tracing::trace!(kind, delivered, "event emitted");
        delivered
    }
}
