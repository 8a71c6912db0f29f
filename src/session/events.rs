//! Typed session events and the listener bus.
//!
//! Listeners subscribe per event kind and are invoked in registration
//! order. Subscribing returns a [`Subscription`] token used for explicit
//! unsubscription, so removal never depends on comparing callbacks.

use std::collections::HashMap;

use crate::session::provider::ProviderErrorKind;
use crate::types::HypothesisBatch;

/// Events emitted by a recognition session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The provider started listening.
    Start,

    /// Sound (possibly speech) was detected.
    SoundStart,

    /// The provider stopped listening.
    End,

    /// A recognition error. Also delivered to the `ErrorNetwork` or
    /// permission listeners when the kind warrants it.
    Error { kind: ProviderErrorKind },

    /// Speech was recognized but not matched (interim results, or a final
    /// batch preceding `ResultNoMatch`).
    Result { hypotheses: HypothesisBatch },

    /// A command matched a finalized batch.
    ResultMatch {
        matched_text: String,
        phrase: String,
        hypotheses: HypothesisBatch,
    },

    /// A finalized batch matched no registered command.
    ResultNoMatch { hypotheses: HypothesisBatch },

    /// A hotword woke the session.
    HotwordTrigger,
}

/// The subscription channels of the bus. `Error` fires for every provider
/// error; the classified kinds fire in addition to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Start,
    SoundStart,
    End,
    Error,
    ErrorNetwork,
    ErrorPermissionBlocked,
    ErrorPermissionDenied,
    Result,
    ResultMatch,
    ResultNoMatch,
    HotwordTrigger,
}

/// Token returned by [`EventBus::subscribe`]; pass to
/// [`EventBus::unsubscribe`] to dispose of the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    kind: EventKind,
    id: u64,
}

type Listener = Box<dyn FnMut(&SessionEvent) + Send>;

/// Per-kind listener lists, invoked in registration order.
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<EventKind, Vec<(u64, Listener)>>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> Subscription
    where
        F: FnMut(&SessionEvent) + Send + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(listener)));
        Subscription { kind, id }
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) {
        if let Some(list) = self.listeners.get_mut(&subscription.kind) {
            list.retain(|(id, _)| *id != subscription.id);
        }
    }

    pub fn emit(&mut self, kind: EventKind, event: &SessionEvent) {
        if let Some(list) = self.listeners.get_mut(&kind) {
            for (_, listener) in list.iter_mut() {
                listener(event);
            }
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<EventKind, usize> = self
            .listeners
            .iter()
            .map(|(kind, list)| (*kind, list.len()))
            .collect();
        f.debug_struct("EventBus").field("listeners", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_listeners_fire_in_registration_order() {
        let mut bus = EventBus::new();
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let o1 = Arc::clone(&order);
        bus.subscribe(EventKind::Start, move |_| o1.lock().push(1));
        let o2 = Arc::clone(&order);
        bus.subscribe(EventKind::Start, move |_| o2.lock().push(2));

        bus.emit(EventKind::Start, &SessionEvent::Start);
        assert_eq!(*order.lock(), vec![1, 2]);
    }

    #[test]
    fn test_unsubscribe_disposes_only_that_listener() {
        let mut bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h1 = Arc::clone(&hits);
        let sub = bus.subscribe(EventKind::End, move |_| {
            h1.fetch_add(1, Ordering::SeqCst);
        });
        let h2 = Arc::clone(&hits);
        bus.subscribe(EventKind::End, move |_| {
            h2.fetch_add(10, Ordering::SeqCst);
        });

        bus.unsubscribe(sub);
        bus.emit(EventKind::End, &SessionEvent::End);
        assert_eq!(hits.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        bus.subscribe(EventKind::Result, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(EventKind::ResultNoMatch, &SessionEvent::ResultNoMatch {
            hypotheses: Vec::new(),
        });
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
