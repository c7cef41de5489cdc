//! Typed event bus
//!
//! Single-threaded cooperative publish/subscribe. Each view owns one bus
//! instance with a fixed set of event kinds it may emit; subscribers
//! register a callback per kind and are called synchronously, in
//! subscription order.
//!
//! A callback may emit further events (re-entrant). Those are queued, and
//! the queue is drained to exhaustion before the outermost `emit` returns,
//! so one analyst action never interleaves partial view updates with a
//! recursive cascade.
//!
//! The bus is not a cross-thread channel: callers serialize access (the
//! session lock does this). The internal locks exist so bus-owning state
//! can live inside the async session, and they are never contended.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Implemented by per-view event enums: maps each variant to its fixed
/// kind name used at subscription time.
pub trait EventKind {
    fn kind(&self) -> &'static str;
}

type Callback<E> = Box<dyn FnMut(&E) + Send>;

struct Subscriber<E> {
    kind: &'static str,
    callback: Callback<E>,
}

/// Publish/subscribe channel for one view's events.
pub struct EventBus<E: EventKind> {
    subscribers: Mutex<Vec<Subscriber<E>>>,
    pending_subscribers: Mutex<Vec<Subscriber<E>>>,
    queue: Mutex<VecDeque<E>>,
    dispatching: AtomicBool,
}

impl<E: EventKind> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EventKind> EventBus<E> {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            pending_subscribers: Mutex::new(Vec::new()),
            queue: Mutex::new(VecDeque::new()),
            dispatching: AtomicBool::new(false),
        }
    }

    /// Registers a callback for one event kind. Delivery order follows
    /// subscription order. A subscription made from inside a callback
    /// takes effect for the next event of the current cascade.
    pub fn subscribe<F>(&self, kind: &'static str, callback: F)
    where
        F: FnMut(&E) + Send + 'static,
    {
        let subscriber = Subscriber {
            kind,
            callback: Box::new(callback),
        };
        if self.dispatching.load(Ordering::SeqCst) {
            if let Ok(mut pending) = self.pending_subscribers.lock() {
                pending.push(subscriber);
            }
        } else if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(subscriber);
        }
    }

    /// Number of callbacks registered for a kind.
    pub fn subscriber_count(&self, kind: &str) -> usize {
        self.subscribers
            .lock()
            .map(|subs| subs.iter().filter(|s| s.kind == kind).count())
            .unwrap_or(0)
    }

    /// Emits one event. If called from inside a callback, the event is
    /// queued and delivered after the in-flight event finishes delivery;
    /// the whole cascade drains before the outermost call returns.
    pub fn emit(&self, event: E) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(event);
        }
        if self.dispatching.swap(true, Ordering::SeqCst) {
            return;
        }

        loop {
            let next = self
                .queue
                .lock()
                .ok()
                .and_then(|mut queue| queue.pop_front());
            let Some(event) = next else {
                break;
            };
            self.deliver(&event);
            self.adopt_pending_subscribers();
        }

        self.dispatching.store(false, Ordering::SeqCst);
    }

    fn deliver(&self, event: &E) {
        let kind = event.kind();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            for subscriber in subscribers.iter_mut().filter(|s| s.kind == kind) {
                (subscriber.callback)(event);
            }
        }
    }

    fn adopt_pending_subscribers(&self) {
        if let (Ok(mut pending), Ok(mut subscribers)) =
            (self.pending_subscribers.lock(), self.subscribers.lock())
        {
            subscribers.append(&mut pending);
        }
    }
}

impl<E: EventKind> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.subscribers.lock().map(|s| s.len()).unwrap_or(0);
        f.debug_struct("EventBus")
            .field("subscribers", &count)
            .finish()
    }
}
