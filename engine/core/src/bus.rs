//! Event Bus
//!
//! In-process publish/subscribe dispatcher that couples the activity layer,
//! the behavior controller and the animation player.
//!
//! # Design Philosophy
//!
//! Producers (the sampler task, the keystroke thread, UI callbacks) never call
//! handlers directly. They hold an [`EventPublisher`] and enqueue events into
//! a single unbounded channel. One consumer owns the [`EventBus`] receiver and
//! dispatches each event to a snapshot of the handlers registered for its
//! kind, in registration order. Events emitted while a handler runs are queued
//! behind the current one, so dispatch is never re-entrant.
//!
//! Handlers are isolated from each other: an error or a panic in one is
//! logged and dispatch continues with the next.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::events::{Event, EventKind, EventParseError};

/// Upper bound on events drained by one [`EventBus::dispatch_pending`] call
pub const MAX_DRAIN_PER_CALL: usize = 10_000;

/// Error a handler reports back to the bus
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler refused the event's contents
    #[error("rejected {event}: {reason}")]
    Rejected {
        /// Wire name of the event
        event: &'static str,
        /// Why
        reason: String,
    },

    /// The handler failed while processing
    #[error("handler failed: {0}")]
    Failed(String),
}

/// Result type for handlers
pub type HandlerResult = Result<(), HandlerError>;

/// A subscriber on the bus
///
/// Handlers run on the consumer task. They may emit further events through a
/// publisher they hold; those are delivered after the current dispatch.
pub trait EventHandler: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Handle one event
    ///
    /// # Errors
    ///
    /// An error is logged by the bus and does not affect other handlers.
    fn handle(&self, event: &Event) -> HandlerResult;
}

/// Closure adapter for [`EventHandler`]
pub struct FnHandler<F> {
    name: String,
    func: F,
}

impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&Event) -> HandlerResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, event: &Event) -> HandlerResult {
        (self.func)(event)
    }
}

/// Wrap a closure as a shareable handler
pub fn handler_fn<F>(name: impl Into<String>, func: F) -> Arc<dyn EventHandler>
where
    F: Fn(&Event) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(FnHandler {
        name: name.into(),
        func,
    })
}

fn same_handler(a: &Arc<dyn EventHandler>, b: &Arc<dyn EventHandler>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Cloneable, `Send` handle for emitting onto the bus from any thread
#[derive(Clone, Debug)]
pub struct EventPublisher {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventPublisher {
    /// Enqueue an event
    ///
    /// Fire-and-forget: if the consumer is gone the event is dropped and
    /// logged at debug level.
    pub fn emit(&self, event: Event) {
        tracing::trace!(event = event.name(), "Emit");
        if let Err(mpsc::error::SendError(event)) = self.tx.send(event) {
            tracing::debug!(event = event.name(), "Bus closed, dropping event");
        }
    }

    /// Parse a raw `(name, data)` pair and enqueue it
    ///
    /// # Errors
    ///
    /// Returns the parse error for unknown names or malformed payloads; the
    /// event is not enqueued.
    pub fn emit_raw(&self, name: &str, data: Option<serde_json::Value>) -> Result<(), EventParseError> {
        let event = Event::from_parts(name, data)?;
        self.emit(event);
        Ok(())
    }

    /// Whether the consumer side has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Shared handler table
///
/// Cloning yields another handle onto the same table, so a handler can hold
/// one and unregister itself. Dispatch works on a snapshot, so changes made
/// during a dispatch only affect later events.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    inner: Arc<RwLock<HashMap<EventKind, Vec<Arc<dyn EventHandler>>>>>,
}

impl HandlerRegistry {
    /// Add `handler` for `kind`; returns `false` if it was already registered
    pub fn register(&self, kind: EventKind, handler: Arc<dyn EventHandler>) -> bool {
        let mut table = self.inner.write();
        let handlers = table.entry(kind).or_default();
        if handlers.iter().any(|h| same_handler(h, &handler)) {
            tracing::warn!(
                event = kind.as_str(),
                handler = handler.name(),
                "Handler already registered, ignoring"
            );
            return false;
        }
        tracing::debug!(event = kind.as_str(), handler = handler.name(), "Handler registered");
        handlers.push(handler);
        true
    }

    /// Register one handler for several kinds
    pub fn register_all(&self, kinds: &[EventKind], handler: &Arc<dyn EventHandler>) {
        for &kind in kinds {
            self.register(kind, Arc::clone(handler));
        }
    }

    /// Remove `handler` from `kind`; returns `false` if it was not registered
    pub fn unregister(&self, kind: EventKind, handler: &Arc<dyn EventHandler>) -> bool {
        let mut table = self.inner.write();
        let Some(handlers) = table.get_mut(&kind) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|h| !same_handler(h, handler));
        let removed = handlers.len() != before;
        if handlers.is_empty() {
            table.remove(&kind);
        }
        if removed {
            tracing::debug!(event = kind.as_str(), handler = handler.name(), "Handler unregistered");
        }
        removed
    }

    /// Number of handlers for `kind`
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.inner.read().get(&kind).map_or(0, Vec::len)
    }

    /// Whether `kind` has an entry in the table
    pub fn has_entry(&self, kind: EventKind) -> bool {
        self.inner.read().contains_key(&kind)
    }

    fn snapshot(&self, kind: EventKind) -> Vec<Arc<dyn EventHandler>> {
        self.inner.read().get(&kind).cloned().unwrap_or_default()
    }
}

/// Outcome of dispatching one event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Handlers that returned `Ok`
    pub delivered: usize,
    /// Handlers that returned an error or panicked
    pub failed: usize,
}

/// The bus: handler table plus the consumer end of the event queue
pub struct EventBus {
    registry: HandlerRegistry,
    publisher: EventPublisher,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            registry: HandlerRegistry::default(),
            publisher: EventPublisher { tx },
            rx,
        }
    }

    /// A new producer handle
    pub fn publisher(&self) -> EventPublisher {
        self.publisher.clone()
    }

    /// A handle onto the handler table
    pub fn registry(&self) -> HandlerRegistry {
        self.registry.clone()
    }

    /// See [`HandlerRegistry::register`]
    pub fn register(&self, kind: EventKind, handler: Arc<dyn EventHandler>) -> bool {
        self.registry.register(kind, handler)
    }

    /// See [`HandlerRegistry::unregister`]
    pub fn unregister(&self, kind: EventKind, handler: &Arc<dyn EventHandler>) -> bool {
        self.registry.unregister(kind, handler)
    }

    /// Enqueue an event for the consumer
    pub fn emit(&self, event: Event) {
        self.publisher.emit(event);
    }

    /// Deliver `event` to the current handlers for its kind, in order
    pub fn dispatch(&self, event: &Event) -> DispatchReport {
        let kind = event.kind();
        let handlers = self.registry.snapshot(kind);
        let mut report = DispatchReport::default();

        for handler in handlers {
            match catch_unwind(AssertUnwindSafe(|| handler.handle(event))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    report.failed += 1;
                    tracing::error!(
                        event = kind.as_str(),
                        handler = handler.name(),
                        error = %e,
                        "Handler failed"
                    );
                }
                Err(panic) => {
                    report.failed += 1;
                    tracing::error!(
                        event = kind.as_str(),
                        handler = handler.name(),
                        panic = panic_message(panic.as_ref()),
                        "Handler panicked"
                    );
                }
            }
        }

        report
    }

    /// Dispatch everything queued, including events emitted while draining
    ///
    /// Returns the number of events dispatched. Stops after
    /// [`MAX_DRAIN_PER_CALL`] events so a handler cycle cannot spin forever.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut dispatched = 0;
        while dispatched < MAX_DRAIN_PER_CALL {
            let Ok(event) = self.rx.try_recv() else {
                return dispatched;
            };
            self.dispatch(&event);
            dispatched += 1;
        }
        tracing::warn!(limit = MAX_DRAIN_PER_CALL, "Drain limit reached, leaving events queued");
        dispatched
    }

    /// Wait for the next queued event
    ///
    /// The bus keeps a publisher of its own, so this only returns `None` if
    /// the channel is explicitly closed.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Take the next queued event without waiting
    pub fn try_next_event(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
