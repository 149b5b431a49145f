//! # Event sources.
//!
//! An [`EventSource`] pushes externally originated events into a loop. It may
//! emit at any time after `subscribe` returns, from any thread, and also
//! synchronously **during** `subscribe` (the loop queues such events until it
//! is initialized).

use std::sync::Arc;

use crate::connections::connection::Consumer;
use crate::connections::disposable::{AnonymousDisposable, Disposable};

/// Producer of events for a loop.
pub trait EventSource<E>: Send + Sync + 'static {
    /// Starts delivering events to `consumer` until the returned handle is disposed.
    fn subscribe(&self, consumer: Consumer<E>) -> Box<dyn Disposable>;
}

impl<E, S> EventSource<E> for Arc<S>
where
    S: EventSource<E> + ?Sized,
{
    fn subscribe(&self, consumer: Consumer<E>) -> Box<dyn Disposable> {
        (**self).subscribe(consumer)
    }
}

/// Source that never emits.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEventSource;

impl<E> EventSource<E> for NoEventSource {
    fn subscribe(&self, _consumer: Consumer<E>) -> Box<dyn Disposable> {
        Box::new(AnonymousDisposable::noop())
    }
}

/// Closure-backed [`EventSource`].
pub struct EventSourceFn<E> {
    f: Box<dyn Fn(Consumer<E>) -> Box<dyn Disposable> + Send + Sync>,
}

impl<E: 'static> EventSourceFn<E> {
    pub fn new(f: impl Fn(Consumer<E>) -> Box<dyn Disposable> + Send + Sync + 'static) -> Self {
        Self { f: Box::new(f) }
    }
}

impl<E: 'static> EventSource<E> for EventSourceFn<E> {
    fn subscribe(&self, consumer: Consumer<E>) -> Box<dyn Disposable> {
        (self.f)(consumer)
    }
}
