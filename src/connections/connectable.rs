//! # Connectable capability.
//!
//! [`Connectable<I, O>`] is the one-method seam used for effect handlers
//! (`Connectable<F, E>`: accepts effects, emits events) and views
//! (`Connectable<M, E>`: accepts models, emits events).
//!
//! [`ConnectableFn`] adapts a closure, so any handler can be written inline.
//!
//! ## Contract
//! - The returned connection must accept values from the moment `connect`
//!   returns until it is disposed.
//! - The implementation may call `output` zero or more times per input, from
//!   any thread, including synchronously inside `accept` or `connect`.

use std::sync::Arc;

use crate::connections::connection::{Connection, Consumer};

/// Something that can be connected to an output consumer.
pub trait Connectable<I, O>: Send + Sync + 'static {
    /// Opens a connection that feeds its results into `output`.
    fn connect(&self, output: Consumer<O>) -> Connection<I>;
}

impl<I, O, C> Connectable<I, O> for Arc<C>
where
    C: Connectable<I, O> + ?Sized,
{
    fn connect(&self, output: Consumer<O>) -> Connection<I> {
        (**self).connect(output)
    }
}

/// Closure-backed [`Connectable`].
pub struct ConnectableFn<I, O> {
    f: Box<dyn Fn(Consumer<O>) -> Connection<I> + Send + Sync>,
}

impl<I: 'static, O: 'static> ConnectableFn<I, O> {
    /// Wraps a full `connect` implementation.
    pub fn new(f: impl Fn(Consumer<O>) -> Connection<I> + Send + Sync + 'static) -> Self {
        Self { f: Box::new(f) }
    }

    /// Connectable whose connections call `handle(value, &output)` and need
    /// no teardown.
    ///
    /// ## Example
    /// ```
    /// use std::sync::Arc;
    /// use statevisor::{Connectable, ConnectableFn, Consumer};
    ///
    /// let doubler = ConnectableFn::handling(|n: u32, out: &Consumer<u32>| out(n * 2));
    /// let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    /// let s = seen.clone();
    /// let conn = doubler.connect(Arc::new(move |n| s.lock().push(n)));
    /// conn.accept(21);
    /// assert_eq!(*seen.lock(), vec![42]);
    /// ```
    pub fn handling(handle: impl Fn(I, &Consumer<O>) + Send + Sync + 'static) -> Self {
        let handle = Arc::new(handle);
        Self::new(move |output: Consumer<O>| {
            let handle = Arc::clone(&handle);
            Connection::accepting(move |value| handle(value, &output))
        })
    }

    /// Connectable that ignores every input.
    pub fn ignoring() -> Self {
        Self::new(|_output: Consumer<O>| Connection::accepting(|_value: I| {}))
    }
}

impl<I: 'static, O: 'static> Connectable<I, O> for ConnectableFn<I, O> {
    fn connect(&self, output: Consumer<O>) -> Connection<I> {
        (self.f)(output)
    }
}
