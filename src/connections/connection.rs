//! # Consumers and connections.
//!
//! A [`Consumer`] is a shared callback. A [`Connection`] is a consumer with a
//! lifetime: it accepts values until it is disposed, exactly once.
//!
//! ## Rules
//! - `dispose` is idempotent; the teardown closure runs on the first call only.
//! - `accept` after `dispose` is a programmer error
//!   ([`MisuseError::AcceptAfterDispose`]) reported through the fatal hook;
//!   [`Connection::try_accept`] drops the value instead.
//! - The creator of a connection owns its disposal.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::MisuseError;
use crate::fatal::fatal;

/// Shared value callback.
pub type Consumer<T> = Arc<dyn Fn(T) + Send + Sync>;

type Teardown = Box<dyn FnOnce() + Send>;

struct Inner<T> {
    accept: Consumer<T>,
    teardown: Mutex<Option<Teardown>>,
    disposed: AtomicBool,
}

/// Disposable value endpoint.
///
/// Cloning yields another handle to the **same** connection.
pub struct Connection<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Connection<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Connection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl<T> Connection<T> {
    /// Creates a connection from an accept callback and a teardown closure.
    pub fn new(
        accept: impl Fn(T) + Send + Sync + 'static,
        teardown: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self::from_consumer(Arc::new(accept), teardown)
    }

    /// Creates a connection around an existing consumer.
    pub fn from_consumer(accept: Consumer<T>, teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                accept,
                teardown: Mutex::new(Some(Box::new(teardown))),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Connection without teardown work.
    pub fn accepting(accept: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self::new(accept, || {})
    }

    /// Delivers a value.
    pub fn accept(&self, value: T) {
        if self.is_disposed() {
            fatal(MisuseError::AcceptAfterDispose);
        }
        (self.inner.accept)(value);
    }

    /// Delivers a value unless the connection is disposed.
    ///
    /// Returns `false` when the value was dropped. For callers where a
    /// concurrent dispose is an expected race rather than misuse.
    pub fn try_accept(&self, value: T) -> bool {
        if self.is_disposed() {
            return false;
        }
        (self.inner.accept)(value);
        true
    }

    /// Tears the connection down. Later calls are no-ops.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let teardown = self.inner.teardown.lock().take();
        if let Some(teardown) = teardown {
            teardown();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }
}

impl<T: 'static> Connection<T> {
    /// Turns the connection into a plain consumer (no disposal).
    pub fn as_consumer(&self) -> Consumer<T> {
        let conn = self.clone();
        Arc::new(move |value| conn.accept(value))
    }
}
