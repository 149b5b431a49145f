//! Disposable resources and composition helpers.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::connections::connection::Connection;

/// A resource that can be released. `dispose` must be idempotent.
pub trait Disposable: Send + Sync {
    fn dispose(&self);
}

impl<T> Disposable for Connection<T> {
    fn dispose(&self) {
        Connection::dispose(self);
    }
}

/// Runs a closure on first disposal.
pub struct AnonymousDisposable {
    action: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl AnonymousDisposable {
    pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
        Self {
            action: Mutex::new(Some(Box::new(action))),
        }
    }

    /// Disposable with nothing to release.
    pub fn noop() -> Self {
        Self {
            action: Mutex::new(None),
        }
    }
}

impl Disposable for AnonymousDisposable {
    fn dispose(&self) {
        let action = self.action.lock().take();
        if let Some(action) = action {
            action();
        }
    }
}

/// Disposes a group of resources in insertion order.
pub struct CompositeDisposable {
    parts: Mutex<Vec<Box<dyn Disposable>>>,
    disposed: AtomicBool,
}

impl CompositeDisposable {
    pub fn new(parts: Vec<Box<dyn Disposable>>) -> Self {
        Self {
            parts: Mutex::new(parts),
            disposed: AtomicBool::new(false),
        }
    }

    /// Adds a part. If the composite is already disposed, the part is
    /// disposed immediately.
    pub fn push(&self, part: Box<dyn Disposable>) {
        if self.disposed.load(Ordering::Acquire) {
            part.dispose();
            return;
        }
        self.parts.lock().push(part);
    }
}

impl Disposable for CompositeDisposable {
    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let parts = std::mem::take(&mut *self.parts.lock());
        for part in parts {
            part.dispose();
        }
    }
}
