//! # Loop logging hooks.
//!
//! [`LoopLogger`] observes the pure functions of a loop: every call to the
//! initiate function and every call to the update function. Attach one with
//! [`LoopBuilder::with_logger`](crate::LoopBuilder::with_logger), or decorate
//! the functions directly with [`Update::logged`](crate::Update::logged) and
//! [`Initiate::logged`](crate::Initiate::logged).
//!
//! ## Call order
//! ```text
//! will_initiate(model) ─► initiate(model) ─► did_initiate(model, first)
//! will_update(model, e) ─► update(model, e) ─► did_update(model, e, next)
//! ```
//!
//! Hooks run on the loop's serialization point, inline with the update. Keep
//! them fast and never call back into the loop from them.
//!
//! ## Implementing custom loggers
//! ```
//! use statevisor::{LoopLogger, Next};
//!
//! struct Counter(std::sync::atomic::AtomicUsize);
//!
//! impl LoopLogger<i32, i32, ()> for Counter {
//!     fn did_update(&self, _model: &i32, _event: &i32, _next: &Next<i32, ()>) {
//!         self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod tracing_logger;

#[cfg(feature = "logging")]
pub use tracing_logger::TracingLogger;

use crate::update::{First, Next};

/// Observer of initiate and update calls. Every hook defaults to a no-op.
pub trait LoopLogger<M, E, F>: Send + Sync {
    fn will_initiate(&self, _model: &M) {}

    fn did_initiate(&self, _model: &M, _first: &First<M, F>) {}

    fn will_update(&self, _model: &M, _event: &E) {}

    fn did_update(&self, _model: &M, _event: &E, _next: &Next<M, F>) {}
}
