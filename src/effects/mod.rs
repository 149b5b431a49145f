//! # Asynchronous effect handling.
//!
//! Effect handlers are plain [`Connectable`](crate::Connectable)s, so any
//! synchronous handler can be written with
//! [`ConnectableFn`](crate::ConnectableFn). This module adds the async side:
//!
//! - [`Perform`]: async, cancelable unit of effect work.
//! - [`EffectFn`]: closure-backed [`Perform`].
//! - [`SpawnedEffectHandler`]: spawns one tokio task per accepted effect.
//!
//! ## Architecture
//! ```text
//! loop ──effect──► Connection::accept ──► handle.spawn(perform(effect, emit, ctx))
//!                                                            │
//!                             emit(event) ◄──────────────────┘
//!                                  │
//!                                  ▼
//!                    loop dispatch (dropped once the loop is disposed)
//! ```
//!
//! ## Rules
//! - Every connection owns one [`CancellationToken`](tokio_util::sync::CancellationToken);
//!   disposing the connection cancels all effects in flight on it.
//! - After cancellation `emit` is a no-op.

mod perform;
mod spawned;

pub use perform::{BoxEffectFuture, EffectFn, Perform};
pub use spawned::SpawnedEffectHandler;
