//! # Connection primitives.
//!
//! The seams between the loop and the outside world:
//! - [`Consumer`] / [`Connection`]: value callbacks with exactly-once disposal
//! - [`Disposable`] and helpers ([`AnonymousDisposable`], [`CompositeDisposable`])
//! - [`Connectable`]: effect handlers and views
//! - [`EventSource`]: external event producers
//!
//! ```text
//!                 Connectable<F, E>                 EventSource<E>
//!   effects ──► Connection<F>.accept ──► Consumer<E> ◄── subscribe
//!                                            │
//!                                            ▼
//!                                   loop dispatch (unguarded)
//! ```

mod connectable;
mod connection;
mod disposable;
mod source;

pub use connectable::{Connectable, ConnectableFn};
pub use connection::{Connection, Consumer};
pub use disposable::{AnonymousDisposable, CompositeDisposable, Disposable};
pub use source::{EventSource, EventSourceFn, NoEventSource};
