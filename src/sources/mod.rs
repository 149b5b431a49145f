//! Event sources backed by async channels.
//!
//! The synchronous adapters ([`EventSourceFn`](crate::EventSourceFn),
//! [`NoEventSource`](crate::NoEventSource)) live next to the
//! [`EventSource`](crate::EventSource) trait.

mod broadcast;

pub use broadcast::BroadcastEventSource;
