//! # Broadcast-channel event source.
//!
//! [`BroadcastEventSource`] forwards every value sent on a
//! [`tokio::sync::broadcast`] channel into the subscribing loop.
//!
//! ## Architecture
//! ```text
//! Senders (many):                     per subscription:
//!   producer 1 ──┐
//!   producer 2 ──┼──► broadcast::Sender ──► Receiver ──► forwarder task ──► consumer(event)
//!   producer N ──┘
//! ```
//!
//! ## Rules
//! - A subscription only sees values sent **after** `subscribe`.
//! - **Lag handling**: a forwarder that fell behind skips the missed values
//!   and logs how many were lost.
//! - Disposing the subscription cancels its forwarder; the forwarder also
//!   stops once every sender is dropped.

use tokio::runtime::Handle;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;

use crate::connections::{AnonymousDisposable, Consumer, Disposable, EventSource};

/// Event source fed by a broadcast channel.
///
/// Cheap to clone; clones share the channel.
#[derive(Clone, Debug)]
pub struct BroadcastEventSource<E> {
    tx: broadcast::Sender<E>,
    handle: Handle,
}

impl<E> BroadcastEventSource<E>
where
    E: Clone + Send + 'static,
{
    /// Creates a source with its own channel and returns the sending half.
    ///
    /// The minimum capacity is 1 (clamped).
    ///
    /// # Panics
    /// Panics when called outside of a tokio runtime.
    pub fn channel(capacity: usize) -> (Self, broadcast::Sender<E>) {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        (Self::from_sender(tx.clone()), tx)
    }

    /// Wraps an existing sender; forwarders run on the current runtime.
    ///
    /// # Panics
    /// Panics when called outside of a tokio runtime.
    pub fn from_sender(tx: broadcast::Sender<E>) -> Self {
        Self::on(tx, Handle::current())
    }

    /// Wraps an existing sender; forwarders run on `handle`.
    pub fn on(tx: broadcast::Sender<E>, handle: Handle) -> Self {
        Self { tx, handle }
    }

    /// Number of live subscriptions on the channel.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<E> EventSource<E> for BroadcastEventSource<E>
where
    E: Clone + Send + 'static,
{
    fn subscribe(&self, consumer: Consumer<E>) -> Box<dyn Disposable> {
        let mut rx = self.tx.subscribe();
        let token = CancellationToken::new();
        let stop = token.clone();

        self.handle.spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(event) => consumer(event),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "event source lagged; events lost");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
            tracing::debug!("event source forwarder stopped");
        });

        Box::new(AnonymousDisposable::new(move || token.cancel()))
    }
}
