//! # Publisher: multicast, replay-latest broadcaster.
//!
//! [`Publisher`] fans values out to every connected consumer and remembers
//! the last one, so late observers start from the current state. The loop
//! uses one for models and one for `Next` values.
//!
//! ## Architecture
//! ```text
//! post(v) ──► latest = v
//!         └─► snapshot(consumers) ──► c1(v), c2(v), ... cN(v)
//!
//! connect(c) ──► register c ──► c(latest)   (if any)
//! ```
//!
//! ## Rules
//! - **Replay**: `connect` delivers the latest value synchronously before returning.
//! - **Snapshot broadcast**: a consumer that disconnects itself or others
//!   mid-broadcast does not skip or double-invoke anyone in that broadcast.
//! - **No cross-consumer ordering**: delivery order within one post is unspecified.
//! - **Single writer**: `post`/`connect` must be serialized by the caller (the
//!   loop's serialization point). The internal lock only keeps the consumer
//!   map consistent and is never held while a consumer runs.
//! - After `dispose`, `connect`/`post` are misuse.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::connections::{Connection, Consumer};
use crate::error::MisuseError;
use crate::fatal::fatal;

struct Registered<T> {
    consumer: Consumer<T>,
    connection: Connection<T>,
}

struct PublisherState<T> {
    consumers: BTreeMap<u64, Registered<T>>,
    next_id: u64,
    latest: Option<T>,
    disposed: bool,
}

/// Multicast broadcaster with replay of the latest value.
///
/// Cloning yields another handle to the same publisher.
pub struct Publisher<T> {
    state: Arc<Mutex<PublisherState<T>>>,
}

impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Default for Publisher<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Publisher<T>
where
    T: Clone + Send + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(PublisherState {
                consumers: BTreeMap::new(),
                next_id: 0,
                latest: None,
                disposed: false,
            })),
        }
    }

    /// Registers `consumer` and replays the latest value to it.
    ///
    /// Disposing the returned connection removes this consumer only.
    pub fn connect(&self, consumer: Consumer<T>) -> Connection<T> {
        let (connection, latest) = {
            let mut state = self.state.lock();
            if state.disposed {
                drop(state);
                fatal(MisuseError::PublisherDisposed { operation: "connect" });
            }
            let id = state.next_id;
            state.next_id += 1;

            let weak: Weak<Mutex<PublisherState<T>>> = Arc::downgrade(&self.state);
            let connection = Connection::from_consumer(Arc::clone(&consumer), move || {
                if let Some(state) = weak.upgrade() {
                    state.lock().consumers.remove(&id);
                }
            });
            state.consumers.insert(
                id,
                Registered {
                    consumer: Arc::clone(&consumer),
                    connection: connection.clone(),
                },
            );
            (connection, state.latest.clone())
        };

        if let Some(value) = latest {
            consumer(value);
        }
        connection
    }

    /// Stores `value` as latest and delivers it to every connected consumer.
    pub fn post(&self, value: T) {
        let snapshot: Vec<Consumer<T>> = {
            let mut state = self.state.lock();
            if state.disposed {
                drop(state);
                fatal(MisuseError::PublisherDisposed { operation: "post" });
            }
            state.latest = Some(value.clone());
            state
                .consumers
                .values()
                .map(|r| Arc::clone(&r.consumer))
                .collect()
        };

        if let Some((last, rest)) = snapshot.split_last() {
            for consumer in rest {
                consumer(value.clone());
            }
            last(value);
        }
    }
}

impl<T> Publisher<T> {
    /// Disposes every registered connection and closes the publisher.
    pub fn dispose(&self) {
        let connections: Vec<Connection<T>> = {
            let mut state = self.state.lock();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.latest = None;
            std::mem::take(&mut state.consumers)
                .into_values()
                .map(|r| r.connection)
                .collect()
        };
        for connection in connections {
            connection.dispose();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    /// Number of currently connected consumers.
    pub fn consumer_count(&self) -> usize {
        self.state.lock().consumers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fatal::catch_misuse;

    fn collector<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, Consumer<T>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        (seen, Arc::new(move |v| s.lock().push(v)))
    }

    #[test]
    fn test_replays_latest_to_new_consumer() {
        let p = Publisher::new();
        p.post(1);
        p.post(2);
        p.post(3);

        let (seen, consumer) = collector();
        let _conn = p.connect(consumer);
        assert_eq!(*seen.lock(), vec![3]);

        p.post(4);
        assert_eq!(*seen.lock(), vec![3, 4]);
    }

    #[test]
    fn test_no_replay_before_first_post() {
        let p: Publisher<u8> = Publisher::new();
        let (seen, consumer) = collector();
        let _conn = p.connect(consumer);
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_fan_out_in_post_order() {
        let p = Publisher::new();
        let (a, ca) = collector();
        let (b, cb) = collector();
        let _x = p.connect(ca);
        let _y = p.connect(cb);
        for v in ["x", "y", "z"] {
            p.post(v);
        }
        assert_eq!(*a.lock(), vec!["x", "y", "z"]);
        assert_eq!(*b.lock(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_disposing_connection_removes_only_that_consumer() {
        let p = Publisher::new();
        let (a, ca) = collector();
        let (b, cb) = collector();
        let conn_a = p.connect(ca);
        let _conn_b = p.connect(cb);

        conn_a.dispose();
        p.post(9);

        assert!(a.lock().is_empty());
        assert_eq!(*b.lock(), vec![9]);
        assert_eq!(p.consumer_count(), 1);
    }

    #[test]
    fn test_dispose_mid_broadcast_keeps_snapshot() {
        let p: Publisher<u32> = Publisher::new();
        let conns: Arc<Mutex<Vec<Connection<u32>>>> = Arc::new(Mutex::new(Vec::new()));
        let hits = Arc::new(Mutex::new(0u32));

        for _ in 0..4 {
            let conns2 = conns.clone();
            let hits2 = hits.clone();
            let conn = p.connect(Arc::new(move |_| {
                *hits2.lock() += 1;
                // every consumer disconnects everybody on first delivery
                let all = conns2.lock().clone();
                for c in all {
                    c.dispose();
                }
            }));
            conns.lock().push(conn);
        }

        p.post(1);
        assert_eq!(*hits.lock(), 4);
        assert_eq!(p.consumer_count(), 0);

        p.post(2);
        assert_eq!(*hits.lock(), 4);
    }

    #[test]
    fn test_dispose_is_idempotent_and_closes() {
        let p = Publisher::new();
        let (_seen, consumer) = collector::<u8>();
        let conn = p.connect(consumer);

        p.dispose();
        p.dispose();

        assert!(p.is_disposed());
        assert!(conn.is_disposed());
        assert_eq!(p.consumer_count(), 0);
        assert_eq!(
            catch_misuse(|| p.post(1)),
            Err(MisuseError::PublisherDisposed { operation: "post" })
        );
        let (_s, c) = collector::<u8>();
        assert_eq!(
            catch_misuse(|| p.connect(c)).map(|_| ()),
            Err(MisuseError::PublisherDisposed { operation: "connect" })
        );
    }
}
