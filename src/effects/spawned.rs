use std::sync::Arc;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::connections::{Connectable, Connection, Consumer};
use crate::effects::perform::Perform;

/// Effect handler that runs each effect as its own tokio task.
///
/// ### Notes
/// - Effects accepted on one connection run concurrently; there is no
///   ordering between them.
/// - Disposing the connection cancels every in-flight effect: their futures
///   are dropped at the next await point and their `emit` becomes a no-op.
pub struct SpawnedEffectHandler<P> {
    performer: Arc<P>,
    handle: Handle,
}

impl<P> SpawnedEffectHandler<P> {
    /// Spawns effects on the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside of a tokio runtime.
    pub fn new(performer: P) -> Self {
        Self::on(performer, Handle::current())
    }

    /// Spawns effects on the given runtime handle.
    pub fn on(performer: P, handle: Handle) -> Self {
        Self {
            performer: Arc::new(performer),
            handle,
        }
    }
}

impl<F, E, P> Connectable<F, E> for SpawnedEffectHandler<P>
where
    F: Send + 'static,
    E: Send + 'static,
    P: Perform<F, E>,
{
    fn connect(&self, output: Consumer<E>) -> Connection<F> {
        let token = CancellationToken::new();

        let gate = token.clone();
        let emit: Consumer<E> = Arc::new(move |event: E| {
            if gate.is_cancelled() {
                tracing::trace!("event dropped: effect connection disposed");
                return;
            }
            output(event);
        });

        let performer = Arc::clone(&self.performer);
        let handle = self.handle.clone();
        let ctx = token.clone();
        let accept = move |effect: F| {
            let performer = Arc::clone(&performer);
            let emit = Arc::clone(&emit);
            let ctx = ctx.clone();
            handle.spawn(async move {
                let child = ctx.clone();
                tokio::select! {
                    biased;
                    _ = ctx.cancelled() => tracing::trace!("effect cancelled"),
                    _ = performer.perform(effect, emit, child) => {}
                }
            });
        };

        Connection::new(accept, move || token.cancel())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Loop;
    use crate::effects::EffectFn;
    use crate::update::Next;
    use parking_lot::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[derive(Clone, Debug, PartialEq)]
    enum Ev {
        Load(u32),
        Loaded(u32),
    }

    #[tokio::test]
    async fn test_spawned_effect_feeds_loop() {
        let handler = SpawnedEffectHandler::new(EffectFn::new(
            |n: u32, emit: Consumer<Ev>, _ctx: CancellationToken| async move {
                tokio::task::yield_now().await;
                emit(Ev::Loaded(n * 10));
            },
        ));
        let lp = Loop::builder(|m: &u32, e: Ev| match e {
            Ev::Load(n) => Next::dispatch([n]),
            Ev::Loaded(v) => Next::next(m + v),
        })
        .with_effect_handler(handler)
        .start(0);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _obs = lp.add_observer(Arc::new(move |m: u32| {
            let _ = tx.send(m);
        }));
        lp.dispatch_event(Ev::Load(4));

        let mut last = 0;
        while last != 40 {
            last = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("model within timeout")
                .expect("observer alive");
        }
        assert_eq!(lp.latest_model(), 40);
    }

    #[tokio::test]
    async fn test_dispose_cancels_in_flight_effects() {
        struct DropSignal(mpsc::UnboundedSender<()>);
        impl Drop for DropSignal {
            fn drop(&mut self) {
                let _ = self.0.send(());
            }
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let handler = SpawnedEffectHandler::new(EffectFn::new(
            move |_: (), _emit: Consumer<()>, _ctx: CancellationToken| {
                let signal = DropSignal(tx.clone());
                async move {
                    let _signal = signal;
                    std::future::pending::<()>().await;
                }
            },
        ));

        let conn = handler.connect(Arc::new(|_| {}));
        conn.accept(());
        tokio::task::yield_now().await;
        conn.dispose();

        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("effect dropped within timeout");
    }

    #[tokio::test]
    async fn test_emit_after_dispose_is_ignored() {
        let stored: Arc<Mutex<Option<Consumer<u8>>>> = Arc::new(Mutex::new(None));
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        let s = stored.clone();
        let handler = SpawnedEffectHandler::new(EffectFn::new(
            move |_: (), emit: Consumer<u8>, _ctx: CancellationToken| {
                *s.lock() = Some(emit);
                let done = done_tx.clone();
                async move {
                    let _ = done.send(());
                }
            },
        ));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sn = seen.clone();
        let conn = handler.connect(Arc::new(move |v| sn.lock().push(v)));
        conn.accept(());
        done_rx.recv().await.expect("effect ran");

        let emit = stored.lock().clone().expect("emit stored");
        emit(1);
        conn.dispose();
        emit(2);
        assert_eq!(*seen.lock(), vec![1]);
    }
}
