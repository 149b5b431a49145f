use std::future::Future;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use tokio_util::sync::CancellationToken;

use crate::connections::Consumer;

/// Boxed future returned by closure-backed effects.
pub type BoxEffectFuture = BoxFuture<'static, ()>;

/// # Asynchronous, cancelable effect performer.
///
/// Receives one effect, may emit any number of events through `emit`, and
/// should return promptly once `ctx` is cancelled.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use statevisor::{Consumer, Perform};
///
/// struct Fetch;
///
/// #[async_trait]
/// impl Perform<u32, String> for Fetch {
///     async fn perform(&self, id: u32, emit: Consumer<String>, ctx: CancellationToken) {
///         if ctx.is_cancelled() {
///             return;
///         }
///         emit(format!("loaded {id}"));
///     }
/// }
/// ```
#[async_trait]
pub trait Perform<F, E>: Send + Sync + 'static
where
    F: Send + 'static,
    E: 'static,
{
    /// Performs `effect` until completion or cancellation.
    async fn perform(&self, effect: F, emit: Consumer<E>, ctx: CancellationToken);
}

type EffectClosure<F, E> = dyn Fn(F, Consumer<E>, CancellationToken) -> BoxEffectFuture + Send + Sync;

/// Function-backed [`Perform`].
///
/// Wraps a closure that *creates* a new future per effect.
pub struct EffectFn<F, E> {
    f: Box<EffectClosure<F, E>>,
}

impl<F, E> EffectFn<F, E>
where
    F: Send + 'static,
    E: 'static,
{
    pub fn new<C, Fut>(f: C) -> Self
    where
        C: Fn(F, Consumer<E>, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            f: Box::new(move |effect: F, emit: Consumer<E>, ctx: CancellationToken| {
                f(effect, emit, ctx).boxed()
            }),
        }
    }

    /// Creates the future for one effect.
    pub fn call(&self, effect: F, emit: Consumer<E>, ctx: CancellationToken) -> BoxEffectFuture {
        (self.f)(effect, emit, ctx)
    }
}

#[async_trait]
impl<F, E> Perform<F, E> for EffectFn<F, E>
where
    F: Send + 'static,
    E: 'static,
{
    async fn perform(&self, effect: F, emit: Consumer<E>, ctx: CancellationToken) {
        self.call(effect, emit, ctx).await;
    }
}
