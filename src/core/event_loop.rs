//! # Loop: the assembled unit.
//!
//! A [`Loop`] wires an [`EventProcessor`], a [`WorkQueue`], a model
//! [`Publisher`], an effect handler and an event source together. It is
//! constructed fully wired and already processing; there is no separate
//! start step.
//!
//! ## Architecture
//! ```text
//!   dispatch_event(e) ──┐        effect handler output ──┐   event source ──┐
//!                       ▼                                ▼                  ▼
//!               ┌──────────────── serialization point (reentrant lock) ───────────────┐
//!               │ WorkQueue.submit(accept e) ; WorkQueue.service()                     │
//!               │      │                                                               │
//!               │      ▼                                                               │
//!               │ EventProcessor.accept(e) ──► update(model, e) ──► Next               │
//!               │                                                   │                  │
//!               │                  ┌────────────────────────────────┴────────┐         │
//!               │                  ▼                                         ▼         │
//!               │        model publisher.post(m)            WorkQueue.submit(effect)   │
//!               │                  │                                         │         │
//!               │            observers(m)               effect connection.accept(f)    │
//!               │                                                  │ (may emit events) │
//!               └──────────────────────────────────────────────────┴───────────────────┘
//! ```
//!
//! ## Construction order
//! gated WorkQueue → `Next` publisher → EventProcessor → model publisher →
//! effect connection → event-source subscription → `processor.start(first)`
//! → `work.start()`.
//!
//! Events emitted while wiring (by the effect handler's `connect` or the event
//! source's `subscribe`) are queued by the processor and replayed in arrival
//! order right after the initial model.
//!
//! ## Rules
//! - One thread at a time holds the serialization point; the same thread may
//!   re-enter it (an effect handler emitting synchronously), in which case the
//!   nested drain collapses into the outer one.
//! - Everything derived from one externally dispatched event (models,
//!   effects, events emitted by effect handlers, their effects, ...) completes
//!   before `dispatch_event` returns.
//! - Effect handler and event source outputs are dispatched **unguarded**:
//!   after disposal they are dropped silently.
//! - `dispose` is idempotent; dropping the loop disposes it.

use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, ReentrantMutex};

use crate::connections::{Connectable, Connection, Consumer, Disposable, EventSource};
use crate::core::config::LoopConfig;
use crate::core::processor::EventProcessor;
use crate::core::publisher::Publisher;
use crate::core::work_queue::WorkQueue;
use crate::error::MisuseError;
use crate::fatal::fatal;
use crate::update::{First, Next, Update};

struct LoopCore<M, E, F> {
    name: Cow<'static, str>,
    serial: ReentrantMutex<()>,
    work: WorkQueue,
    processor: EventProcessor<M, E, F>,
    models: Publisher<M>,
    effects: OnceLock<Connection<F>>,
    source: Mutex<Option<Box<dyn Disposable>>>,
    disposed: AtomicBool,
}

impl<M, E, F> LoopCore<M, E, F>
where
    M: Clone + Send + 'static,
    E: Send + 'static,
    F: Clone + Send + 'static,
{
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn dispatch(self: &Arc<Self>, event: E) {
        let _serial = self.serial.lock();
        if !self.work.is_started() {
            // still wiring: the processor keeps arrival order until start
            self.processor.accept(event);
            return;
        }

        let weak = Arc::downgrade(self);
        self.work.submit(move || {
            let Some(core) = weak.upgrade() else { return };
            if core.is_disposed() {
                tracing::trace!(name = %core.name, "queued event dropped: loop disposed");
                return;
            }
            core.processor.accept(event);
        });
        self.work.service();
    }

    fn dispatch_unguarded(self: &Arc<Self>, event: E) {
        if self.is_disposed() {
            tracing::trace!(name = %self.name, "event dropped: loop disposed");
            return;
        }
        self.dispatch(event);
    }

    fn on_next(self: &Arc<Self>, next: Next<M, F>) {
        if self.is_disposed() {
            return;
        }
        let (model, effects) = next.into_parts();
        if let Some(model) = model {
            self.models.post(model);
        }
        for effect in effects {
            let weak = Arc::downgrade(self);
            self.work.submit(move || {
                if let Some(core) = weak.upgrade() {
                    core.deliver_effect(effect);
                }
            });
        }
        self.work.service();
    }

    fn deliver_effect(&self, effect: F) {
        if self.is_disposed() {
            tracing::trace!(name = %self.name, "effect dropped: loop disposed");
            return;
        }
        if let Some(connection) = self.effects.get() {
            connection.accept(effect);
        }
    }

    fn dispose(&self) {
        let _serial = self.serial.lock();
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(effects) = self.effects.get() {
            effects.dispose();
        }
        let source = self.source.lock().take();
        if let Some(source) = source {
            source.dispose();
        }
        self.models.dispose();
        self.processor.dispose();
        tracing::debug!(name = %self.name, "loop disposed");
    }
}

fn unguarded_consumer<M, E, F>(core: &Arc<LoopCore<M, E, F>>) -> Consumer<E>
where
    M: Clone + Send + 'static,
    E: Send + 'static,
    F: Clone + Send + 'static,
{
    let weak = Arc::downgrade(core);
    Arc::new(move |event: E| match weak.upgrade() {
        Some(core) => core.dispatch_unguarded(event),
        None => tracing::trace!("event dropped: loop released"),
    })
}

/// A running update loop.
pub struct Loop<M, E, F>
where
    M: Clone + Send + 'static,
    E: Send + 'static,
    F: Clone + Send + 'static,
{
    core: Arc<LoopCore<M, E, F>>,
}

impl<M, E, F> Loop<M, E, F>
where
    M: Clone + Send + 'static,
    E: Send + 'static,
    F: Clone + Send + 'static,
{
    /// Wires and starts a loop. Prefer [`Loop::builder`](crate::Loop::builder).
    pub fn new(
        update: Update<M, E, F>,
        first: First<M, F>,
        effect_handler: &dyn Connectable<F, E>,
        event_source: &dyn EventSource<E>,
        config: &LoopConfig,
    ) -> Self {
        let nexts: Publisher<Next<M, F>> = Publisher::new();
        let core = Arc::new(LoopCore {
            name: config.name.clone(),
            serial: ReentrantMutex::new(()),
            work: WorkQueue::gated(config.work_order),
            processor: EventProcessor::new(update, nexts.clone()),
            models: Publisher::new(),
            effects: OnceLock::new(),
            source: Mutex::new(None),
            disposed: AtomicBool::new(false),
        });

        let weak = Arc::downgrade(&core);
        // released together with the publisher on dispose
        let _nexts = nexts.connect(Arc::new(move |next: Next<M, F>| {
            if let Some(core) = weak.upgrade() {
                core.on_next(next);
            }
        }));

        let effects = effect_handler.connect(unguarded_consumer(&core));
        let _ = core.effects.set(effects);
        let source = event_source.subscribe(unguarded_consumer(&core));
        *core.source.lock() = Some(source);

        {
            let _serial = core.serial.lock();
            core.processor.start(first);
            core.work.start();
        }
        tracing::debug!(name = %core.name, "loop started");

        Self { core }
    }

    /// Processes `event`. Dispatching into a disposed loop is misuse.
    pub fn dispatch_event(&self, event: E) {
        if self.core.is_disposed() {
            fatal(MisuseError::DispatchAfterDispose);
        }
        self.core.dispatch(event);
    }

    /// Like [`dispatch_event`](Self::dispatch_event), but drops the event
    /// silently when the loop is disposed.
    ///
    /// For call sites where dispatch-after-dispose is an expected race
    /// (asynchronous redirects that already checked for misuse upstream).
    pub fn dispatch_event_unguarded(&self, event: E) {
        self.core.dispatch_unguarded(event);
    }

    /// Consumer that dispatches unguarded into this loop without keeping it alive.
    pub fn unguarded_dispatcher(&self) -> Consumer<E> {
        unguarded_consumer(&self.core)
    }

    /// Observes models; the current model is delivered immediately.
    pub fn add_observer(&self, observer: Consumer<M>) -> Connection<M> {
        let _serial = self.core.serial.lock();
        self.core.models.connect(observer)
    }

    /// The current model.
    pub fn latest_model(&self) -> M {
        self.core.processor.latest_model()
    }

    pub fn observer_count(&self) -> usize {
        self.core.models.consumer_count()
    }

    pub fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }

    /// Tears down the effect connection, event source and publishers.
    pub fn dispose(&self) {
        self.core.dispose();
    }
}

impl<M, E, F> Drop for Loop<M, E, F>
where
    M: Clone + Send + 'static,
    E: Send + 'static,
    F: Clone + Send + 'static,
{
    fn drop(&mut self) {
        self.core.dispose();
    }
}
