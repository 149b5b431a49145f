//! # statevisor
//!
//! **Statevisor** is a unidirectional state loop for Rust.
//!
//! A loop owns a model and applies events to it with a pure update function.
//! Each update may produce a new model and any number of effects; effects are
//! handed to an effect handler, which may emit new events back into the loop.
//! Updates run one at a time no matter how many threads produce events.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ dispatch_    │   │ EventSource  │   │ view events  │
//!     │ event(e)     │   │ (subscribe)  │   │ (Controller) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Loop (one serialization point, reentrant for its own thread)     │
//! │  - WorkQueue (collapses nested drains into the outermost one)     │
//! │  - EventProcessor (owns the model, runs update)                   │
//! │  - Publisher<M> (replays the latest model to new observers)       │
//! └──────┬──────────────────────────────────────────────────┬─────────┘
//!        ▼                                                  ▼
//!   observers(model)                          effect handler (Connectable<F, E>)
//!                                                           │ emit(event)
//!                                                           └──────► back into the loop
//! ```
//!
//! ### Ordering
//! ```text
//! dispatch_event(A) ─► update(A) ─► effect X ─► handler emits Y ─► update(Y) ─► return
//! dispatch_event(B) ─► update(B) ─► ...
//! ```
//! Everything caused by `A` completes before `B` is processed. Effects of one
//! update are delivered in no particular order unless
//! [`WorkOrder::Fifo`] is configured.
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                        |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------|
//! | **Loop**          | Serialized updates, effect dispatch, model observers.        | [`Loop`], [`LoopBuilder`], [`LoopConfig`] |
//! | **Functions**     | Update/initiate functions and their results.                 | [`Update`], [`Initiate`], [`Next`], [`First`] |
//! | **Connections**   | Effect handlers, views and event sources.                    | [`Connectable`], [`Connection`], [`EventSource`] |
//! | **Async effects** | Spawn effects on tokio, cancel them on dispose.              | [`Perform`], [`EffectFn`], [`SpawnedEffectHandler`] |
//! | **Lanes**         | Where controller callbacks run.                              | [`Lane`], [`ImmediateLane`], [`SerialLane`] |
//! | **Errors**        | Typed programmer errors and the fatal hook.                  | [`MisuseError`], [`set_fatal_hook`], [`catch_misuse`] |
//!
//! ## Optional features
//! - `controller`: exposes the start/stop [`Controller`].
//! - `logging`: exports the `tracing` backed [`TracingLogger`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use statevisor::{ConnectableFn, Consumer, Loop, Next};
//!
//! #[derive(Clone, Debug)]
//! enum Event {
//!     Add(i32),
//!     Saved,
//! }
//!
//! let saved = Arc::new(Mutex::new(Vec::new()));
//! let s = saved.clone();
//!
//! let lp = Loop::builder(|model: &i32, event: Event| match event {
//!     Event::Add(n) => Next::next_with(model + n, [model + n]),
//!     Event::Saved => Next::no_change(),
//! })
//! .with_effect_handler(ConnectableFn::handling(move |value: i32, out: &Consumer<Event>| {
//!     s.lock().push(value);
//!     out(Event::Saved);
//! }))
//! .start(0);
//!
//! lp.dispatch_event(Event::Add(2));
//! lp.dispatch_event(Event::Add(3));
//!
//! assert_eq!(lp.latest_model(), 5);
//! assert_eq!(*saved.lock(), vec![2, 5]);
//! ```
mod connections;
mod core;
mod effects;
mod error;
mod fatal;
mod lane;
mod logging;
mod sources;
mod update;

// ---- Public re-exports ----

pub use connections::{
    AnonymousDisposable, CompositeDisposable, Connectable, ConnectableFn, Connection, Consumer,
    Disposable, EventSource, EventSourceFn, NoEventSource,
};
pub use core::{EventProcessor, Loop, LoopBuilder, LoopConfig, Publisher, WorkOrder, WorkQueue};
pub use effects::{BoxEffectFuture, EffectFn, Perform, SpawnedEffectHandler};
pub use error::MisuseError;
pub use fatal::{abort_hook, catch_misuse, reset_fatal_hook, set_fatal_hook, unwinding_hook, FatalHook};
pub use lane::{ImmediateLane, Job, Lane, SerialLane};
pub use logging::LoopLogger;
pub use sources::BroadcastEventSource;
pub use update::{First, Initiate, Next, Update};

// Optional: expose the start/stop controller.
// Enable with: `--features controller`
#[cfg(feature = "controller")]
mod controller;
#[cfg(feature = "controller")]
pub use controller::{Controller, ControllerBuilder, ControllerPhase};

// Optional: expose the built-in `tracing` logger.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use logging::TracingLogger;
