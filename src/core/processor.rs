//! # EventProcessor: update driver and model owner.
//!
//! The processor owns the current model and runs the update function. Its
//! results are posted as [`Next`] values to a downstream [`Publisher`].
//!
//! ## State machine
//! ```text
//! uninitialized ── start(first) ──► started ── dispose() ──► (publisher closed)
//!      │                              │
//!   accept(e): queue e             accept(e): update(model, e) → Next → post
//! ```
//!
//! ## Rules
//! - Events accepted before `start` are replayed, in arrival order, right
//!   after the initial `Next` is posted and before any later event.
//! - The model is read **when an event is processed**, not when it was submitted.
//! - Every processed event posts a `Next`, also when it carries no model.
//! - `accept`/`start` must be serialized by the caller.

use parking_lot::Mutex;

use crate::core::publisher::Publisher;
use crate::error::MisuseError;
use crate::fatal::fatal;
use crate::update::{First, Next, Update};

struct ProcessorState<M, E> {
    current: Option<M>,
    queued: Vec<E>,
}

/// Applies events to the current model.
pub struct EventProcessor<M, E, F> {
    update: Update<M, E, F>,
    output: Publisher<Next<M, F>>,
    state: Mutex<ProcessorState<M, E>>,
}

impl<M, E, F> EventProcessor<M, E, F>
where
    M: Clone + Send + 'static,
    E: Send + 'static,
    F: Clone + Send + 'static,
{
    pub fn new(update: Update<M, E, F>, output: Publisher<Next<M, F>>) -> Self {
        Self {
            update,
            output,
            state: Mutex::new(ProcessorState {
                current: None,
                queued: Vec::new(),
            }),
        }
    }

    /// Sets the initial model, posts it with the initial effects, then
    /// replays the events queued so far.
    pub fn start(&self, first: First<M, F>) {
        let (model, effects) = first.into_parts();
        let queued = {
            let mut state = self.state.lock();
            if state.current.is_some() {
                drop(state);
                fatal(MisuseError::AlreadyStarted);
            }
            state.current = Some(model.clone());
            std::mem::take(&mut state.queued)
        };

        self.output.post(Next::next_with(model, effects));

        for event in queued {
            self.accept(event);
        }
    }

    /// Processes `event`, or queues it when not started yet.
    pub fn accept(&self, event: E) {
        let model = {
            let mut state = self.state.lock();
            match state.current.as_ref() {
                Some(model) => model.clone(),
                None => {
                    state.queued.push(event);
                    return;
                }
            }
        };

        let next = self.update.call(&model, event);
        if let Some(model) = next.model() {
            self.state.lock().current = Some(model.clone());
        }
        self.output.post(next);
    }

    /// Returns the current model.
    ///
    /// Reading before [`start`](Self::start) is misuse.
    pub fn latest_model(&self) -> M {
        let current = self.state.lock().current.clone();
        match current {
            Some(model) => model,
            None => fatal(MisuseError::ModelReadBeforeStart),
        }
    }

    pub fn is_started(&self) -> bool {
        self.state.lock().current.is_some()
    }

    /// Number of events waiting for `start`.
    pub fn queued_len(&self) -> usize {
        self.state.lock().queued.len()
    }
}

impl<M, E, F> EventProcessor<M, E, F> {
    /// Closes the downstream publisher.
    pub fn dispose(&self) {
        self.output.dispose();
    }
}
