//! # TracingLogger: `tracing` backed loop logger.
//!
//! Emits one `debug!` line per hook, with the loop name as a field.
//!
//! ## Example output
//! ```text
//! DEBUG statevisor: initiating name="counter" model=0
//! DEBUG statevisor: loop initialized name="counter" model=0 effects=[]
//! DEBUG statevisor: event received name="counter" model=0 event=1
//! DEBUG statevisor: model updated name="counter" event=1 model=Some(1) effects=[]
//! ```

use std::borrow::Cow;
use std::fmt::Debug;

use crate::logging::LoopLogger;
use crate::update::{First, Next};

/// Loop logger writing through `tracing`.
#[derive(Clone, Debug)]
pub struct TracingLogger {
    name: Cow<'static, str>,
}

impl TracingLogger {
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new("loop")
    }
}

impl<M, E, F> LoopLogger<M, E, F> for TracingLogger
where
    M: Debug,
    E: Debug,
    F: Debug,
{
    fn will_initiate(&self, model: &M) {
        tracing::debug!(name = %self.name, ?model, "initiating");
    }

    fn did_initiate(&self, _model: &M, first: &First<M, F>) {
        tracing::debug!(
            name = %self.name,
            model = ?first.model(),
            effects = ?first.effects(),
            "loop initialized"
        );
    }

    fn will_update(&self, model: &M, event: &E) {
        tracing::debug!(name = %self.name, ?model, ?event, "event received");
    }

    fn did_update(&self, _model: &M, event: &E, next: &Next<M, F>) {
        tracing::debug!(
            name = %self.name,
            ?event,
            model = ?next.model(),
            effects = ?next.effects(),
            "model updated"
        );
    }
}
