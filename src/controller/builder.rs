use std::sync::Arc;

use crate::{
    core::LoopBuilder,
    lane::{ImmediateLane, Lane, SerialLane},
    update::{First, Initiate},
};

use super::core::Controller;

impl<M, E, F> LoopBuilder<M, E, F>
where
    M: Clone + Send + 'static,
    E: Send + 'static,
    F: Clone + Send + 'static,
{
    /// Turns this builder into the loop factory of a [`Controller`] that
    /// starts out stopped with `model` as its resume model.
    ///
    /// Requires the `controller` feature flag.
    pub fn controller(self, model: M) -> ControllerBuilder<M, E, F> {
        ControllerBuilder {
            loops: self,
            model,
            initiate: None,
            loop_lane: Arc::new(ImmediateLane),
            view_lane: None,
        }
    }
}

/// Builder for a [`Controller`].
///
/// The loop lane defaults to [`ImmediateLane`]. The view lane defaults to a
/// [`SerialLane`] spawned on the current tokio runtime at [`build`](Self::build);
/// outside a runtime it falls back to [`ImmediateLane`].
pub struct ControllerBuilder<M, E, F> {
    loops: LoopBuilder<M, E, F>,
    model: M,
    initiate: Option<Initiate<M, F>>,
    loop_lane: Arc<dyn Lane>,
    view_lane: Option<Arc<dyn Lane>>,
}

impl<M, E, F> ControllerBuilder<M, E, F>
where
    M: Clone + Send + 'static,
    E: Send + 'static,
    F: Clone + Send + 'static,
{
    /// Sets the function that turns the resume model into a starting point
    /// on every start. Reported to the loop logger, if one is set.
    pub fn with_initiate(mut self, initiate: impl Fn(M) -> First<M, F> + Send + Sync + 'static) -> Self {
        let initiate = Initiate::new(initiate);
        self.initiate = Some(match self.loops.logger() {
            Some(logger) => initiate.logged(logger),
            None => initiate,
        });
        self
    }

    /// Lane on which view-originated events are dispatched into the loop.
    pub fn with_loop_lane(mut self, lane: impl Lane) -> Self {
        self.loop_lane = Arc::new(lane);
        self
    }

    /// Lane on which models are delivered to the view.
    pub fn with_view_lane(mut self, lane: impl Lane) -> Self {
        self.view_lane = Some(Arc::new(lane));
        self
    }

    /// Builds the controller in the stopped phase.
    pub fn build(self) -> Controller<M, E, F> {
        let view_lane = self.view_lane.unwrap_or_else(default_view_lane);
        Controller::new(self.loops, self.model, self.initiate, self.loop_lane, view_lane)
    }
}

fn default_view_lane() -> Arc<dyn Lane> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Arc::new(SerialLane::spawn_on("view", &handle)),
        Err(_) => {
            tracing::debug!("no tokio runtime: view models are delivered inline");
            Arc::new(ImmediateLane)
        }
    }
}
