use std::sync::Arc;

use crate::{
    connections::{Connectable, ConnectableFn, EventSource, NoEventSource},
    core::{config::LoopConfig, event_loop::Loop},
    logging::LoopLogger,
    update::{First, Next, Update},
};

/// Builder for constructing a [`Loop`] with optional collaborators.
///
/// Cloning is cheap; a controller keeps a clone to build a fresh loop on
/// every start.
pub struct LoopBuilder<M, E, F> {
    update: Update<M, E, F>,
    logged: Option<Update<M, E, F>>,
    effect_handler: Arc<dyn Connectable<F, E>>,
    event_source: Arc<dyn EventSource<E>>,
    logger: Option<Arc<dyn LoopLogger<M, E, F>>>,
    config: LoopConfig,
}

impl<M, E, F> Clone for LoopBuilder<M, E, F> {
    fn clone(&self) -> Self {
        Self {
            update: self.update.clone(),
            logged: self.logged.clone(),
            effect_handler: Arc::clone(&self.effect_handler),
            event_source: Arc::clone(&self.event_source),
            logger: self.logger.clone(),
            config: self.config.clone(),
        }
    }
}

impl<M, E, F> Loop<M, E, F>
where
    M: Clone + Send + 'static,
    E: Send + 'static,
    F: Clone + Send + 'static,
{
    /// Starts a builder around `update`.
    ///
    /// Without further configuration the loop ignores effects, has no event
    /// source and uses [`LoopConfig::default`].
    pub fn builder(update: impl Fn(&M, E) -> Next<M, F> + Send + Sync + 'static) -> LoopBuilder<M, E, F> {
        LoopBuilder::new(Update::new(update))
    }
}

impl<M, E, F> LoopBuilder<M, E, F>
where
    M: Clone + Send + 'static,
    E: Send + 'static,
    F: Clone + Send + 'static,
{
    pub fn new(update: Update<M, E, F>) -> Self {
        Self {
            update,
            logged: None,
            effect_handler: Arc::new(ConnectableFn::<F, E>::ignoring()),
            event_source: Arc::new(NoEventSource),
            logger: None,
            config: LoopConfig::default(),
        }
    }

    /// Sets the handler that receives effects and emits events.
    pub fn with_effect_handler(mut self, handler: impl Connectable<F, E>) -> Self {
        self.effect_handler = Arc::new(handler);
        self
    }

    /// Sets the source of external events.
    pub fn with_event_source(mut self, source: impl EventSource<E>) -> Self {
        self.event_source = Arc::new(source);
        self
    }

    /// Reports every update (and, for controllers, every initiate) to `logger`.
    ///
    /// Replaces a previously set logger.
    pub fn with_logger(mut self, logger: impl LoopLogger<M, E, F> + 'static) -> Self
    where
        E: Clone,
    {
        let logger: Arc<dyn LoopLogger<M, E, F>> = Arc::new(logger);
        self.logged = Some(self.update.clone().logged(Arc::clone(&logger)));
        self.logger = Some(logger);
        self
    }

    pub fn with_config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub(crate) fn logger(&self) -> Option<Arc<dyn LoopLogger<M, E, F>>> {
        self.logger.clone()
    }

    /// Starts a loop from `model` with no initial effects.
    pub fn start(&self, model: M) -> Loop<M, E, F> {
        self.start_from(First::new(model))
    }

    /// Starts a loop from a full starting point.
    pub fn start_from(&self, first: First<M, F>) -> Loop<M, E, F> {
        let update = self.logged.clone().unwrap_or_else(|| self.update.clone());
        Loop::new(
            update,
            first,
            &self.effect_handler,
            &self.event_source,
            &self.config,
        )
    }
}
