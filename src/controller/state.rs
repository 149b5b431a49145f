use std::fmt;
use std::sync::Arc;

use crate::connections::{CompositeDisposable, Connectable};
use crate::core::Loop;

/// Shared view handle, kept across restarts.
pub(super) type View<M, E> = Arc<dyn Connectable<M, E>>;

/// What a running controller owns.
pub(super) struct Running<M, E, F>
where
    M: Clone + Send + 'static,
    E: Send + 'static,
    F: Clone + Send + 'static,
{
    pub lp: Loop<M, E, F>,
    pub view: Option<View<M, E>>,
    /// Model observer, then view connection.
    pub bindings: CompositeDisposable,
}

/// Internal state of a controller.
pub(super) enum ControllerState<M, E, F>
where
    M: Clone + Send + 'static,
    E: Send + 'static,
    F: Clone + Send + 'static,
{
    /// Holds the model to resume from and the view to connect on start.
    Stopped { model: M, view: Option<View<M, E>> },

    /// A loop is being built.
    TransitioningToRunning,

    Running(Running<M, E, F>),

    /// The loop is being torn down.
    TransitioningToStopped,
}

impl<M, E, F> ControllerState<M, E, F>
where
    M: Clone + Send + 'static,
    E: Send + 'static,
    F: Clone + Send + 'static,
{
    pub fn phase(&self) -> ControllerPhase {
        match self {
            Self::Stopped { .. } => ControllerPhase::Stopped,
            Self::TransitioningToRunning => ControllerPhase::TransitioningToRunning,
            Self::Running(_) => ControllerPhase::Running,
            Self::TransitioningToStopped => ControllerPhase::TransitioningToStopped,
        }
    }
}

/// Observable phase of a [`Controller`](crate::Controller).
///
/// Transitional phases exist so that queries from other threads get a stable
/// answer while a start or stop is in flight, without waiting for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerPhase {
    Stopped,
    TransitioningToRunning,
    Running,
    TransitioningToStopped,
}

impl ControllerPhase {
    /// Returns true for `Running` and `TransitioningToStopped`.
    ///
    /// A stop in progress still counts as running: the loop exists until the
    /// transition completes.
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running | Self::TransitioningToStopped)
    }

    /// Short stable label (for logs/metrics).
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::TransitioningToRunning => "starting",
            Self::Running => "running",
            Self::TransitioningToStopped => "stopping",
        }
    }
}

impl fmt::Display for ControllerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
