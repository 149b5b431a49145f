//! Programmer-error taxonomy of the loop runtime.
//!
//! [`MisuseError`] enumerates every protocol violation the runtime can detect:
//! dispatching into a disposed loop, calling `start` on a running controller,
//! reading a model before the loop was initialized, and so on.
//!
//! These errors are never returned to callers. They are handed to the
//! process-wide fatal hook (see [`crate::fatal`]), which aborts by default and
//! can be replaced for tests or for log-and-continue builds.
//!
//! Like the rest of the runtime's errors the type provides `as_label` for
//! logs/metrics.

use thiserror::Error;

/// # Protocol violations detected by the runtime.
///
/// Each variant describes a caller bug. Continuing past one would break a
/// state invariant, so the runtime never recovers locally.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MisuseError {
    /// An event was dispatched into a loop that has already been disposed.
    #[error("cannot dispatch an event: the loop has been disposed")]
    DispatchAfterDispose,

    /// A value was handed to a connection that has already been disposed.
    #[error("cannot accept a value: the connection has been disposed")]
    AcceptAfterDispose,

    /// A publisher operation was invoked after the publisher was disposed.
    #[error("cannot {operation}: the publisher has been disposed")]
    PublisherDisposed {
        /// The rejected operation (`"connect"` or `"post"`).
        operation: &'static str,
    },

    /// The current model was read before the event processor was started.
    #[error("the model cannot be read before the loop has been started")]
    ModelReadBeforeStart,

    /// An event processor was started a second time.
    #[error("the event processor has already been started")]
    AlreadyStarted,

    /// `start` was called on a controller that is not stopped.
    #[error("cannot start a controller that is already running")]
    AlreadyRunning,

    /// `stop` was called on a controller that is not running.
    #[error("cannot stop a controller that is not running")]
    NotRunning,

    /// `connect_view` was called while a view is already connected.
    #[error("a view is already connected; disconnect it first")]
    ViewAlreadyConnected,

    /// `disconnect_view` was called without a connected view.
    #[error("no view is connected")]
    NoViewConnected,

    /// The view was connected or disconnected while the controller was running.
    #[error("the view can only be {operation} while the controller is stopped")]
    ViewChangeWhileRunning {
        /// `"connected"` or `"disconnected"`.
        operation: &'static str,
    },

    /// `replace_model` was called while the controller was running.
    #[error("the model can only be replaced while the controller is stopped")]
    ReplaceModelWhileRunning,

    /// The controller model was read from inside a start/stop transition.
    #[error("the controller model cannot be read while it is starting or stopping")]
    ModelReadWhileTransitioning,
}

impl MisuseError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use statevisor::MisuseError;
    ///
    /// assert_eq!(MisuseError::NotRunning.as_label(), "controller_not_running");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            MisuseError::DispatchAfterDispose => "loop_dispatch_after_dispose",
            MisuseError::AcceptAfterDispose => "connection_accept_after_dispose",
            MisuseError::PublisherDisposed { .. } => "publisher_disposed",
            MisuseError::ModelReadBeforeStart => "model_read_before_start",
            MisuseError::AlreadyStarted => "processor_already_started",
            MisuseError::AlreadyRunning => "controller_already_running",
            MisuseError::NotRunning => "controller_not_running",
            MisuseError::ViewAlreadyConnected => "controller_view_already_connected",
            MisuseError::NoViewConnected => "controller_no_view_connected",
            MisuseError::ViewChangeWhileRunning { .. } => "controller_view_change_while_running",
            MisuseError::ReplaceModelWhileRunning => "controller_replace_model_while_running",
            MisuseError::ModelReadWhileTransitioning => "controller_model_read_while_transitioning",
        }
    }

    /// Returns `true` for violations of the controller state machine.
    pub fn is_controller_misuse(&self) -> bool {
        matches!(
            self,
            MisuseError::AlreadyRunning
                | MisuseError::NotRunning
                | MisuseError::ViewAlreadyConnected
                | MisuseError::NoViewConnected
                | MisuseError::ViewChangeWhileRunning { .. }
                | MisuseError::ReplaceModelWhileRunning
                | MisuseError::ModelReadWhileTransitioning
        )
    }
}
