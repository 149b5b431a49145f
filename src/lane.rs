//! # Execution lanes.
//!
//! A [`Lane`] runs [`Job`]s. The controller uses two of them: one to redirect
//! view-originated events onto the loop, one to deliver models to the view.
//!
//! - [`ImmediateLane`] runs the job inline on the calling thread.
//! - [`SerialLane`] hands jobs to a dedicated tokio worker that runs them one
//!   at a time, in submission order.
//!
//! ## Architecture
//! ```text
//! execute(job) ──► [unbounded queue] ──► worker task ──► job()
//!                                             └──────► panic → warn!, continue
//! ```
//!
//! ## Rules
//! - **Per-lane FIFO**: jobs submitted from one thread run in that order.
//! - **Isolation**: a panicking job is logged and the worker keeps going.
//! - **Shutdown**: after [`SerialLane::shutdown`] new jobs are dropped.

use std::panic::{self, AssertUnwindSafe};

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Unit of deferred work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run jobs, now or later.
pub trait Lane: Send + Sync + 'static {
    /// Runs or schedules `job`.
    fn execute(&self, job: Job);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Runs every job synchronously on the caller's thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateLane;

impl Lane for ImmediateLane {
    fn execute(&self, job: Job) {
        job();
    }

    fn name(&self) -> &'static str {
        "immediate"
    }
}

/// Serial lane backed by a single tokio worker task.
///
/// Cheap to clone; clones feed the same worker.
#[derive(Clone, Debug)]
pub struct SerialLane {
    name: &'static str,
    tx: mpsc::UnboundedSender<Job>,
    token: CancellationToken,
}

impl SerialLane {
    /// Spawns the worker on the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside of a tokio runtime.
    #[must_use]
    pub fn spawn(name: &'static str) -> Self {
        Self::spawn_on(name, &tokio::runtime::Handle::current())
    }

    /// Spawns the worker on the given runtime handle.
    #[must_use]
    pub fn spawn_on(name: &'static str, handle: &tokio::runtime::Handle) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let token = CancellationToken::new();
        let stop = token.clone();

        handle.spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => break,
                    job = rx.recv() => match job {
                        Some(job) => run_isolated(name, job),
                        None => break,
                    },
                }
            }
            tracing::debug!(lane = name, "lane worker stopped");
        });

        Self { name, tx, token }
    }

    /// Resolves once every job submitted before this call has run.
    ///
    /// Returns immediately if the lane was shut down.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel::<()>();
        let job: Job = Box::new(move || {
            let _ = done.send(());
        });
        if self.tx.send(job).is_err() {
            return;
        }
        let _ = wait.await;
    }

    /// Stops the worker; pending and future jobs are dropped.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Returns true once [`shutdown`](Self::shutdown) was requested.
    pub fn is_shut_down(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Lane for SerialLane {
    fn execute(&self, job: Job) {
        if self.token.is_cancelled() || self.tx.send(job).is_err() {
            tracing::trace!(lane = self.name, "job dropped: lane is shut down");
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

fn run_isolated(lane: &'static str, job: Job) {
    if let Err(panic_err) = panic::catch_unwind(AssertUnwindSafe(job)) {
        let info = if let Some(msg) = panic_err.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = panic_err.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        tracing::warn!(lane, info = %info, "lane job panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_immediate_lane_runs_inline() {
        let hits = Arc::new(Mutex::new(0));
        let h = hits.clone();
        ImmediateLane.execute(Box::new(move || *h.lock() += 1));
        assert_eq!(*hits.lock(), 1);
        assert_eq!(ImmediateLane.name(), "immediate");
    }

    #[tokio::test]
    async fn test_serial_lane_preserves_submission_order() {
        let lane = SerialLane::spawn("ordered");
        assert_eq!(lane.name(), "ordered");
        let seen = Arc::new(Mutex::new(Vec::new()));
        for i in 0..50 {
            let s = seen.clone();
            lane.execute(Box::new(move || s.lock().push(i)));
        }
        lane.flush().await;
        assert_eq!(*seen.lock(), (0..50).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_serial_lane_survives_panicking_job() {
        let lane = SerialLane::spawn("panicky");
        let seen = Arc::new(Mutex::new(Vec::new()));
        lane.execute(Box::new(|| panic!("boom")));
        let s = seen.clone();
        lane.execute(Box::new(move || s.lock().push("after")));
        lane.flush().await;
        assert_eq!(*seen.lock(), vec!["after"]);
    }

    #[tokio::test]
    async fn test_serial_lane_drops_jobs_after_shutdown() {
        let lane = SerialLane::spawn("closing");
        lane.shutdown();
        assert!(lane.is_shut_down());
        let seen = Arc::new(Mutex::new(0));
        let s = seen.clone();
        lane.execute(Box::new(move || *s.lock() += 1));
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(*seen.lock(), 0);
    }
}
