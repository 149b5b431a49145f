//! # WorkQueue: reentrancy-collapsing task runner.
//!
//! Effect handlers may call back into the loop synchronously. If every such
//! call drained the queue itself, the update function would run recursively
//! against a stale model. The [`WorkQueue`] collapses nested drains into the
//! outermost one instead:
//!
//! ```text
//! service()                       ← outermost drain
//!   ├─► task A
//!   │     └─► submit(B); service()   ← nested: no-op, B stays queued
//!   ├─► task B                       ← picked up by the outer drain
//!   └─► queue empty → return
//! ```
//!
//! ## Rules
//! - Every submitted task runs **exactly once**, at the top level of a drain.
//! - Pick order follows [`WorkOrder`]; with `Randomized` callers cannot come
//!   to depend on incidental FIFO order.
//! - A **gated** queue holds tasks until [`start`](WorkQueue::start).
//! - A panicking task releases the drain flag; remaining tasks stay queued.

use parking_lot::Mutex;
use rand::Rng;

use crate::lane::Job;

/// Order in which a drain picks pending tasks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WorkOrder {
    /// Pick a random pending task each time.
    ///
    /// Only the causal ordering of the loop is guaranteed; this keeps it that way.
    #[default]
    Randomized,

    /// Pick tasks in submission order.
    ///
    /// A stronger guarantee than the loop needs; opt in when reproducible
    /// traces matter more than catching order dependencies.
    Fifo,
}

struct WorkState {
    tasks: Vec<Job>,
    servicing: bool,
    started: bool,
}

/// Reentrancy-guarded queue of closures.
pub struct WorkQueue {
    order: WorkOrder,
    state: Mutex<WorkState>,
}

impl WorkQueue {
    /// Creates an active queue.
    pub fn new(order: WorkOrder) -> Self {
        Self::with_started(order, true)
    }

    /// Creates a queue that holds tasks until [`start`](Self::start).
    pub fn gated(order: WorkOrder) -> Self {
        Self::with_started(order, false)
    }

    fn with_started(order: WorkOrder, started: bool) -> Self {
        Self {
            order,
            state: Mutex::new(WorkState {
                tasks: Vec::new(),
                servicing: false,
                started,
            }),
        }
    }

    /// Appends a task. It runs on the next (or current) drain.
    pub fn submit(&self, task: impl FnOnce() + Send + 'static) {
        self.state.lock().tasks.push(Box::new(task));
    }

    /// Activates a gated queue and drains it.
    pub fn start(&self) {
        self.state.lock().started = true;
        self.service();
    }

    /// Drains until empty, unless a drain is already in progress or the
    /// queue is still gated.
    pub fn service(&self) {
        {
            let mut state = self.state.lock();
            if !state.started || state.servicing {
                return;
            }
            state.servicing = true;
        }
        let _unwind = scopeguard::guard_on_unwind(&self.state, |state| {
            state.lock().servicing = false;
        });

        loop {
            let task = {
                let mut state = self.state.lock();
                match self.pick(&mut state.tasks) {
                    Some(task) => task,
                    None => {
                        state.servicing = false;
                        break;
                    }
                }
            };
            task();
        }
    }

    fn pick(&self, tasks: &mut Vec<Job>) -> Option<Job> {
        if tasks.is_empty() {
            return None;
        }
        match self.order {
            WorkOrder::Fifo => Some(tasks.remove(0)),
            WorkOrder::Randomized => {
                let idx = rand::rng().random_range(0..tasks.len());
                Some(tasks.swap_remove(idx))
            }
        }
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.state.lock().tasks.len()
    }

    pub fn is_servicing(&self) -> bool {
        self.state.lock().servicing
    }

    pub fn is_started(&self) -> bool {
        self.state.lock().started
    }
}
