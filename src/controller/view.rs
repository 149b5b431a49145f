//! View delivery on a dedicated lane.
//!
//! [`LaneView`] wraps a view so that every model it accepts is delivered on
//! the view lane instead of the loop's serialization point.
//!
//! ## Rules
//! - A delivery queued before `dispose` but run after it is skipped.
//! - `dispose` never waits for a delivery running on another thread; it
//!   only flips the alive flag and tears the view down.
//! - [`ViewBinding::deliver`] drops models silently once disposed, so a
//!   publisher broadcasting from a stale snapshot never reports misuse.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::connections::{Connectable, Connection, Consumer};
use crate::lane::Lane;

pub(super) struct LaneView<M, E> {
    view: Arc<dyn Connectable<M, E>>,
    lane: Arc<dyn Lane>,
}

/// A connected view: the silent delivery path plus the owning connection.
pub(super) struct ViewBinding<M> {
    pub deliver: Consumer<M>,
    pub connection: Connection<M>,
}

impl<M, E> LaneView<M, E>
where
    M: Send + 'static,
    E: 'static,
{
    pub fn new(view: Arc<dyn Connectable<M, E>>, lane: Arc<dyn Lane>) -> Self {
        Self { view, lane }
    }

    pub fn attach(&self, output: Consumer<E>) -> ViewBinding<M> {
        let inner = self.view.connect(output);
        let alive = Arc::new(AtomicBool::new(true));
        let lane = Arc::clone(&self.lane);

        let deliver: Consumer<M> = {
            let inner = inner.clone();
            let alive = Arc::clone(&alive);
            Arc::new(move |model: M| {
                if !alive.load(Ordering::Acquire) {
                    tracing::trace!(lane = lane.name(), "model dropped: view disconnected");
                    return;
                }
                let inner = inner.clone();
                let alive = Arc::clone(&alive);
                lane.execute(Box::new(move || {
                    if !alive.load(Ordering::Acquire) || !inner.try_accept(model) {
                        tracing::trace!("queued model dropped: view disconnected");
                    }
                }));
            })
        };
        let connection = Connection::from_consumer(Arc::clone(&deliver), move || {
            alive.store(false, Ordering::Release);
            inner.dispose();
        });
        ViewBinding { deliver, connection }
    }
}

impl<M, E> Connectable<M, E> for LaneView<M, E>
where
    M: Send + 'static,
    E: 'static,
{
    fn connect(&self, output: Consumer<E>) -> Connection<M> {
        self.attach(output).connection
    }
}
