//! Loop core: the pieces every loop is assembled from.
//!
//! Internal modules:
//! - [`work_queue`]: reentrancy-collapsing task runner with a pluggable pick order;
//! - [`publisher`]: multicast broadcaster that replays the latest value;
//! - [`processor`]: owns the model and drives the update function;
//! - [`event_loop`]: wires the above with an effect handler and an event source;
//! - [`builder`]: fluent construction of loops;
//! - [`config`]: loop settings.

mod builder;
mod config;
mod event_loop;
mod processor;
mod publisher;
mod work_queue;

pub use builder::LoopBuilder;
pub use config::LoopConfig;
pub use event_loop::Loop;
pub use processor::EventProcessor;
pub use publisher::Publisher;
pub use work_queue::{WorkOrder, WorkQueue};
