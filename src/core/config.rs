//! # Loop configuration.
//!
//! Provides [`LoopConfig`], the runtime settings shared by a loop and every
//! loop a controller builds from the same builder.
//!
//! ## Defaults
//! - `work_order = Randomized` → only causal ordering is guaranteed
//! - `name = "loop"` → label attached to lifecycle log lines

use std::borrow::Cow;

use crate::core::work_queue::WorkOrder;

/// Settings for one loop.
///
/// ## Field semantics
/// - `work_order`: pick order of the internal work queue
/// - `name`: label for log lines (`tracing` field `name`)
#[derive(Clone, Debug)]
pub struct LoopConfig {
    /// Order in which queued events and effects are picked.
    ///
    /// Externally dispatched events from one thread are processed in dispatch
    /// order regardless of this setting; it only affects work queued within
    /// one drain (effects of one update, events emitted by effect handlers).
    pub work_order: WorkOrder,

    /// Label used in log lines.
    pub name: Cow<'static, str>,
}

impl LoopConfig {
    /// Config with FIFO work order, for reproducible traces.
    pub fn fifo() -> Self {
        Self {
            work_order: WorkOrder::Fifo,
            ..Self::default()
        }
    }

    /// Returns a copy with the given name.
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            work_order: WorkOrder::Randomized,
            name: Cow::Borrowed("loop"),
        }
    }
}
