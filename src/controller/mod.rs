//! # Controller: start/stop state machine around a loop.
//!
//! ## Architecture
//! ```text
//!                 connect_view / disconnect_view / replace_model
//!                           ┌──────────┐
//!                           ▼          │
//!   build() ──► Stopped{model, view?} ─┘
//!                  │             ▲
//!          start() │             │ stop(): model = loop.latest_model()
//!                  ▼             │
//!     TransitioningToRunning   TransitioningToStopped
//!                  │             ▲
//!                  ▼             │
//!             Running{loop, view connection, observer}
//! ```
//!
//! While running:
//! ```text
//! loop models ──► observer ──► view lane ──► view.accept(model)
//! view events ──► loop lane ──► loop.dispatch (unguarded: dropped after stop)
//! ```
//!
//! ## Rules
//! - The view may only change while stopped.
//! - A restart resumes from the last model observed before `stop`.
//! - `is_running` is `true` for `Running` and `TransitioningToStopped`.

mod builder;
mod core;
mod state;
mod view;

pub use builder::ControllerBuilder;
pub use core::Controller;
pub use state::ControllerPhase;
