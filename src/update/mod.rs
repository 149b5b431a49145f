//! # Update functions and their outcomes.
//!
//! - [`Next`] / [`First`]: outcome of one update / seed of a loop
//! - [`Update`] / [`Initiate`]: the functions themselves, decorated by value

mod next;
#[allow(clippy::module_inception)]
mod update;

pub use next::{First, Next};
pub use update::{Initiate, Update};
