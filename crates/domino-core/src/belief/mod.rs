//! Event-driven belief tracking over the zone partition.
//!
//! - `tracker`: the caller-owned [`Belief`] and the events it consumes.
//! - `cache`: estimates reused while the belief is unchanged.

mod cache;
mod tracker;

pub use cache::{EstimateCache, EstimateKey};
pub use tracker::{Belief, BeliefUpdate};
