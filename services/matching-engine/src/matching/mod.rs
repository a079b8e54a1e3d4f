//! Matching logic
//!
//! Price-time priority matching, split into a read-only planning pass over
//! the opposite ladder and a commit pass that settles cash and persists
//! state through the external ports.

pub mod crossing;
pub mod plan;
pub mod settlement;

pub use crossing::crosses;
pub use plan::FillPlan;
