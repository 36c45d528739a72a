//! Plain data records for the foraging simulation.

pub mod agent;
pub mod geometry;
pub mod snapshot;
pub mod terrain;
