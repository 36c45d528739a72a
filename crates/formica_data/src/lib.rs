//! Core data structures for the Formica simulation.
//!
//! Everything here is plain data shared between the engine, the persistence
//! layer and any renderer. Behaviour lives in `formica_core`.

pub mod data;

pub use data::agent::{AgentRecord, AgentState};
pub use data::geometry::{Direction, Position};
pub use data::snapshot::{ColonySnapshot, WorldSnapshot};
pub use data::terrain::{Cell, PheromoneChannel, TerrainKind};
