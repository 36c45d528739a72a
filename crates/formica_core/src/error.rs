//! Error types for the simulation engine.
//!
//! Construction and command failures are reported through [`SimError`];
//! blocked moves and empty queries are not errors and never reach it.

use formica_data::Position;
use thiserror::Error;

/// Main error type for formica_core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Malformed construction parameters
    #[error("Validation error: {0}")]
    Validation(String),

    /// Colony id outside the world's colony table
    #[error("Unknown colony: {0}")]
    InvalidColony(u32),

    /// Position outside the grid
    #[error("Position out of bounds: {0}")]
    OutOfBounds(Position),

    /// Spawn refused because the colony is full
    #[error("Colony {colony} is at capacity ({capacity} agents)")]
    CapacityReached { colony: u32, capacity: u32 },

    /// Spawn refused because the colony has no nest on the grid yet
    #[error("Colony {0} has no nest")]
    NestNotPlaced(u32),

    /// Agent record violating the state invariants
    #[error("Invalid agent: {0}")]
    InvalidAgent(String),
}

/// Result type alias for formica_core operations.
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    /// Creates a new validation error.
    #[must_use]
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a new invalid agent error.
    #[must_use]
    pub fn invalid_agent<S: Into<String>>(msg: S) -> Self {
        Self::InvalidAgent(msg.into())
    }
}
