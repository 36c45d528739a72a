use crate::data::geometry::{Direction, Position};
use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};

/// Mutually exclusive primary state of a foraging agent.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub enum AgentState {
    /// Looking for food.
    #[default]
    Searching,
    /// Heading back to the nest.
    Returning,
    /// Terminal. Removed at the next reap.
    Dead,
}

/// Flattened agent state used for persistence and snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct AgentRecord {
    pub id: u32,
    pub colony_id: u32,
    pub position: Position,
    pub previous_position: Position,
    pub state: AgentState,
    pub carrying: bool,
    pub tired: bool,
    pub energy: f32,
    pub food_carrying: u32,
    pub steps_taken: u32,
    pub food_delivered: u32,
    pub preferred_direction: Option<Direction>,
    pub trail: Vec<Position>,
}
