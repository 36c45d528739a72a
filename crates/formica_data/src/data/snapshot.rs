//! Whole-world snapshots exchanged with persistence and renderers.

use crate::data::agent::AgentRecord;
use crate::data::geometry::Position;
use crate::data::terrain::Cell;
use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct ColonySnapshot {
    pub id: u32,
    pub nest_position: Option<Position>,
    pub food_collected: u32,
    pub total_count: u32,
    pub active_count: u32,
    pub efficiency_score: f32,
    pub agents: Vec<AgentRecord>,
}

/// Field-by-field copy of a world between ticks.
///
/// `cells` is row-major, `width * height` long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct WorldSnapshot {
    pub width: u16,
    pub height: u16,
    pub tick: u64,
    pub cells: Vec<Cell>,
    pub colonies: Vec<ColonySnapshot>,
}

impl WorldSnapshot {
    #[must_use]
    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width as i32 || pos.y >= self.height as i32 {
            return None;
        }
        self.cells
            .get(pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// Food units still lying on food cells.
    #[must_use]
    pub fn remaining_food(&self) -> u64 {
        self.cells.iter().map(|c| u64::from(c.food_amount)).sum()
    }

    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.colonies.iter().map(|c| c.agents.len()).sum()
    }
}
