use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};

/// Terrain type for world cells.
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
pub enum TerrainKind {
    /// Open ground.
    #[default]
    Empty,
    /// Impassable obstacle.
    Wall,
    /// Food source; `food_amount` holds the remaining units.
    Food,
    /// Colony nest; `owning_colony` names the owner.
    Nest,
    /// Impassable water.
    Water,
}

impl TerrainKind {
    /// Agents may stand on empty ground, food and nests.
    #[must_use]
    pub fn is_walkable(self) -> bool {
        matches!(self, TerrainKind::Empty | TerrainKind::Food | TerrainKind::Nest)
    }

    /// Stable numeric code used by the binary save format.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            TerrainKind::Empty => 0,
            TerrainKind::Wall => 1,
            TerrainKind::Food => 2,
            TerrainKind::Nest => 3,
            TerrainKind::Water => 4,
        }
    }

    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(TerrainKind::Empty),
            1 => Some(TerrainKind::Wall),
            2 => Some(TerrainKind::Food),
            3 => Some(TerrainKind::Nest),
            4 => Some(TerrainKind::Water),
            _ => None,
        }
    }
}

/// The two pheromone channels every cell carries.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub enum PheromoneChannel {
    /// Laid by returning agents; leads searchers to food.
    Food,
    /// Laid by searching agents; leads carriers home.
    Home,
}

/// Complete state of one grid cell.
///
/// Inside the engine terrain and pheromone are stored in separate buffers;
/// this is the composed view handed to renderers and persistence.
#[derive(
    Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct Cell {
    pub terrain: TerrainKind,
    pub pheromone_food: f32,
    pub pheromone_home: f32,
    pub food_amount: u32,
    pub owning_colony: Option<u32>,
}

impl Cell {
    #[must_use]
    pub fn pheromone(&self, channel: PheromoneChannel) -> f32 {
        match channel {
            PheromoneChannel::Food => self.pheromone_food,
            PheromoneChannel::Home => self.pheromone_home,
        }
    }

    /// Owner is set exactly on nests, and stored food implies a food cell.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let owner_ok = self.owning_colony.is_some() == (self.terrain == TerrainKind::Nest);
        let food_ok = self.food_amount == 0 || self.terrain == TerrainKind::Food;
        let pheromone_ok = self.pheromone_food >= 0.0 && self.pheromone_home >= 0.0;
        owner_ok && food_ok && pheromone_ok
    }
}
