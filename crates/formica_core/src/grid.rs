//! Bounds-checked cell storage and terrain queries.

use crate::config::PheromoneConfig;
use crate::error::{Result, SimError};
use crate::pheromone::PheromoneField;
use formica_data::{Cell, Direction, Position, TerrainKind};
use serde::{Deserialize, Serialize};

/// Terrain part of a cell. Pheromone lives in [`PheromoneField`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainCell {
    pub terrain: TerrainKind,
    pub food_amount: u32,
    pub owner: Option<u32>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Grid {
    width: u16,
    height: u16,
    cells: Vec<TerrainCell>,
    pub pheromones: PheromoneField,
}

impl Grid {
    pub fn new(width: u16, height: u16, params: PheromoneConfig) -> Self {
        Self {
            width,
            height,
            cells: vec![TerrainCell::default(); width as usize * height as usize],
            pheromones: PheromoneField::new(width, height, params),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline(always)]
    pub fn index(&self, pos: Position) -> Option<usize> {
        self.is_valid(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    #[inline]
    pub fn is_valid(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    pub fn is_walkable(&self, pos: Position) -> bool {
        self.terrain_at(pos)
            .map(|cell| cell.terrain.is_walkable())
            .unwrap_or(false)
    }

    pub fn terrain_at(&self, pos: Position) -> Option<&TerrainCell> {
        self.index(pos).map(|idx| &self.cells[idx])
    }

    /// Full cell view including both pheromone channels.
    pub fn cell_at(&self, pos: Position) -> Option<Cell> {
        let terrain = self.terrain_at(pos)?;
        let pheromone = self.pheromones.get_cell(pos).copied().unwrap_or_default();
        Some(Cell {
            terrain: terrain.terrain,
            pheromone_food: pheromone.food,
            pheromone_home: pheromone.home,
            food_amount: terrain.food_amount,
            owning_colony: terrain.owner,
        })
    }

    /// Neighbours of `pos` an agent could step onto, in scan order.
    pub fn walkable_neighbors(&self, pos: Position) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |d| self.is_walkable(pos.step(*d)))
    }

    /// Resets terrain, food, owner and pheromone of a cell.
    pub fn clear_cell(&mut self, pos: Position) -> Result<()> {
        let idx = self.index(pos).ok_or(SimError::OutOfBounds(pos))?;
        self.cells[idx] = TerrainCell::default();
        self.pheromones.clear(pos);
        Ok(())
    }

    fn occupy(&mut self, pos: Position, cell: TerrainCell) -> Result<()> {
        let idx = match self.index(pos) {
            Some(idx) => idx,
            None => {
                tracing::warn!(%pos, "Placement outside the grid rejected");
                return Err(SimError::OutOfBounds(pos));
            }
        };
        if self.cells[idx].terrain != TerrainKind::Empty {
            tracing::debug!(%pos, "Position already occupied, clearing first");
            self.clear_cell(pos)?;
        }
        self.cells[idx] = cell;
        Ok(())
    }

    pub fn place_nest(&mut self, pos: Position, colony_id: u32) -> Result<()> {
        self.occupy(
            pos,
            TerrainCell {
                terrain: TerrainKind::Nest,
                food_amount: 0,
                owner: Some(colony_id),
            },
        )
    }

    pub fn place_food(&mut self, pos: Position, amount: u32) -> Result<()> {
        if amount == 0 {
            return Err(SimError::validation("food amount must be positive"));
        }
        self.occupy(
            pos,
            TerrainCell {
                terrain: TerrainKind::Food,
                food_amount: amount,
                owner: None,
            },
        )
    }

    pub fn place_obstacle(&mut self, pos: Position) -> Result<()> {
        self.occupy(
            pos,
            TerrainCell {
                terrain: TerrainKind::Wall,
                ..TerrainCell::default()
            },
        )
    }

    pub fn place_water(&mut self, pos: Position) -> Result<()> {
        self.occupy(
            pos,
            TerrainCell {
                terrain: TerrainKind::Water,
                ..TerrainCell::default()
            },
        )
    }

    /// Removes one unit of food from a food cell. The cell reverts to empty
    /// ground once exhausted. Returns `false` if there was nothing to take.
    pub fn take_food(&mut self, pos: Position) -> bool {
        let Some(idx) = self.index(pos) else {
            return false;
        };
        let cell = &mut self.cells[idx];
        if cell.terrain != TerrainKind::Food || cell.food_amount == 0 {
            return false;
        }
        cell.food_amount -= 1;
        if cell.food_amount == 0 {
            cell.terrain = TerrainKind::Empty;
        }
        true
    }

    /// Sum of food left on food cells.
    pub fn total_food(&self) -> u64 {
        self.cells
            .iter()
            .filter(|c| c.terrain == TerrainKind::Food)
            .map(|c| u64::from(c.food_amount))
            .sum()
    }

    /// Writes a complete cell, bypassing the occupant-clearing rules.
    /// Used when rebuilding a world from a snapshot.
    pub fn restore_cell(&mut self, pos: Position, cell: &Cell) -> Result<()> {
        let idx = self.index(pos).ok_or(SimError::OutOfBounds(pos))?;
        if !cell.is_consistent() {
            return Err(SimError::validation(format!(
                "inconsistent cell at {pos}: {cell:?}"
            )));
        }
        self.cells[idx] = TerrainCell {
            terrain: cell.terrain,
            food_amount: cell.food_amount,
            owner: cell.owning_colony,
        };
        self.pheromones
            .set(pos, cell.pheromone_food, cell.pheromone_home);
        Ok(())
    }

    /// All cell views in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let w = self.width as i32;
        (0..self.cells.len()).filter_map(move |i| {
            let i = i as i32;
            self.cell_at(Position::new(i % w, i / w))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(10, 8, PheromoneConfig::default())
    }

    #[test]
    fn test_bounds() {
        let g = grid();
        assert!(g.is_valid(Position::new(0, 0)));
        assert!(g.is_valid(Position::new(9, 7)));
        assert!(!g.is_valid(Position::new(10, 7)));
        assert!(!g.is_valid(Position::new(0, -1)));
        assert!(g.cell_at(Position::new(-1, 0)).is_none());
        assert!(!g.is_walkable(Position::new(20, 20)));
    }

    #[test]
    fn test_placement_clears_previous_occupant() {
        let mut g = grid();
        let p = Position::new(3, 3);
        g.place_nest(p, 1).unwrap();
        g.pheromones
            .deposit(p, formica_data::PheromoneChannel::Home, 50.0);
        g.place_food(p, 20).unwrap();

        let cell = g.cell_at(p).unwrap();
        assert_eq!(cell.terrain, TerrainKind::Food);
        assert_eq!(cell.food_amount, 20);
        assert_eq!(cell.owning_colony, None);
        assert_eq!(cell.pheromone_home, 0.0);
        assert!(cell.is_consistent());

        g.place_obstacle(p).unwrap();
        let cell = g.cell_at(p).unwrap();
        assert_eq!(cell.terrain, TerrainKind::Wall);
        assert_eq!(cell.food_amount, 0);
        assert!(!g.is_walkable(p));
    }

    #[test]
    fn test_invalid_placement_does_not_mutate() {
        let mut g = grid();
        assert_eq!(
            g.place_food(Position::new(11, 0), 5),
            Err(SimError::OutOfBounds(Position::new(11, 0)))
        );
        assert!(matches!(
            g.place_food(Position::new(1, 1), 0),
            Err(SimError::Validation(_))
        ));
        assert_eq!(g.total_food(), 0);
        assert!(g.cells().all(|c| c == Cell::default()));
    }

    #[test]
    fn test_take_food_exhausts_cell() {
        let mut g = grid();
        let p = Position::new(2, 5);
        g.place_food(p, 2).unwrap();
        assert!(g.take_food(p));
        assert_eq!(g.total_food(), 1);
        assert!(g.take_food(p));
        assert_eq!(g.cell_at(p).unwrap().terrain, TerrainKind::Empty);
        assert!(!g.take_food(p));
        assert_eq!(g.total_food(), 0);
    }

    #[test]
    fn test_walkable_neighbors_skip_walls_and_edges() {
        let mut g = grid();
        g.place_obstacle(Position::new(1, 0)).unwrap();
        let dirs: Vec<_> = g.walkable_neighbors(Position::new(0, 0)).collect();
        assert_eq!(dirs, vec![Direction::SouthEast, Direction::South]);
    }

    #[test]
    fn test_restore_rejects_inconsistent_cell() {
        let mut g = grid();
        let bad = Cell {
            terrain: TerrainKind::Nest,
            ..Cell::default()
        };
        assert!(g.restore_cell(Position::new(0, 0), &bad).is_err());
    }
}
