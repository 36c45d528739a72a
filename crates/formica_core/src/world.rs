//! The simulation context: grid, colonies, tick counter and RNG.

use crate::colony::Colony;
use crate::config::AppConfig;
use crate::error::{Result, SimError};
use crate::grid::Grid;
use formica_data::{Cell, Position, TerrainKind, WorldSnapshot};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Per-tick deltas reported by [`World::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub pickups: u32,
    /// Units of food handed to colonies.
    pub deliveries: u32,
    pub deaths: u32,
    /// Food that disappeared with agents dying while carrying it.
    pub food_lost: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The pause gate is closed; nothing changed.
    Paused,
    /// The world was stopped; nothing changed.
    Stopped,
    Advanced(TickReport),
}

#[derive(Debug)]
pub struct World {
    grid: Grid,
    colonies: Vec<Colony>,
    tick: u64,
    running: bool,
    paused: bool,
    config: AppConfig,
    rng: ChaCha8Rng,
}

/// An empty world of the given shape with default parameters.
/// Nests are left unplaced.
pub fn create_world(width: u16, height: u16, colony_count: u32) -> Result<World> {
    let mut config = AppConfig::default();
    config.world.width = width;
    config.world.height = height;
    config.world.colony_count = colony_count;
    World::new(config)
}

impl World {
    pub fn new(config: AppConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| SimError::validation(e.to_string()))?;

        let rng = match config.world.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let grid = Grid::new(config.world.width, config.world.height, config.pheromone);
        let colonies = (0..config.world.colony_count).map(Colony::new).collect();

        tracing::info!(
            width = config.world.width,
            height = config.world.height,
            colonies = config.world.colony_count,
            seed = ?config.world.seed,
            "World created"
        );

        Ok(Self {
            grid,
            colonies,
            tick: 0,
            running: true,
            paused: false,
            config,
            rng,
        })
    }

    pub fn width(&self) -> u16 {
        self.grid.width()
    }

    pub fn height(&self) -> u16 {
        self.grid.height()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cell_at(&self, pos: Position) -> Option<Cell> {
        self.grid.cell_at(pos)
    }

    pub fn colonies(&self) -> &[Colony] {
        &self.colonies
    }

    pub fn colony(&self, id: u32) -> Option<&Colony> {
        self.colonies.get(id as usize)
    }

    pub(crate) fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    fn colony_mut(&mut self, id: u32) -> Result<&mut Colony> {
        self.colonies
            .get_mut(id as usize)
            .ok_or(SimError::InvalidColony(id))
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            tracing::info!(tick = self.tick, "Simulation paused");
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            tracing::info!(tick = self.tick, "Simulation resumed");
        }
    }

    /// Ends the run. Further updates report [`TickOutcome::Stopped`].
    pub fn stop(&mut self) {
        self.running = false;
        tracing::info!(tick = self.tick, "Simulation stopped");
    }

    /// Advances the simulation by one tick.
    ///
    /// Colonies run in ascending id order and agents in collection order.
    /// The pheromone field evaporates and then diffuses once all agents have
    /// moved.
    pub fn update(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Stopped;
        }
        if self.paused {
            return TickOutcome::Paused;
        }

        let mut report = TickReport::default();
        let Self {
            grid,
            colonies,
            config,
            rng,
            ..
        } = self;

        for colony in colonies.iter_mut() {
            colony.update_agents(grid, &config.agent, rng, &mut report);
            colony.reap();
            colony.recompute_stats();
        }

        grid.pheromones.evaporate();
        grid.pheromones.diffuse();

        self.tick += 1;
        report.tick = self.tick;
        TickOutcome::Advanced(report)
    }

    /// Restarts the run on the current map. Food already taken stays taken.
    pub fn reset(&mut self) {
        self.tick = 0;
        self.paused = false;
        self.running = true;
        self.grid.pheromones.reset();
        for colony in &mut self.colonies {
            colony.clear();
        }
        self.spawn_initial_agents();
        tracing::info!("Simulation reset");
    }

    pub fn spawn_agent(&mut self, colony_id: u32) -> Result<u32> {
        let capacity = self.config.world.max_agents_per_colony;
        let cfg = self.config.agent.clone();
        let colony = self.colony_mut(colony_id)?;
        colony.spawn(&cfg, capacity).inspect_err(|e| {
            tracing::warn!(colony = colony_id, error = %e, "Spawn refused");
        })
    }

    /// Fills every nested colony up to its initial population. Returns the
    /// number of agents created.
    pub fn spawn_initial_agents(&mut self) -> usize {
        let target = self.config.world.initial_agents_per_colony as usize;
        let capacity = self.config.world.max_agents_per_colony;
        let mut spawned = 0;
        for colony in &mut self.colonies {
            if colony.nest_position().is_none() {
                tracing::warn!(colony = colony.id(), "Colony has no nest, skipping spawn");
                continue;
            }
            while colony.live_agents() < target {
                if colony.spawn(&self.config.agent, capacity).is_err() {
                    break;
                }
                spawned += 1;
            }
        }
        tracing::info!(spawned, "Initial agents spawned");
        spawned
    }

    /// Places (or moves) the nest of a colony.
    pub fn place_nest(&mut self, colony_id: u32, pos: Position) -> Result<()> {
        if colony_id as usize >= self.colonies.len() {
            return Err(SimError::InvalidColony(colony_id));
        }
        self.detach_nest(pos);
        self.grid.place_nest(pos, colony_id)?;

        let previous = self.colonies[colony_id as usize].nest_position();
        if let Some(old) = previous.filter(|old| *old != pos) {
            let still_ours = self
                .grid
                .terrain_at(old)
                .map(|c| c.terrain == TerrainKind::Nest && c.owner == Some(colony_id))
                .unwrap_or(false);
            if still_ours {
                self.grid.clear_cell(old)?;
            }
        }
        self.colonies[colony_id as usize].set_nest(Some(pos));
        tracing::info!(colony = colony_id, %pos, "Nest placed");
        Ok(())
    }

    pub fn place_food(&mut self, pos: Position, amount: u32) -> Result<()> {
        if amount == 0 {
            return Err(SimError::validation("food amount must be positive"));
        }
        self.detach_nest(pos);
        self.grid.place_food(pos, amount)
    }

    pub fn place_obstacle(&mut self, pos: Position) -> Result<()> {
        self.detach_nest(pos);
        self.grid.place_obstacle(pos)
    }

    pub fn place_water(&mut self, pos: Position) -> Result<()> {
        self.detach_nest(pos);
        self.grid.place_water(pos)
    }

    pub fn clear_cell(&mut self, pos: Position) -> Result<()> {
        self.detach_nest(pos);
        self.grid.clear_cell(pos)
    }

    /// Forgets the nest of whichever colony owns `pos`, if any.
    fn detach_nest(&mut self, pos: Position) {
        let owner = match self.grid.terrain_at(pos) {
            Some(cell) if cell.terrain == TerrainKind::Nest => cell.owner,
            _ => None,
        };
        if let Some(colony) = owner.and_then(|id| self.colonies.get_mut(id as usize)) {
            if colony.nest_position() == Some(pos) {
                colony.set_nest(None);
            }
        }
    }

    /// Food left on the map.
    pub fn remaining_food(&self) -> u64 {
        self.grid.total_food()
    }

    pub fn is_food_exhausted(&self) -> bool {
        self.remaining_food() == 0
    }

    /// Food in transit.
    pub fn carried_food(&self) -> u64 {
        self.colonies.iter().map(Colony::carried_food).sum()
    }

    pub fn delivered_food(&self) -> u64 {
        self.colonies
            .iter()
            .map(|c| u64::from(c.food_collected()))
            .sum()
    }

    pub fn agent_count(&self) -> usize {
        self.colonies.iter().map(|c| c.agents().len()).sum()
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            tick: self.tick,
            cells: self.grid.cells().collect(),
            colonies: self.colonies.iter().map(Colony::snapshot).collect(),
        }
    }

    /// Rebuilds a world from a snapshot. Dimensions and colony count come
    /// from the snapshot; every other parameter from `config`.
    pub fn from_snapshot(mut config: AppConfig, snapshot: &WorldSnapshot) -> Result<Self> {
        config.world.width = snapshot.width;
        config.world.height = snapshot.height;
        config.world.colony_count = snapshot.colonies.len() as u32;

        let expected = snapshot.width as usize * snapshot.height as usize;
        if snapshot.cells.len() != expected {
            return Err(SimError::validation(format!(
                "snapshot has {} cells, expected {expected}",
                snapshot.cells.len()
            )));
        }

        let mut world = Self::new(config)?;
        let w = i32::from(snapshot.width);
        for (i, cell) in snapshot.cells.iter().enumerate() {
            let pos = Position::new(i as i32 % w, i as i32 / w);
            if let Some(owner) = cell.owning_colony {
                if owner as usize >= snapshot.colonies.len() {
                    return Err(SimError::InvalidColony(owner));
                }
            }
            world.grid.restore_cell(pos, cell)?;
        }

        for (index, colony_snap) in snapshot.colonies.iter().enumerate() {
            if colony_snap.id as usize != index {
                return Err(SimError::validation(format!(
                    "colony id {} stored at index {index}",
                    colony_snap.id
                )));
            }
            if let Some(nest) = colony_snap.nest_position {
                let owned = world
                    .grid
                    .terrain_at(nest)
                    .map(|c| c.terrain == TerrainKind::Nest && c.owner == Some(colony_snap.id))
                    .unwrap_or(false);
                if !owned {
                    return Err(SimError::validation(format!(
                        "colony {} nest {nest} is not a nest cell it owns",
                        colony_snap.id
                    )));
                }
            }
            if let Some(agent) = colony_snap
                .agents
                .iter()
                .find(|a| !world.grid.is_valid(a.position))
            {
                return Err(SimError::OutOfBounds(agent.position));
            }
            world.colonies[index] = Colony::from_snapshot(colony_snap)?;
        }

        world.tick = snapshot.tick;
        tracing::info!(tick = world.tick, agents = world.agent_count(), "World restored");
        Ok(world)
    }
}
