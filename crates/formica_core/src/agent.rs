//! Foraging agent: a small state machine driven by the pheromone gradient.
//!
//! Each tick an agent pays its step cost, then either follows a pending
//! retreat direction, picks up or delivers food, or moves and marks its path.
//! Searching agents lay the home trail, returning agents the food trail.

use crate::config::AgentConfig;
use crate::error::{Result, SimError};
use crate::grid::Grid;
use formica_data::{AgentRecord, AgentState, Direction, PheromoneChannel, Position, TerrainKind};
use rand::Rng;
use std::collections::VecDeque;

/// What happened to an agent during its turn, for colony bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentEvent {
    None,
    PickedUp,
    /// Units handed to the colony.
    Delivered(u32),
    /// Energy ran out. `lost` is the food the agent was carrying.
    Died { lost: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    id: u32,
    colony_id: u32,
    position: Position,
    previous_position: Position,
    state: AgentState,
    carrying: bool,
    tired: bool,
    energy: f32,
    food_carrying: u32,
    steps_taken: u32,
    food_delivered: u32,
    preferred_direction: Option<Direction>,
    trail: VecDeque<Position>,
}

impl Agent {
    /// A fresh searcher standing on its nest.
    pub fn new(id: u32, colony_id: u32, nest: Position, cfg: &AgentConfig) -> Self {
        Self {
            id,
            colony_id,
            position: nest,
            previous_position: nest,
            state: AgentState::Searching,
            carrying: false,
            tired: false,
            energy: cfg.initial_energy,
            food_carrying: 0,
            steps_taken: 0,
            food_delivered: 0,
            preferred_direction: None,
            trail: VecDeque::new(),
        }
    }

    /// Rebuilds an agent from persisted fields, rejecting illegal state
    /// combinations.
    pub fn from_record(record: &AgentRecord) -> Result<Self> {
        if !record.energy.is_finite() || record.energy < 0.0 {
            return Err(SimError::invalid_agent(format!(
                "agent {} has energy {}",
                record.id, record.energy
            )));
        }
        if record.food_carrying > 1 {
            return Err(SimError::invalid_agent(format!(
                "agent {} carries {} units",
                record.id, record.food_carrying
            )));
        }
        if record.carrying != (record.food_carrying == 1) {
            return Err(SimError::invalid_agent(format!(
                "agent {} carrying flag disagrees with its load",
                record.id
            )));
        }
        if record.carrying && record.state != AgentState::Returning {
            return Err(SimError::invalid_agent(format!(
                "agent {} carries food while {:?}",
                record.id, record.state
            )));
        }
        Ok(Self {
            id: record.id,
            colony_id: record.colony_id,
            position: record.position,
            previous_position: record.previous_position,
            state: record.state,
            carrying: record.carrying,
            tired: record.tired,
            energy: record.energy,
            food_carrying: record.food_carrying,
            steps_taken: record.steps_taken,
            food_delivered: record.food_delivered,
            preferred_direction: record.preferred_direction,
            trail: record.trail.iter().copied().collect(),
        })
    }

    pub fn to_record(&self) -> AgentRecord {
        AgentRecord {
            id: self.id,
            colony_id: self.colony_id,
            position: self.position,
            previous_position: self.previous_position,
            state: self.state,
            carrying: self.carrying,
            tired: self.tired,
            energy: self.energy,
            food_carrying: self.food_carrying,
            steps_taken: self.steps_taken,
            food_delivered: self.food_delivered,
            preferred_direction: self.preferred_direction,
            trail: self.trail.iter().copied().collect(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn colony_id(&self) -> u32 {
        self.colony_id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn previous_position(&self) -> Position {
        self.previous_position
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn is_dead(&self) -> bool {
        self.state == AgentState::Dead
    }

    pub fn is_carrying(&self) -> bool {
        self.carrying
    }

    pub fn is_tired(&self) -> bool {
        self.tired
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn food_carrying(&self) -> u32 {
        self.food_carrying
    }

    pub fn steps_taken(&self) -> u32 {
        self.steps_taken
    }

    pub fn food_delivered(&self) -> u32 {
        self.food_delivered
    }

    pub fn preferred_direction(&self) -> Option<Direction> {
        self.preferred_direction
    }

    /// Past positions, oldest first.
    pub fn trail(&self) -> impl Iterator<Item = &Position> {
        self.trail.iter()
    }

    /// Releases the movement trail. Called when a dead agent is reaped.
    pub fn dispose_trail(&mut self) {
        self.trail = VecDeque::new();
    }

    /// Delivered food per step, boosted for living and well-fed agents.
    ///
    /// Reporting only; the simulation never reads it.
    pub fn efficiency(&self, initial_energy: f32) -> f32 {
        if self.steps_taken == 0 {
            return 0.0;
        }
        let mut score = self.food_delivered as f32 / self.steps_taken as f32;
        if !self.is_dead() {
            score *= 1.2;
        }
        if self.energy > initial_energy * 0.8 {
            score *= 1.1;
        }
        score
    }

    /// Runs one tick of the agent. Dead agents are left untouched.
    pub fn update<R: Rng>(&mut self, grid: &mut Grid, cfg: &AgentConfig, rng: &mut R) -> AgentEvent {
        if self.is_dead() {
            return AgentEvent::None;
        }

        self.energy -= cfg.energy_per_step;
        if self.energy <= 0.0 {
            let lost = self.die();
            tracing::debug!(agent = self.id, colony = self.colony_id, lost, "Agent died from exhaustion");
            return AgentEvent::Died { lost };
        }

        let event = self.act(grid, cfg, rng);
        self.tired = self.energy < cfg.initial_energy * cfg.tired_fraction;
        event
    }

    pub(crate) fn die(&mut self) -> u32 {
        let lost = self.food_carrying;
        self.energy = 0.0;
        self.state = AgentState::Dead;
        self.carrying = false;
        self.food_carrying = 0;
        self.preferred_direction = None;
        lost
    }

    fn act<R: Rng>(&mut self, grid: &mut Grid, cfg: &AgentConfig, rng: &mut R) -> AgentEvent {
        // A pending retreat after pickup or delivery takes the whole turn.
        if let Some(dir) = self.preferred_direction.take() {
            self.try_move(grid, dir, cfg);
            return AgentEvent::None;
        }

        match self.state {
            AgentState::Searching => {
                if !self.carrying && grid.take_food(self.position) {
                    self.pick_up(cfg);
                    self.deposit(grid);
                    tracing::debug!(agent = self.id, pos = %self.position, "Agent picked up food");
                    return AgentEvent::PickedUp;
                }

                if rng.gen::<f32>() < cfg.follow_pheromone_probability {
                    self.follow_gradient(grid, PheromoneChannel::Food, cfg, rng);
                } else {
                    self.random_walk(grid, cfg, rng);
                }
                self.deposit(grid);
                AgentEvent::None
            }
            AgentState::Returning => {
                if self.food_carrying > 0 && self.is_on_own_nest(grid) {
                    let load = self.deliver();
                    tracing::debug!(agent = self.id, colony = self.colony_id, load, "Agent delivered food");
                    return AgentEvent::Delivered(load);
                }

                self.follow_gradient(grid, PheromoneChannel::Home, cfg, rng);
                self.deposit(grid);
                AgentEvent::None
            }
            AgentState::Dead => AgentEvent::None,
        }
    }

    fn is_on_own_nest(&self, grid: &Grid) -> bool {
        grid.terrain_at(self.position)
            .map(|c| c.terrain == TerrainKind::Nest && c.owner == Some(self.colony_id))
            .unwrap_or(false)
    }

    fn pick_up(&mut self, cfg: &AgentConfig) {
        self.food_carrying = 1;
        self.carrying = true;
        self.state = AgentState::Returning;
        self.energy += cfg.energy_from_food;
        self.preferred_direction = Direction::between(self.position, self.previous_position);
    }

    fn deliver(&mut self) -> u32 {
        let load = self.food_carrying;
        self.food_delivered += load;
        self.food_carrying = 0;
        self.carrying = false;
        self.state = AgentState::Searching;
        self.preferred_direction = Direction::between(self.position, self.previous_position);
        load
    }

    /// Searchers mark the way home, carriers mark the way to food.
    fn trail_channel(&self) -> Option<PheromoneChannel> {
        match self.state {
            AgentState::Searching => Some(PheromoneChannel::Home),
            AgentState::Returning => Some(PheromoneChannel::Food),
            AgentState::Dead => None,
        }
    }

    fn deposit(&self, grid: &mut Grid) {
        if let Some(channel) = self.trail_channel() {
            let amount = grid.pheromones.params().deposit_amount;
            grid.pheromones.deposit(self.position, channel, amount);
        }
    }

    /// Steps to the walkable neighbour with the strongest `channel` value.
    /// Ties go to the first direction in scan order; a flat neighbourhood
    /// falls back to a random walk.
    fn follow_gradient<R: Rng>(
        &mut self,
        grid: &Grid,
        channel: PheromoneChannel,
        cfg: &AgentConfig,
        rng: &mut R,
    ) -> bool {
        let mut best = None;
        let mut strongest = 0.0f32;
        for dir in grid.walkable_neighbors(self.position) {
            let value = grid.pheromones.intensity(self.position.step(dir), channel);
            if value > strongest {
                strongest = value;
                best = Some(dir);
            }
        }

        match best {
            Some(dir) => self.try_move(grid, dir, cfg),
            None => self.random_walk(grid, cfg, rng),
        }
    }

    fn random_walk<R: Rng>(&mut self, grid: &Grid, cfg: &AgentConfig, rng: &mut R) -> bool {
        for _ in 0..cfg.random_walk_attempts {
            let dir = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
            if grid.is_walkable(self.position.step(dir)) {
                return self.try_move(grid, dir, cfg);
            }
        }
        tracing::trace!(agent = self.id, pos = %self.position, "No walkable direction found");
        false
    }

    fn try_move(&mut self, grid: &Grid, dir: Direction, cfg: &AgentConfig) -> bool {
        let target = self.position.step(dir);
        if !grid.is_walkable(target) {
            tracing::trace!(agent = self.id, %target, "Move blocked");
            return false;
        }
        self.previous_position = self.position;
        self.position = target;
        self.steps_taken += 1;
        self.trail.push_back(target);
        while self.trail.len() > cfg.trail_capacity {
            self.trail.pop_front();
        }
        true
    }
}
