use crate::agent::{Agent, AgentEvent};
use crate::config::AgentConfig;
use crate::error::{Result, SimError};
use crate::grid::Grid;
use crate::world::TickReport;
use formica_data::{ColonySnapshot, Position};
use rand::Rng;

/// A colony owns its agents and the statistics derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct Colony {
    id: u32,
    nest_position: Option<Position>,
    food_collected: u32,
    agents: Vec<Agent>,
    /// Agents held by the colony, dead ones included until reaped.
    total_count: u32,
    active_count: u32,
    efficiency_score: f32,
    next_agent_id: u32,
}

impl Colony {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            nest_position: None,
            food_collected: 0,
            agents: Vec::new(),
            total_count: 0,
            active_count: 0,
            efficiency_score: 0.0,
            next_agent_id: 1,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn nest_position(&self) -> Option<Position> {
        self.nest_position
    }

    pub(crate) fn set_nest(&mut self, pos: Option<Position>) {
        self.nest_position = pos;
    }

    pub fn food_collected(&self) -> u32 {
        self.food_collected
    }

    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    pub fn active_count(&self) -> u32 {
        self.active_count
    }

    pub fn efficiency_score(&self) -> f32 {
        self.efficiency_score
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: u32) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id() == id)
    }

    pub fn live_agents(&self) -> usize {
        self.agents.iter().filter(|a| !a.is_dead()).count()
    }

    /// Food currently held by this colony's agents.
    pub fn carried_food(&self) -> u64 {
        self.agents
            .iter()
            .map(|a| u64::from(a.food_carrying()))
            .sum()
    }

    /// Adds a searcher on the nest. Fails without mutating when there is no
    /// nest or `capacity` live agents already exist.
    pub fn spawn(&mut self, cfg: &AgentConfig, capacity: u32) -> Result<u32> {
        let nest = self.nest_position.ok_or(SimError::NestNotPlaced(self.id))?;
        if self.live_agents() >= capacity as usize {
            return Err(SimError::CapacityReached {
                colony: self.id,
                capacity,
            });
        }

        let id = self.next_agent_id;
        self.next_agent_id += 1;
        self.agents.push(Agent::new(id, self.id, nest, cfg));
        self.total_count += 1;
        self.recompute_stats();
        Ok(id)
    }

    /// Runs one turn for every agent that is alive when the scan starts.
    pub fn update_agents<R: Rng>(
        &mut self,
        grid: &mut Grid,
        cfg: &AgentConfig,
        rng: &mut R,
        report: &mut TickReport,
    ) {
        for i in 0..self.agents.len() {
            let agent = &mut self.agents[i];
            if agent.is_dead() {
                continue;
            }
            match agent.update(grid, cfg, rng) {
                AgentEvent::None => {}
                AgentEvent::PickedUp => report.pickups += 1,
                AgentEvent::Delivered(load) => {
                    self.food_collected += load;
                    report.deliveries += load;
                }
                AgentEvent::Died { lost } => {
                    report.deaths += 1;
                    report.food_lost += lost;
                }
            }
        }
    }

    /// Removes dead agents. Returns how many were reclaimed.
    pub fn reap(&mut self) -> usize {
        let mut reaped = 0;
        for i in (0..self.agents.len()).rev() {
            if self.agents[i].is_dead() {
                let mut dead = self.agents.swap_remove(i);
                dead.dispose_trail();
                self.total_count = self.total_count.saturating_sub(1);
                reaped += 1;
            }
        }
        if reaped > 0 {
            tracing::debug!(colony = self.id, reaped, "Reaped dead agents");
        }
        reaped
    }

    pub fn recompute_stats(&mut self) {
        self.active_count = self.live_agents() as u32;
        self.efficiency_score = if self.total_count == 0 {
            0.0
        } else {
            self.food_collected as f32 / self.total_count as f32
        };
    }

    /// Drops every agent and zeroes the counters. The nest stays.
    pub fn clear(&mut self) {
        self.agents.clear();
        self.food_collected = 0;
        self.total_count = 0;
        self.active_count = 0;
        self.efficiency_score = 0.0;
        self.next_agent_id = 1;
    }

    pub fn snapshot(&self) -> ColonySnapshot {
        ColonySnapshot {
            id: self.id,
            nest_position: self.nest_position,
            food_collected: self.food_collected,
            total_count: self.total_count,
            active_count: self.active_count,
            efficiency_score: self.efficiency_score,
            agents: self.agents.iter().map(Agent::to_record).collect(),
        }
    }

    /// Rebuilds a colony, validating every agent record.
    pub fn from_snapshot(snapshot: &ColonySnapshot) -> Result<Self> {
        let agents = snapshot
            .agents
            .iter()
            .map(|record| {
                if record.colony_id != snapshot.id {
                    return Err(SimError::invalid_agent(format!(
                        "agent {} belongs to colony {} but is stored under colony {}",
                        record.id, record.colony_id, snapshot.id
                    )));
                }
                Agent::from_record(record)
            })
            .collect::<Result<Vec<_>>>()?;

        let next_agent_id = agents.iter().map(Agent::id).max().unwrap_or(0) + 1;
        let mut colony = Self {
            id: snapshot.id,
            nest_position: snapshot.nest_position,
            food_collected: snapshot.food_collected,
            total_count: agents.len() as u32,
            active_count: 0,
            efficiency_score: 0.0,
            agents,
            next_agent_id,
        };
        // Derived counters follow the agent list, not the stored figures.
        colony.recompute_stats();
        Ok(colony)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PheromoneConfig;
    use formica_data::AgentState;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn nested(id: u32) -> Colony {
        let mut c = Colony::new(id);
        c.set_nest(Some(Position::new(2, 2)));
        c
    }

    #[test]
    fn test_spawn_requires_nest() {
        let mut c = Colony::new(0);
        assert_eq!(
            c.spawn(&AgentConfig::default(), 5),
            Err(SimError::NestNotPlaced(0))
        );
        assert!(c.agents().is_empty());
        assert_eq!(c.total_count(), 0);
    }

    #[test]
    fn test_spawn_respects_capacity() {
        let cfg = AgentConfig::default();
        let mut c = nested(1);
        assert_eq!(c.spawn(&cfg, 2), Ok(1));
        assert_eq!(c.spawn(&cfg, 2), Ok(2));
        assert_eq!(
            c.spawn(&cfg, 2),
            Err(SimError::CapacityReached {
                colony: 1,
                capacity: 2
            })
        );
        assert_eq!(c.total_count(), 2);
        assert_eq!(c.active_count(), 2);
        assert!(c
            .agents()
            .iter()
            .all(|a| a.position() == Position::new(2, 2) && a.state() == AgentState::Searching));
    }

    #[test]
    fn test_reap_removes_only_dead_agents() {
        let cfg = AgentConfig {
            initial_energy: 2.0,
            ..AgentConfig::default()
        };
        let mut grid = Grid::new(6, 6, PheromoneConfig::default());
        let mut c = nested(0);
        grid.place_nest(Position::new(2, 2), 0).unwrap();
        for _ in 0..3 {
            c.spawn(&cfg, 10).unwrap();
        }
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut report = TickReport::default();

        c.update_agents(&mut grid, &cfg, &mut rng, &mut report);
        assert_eq!(report.deaths, 0);
        c.update_agents(&mut grid, &cfg, &mut rng, &mut report);
        assert_eq!(report.deaths, 3);
        assert_eq!(c.agents().len(), 3);

        assert_eq!(c.reap(), 3);
        c.recompute_stats();
        assert!(c.agents().is_empty());
        assert_eq!(c.active_count(), 0);
        assert_eq!(c.total_count(), 0);

        // Dead agents no longer count against capacity.
        assert_eq!(c.spawn(&cfg, 1), Ok(4));
    }

    #[test]
    fn test_efficiency_is_food_per_agent() {
        let mut c = nested(0);
        c.recompute_stats();
        assert_eq!(c.efficiency_score(), 0.0);
        c.spawn(&AgentConfig::default(), 10).unwrap();
        c.spawn(&AgentConfig::default(), 10).unwrap();
        c.food_collected = 3;
        c.recompute_stats();
        assert_eq!(c.efficiency_score(), 1.5);
    }

    #[test]
    fn test_efficiency_uses_count_after_reaping() {
        let cfg = AgentConfig::default();
        let mut c = nested(0);
        for _ in 0..4 {
            c.spawn(&cfg, 10).unwrap();
        }
        c.food_collected = 2;
        c.recompute_stats();
        assert_eq!(c.efficiency_score(), 0.5);

        for agent in &mut c.agents[..2] {
            agent.die();
        }
        assert_eq!(c.reap(), 2);
        c.recompute_stats();

        assert_eq!(c.total_count(), 2);
        assert_eq!(c.active_count(), 2);
        assert_eq!(c.efficiency_score(), 1.0);
    }

    #[test]
    fn test_snapshot_recomputes_derived_counters() {
        let cfg = AgentConfig::default();
        let mut c = nested(0);
        for _ in 0..3 {
            c.spawn(&cfg, 10).unwrap();
        }
        c.food_collected = 6;
        let mut snap = c.snapshot();
        snap.total_count = 40;
        snap.active_count = 17;
        snap.efficiency_score = 9.5;
        snap.agents[1].state = AgentState::Dead;
        snap.agents[1].energy = 0.0;

        let restored = Colony::from_snapshot(&snap).unwrap();
        assert_eq!(restored.total_count(), 3);
        assert_eq!(restored.active_count(), 2);
        assert_eq!(restored.efficiency_score(), 2.0);
    }

    #[test]
    fn test_snapshot_restores_id_sequence() {
        let cfg = AgentConfig::default();
        let mut c = nested(3);
        for _ in 0..4 {
            c.spawn(&cfg, 10).unwrap();
        }
        let snap = c.snapshot();
        let mut restored = Colony::from_snapshot(&snap).unwrap();
        assert_eq!(restored, c);
        assert_eq!(restored.spawn(&cfg, 10), Ok(5));
    }

    #[test]
    fn test_snapshot_rejects_foreign_agent() {
        let mut c = nested(0);
        c.spawn(&AgentConfig::default(), 10).unwrap();
        let mut snap = c.snapshot();
        snap.agents[0].colony_id = 7;
        assert!(matches!(
            Colony::from_snapshot(&snap),
            Err(SimError::InvalidAgent(_))
        ));
    }

    #[test]
    fn test_clear_keeps_nest() {
        let mut c = nested(0);
        c.spawn(&AgentConfig::default(), 10).unwrap();
        c.clear();
        assert_eq!(c.nest_position(), Some(Position::new(2, 2)));
        assert!(c.agents().is_empty());
        assert_eq!(c.spawn(&AgentConfig::default(), 10), Ok(1));
    }
}
