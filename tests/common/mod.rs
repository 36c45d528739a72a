pub mod macros;

use formica_core::{AppConfig, TickOutcome, TickReport, World};
use formica_data::Position;

#[allow(dead_code)]
pub struct WorldBuilder {
    config: AppConfig,
    nests: Vec<(u32, Position)>,
    food: Vec<(Position, u32)>,
    walls: Vec<Position>,
}

#[allow(dead_code)]
impl WorldBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.width = 20;
        config.world.height = 20;
        config.world.colony_count = 1;
        config.world.initial_agents_per_colony = 0;
        config.world.seed = Some(42);
        Self {
            config,
            nests: Vec::new(),
            food: Vec::new(),
            walls: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.config.world.width = width;
        self.config.world.height = height;
        self
    }

    pub fn with_colonies(mut self, count: u32) -> Self {
        self.config.world.colony_count = count;
        self
    }

    pub fn with_agents(mut self, per_colony: u32) -> Self {
        self.config.world.initial_agents_per_colony = per_colony;
        self.config.world.max_agents_per_colony =
            self.config.world.max_agents_per_colony.max(per_colony);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_nest(mut self, colony: u32, x: i32, y: i32) -> Self {
        self.nests.push((colony, Position::new(x, y)));
        self
    }

    pub fn with_food(mut self, x: i32, y: i32, amount: u32) -> Self {
        self.food.push((Position::new(x, y), amount));
        self
    }

    pub fn with_wall(mut self, x: i32, y: i32) -> Self {
        self.walls.push(Position::new(x, y));
        self
    }

    pub fn build(self) -> World {
        let mut world = World::new(self.config).expect("valid test config");
        for pos in self.walls {
            world.place_obstacle(pos).expect("wall inside grid");
        }
        for (pos, amount) in self.food {
            world.place_food(pos, amount).expect("food inside grid");
        }
        for (colony, pos) in self.nests {
            world.place_nest(colony, pos).expect("nest inside grid");
        }
        world.spawn_initial_agents();
        world
    }
}

/// Advances `world` one tick and returns the report, panicking if the tick
/// was refused.
#[allow(dead_code)]
pub fn tick(world: &mut World) -> TickReport {
    match world.update() {
        TickOutcome::Advanced(report) => report,
        other => panic!("tick refused: {other:?}"),
    }
}
