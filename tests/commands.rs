mod common;

use common::{tick, WorldBuilder};
use formica_core::{SimError, TickOutcome};
use formica_data::{PheromoneChannel, Position, TerrainKind};

#[test]
fn test_pause_freezes_everything() {
    let mut world = WorldBuilder::new()
        .with_agents(8)
        .with_nest(0, 10, 10)
        .with_food(3, 3, 10)
        .build();
    for _ in 0..10 {
        tick(&mut world);
    }

    world.pause();
    assert!(world.is_paused());
    let frozen = world.snapshot();
    for _ in 0..25 {
        assert_eq!(world.update(), TickOutcome::Paused);
    }
    assert_eq!(world.snapshot(), frozen);

    world.resume();
    assert_eq!(tick(&mut world).tick, 11);
}

#[test]
fn test_reset_restarts_the_run_but_keeps_the_map() {
    let mut world = WorldBuilder::new()
        .with_size(12, 12)
        .with_agents(10)
        .with_seed(8)
        .with_nest(0, 6, 6)
        .with_food(6, 8, 3)
        .with_wall(2, 2)
        .build();
    for _ in 0..400 {
        tick(&mut world);
    }
    let food_after_run = world.remaining_food();

    world.pause();
    world.reset();

    assert_eq!(world.tick(), 0);
    assert!(!world.is_paused());
    assert_eq!(world.grid().pheromones.total(PheromoneChannel::Food), 0.0);
    assert_eq!(world.grid().pheromones.total(PheromoneChannel::Home), 0.0);
    assert_eq!(world.remaining_food(), food_after_run);
    assert_eq!(
        world.cell_at(Position::new(2, 2)).unwrap().terrain,
        TerrainKind::Wall
    );

    let colony = world.colony(0).unwrap();
    assert_eq!(colony.food_collected(), 0);
    assert_eq!(colony.efficiency_score(), 0.0);
    assert_eq!(colony.total_count(), 10);
    assert_eq!(colony.active_count(), 10);
    assert!(colony
        .agents()
        .iter()
        .all(|a| a.position() == Position::new(6, 6) && a.energy() == 1000.0));
}

#[test]
fn test_spawn_capacity_is_enforced() {
    let mut world = WorldBuilder::new()
        .with_agents(3)
        .with_config(|c| c.world.max_agents_per_colony = 5)
        .with_nest(0, 10, 10)
        .build();

    assert!(world.spawn_agent(0).is_ok());
    assert!(world.spawn_agent(0).is_ok());
    let before = world.snapshot();
    assert_eq!(
        world.spawn_agent(0),
        Err(SimError::CapacityReached {
            colony: 0,
            capacity: 5
        })
    );
    assert_eq!(world.snapshot(), before);
}

#[test]
fn test_placement_commands_validate_input() {
    let mut world = WorldBuilder::new().with_size(8, 8).build();

    assert_eq!(
        world.place_food(Position::new(8, 0), 5),
        Err(SimError::OutOfBounds(Position::new(8, 0)))
    );
    assert!(matches!(
        world.place_food(Position::new(1, 1), 0),
        Err(SimError::Validation(_))
    ));
    assert_eq!(
        world.place_nest(3, Position::new(1, 1)),
        Err(SimError::InvalidColony(3))
    );
    assert_eq!(
        world.clear_cell(Position::new(-1, 0)),
        Err(SimError::OutOfBounds(Position::new(-1, 0)))
    );
    assert!(world.cell_at(Position::new(0, 8)).is_none());
    assert_eq!(world.remaining_food(), 0);
}

#[test]
fn test_clear_cell_resets_everything() {
    let mut world = WorldBuilder::new()
        .with_agents(1)
        .with_nest(0, 5, 5)
        .with_food(7, 7, 4)
        .build();
    for _ in 0..5 {
        tick(&mut world);
    }

    world.clear_cell(Position::new(7, 7)).unwrap();
    world.clear_cell(Position::new(5, 5)).unwrap();

    for pos in [Position::new(7, 7), Position::new(5, 5)] {
        let cell = world.cell_at(pos).unwrap();
        assert_eq!(cell.terrain, TerrainKind::Empty);
        assert_eq!(cell.food_amount, 0);
        assert_eq!(cell.owning_colony, None);
        assert_eq!(cell.pheromone_food, 0.0);
        assert_eq!(cell.pheromone_home, 0.0);
    }
    assert_eq!(world.colony(0).unwrap().nest_position(), None);
    assert_eq!(world.spawn_agent(0), Err(SimError::NestNotPlaced(0)));
}
