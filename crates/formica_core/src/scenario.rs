//! Ready-made maps for a freshly created world.

use crate::error::Result;
use crate::world::World;
use formica_data::Position;
use rand::Rng;

/// Lower bound on the number of random walls.
const MIN_OBSTACLES: usize = 3;
/// Distance of the test scenario nests from the side walls.
const NEST_INSET: i32 = 5;

/// Spreads the nests along the middle row, scatters walls over roughly 5% of
/// the interior and drops 3 to 8 food piles on empty ground.
///
/// Walls and food only land on cells that are empty when drawn, so a draw
/// that hits a nest or an earlier pile is skipped rather than retried.
pub fn populate_random(world: &mut World) -> Result<()> {
    let (w, h) = (i32::from(world.width()), i32::from(world.height()));
    let colonies = world.colonies().len() as u32;

    for id in 0..colonies {
        let x = (w * (id as i32 + 1)) / (colonies as i32 + 1);
        let pos = free_nest_cell(world, Position::new(x.min(w - 1), h / 2));
        world.place_nest(id, pos)?;
    }

    let cells = (w * h) as usize;
    let obstacles = cells.div_ceil(20).max(MIN_OBSTACLES).min(cells / 4);
    for _ in 0..obstacles {
        let pos = random_position(world);
        let interior = pos.x > 0 && pos.x < w - 1 && pos.y > 0 && pos.y < h - 1;
        if interior && is_empty(world, pos) {
            world.place_obstacle(pos)?;
        }
    }

    let piles = world.rng().gen_range(3..=8);
    for _ in 0..piles {
        let pos = random_position(world);
        let amount = world.rng().gen_range(20..=100);
        if is_empty(world, pos) {
            world.place_food(pos, amount)?;
        }
    }

    tracing::info!(
        obstacles,
        food = world.remaining_food(),
        "Random world initialised"
    );
    Ok(())
}

/// Walled arena with two nests facing each other and three food piles.
///
/// Interior wall segments follow a lattice (every 8th column and every 6th
/// row) and each lattice cell is walled with probability 0.3.
pub fn populate_test_scenario(world: &mut World) -> Result<()> {
    let (w, h) = (i32::from(world.width()), i32::from(world.height()));

    for y in 0..h {
        for x in 0..w {
            world.clear_cell(Position::new(x, y))?;
        }
    }

    for y in 0..h {
        for x in 0..w {
            let pos = Position::new(x, y);
            if x == 0 || x == w - 1 || y == 0 || y == h - 1 {
                world.place_obstacle(pos)?;
            } else if (x % 8 == 0 && y % 6 != 0) || (y % 6 == 0 && x % 8 != 0) {
                if world.rng().gen::<f32>() < 0.3 {
                    world.place_obstacle(pos)?;
                }
            }
        }
    }

    // Nests sit five cells in from each side, pulled inwards on narrow maps.
    let inset = NEST_INSET.min(w / 2 - 1).max(0);
    let colonies = world.colonies().len();
    if colonies >= 1 {
        let pos = free_nest_cell(world, Position::new(inset, h / 2));
        world.place_nest(0, pos)?;
    }
    if colonies >= 2 {
        let pos = free_nest_cell(world, Position::new(w - 1 - inset, h / 2));
        world.place_nest(1, pos)?;
    }

    for (pos, amount) in [
        (Position::new(w / 2, h / 2), 50),
        (Position::new(w / 4, h / 4), 30),
        (Position::new(3 * w / 4, 3 * h / 4), 40),
    ] {
        if is_nest(world, pos) {
            tracing::debug!(%pos, "Food pile skipped, cell holds a nest");
            continue;
        }
        world.place_food(pos, amount)?;
    }

    tracing::info!("Test scenario created");
    Ok(())
}

fn random_position(world: &mut World) -> Position {
    let (w, h) = (i32::from(world.width()), i32::from(world.height()));
    let rng = world.rng();
    Position::new(rng.gen_range(0..w), rng.gen_range(0..h))
}

/// First cell from `start` onwards, in row-major order with wrap-around, that
/// does not already hold a nest. Falls back to `start` on a map full of nests.
fn free_nest_cell(world: &World, start: Position) -> Position {
    let w = i32::from(world.width());
    let cells = w * i32::from(world.height());
    let first = start.y * w + start.x;
    (0..cells)
        .map(|offset| {
            let i = (first + offset) % cells;
            Position::new(i % w, i / w)
        })
        .find(|pos| !is_nest(world, *pos))
        .unwrap_or(start)
}

fn is_nest(world: &World, pos: Position) -> bool {
    world
        .grid()
        .terrain_at(pos)
        .map(|c| c.terrain == formica_data::TerrainKind::Nest)
        .unwrap_or(false)
}

fn is_empty(world: &World, pos: Position) -> bool {
    world
        .grid()
        .terrain_at(pos)
        .map(|c| c.terrain == formica_data::TerrainKind::Empty)
        .unwrap_or(false)
}
