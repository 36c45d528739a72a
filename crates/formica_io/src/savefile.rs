//! Binary save file.
//!
//! Layout, all integers and floats little-endian:
//!
//! ```text
//! "ACO_SIM" "1.0"
//! width i32, height i32, colony_count i32
//! per colony:  nest_x i32, nest_y i32, food_collected i32, total i32,
//!              active i32, efficiency f32
//! per cell (row-major):
//!              terrain i32, pheromone_food f32, pheromone_home f32,
//!              food_amount i32, colony i32
//! per colony:  agent records, then the sentinel id -1
//!   agent:     id i32, x i32, y i32, prev_x i32, prev_y i32, state u8,
//!              colony i32, energy f32, food_carrying i32, steps i32,
//!              food_delivered i32, preferred_direction i32
//! ```
//!
//! A missing nest is stored as (-1, -1), a missing colony or direction as -1.
//! The tick counter and movement trails are not stored.

use crate::error::{IoError, Result};
use formica_core::{AppConfig, World, MAX_WORLD_SIZE};
use formica_data::{
    AgentRecord, AgentState, Cell, ColonySnapshot, Direction, Position, TerrainKind, WorldSnapshot,
};
use std::path::Path;

const MAGIC: &[u8] = b"ACO_SIM";
const VERSION: &[u8] = b"1.0";
const END_OF_AGENTS: i32 = -1;
const NONE: i32 = -1;

const SEARCHING: u8 = 0x01;
const RETURNING: u8 = 0x02;
const CARRYING: u8 = 0x08;
const TIRED: u8 = 0x20;
const DEAD: u8 = 0x40;

/// Writes `world` to `path`.
pub fn save_world<P: AsRef<Path>>(world: &World, path: P) -> Result<()> {
    let bytes = encode(&world.snapshot())?;
    std::fs::write(&path, &bytes).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("writing save file {:?}", path.as_ref()))
    })?;
    tracing::info!(path = ?path.as_ref(), bytes = bytes.len(), "World saved");
    Ok(())
}

/// Reads a save file and rebuilds a world from it. Parameters that the file
/// does not carry come from `config`.
pub fn load_world<P: AsRef<Path>>(config: AppConfig, path: P) -> Result<World> {
    let snapshot = load_snapshot(&path)?;
    let world = World::from_snapshot(config, &snapshot)
        .map_err(|e| IoError::from(e).with_context(format!("restoring {:?}", path.as_ref())))?;
    tracing::info!(path = ?path.as_ref(), agents = world.agent_count(), "World loaded");
    Ok(world)
}

pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<WorldSnapshot> {
    let bytes = std::fs::read(&path).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("reading save file {:?}", path.as_ref()))
    })?;
    decode(&bytes)
}

/// Serialises a snapshot into the save file layout.
pub fn encode(snapshot: &WorldSnapshot) -> Result<Vec<u8>> {
    let mut out = Writer::default();
    out.bytes(MAGIC);
    out.bytes(VERSION);
    out.i32(i32::from(snapshot.width));
    out.i32(i32::from(snapshot.height));
    out.i32(to_i32(snapshot.colonies.len() as u64, "colony count")?);

    for colony in &snapshot.colonies {
        let (x, y) = colony
            .nest_position
            .map(|p| (p.x, p.y))
            .unwrap_or((NONE, NONE));
        out.i32(x);
        out.i32(y);
        out.i32(to_i32(colony.food_collected.into(), "food collected")?);
        out.i32(to_i32(colony.total_count.into(), "total agents")?);
        out.i32(to_i32(colony.active_count.into(), "active agents")?);
        out.f32(colony.efficiency_score);
    }

    for cell in &snapshot.cells {
        out.i32(cell.terrain.code());
        out.f32(cell.pheromone_food);
        out.f32(cell.pheromone_home);
        out.i32(to_i32(cell.food_amount.into(), "food amount")?);
        out.i32(optional_id(cell.owning_colony, "cell owner")?);
    }

    for colony in &snapshot.colonies {
        for agent in &colony.agents {
            encode_agent(&mut out, agent)?;
        }
        out.i32(END_OF_AGENTS);
    }

    Ok(out.buf)
}

fn encode_agent(out: &mut Writer, agent: &AgentRecord) -> Result<()> {
    out.i32(to_i32(agent.id.into(), "agent id")?);
    out.i32(agent.position.x);
    out.i32(agent.position.y);
    out.i32(agent.previous_position.x);
    out.i32(agent.previous_position.y);
    out.u8(state_bits(agent));
    out.i32(to_i32(agent.colony_id.into(), "agent colony")?);
    out.f32(agent.energy);
    out.i32(to_i32(agent.food_carrying.into(), "food carried")?);
    out.i32(to_i32(agent.steps_taken.into(), "steps taken")?);
    out.i32(to_i32(agent.food_delivered.into(), "food delivered")?);
    out.i32(
        agent
            .preferred_direction
            .map(|d| d.index() as i32)
            .unwrap_or(NONE),
    );
    Ok(())
}

fn state_bits(agent: &AgentRecord) -> u8 {
    let mut bits = match agent.state {
        AgentState::Searching => SEARCHING,
        AgentState::Returning => RETURNING,
        AgentState::Dead => DEAD,
    };
    if agent.carrying {
        bits |= CARRYING;
    }
    if agent.tired {
        bits |= TIRED;
    }
    bits
}

/// Parses the save file layout. Any short read or out-of-range field fails
/// the whole decode.
pub fn decode(bytes: &[u8]) -> Result<WorldSnapshot> {
    let mut input = Reader::new(bytes);

    if input.take(MAGIC.len(), "header")? != MAGIC {
        return Err(IoError::format("not a simulation save file"));
    }
    let version = input.take(VERSION.len(), "version")?;
    if version != VERSION {
        return Err(IoError::format(format!(
            "unsupported version {:?}",
            String::from_utf8_lossy(version)
        )));
    }

    let width = dimension(input.i32("width")?, "width")?;
    let height = dimension(input.i32("height")?, "height")?;
    let cell_count = width as usize * height as usize;
    let colony_count = input.i32("colony count")?;
    if colony_count <= 0 || colony_count as usize > cell_count {
        return Err(IoError::format(format!("invalid colony count {colony_count}")));
    }

    let mut colonies = Vec::with_capacity(colony_count as usize);
    for id in 0..colony_count as u32 {
        let what = format!("colony {id}");
        let x = input.i32(&what)?;
        let y = input.i32(&what)?;
        let nest_position = match (x, y) {
            (NONE, NONE) => None,
            (x, y) => Some(Position::new(x, y)),
        };
        colonies.push(ColonySnapshot {
            id,
            nest_position,
            food_collected: non_negative(input.i32(&what)?, "food collected")?,
            total_count: non_negative(input.i32(&what)?, "total agents")?,
            active_count: non_negative(input.i32(&what)?, "active agents")?,
            efficiency_score: input.f32(&what)?,
            agents: Vec::new(),
        });
    }

    let mut cells = Vec::with_capacity(cell_count);
    for index in 0..cell_count {
        let what = format!("cell {index}");
        let code = input.i32(&what)?;
        let terrain = TerrainKind::from_code(code)
            .ok_or_else(|| IoError::format(format!("unknown terrain code {code} in {what}")))?;
        let pheromone_food = pheromone(input.f32(&what)?, &what)?;
        let pheromone_home = pheromone(input.f32(&what)?, &what)?;
        let food_amount = non_negative(input.i32(&what)?, "food amount")?;
        let owning_colony = match input.i32(&what)? {
            NONE => None,
            id if id >= 0 => Some(id as u32),
            id => return Err(IoError::format(format!("invalid owner {id} in {what}"))),
        };
        cells.push(Cell {
            terrain,
            pheromone_food,
            pheromone_home,
            food_amount,
            owning_colony,
        });
    }

    for colony in &mut colonies {
        loop {
            let id = input.i32(&format!("agent run of colony {}", colony.id))?;
            if id == END_OF_AGENTS {
                break;
            }
            if id < 0 {
                return Err(IoError::format(format!("invalid agent id {id}")));
            }
            colony.agents.push(decode_agent(&mut input, id as u32)?);
        }
    }

    if !input.is_empty() {
        return Err(IoError::format(format!(
            "{} trailing bytes after the last agent run",
            input.remaining()
        )));
    }

    Ok(WorldSnapshot {
        width,
        height,
        tick: 0,
        cells,
        colonies,
    })
}

fn decode_agent(input: &mut Reader<'_>, id: u32) -> Result<AgentRecord> {
    let what = format!("agent {id}");
    let position = Position::new(input.i32(&what)?, input.i32(&what)?);
    let previous_position = Position::new(input.i32(&what)?, input.i32(&what)?);
    let bits = input.u8(&what)?;
    let state = if bits & DEAD != 0 {
        AgentState::Dead
    } else if bits & RETURNING != 0 {
        AgentState::Returning
    } else if bits & SEARCHING != 0 {
        AgentState::Searching
    } else {
        return Err(IoError::format(format!("{what} has no state bits ({bits:#04x})")));
    };
    let colony_id = non_negative(input.i32(&what)?, "agent colony")?;
    let energy = input.f32(&what)?;
    let food_carrying = non_negative(input.i32(&what)?, "food carried")?;
    let steps_taken = non_negative(input.i32(&what)?, "steps taken")?;
    let food_delivered = non_negative(input.i32(&what)?, "food delivered")?;
    let preferred_direction = match input.i32(&what)? {
        NONE => None,
        index => Some(
            usize::try_from(index)
                .ok()
                .and_then(Direction::from_index)
                .ok_or_else(|| IoError::format(format!("{what} has direction {index}")))?,
        ),
    };

    Ok(AgentRecord {
        id,
        colony_id,
        position,
        previous_position,
        state,
        carrying: bits & CARRYING != 0,
        tired: bits & TIRED != 0,
        energy,
        food_carrying,
        steps_taken,
        food_delivered,
        preferred_direction,
        trail: Vec::new(),
    })
}

fn dimension(value: i32, what: &str) -> Result<u16> {
    if value <= 0 || value > i32::from(MAX_WORLD_SIZE) {
        return Err(IoError::format(format!("{what} {value} outside 1..={MAX_WORLD_SIZE}")));
    }
    Ok(value as u16)
}

fn non_negative(value: i32, what: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| IoError::format(format!("negative {what}: {value}")))
}

fn pheromone(value: f32, what: &str) -> Result<f32> {
    if !value.is_finite() || value < 0.0 {
        return Err(IoError::format(format!("invalid pheromone {value} in {what}")));
    }
    Ok(value)
}

fn to_i32(value: u64, what: &str) -> Result<i32> {
    i32::try_from(value).map_err(|_| IoError::format(format!("{what} {value} does not fit in i32")))
}

fn optional_id(id: Option<u32>, what: &str) -> Result<i32> {
    id.map_or(Ok(NONE), |id| to_i32(id.into(), what))
}

#[derive(Default)]
struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn u8(&mut self, value: u8) {
        self.buf.push(value);
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| IoError::truncated(what))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn word(&mut self, what: &str) -> Result<[u8; 4]> {
        let mut word = [0u8; 4];
        word.copy_from_slice(self.take(4, what)?);
        Ok(word)
    }

    fn i32(&mut self, what: &str) -> Result<i32> {
        self.word(what).map(i32::from_le_bytes)
    }

    fn f32(&mut self, what: &str) -> Result<f32> {
        self.word(what).map(f32::from_le_bytes)
    }

    fn u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.take(1, what)?[0])
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}
