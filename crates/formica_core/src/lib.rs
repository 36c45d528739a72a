//! # Formica Core
//!
//! The simulation engine for Formica - a stigmergic ant-colony foraging model.
//!
//! This crate contains the deterministic simulation logic, including:
//! - The bounds-checked grid of terrain cells
//! - A dual-channel pheromone field with evaporation and diffusion
//! - The per-agent foraging state machine
//! - Colony bookkeeping and the tick orchestration of the world
//! - Metrics collection and structured logging
//!
//! ## Architecture
//!
//! A [`World`] owns the [`Grid`] (which embeds the [`PheromoneField`]) and
//! one [`Colony`] per configured colony; each colony owns its agents in a
//! dense `Vec`. A tick updates colonies by ascending id and agents by index,
//! reaps the dead, then evaporates and diffuses the field once.
//! All randomness flows from a single seeded `ChaCha8Rng`.
//!
//! ## Example
//!
//! ```
//! use formica_core::{AppConfig, TickOutcome, World};
//! use formica_data::Position;
//!
//! let mut config = AppConfig::default();
//! config.world.width = 20;
//! config.world.height = 20;
//! config.world.colony_count = 1;
//! config.world.seed = Some(42);
//!
//! let mut world = World::new(config).unwrap();
//! world.place_nest(0, Position::new(10, 10)).unwrap();
//! world.place_food(Position::new(4, 4), 25).unwrap();
//! world.spawn_initial_agents();
//!
//! assert!(matches!(world.update(), TickOutcome::Advanced(_)));
//! assert_eq!(world.tick(), 1);
//! ```

/// Foraging agent state machine
pub mod agent;
/// Colony ownership of agents and derived statistics
pub mod colony;
/// Configuration management for simulation parameters
pub mod config;
/// Error types shared by the engine
pub mod error;
/// Terrain storage and placement
pub mod grid;
/// Performance metrics and structured logging
pub mod metrics;
/// Pheromone deposit, evaporation and diffusion
pub mod pheromone;
/// Ready-made world layouts
pub mod scenario;
/// Simulation context and tick orchestration
pub mod world;

pub use agent::{Agent, AgentEvent};
pub use colony::Colony;
pub use config::{AgentConfig, AppConfig, PheromoneConfig, WorldConfig, MAX_WORLD_SIZE};
pub use error::{Result, SimError};
pub use grid::{Grid, TerrainCell};
pub use metrics::{init_logging, Metrics};
pub use pheromone::{PheromoneCell, PheromoneField};
pub use world::{create_world, TickOutcome, TickReport, World};
