//! Configuration management for simulation parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file. Every tunable of the foraging model lives here.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (hardcoded in `Default` impls)
//! 2. `config.toml` file (overrides defaults, missing keys fall back)
//! 3. Command line flags of the `formica` binary
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! width = 60
//! height = 30
//! colony_count = 2
//! seed = 42
//!
//! [agent]
//! initial_energy = 1000.0
//! follow_pheromone_probability = 0.8
//!
//! [pheromone]
//! evaporation_rate = 0.02
//! diffusion_rate = 0.01
//! ```

use serde::{Deserialize, Serialize};

/// Largest accepted grid side.
pub const MAX_WORLD_SIZE: u16 = 100;

/// World-level simulation configuration.
///
/// Defines the dimensions of the grid, the number of colonies and the
/// population limits applied to each of them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub width: u16,
    pub height: u16,
    pub colony_count: u32,
    pub initial_agents_per_colony: u32,
    pub max_agents_per_colony: u32,
    /// Upper bound on ticks for the loop driver. The engine never checks it.
    pub max_ticks: u64,
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 60,
            height: 30,
            colony_count: 2,
            initial_agents_per_colony: 20,
            max_agents_per_colony: 50,
            max_ticks: 10_000,
            seed: None,
        }
    }
}

/// Agent energy budget and movement behaviour.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    pub initial_energy: f32,
    pub energy_per_step: f32,
    pub energy_from_food: f32,
    /// Chance that a searcher climbs the food trail instead of wandering.
    pub follow_pheromone_probability: f32,
    pub random_walk_attempts: u32,
    /// Fraction of `initial_energy` under which the agent is flagged tired.
    pub tired_fraction: f32,
    /// Number of past positions kept in the movement trail.
    pub trail_capacity: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            initial_energy: 1000.0,
            energy_per_step: 1.0,
            energy_from_food: 500.0,
            follow_pheromone_probability: 0.8,
            random_walk_attempts: 10,
            tired_fraction: 0.2,
            trail_capacity: 256,
        }
    }
}

/// Pheromone field dynamics.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct PheromoneConfig {
    pub max_intensity: f32,
    /// Values under this threshold snap to zero after evaporation.
    pub min_threshold: f32,
    pub deposit_amount: f32,
    pub evaporation_rate: f32,
    pub diffusion_rate: f32,
}

impl Default for PheromoneConfig {
    fn default() -> Self {
        Self {
            max_intensity: 1000.0,
            min_threshold: 0.1,
            deposit_amount: 100.0,
            evaporation_rate: 0.02,
            diffusion_rate: 0.01,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub agent: AgentConfig,
    pub pheromone: PheromoneConfig,
    /// Ticks between two statistics rows written by the loop driver.
    pub stats_interval: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            agent: AgentConfig::default(),
            pheromone: PheromoneConfig::default(),
            stats_interval: 100,
        }
    }
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    ///
    /// # Validation Rules
    /// - World dimensions must be positive and at most [`MAX_WORLD_SIZE`]
    /// - At least one colony, and the initial population must fit the capacity
    /// - Energies must be positive, probabilities and rates in [0.0, 1.0]
    pub fn validate(&self) -> anyhow::Result<()> {
        // World validation
        anyhow::ensure!(self.world.width > 0, "World width must be positive");
        anyhow::ensure!(
            self.world.width <= MAX_WORLD_SIZE,
            "World width too large (max {MAX_WORLD_SIZE})"
        );
        anyhow::ensure!(self.world.height > 0, "World height must be positive");
        anyhow::ensure!(
            self.world.height <= MAX_WORLD_SIZE,
            "World height too large (max {MAX_WORLD_SIZE})"
        );
        anyhow::ensure!(
            self.world.colony_count > 0,
            "Colony count must be positive"
        );
        anyhow::ensure!(
            self.world.initial_agents_per_colony <= self.world.max_agents_per_colony,
            "Initial agents per colony exceeds the colony capacity"
        );

        // Agent validation
        anyhow::ensure!(
            self.agent.initial_energy > 0.0,
            "Initial energy must be positive"
        );
        anyhow::ensure!(
            self.agent.energy_per_step >= 0.0,
            "Energy per step must be non-negative"
        );
        anyhow::ensure!(
            self.agent.energy_from_food >= 0.0,
            "Energy from food must be non-negative"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.agent.follow_pheromone_probability),
            "Follow pheromone probability must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.agent.tired_fraction),
            "Tired fraction must be in [0.0, 1.0]"
        );

        // Pheromone validation
        anyhow::ensure!(
            self.pheromone.max_intensity > 0.0,
            "Pheromone max intensity must be positive"
        );
        anyhow::ensure!(
            self.pheromone.min_threshold >= 0.0
                && self.pheromone.min_threshold < self.pheromone.max_intensity,
            "Pheromone threshold must be in [0.0, max_intensity)"
        );
        anyhow::ensure!(
            self.pheromone.deposit_amount >= 0.0,
            "Pheromone deposit must be non-negative"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.pheromone.evaporation_rate),
            "Evaporation rate must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.pheromone.diffusion_rate),
            "Diffusion rate must be in [0.0, 1.0]"
        );

        anyhow::ensure!(self.stats_interval > 0, "Stats interval must be positive");

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Hash of the parameters that influence simulation outcomes.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.world).as_bytes());
        hasher.update(format!("{:?}", self.agent).as_bytes());
        hasher.update(format!("{:?}", self.pheromone).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_oversized_world() {
        let mut config = AppConfig::default();
        config.world.width = MAX_WORLD_SIZE + 1;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.world.height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_rates() {
        let mut config = AppConfig::default();
        config.pheromone.evaporation_rate = 1.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.agent.follow_pheromone_probability = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [world]
            width = 10
            height = 12
            seed = 7

            [pheromone]
            diffusion_rate = 0.05
            "#,
        )
        .unwrap();
        assert_eq!(config.world.width, 10);
        assert_eq!(config.world.height, 12);
        assert_eq!(config.world.seed, Some(7));
        assert_eq!(config.world.colony_count, 2);
        assert_eq!(config.pheromone.diffusion_rate, 0.05);
        assert_eq!(config.agent, AgentConfig::default());
    }

    #[test]
    fn test_fingerprint_tracks_parameters() {
        let a = AppConfig::default();
        let mut b = AppConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.pheromone.evaporation_rate = 0.05;
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
