//! Serialization utilities with robust error handling.
//!
//! JSON helpers used for snapshot export and configuration dumps.

use crate::error::{IoError, Result};
use formica_core::{AppConfig, World};
use formica_data::WorldSnapshot;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serializes data to JSON with error handling.
pub fn to_json<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

/// Serializes data to pretty-printed JSON.
pub fn to_json_pretty<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

/// Deserializes data from JSON string.
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    if json.trim().is_empty() {
        return Err(IoError::validation("Empty JSON string"));
    }

    serde_json::from_str(json)
        .map_err(|e| IoError::serialization(format!("JSON deserialization failed: {}", e)))
}

/// Writes pretty JSON to a file.
pub fn write_json_file<T, P>(data: &T, path: P) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let json = to_json_pretty(data)?;
    std::fs::write(&path, json).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("writing JSON to {:?}", path.as_ref()))
    })?;
    Ok(())
}

/// Reads JSON from a file.
pub fn read_json_file<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let json = std::fs::read_to_string(&path).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("reading JSON from {:?}", path.as_ref()))
    })?;
    from_json(&json)
}

/// Exports the complete state of `world` as pretty JSON.
pub fn save_world_json<P: AsRef<Path>>(world: &World, path: P) -> Result<()> {
    write_json_file(&world.snapshot(), &path)?;
    tracing::info!(path = ?path.as_ref(), tick = world.tick(), "JSON snapshot saved");
    Ok(())
}

pub fn load_world_json<P: AsRef<Path>>(config: AppConfig, path: P) -> Result<World> {
    let snapshot: WorldSnapshot = read_json_file(&path)?;
    World::from_snapshot(config, &snapshot)
        .map_err(|e| IoError::from(e).with_context(format!("restoring {:?}", path.as_ref())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use formica_data::Position;

    #[test]
    fn test_snapshot_json_round_trip() {
        let mut config = AppConfig::default();
        config.world.width = 8;
        config.world.height = 8;
        config.world.colony_count = 1;
        config.world.initial_agents_per_colony = 3;
        config.world.seed = Some(2);
        let mut world = World::new(config).unwrap();
        world.place_nest(0, Position::new(4, 4)).unwrap();
        world.place_food(Position::new(1, 1), 9).unwrap();
        world.spawn_initial_agents();
        for _ in 0..10 {
            world.update();
        }

        let snapshot = world.snapshot();
        let json = to_json(&snapshot).unwrap();
        let restored: WorldSnapshot = from_json(&json).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = AppConfig::default();
        let json = to_json_pretty(&config).unwrap();
        let restored: AppConfig = from_json(&json).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_empty_json_rejected() {
        let result: Result<AppConfig> = from_json("   ");
        assert!(matches!(result, Err(IoError::Validation(_))));
        let result: Result<AppConfig> = from_json("{ not json");
        assert!(matches!(result, Err(IoError::Serialization(_))));
    }
}
