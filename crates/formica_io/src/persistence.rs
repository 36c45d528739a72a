//! Full-fidelity snapshots in rkyv's archived format.
//!
//! Unlike the save file these keep the tick counter and agent trails.

use crate::error::{IoError, Result};
use formica_core::{AppConfig, World};
use formica_data::WorldSnapshot;
use rkyv::de::deserializers::SharedDeserializeMap;
use rkyv::ser::serializers::AllocSerializer;
use rkyv::ser::Serializer;
use rkyv::{Archive, Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub fn to_rkyv_bytes<T>(data: &T) -> Result<Vec<u8>>
where
    T: Serialize<AllocSerializer<4096>>,
    T: Archive,
{
    let mut serializer = AllocSerializer::<4096>::default();
    serializer
        .serialize_value(data)
        .map_err(|e| IoError::rkyv(format!("serialization failed: {e:?}")))?;
    Ok(serializer.into_serializer().into_inner().to_vec())
}

pub fn from_rkyv_bytes<T>(bytes: &[u8]) -> Result<T>
where
    T: Archive,
    T::Archived: Deserialize<T, SharedDeserializeMap>
        + for<'a> rkyv::CheckBytes<rkyv::validation::validators::DefaultValidator<'a>>,
{
    let archived = rkyv::check_archived_root::<T>(bytes)
        .map_err(|e| IoError::rkyv(format!("validation failed: {e:?}")))?;
    let mut deserializer = SharedDeserializeMap::default();
    archived
        .deserialize(&mut deserializer)
        .map_err(|e| IoError::rkyv(format!("deserialization failed: {e:?}")))
}

pub fn save_rkyv<T, P>(data: &T, path: P) -> Result<()>
where
    T: Serialize<AllocSerializer<4096>>,
    T: Archive,
    P: AsRef<Path>,
{
    let bytes = to_rkyv_bytes(data)?;
    let mut file = File::create(&path)?;
    file.write_all(&bytes)?;
    Ok(())
}

pub fn load_rkyv<T, P>(path: P) -> Result<T>
where
    T: Archive,
    T::Archived: Deserialize<T, SharedDeserializeMap>
        + for<'a> rkyv::CheckBytes<rkyv::validation::validators::DefaultValidator<'a>>,
    P: AsRef<Path>,
{
    // Archives need an aligned buffer.
    let raw = std::fs::read(path)?;
    let mut bytes = rkyv::AlignedVec::with_capacity(raw.len());
    bytes.extend_from_slice(&raw);
    from_rkyv_bytes(&bytes)
}

/// Stores the complete state of `world`.
pub fn save_snapshot<P: AsRef<Path>>(world: &World, path: P) -> Result<()> {
    save_rkyv(&world.snapshot(), &path)?;
    tracing::info!(path = ?path.as_ref(), tick = world.tick(), "Snapshot saved");
    Ok(())
}

pub fn load_snapshot<P: AsRef<Path>>(config: AppConfig, path: P) -> Result<World> {
    let snapshot: WorldSnapshot = load_rkyv(&path)?;
    Ok(World::from_snapshot(config, &snapshot)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formica_data::Position;

    fn busy_world() -> World {
        let mut config = AppConfig::default();
        config.world.width = 16;
        config.world.height = 10;
        config.world.initial_agents_per_colony = 6;
        config.world.seed = Some(23);
        let mut world = World::new(config).unwrap();
        world.place_nest(0, Position::new(3, 5)).unwrap();
        world.place_nest(1, Position::new(12, 5)).unwrap();
        world.place_food(Position::new(8, 2), 20).unwrap();
        world.spawn_initial_agents();
        for _ in 0..60 {
            world.update();
        }
        world
    }

    #[test]
    fn test_bytes_round_trip_keeps_trails_and_tick() {
        let snapshot = busy_world().snapshot();
        let bytes = to_rkyv_bytes(&snapshot).unwrap();
        let mut aligned = rkyv::AlignedVec::new();
        aligned.extend_from_slice(&bytes);
        let restored: WorldSnapshot = from_rkyv_bytes(&aligned).unwrap();
        assert_eq!(restored, snapshot);
        assert_eq!(restored.tick, 60);
        assert!(restored.colonies[0].agents.iter().any(|a| !a.trail.is_empty()));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let mut aligned = rkyv::AlignedVec::new();
        aligned.extend_from_slice(&[0xFF; 64]);
        assert!(matches!(
            from_rkyv_bytes::<WorldSnapshot>(&aligned),
            Err(IoError::Rkyv(_))
        ));
    }

    #[test]
    fn test_world_file_round_trip() {
        let world = busy_world();
        let path = std::env::temp_dir().join(format!("formica_{}.rkyv", std::process::id()));
        save_snapshot(&world, &path).unwrap();
        let loaded = load_snapshot(world.config().clone(), &path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.snapshot(), world.snapshot());
    }
}
