//! Per-colony statistics appended to a CSV log.

use crate::error::{IoError, Result};
use chrono::{DateTime, Local};
use formica_core::World;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub const HEADER: &str = "Timestamp,Step,Colony,Food_Collected,Total_Ants,Active_Ants,Efficiency";

/// Appends one row per colony, writing the header first when the file is
/// new or empty.
pub fn append_statistics<P: AsRef<Path>>(world: &World, path: P) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| {
            IoError::FileSystem(e).with_context(format!("opening statistics {:?}", path.as_ref()))
        })?;

    let mut out = String::new();
    if file.metadata()?.len() == 0 {
        out.push_str(HEADER);
        out.push('\n');
    }
    out.push_str(&format_rows(world, Local::now()));
    file.write_all(out.as_bytes())?;

    tracing::debug!(tick = world.tick(), path = ?path.as_ref(), "Statistics appended");
    Ok(())
}

/// The rows [`append_statistics`] would write at `now`, newline terminated.
pub fn format_rows(world: &World, now: DateTime<Local>) -> String {
    let timestamp = now.format("%Y-%m-%d %H:%M:%S");
    world
        .colonies()
        .iter()
        .map(|colony| {
            format!(
                "{timestamp},{},{},{},{},{},{:.2}\n",
                world.tick(),
                colony.id(),
                colony.food_collected(),
                colony.total_count(),
                colony.active_count(),
                colony.efficiency_score()
            )
        })
        .collect()
}
