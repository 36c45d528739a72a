//! # Formica IO
//!
//! Persistence layer for the Formica simulation.
//!
//! This crate provides:
//! - Structured error handling with custom error types
//! - The compact binary save file
//! - Full-fidelity rkyv snapshots
//! - JSON helpers and the CSV statistics log

/// Error types and result aliases for I/O operations
pub mod error;
/// rkyv snapshots of complete worlds
pub mod persistence;
/// Binary save file encoding and decoding
pub mod savefile;
/// Validated JSON helpers
pub mod serialization;
/// Per-colony CSV statistics
pub mod statistics;

pub use error::{IoError, Result};
pub use savefile::{load_world, save_world};
pub use serialization::{
    from_json, load_world_json, read_json_file, save_world_json, to_json, to_json_pretty,
    write_json_file,
};
pub use statistics::append_statistics;
