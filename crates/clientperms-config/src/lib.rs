//! Configuration types and storage for clientperms.
//!
//! This crate owns the `mods.yml` schema and the storage port the registry
//! persists through, so runtime crates share a single source of truth.

pub mod mods;
pub mod store;

pub use mods::{ModsFile, MODS_FILE_NAME};
pub use store::{MemoryStore, ModsStore, YamlFileStore};
