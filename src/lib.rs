//! Gear Spawner: text-driven item spawns and loot-table injection.
//!
//! Reads a small line-oriented spawn language, places probabilistically
//! selected items into scenes as they activate, and adds weighted entries
//! to host-owned loot tables without duplicating what is already there.

pub mod core;
pub mod schema;
