pub mod config;
pub mod lint;
pub mod loot_registry;
pub mod naming;
pub mod reader;
pub mod resolver;
pub mod spawn_registry;
pub mod spawner;
