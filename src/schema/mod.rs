pub mod directive;
pub mod loot;
pub mod spawn;
