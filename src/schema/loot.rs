use serde::{Deserialize, Serialize};

/// Opaque identity of one host loot-table object.
///
/// Two tables with the same name may still be distinct instances; the
/// processed-table set is keyed by this value, not by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableInstanceId(pub i64);

/// One `item = ... w = ...` line declared inside a loot table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootTableEntry {
    pub prefab_name: String,
    pub weight: u32,
}

impl LootTableEntry {
    pub fn new(prefab_name: impl Into<String>, weight: u32) -> Self {
        Self {
            prefab_name: prefab_name.into(),
            weight,
        }
    }
}
