/// Loot-table registry: weighted entries keyed by table, merged into
/// host-owned tables at most once per table instance.

use log::{debug, info};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::core::naming::{host_table_key, item_name, loot_table_key, DEFAULT_ITEM_PREFIX};
use crate::schema::loot::{LootTableEntry, TableInstanceId};

/// Adapter over a host loot table that entries get merged into.
pub trait LootTable {
    /// Identity of this table object for the lifetime of a session.
    fn instance_id(&self) -> TableInstanceId;

    /// The host's own name for the table, e.g. `LootTableBearCache`.
    fn table_name(&self) -> &str;

    /// Item identifiers already present among the table's entries.
    fn existing_items(&self) -> Vec<&str>;

    /// Append a weighted entry, including any side bookkeeping the host
    /// keeps for it (asset references and the like).
    fn add_entry(&mut self, entry: &LootTableEntry);
}

/// What a single merge call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No table was supplied.
    NoTable,
    /// This instance was merged earlier in the session.
    AlreadyProcessed,
    /// Nothing is stored under the table's name. The table is not marked,
    /// so later calls look it up again.
    NoEntries,
    Merged { added: usize, skipped: usize },
}

/// Table key → entries, plus the set of host tables already merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootTableRegistry {
    item_prefix: String,
    tables: FxHashMap<String, Vec<LootTableEntry>>,
    #[serde(skip)]
    processed: FxHashSet<TableInstanceId>,
}

impl Default for LootTableRegistry {
    fn default() -> Self {
        Self::with_item_prefix(DEFAULT_ITEM_PREFIX)
    }
}

impl LootTableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item_prefix(prefix: &str) -> Self {
        Self {
            item_prefix: prefix.to_string(),
            tables: FxHashMap::default(),
            processed: FxHashSet::default(),
        }
    }

    /// Store an entry under the normalized table key. The entry's item name
    /// gets the item prefix here, once.
    pub fn record(&mut self, table_name: &str, entry: LootTableEntry) {
        let entry = LootTableEntry {
            prefab_name: item_name(&entry.prefab_name, &self.item_prefix),
            weight: entry.weight,
        };
        self.tables
            .entry(loot_table_key(table_name))
            .or_default()
            .push(entry);
    }

    /// Entries stored under an already-normalized table key.
    pub fn entries(&self, table_key: &str) -> &[LootTableEntry] {
        self.tables
            .get(table_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Table keys, sorted.
    pub fn tables(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn is_processed(&self, id: TableInstanceId) -> bool {
        self.processed.contains(&id)
    }

    /// Forget every merged table. Called when the host starts a fresh load.
    pub fn clear_processed(&mut self) {
        if !self.processed.is_empty() {
            debug!("Clearing {} processed loot tables", self.processed.len());
        }
        self.processed.clear();
    }

    /// Add stored entries to a host table that does not hold them yet.
    ///
    /// Entries whose item is already in the table are skipped, never
    /// re-weighted. The same item is never added twice in one merge even
    /// if it was recorded twice.
    pub fn merge_into<T>(&mut self, table: Option<&mut T>) -> MergeOutcome
    where
        T: LootTable + ?Sized,
    {
        let Some(table) = table else {
            return MergeOutcome::NoTable;
        };

        let id = table.instance_id();
        if self.processed.contains(&id) {
            debug!("Loot table '{}' already processed", table.table_name());
            return MergeOutcome::AlreadyProcessed;
        }

        let key = host_table_key(table.table_name());
        let Some(entries) = self.tables.get(&key) else {
            info!("No loot table entries stored for '{}'", key);
            return MergeOutcome::NoEntries;
        };
        self.processed.insert(id);

        let mut present: FxHashSet<String> = table
            .existing_items()
            .into_iter()
            .map(str::to_lowercase)
            .collect();

        let mut added = 0;
        let mut skipped = 0;
        for entry in entries {
            if present.insert(entry.prefab_name.to_lowercase()) {
                table.add_entry(entry);
                added += 1;
            } else {
                skipped += 1;
            }
        }

        info!(
            "Patched loot table '{}': +{} entries, {} already present",
            key, added, skipped
        );
        MergeOutcome::Merged { added, skipped }
    }
}

/// A loot table held entirely in memory. Useful for tooling and tests
/// where no host engine is around.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryLootTable {
    pub id: TableInstanceId,
    pub name: String,
    pub entries: Vec<LootTableEntry>,
}

impl MemoryLootTable {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: TableInstanceId(id),
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, prefab_name: &str, weight: u32) -> Self {
        self.entries.push(LootTableEntry::new(prefab_name, weight));
        self
    }

    pub fn weight_of(&self, prefab_name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.prefab_name.eq_ignore_ascii_case(prefab_name))
            .map(|e| e.weight)
    }
}

impl LootTable for MemoryLootTable {
    fn instance_id(&self) -> TableInstanceId {
        self.id
    }

    fn table_name(&self) -> &str {
        &self.name
    }

    fn existing_items(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.prefab_name.as_str()).collect()
    }

    fn add_entry(&mut self, entry: &LootTableEntry) {
        self.entries.push(entry.clone());
    }
}
