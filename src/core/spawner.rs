/// The spawner facade: loads spawn content and answers host events.
///
/// Wires together the reader, both registries and the resolver.

use log::info;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::config::{ConfigError, SpawnerConfig};
use crate::core::loot_registry::{LootTable, LootTableRegistry, MergeOutcome};
use crate::core::reader::{self, CommitSummary, ReadError};
use crate::core::resolver::{
    ConfigScaler, DifficultyScaler, RandomSource, SpawnHost, SpawnListener, SpawnReport,
    SpawnResolver,
};
use crate::core::spawn_registry::SpawnRegistry;
use crate::schema::loot::LootTableEntry;
use crate::schema::spawn::SpawnDirective;

#[derive(Debug, Error)]
pub enum SpawnerError {
    #[error("{origin}: {source}")]
    Read {
        origin: String,
        #[source]
        source: ReadError,
    },
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Owns the spawn and loot-table registries for a session. Built via
/// `GearSpawner::builder()` or `GearSpawner::new()`.
#[derive(Debug, Clone, Default)]
pub struct GearSpawner {
    config: SpawnerConfig,
    spawns: SpawnRegistry,
    loot: LootTableRegistry,
}

/// Builder for constructing a `GearSpawner`.
#[derive(Debug, Default)]
pub struct GearSpawnerBuilder {
    config: Option<SpawnerConfig>,
    config_path: Option<String>,
    spawn_dirs: Vec<String>,
    spawn_files: Vec<String>,
    /// Directly provided sources (for testing without files).
    sources: Vec<(String, String)>,
}

impl GearSpawner {
    pub fn builder() -> GearSpawnerBuilder {
        GearSpawnerBuilder::default()
    }

    pub fn new(config: SpawnerConfig) -> Self {
        let loot = LootTableRegistry::with_item_prefix(&config.item_prefix);
        Self {
            config,
            spawns: SpawnRegistry::new(),
            loot,
        }
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    pub fn spawn_registry(&self) -> &SpawnRegistry {
        &self.spawns
    }

    pub fn loot_registry(&self) -> &LootTableRegistry {
        &self.loot
    }

    /// Read spawn text and commit it. Nothing is committed if any line is
    /// malformed; `origin` names the source in the error.
    pub fn load_str(&mut self, origin: &str, source: &str) -> Result<CommitSummary, SpawnerError> {
        let file = reader::read_str(source).map_err(|source| SpawnerError::Read {
            origin: origin.to_string(),
            source,
        })?;
        let summary = file.commit(&mut self.spawns, &mut self.loot);
        info!(
            "Loaded {} spawn entries and {} loot table entries from '{}'",
            summary.spawns, summary.loot_entries, origin
        );
        Ok(summary)
    }

    pub fn load_file(&mut self, path: &Path) -> Result<CommitSummary, SpawnerError> {
        let contents = std::fs::read_to_string(path)?;
        self.load_str(&path.display().to_string(), &contents)
    }

    /// Load every spawn file in `dir`, in file-name order. Stops at the
    /// first file that fails; files before it stay loaded.
    pub fn load_dir(&mut self, dir: &Path) -> Result<CommitSummary, SpawnerError> {
        let mut total = CommitSummary::default();
        for path in spawn_files_in(dir, &self.config.spawn_file_extension)? {
            let summary = self.load_file(&path)?;
            total.spawns += summary.spawns;
            total.loot_entries += summary.loot_entries;
        }
        Ok(total)
    }

    /// Register a spawn directive without going through text.
    pub fn add_spawn(&mut self, scene_name: &str, directive: SpawnDirective) {
        self.spawns.record(scene_name, directive);
    }

    /// Register a loot-table entry without going through text.
    pub fn add_loot_entry(&mut self, table_name: &str, entry: LootTableEntry) {
        self.loot.record(table_name, entry);
    }

    /// A resolver using this spawner's configuration.
    pub fn resolver<H, S, R>(&self, host: H, scaler: S, random: R) -> SpawnResolver<H, S, R>
    where
        H: SpawnHost,
        S: DifficultyScaler,
        R: RandomSource,
    {
        SpawnResolver::new(&self.config, host, scaler, random)
    }

    /// A resolver using the configured multipliers as difficulty scaling.
    pub fn default_resolver<H, R>(&self, host: H, random: R) -> SpawnResolver<H, ConfigScaler, R>
    where
        H: SpawnHost,
        R: RandomSource,
    {
        self.resolver(host, ConfigScaler::from_config(&self.config), random)
    }

    /// Host event: a scene finished loading.
    pub fn on_scene_activated<H, S, R, L>(
        &self,
        resolver: &mut SpawnResolver<H, S, R>,
        scene_name: &str,
        listener: &mut L,
    ) -> Option<SpawnReport<H::Handle>>
    where
        H: SpawnHost,
        S: DifficultyScaler,
        R: RandomSource,
        L: SpawnListener<H::Handle> + ?Sized,
    {
        resolver.on_scene_activated(&self.spawns, scene_name, listener)
    }

    /// Host event: a new session or save is being loaded.
    pub fn on_fresh_load(&mut self) {
        self.loot.clear_processed();
    }

    /// Host event: a loot table is about to be drawn from.
    pub fn on_table_populated<T>(&mut self, table: Option<&mut T>) -> MergeOutcome
    where
        T: LootTable + ?Sized,
    {
        self.loot.merge_into(table)
    }

    /// Host event: a container is about to be filled. Containers may refer
    /// to several tables; each present one is merged in order.
    pub fn on_container_populated<'t, I>(&mut self, tables: I) -> Vec<MergeOutcome>
    where
        I: IntoIterator<Item = Option<&'t mut dyn LootTable>>,
    {
        tables
            .into_iter()
            .flatten()
            .map(|table| self.loot.merge_into(Some(table)))
            .collect()
    }
}

impl GearSpawnerBuilder {
    pub fn config(mut self, config: SpawnerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the configuration from a RON file. Takes precedence over
    /// `config()`.
    pub fn config_path(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    pub fn spawn_dir(mut self, path: &str) -> Self {
        self.spawn_dirs.push(path.to_string());
        self
    }

    pub fn spawn_file(mut self, path: &str) -> Self {
        self.spawn_files.push(path.to_string());
        self
    }

    /// Provide spawn text directly (for testing without files).
    pub fn with_source(mut self, origin: &str, source: &str) -> Self {
        self.sources.push((origin.to_string(), source.to_string()));
        self
    }

    pub fn build(self) -> Result<GearSpawner, SpawnerError> {
        let config = match self.config_path {
            Some(ref path) => SpawnerConfig::load_from_ron(Path::new(path))?,
            None => self.config.unwrap_or_default(),
        };
        let mut spawner = GearSpawner::new(config);

        for dir in &self.spawn_dirs {
            spawner.load_dir(Path::new(dir))?;
        }
        for file in &self.spawn_files {
            spawner.load_file(Path::new(file))?;
        }
        for (origin, source) in &self.sources {
            spawner.load_str(origin, source)?;
        }

        Ok(spawner)
    }
}

/// Files in `dir` with the given extension, sorted by file name.
pub fn spawn_files_in(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if path.is_file() && matches {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
