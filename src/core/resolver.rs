/// Spawn resolution: turns a scene's directives into spawned items when
/// the host activates that scene.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::core::config::SpawnerConfig;
use crate::core::naming::{is_non_game_scene, item_name, scene_key};
use crate::core::spawn_registry::SpawnRegistry;
use crate::schema::spawn::{SpawnDirective, Vec3};

/// Host side of spawning: asset lookup and instantiation.
pub trait SpawnHost {
    type Asset;
    type Handle;

    /// Look up a spawnable asset by its normalized name.
    fn load_asset(&mut self, name: &str) -> Option<Self::Asset>;

    /// Place an instance of `asset` in the active scene.
    fn instantiate(&mut self, asset: &Self::Asset, position: Vec3, rotation_euler: Vec3)
        -> Self::Handle;
}

impl<T: SpawnHost + ?Sized> SpawnHost for &mut T {
    type Asset = T::Asset;
    type Handle = T::Handle;

    fn load_asset(&mut self, name: &str) -> Option<Self::Asset> {
        (**self).load_asset(name)
    }

    fn instantiate(
        &mut self,
        asset: &Self::Asset,
        position: Vec3,
        rotation_euler: Vec3,
    ) -> Self::Handle {
        (**self).instantiate(asset, position, rotation_euler)
    }
}

/// Adjusts a declared spawn chance, e.g. for the game's difficulty.
pub trait DifficultyScaler {
    fn adjust(&self, declared_chance: f32, directive: &SpawnDirective) -> f32;
}

impl<F> DifficultyScaler for F
where
    F: Fn(f32, &SpawnDirective) -> f32,
{
    fn adjust(&self, declared_chance: f32, directive: &SpawnDirective) -> f32 {
        self(declared_chance, directive)
    }
}

/// Decides whether a roll against a percentage chance succeeds.
pub trait RandomSource {
    fn roll_success(&mut self, chance: f32) -> bool;
}

impl<F> RandomSource for F
where
    F: FnMut(f32) -> bool,
{
    fn roll_success(&mut self, chance: f32) -> bool {
        self(chance)
    }
}

/// Receives the outcome of every resolved scene, including empty ones.
pub trait SpawnListener<H> {
    fn on_spawned(&mut self, report: &SpawnReport<H>);
}

impl<H, F> SpawnListener<H> for F
where
    F: FnMut(&SpawnReport<H>),
{
    fn on_spawned(&mut self, report: &SpawnReport<H>) {
        self(report)
    }
}

/// Scales chances by the configured global and per-tag multipliers.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigScaler {
    pub multiplier: f32,
    pub tag_multipliers: HashMap<String, f32>,
}

impl ConfigScaler {
    pub fn from_config(config: &SpawnerConfig) -> Self {
        Self {
            multiplier: config.chance_multiplier,
            tag_multipliers: config
                .tag_multipliers
                .iter()
                .map(|(tag, multiplier)| (tag.to_lowercase(), *multiplier))
                .collect(),
        }
    }
}

impl Default for ConfigScaler {
    fn default() -> Self {
        Self::from_config(&SpawnerConfig::default())
    }
}

impl DifficultyScaler for ConfigScaler {
    fn adjust(&self, declared_chance: f32, directive: &SpawnDirective) -> f32 {
        let tag_multiplier = self
            .tag_multipliers
            .get(&directive.tag.to_lowercase())
            .copied()
            .unwrap_or(1.0);
        declared_chance * self.multiplier * tag_multiplier
    }
}

/// Percentage roller over a seeded `StdRng`.
#[derive(Debug, Clone)]
pub struct SeededRoller {
    rng: StdRng,
}

impl SeededRoller {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRoller {
    /// `<= 0` never succeeds, `>= 100` always does.
    fn roll_success(&mut self, chance: f32) -> bool {
        if chance.is_nan() || chance <= 0.0 {
            false
        } else if chance >= 100.0 {
            true
        } else {
            self.rng.gen_range(0.0f32..100.0) < chance
        }
    }
}

/// Everything that happened while resolving one scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnReport<H> {
    pub scene: String,
    pub spawned: Vec<H>,
    /// Normalized names the host could not find.
    pub missing_assets: Vec<String>,
    /// Directives whose roll did not succeed.
    pub failed_rolls: usize,
    pub elapsed: Duration,
}

/// Resolves scenes against a host. Holds the collaborators; the registry
/// is borrowed per activation.
pub struct SpawnResolver<H, S, R> {
    host: H,
    scaler: S,
    random: R,
    item_prefix: String,
    non_game_scenes: Vec<String>,
}

impl<H, S, R> SpawnResolver<H, S, R>
where
    H: SpawnHost,
    S: DifficultyScaler,
    R: RandomSource,
{
    pub fn new(config: &SpawnerConfig, host: H, scaler: S, random: R) -> Self {
        Self {
            host,
            scaler,
            random,
            item_prefix: config.item_prefix.clone(),
            non_game_scenes: config.non_game_scenes.clone(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Handle a scene activation: resolve and publish one report to
    /// `listener`. Menu and loader scenes are ignored and yield `None`.
    pub fn on_scene_activated<L>(
        &mut self,
        registry: &SpawnRegistry,
        scene_name: &str,
        listener: &mut L,
    ) -> Option<SpawnReport<H::Handle>>
    where
        L: SpawnListener<H::Handle> + ?Sized,
    {
        if is_non_game_scene(scene_name, &self.non_game_scenes) {
            return None;
        }

        info!("Spawning items for scene '{}' ...", scene_name);
        let report = self.resolve(registry, scene_name);
        info!(
            "Spawned {} items for scene '{}' in {} ms",
            report.spawned.len(),
            scene_name,
            report.elapsed.as_millis()
        );

        listener.on_spawned(&report);
        Some(report)
    }

    /// Resolve every directive of a scene in a single pass.
    pub fn resolve(&mut self, registry: &SpawnRegistry, scene_name: &str) -> SpawnReport<H::Handle> {
        let started = Instant::now();
        let key = scene_key(scene_name);
        let mut spawned = Vec::new();
        let mut missing_assets = Vec::new();
        let mut failed_rolls = 0;

        for directive in registry.resolve(&key) {
            let name = item_name(&directive.prefab_name, &self.item_prefix);
            let Some(asset) = self.host.load_asset(&name) else {
                warn!(
                    "Could not find prefab '{}' to spawn in scene '{}'.",
                    directive.prefab_name, key
                );
                missing_assets.push(name);
                continue;
            };

            let chance = self.scaler.adjust(directive.spawn_chance, directive);
            // A roll against nothing cannot succeed, whatever the source says.
            if chance.is_nan() || chance <= 0.0 || !self.random.roll_success(chance) {
                failed_rolls += 1;
                continue;
            }

            spawned.push(self.host.instantiate(
                &asset,
                directive.position,
                directive.rotation_euler,
            ));
        }

        SpawnReport {
            scene: key,
            spawned,
            missing_assets,
            failed_rolls,
            elapsed: started.elapsed(),
        }
    }
}
