/// Spawn registry: spawn directives keyed by scene.

use log::info;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::naming::scene_key;
use crate::schema::spawn::SpawnDirective;

/// Scene name → directives, in the order they were recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnRegistry {
    scenes: FxHashMap<String, Vec<SpawnDirective>>,
}

impl SpawnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a directive to a scene, creating the scene on first use.
    pub fn record(&mut self, scene_name: &str, directive: SpawnDirective) {
        self.scenes
            .entry(scene_key(scene_name))
            .or_default()
            .push(directive);
    }

    /// All directives for a scene. An unknown scene yields an empty slice.
    pub fn resolve(&self, scene_name: &str) -> &[SpawnDirective] {
        let key = scene_key(scene_name);
        match self.scenes.get(&key) {
            Some(directives) => {
                info!("Found {} spawn entries for '{}'", directives.len(), key);
                directives
            }
            None => {
                info!("Could not find any spawn entries for '{}'", key);
                &[]
            }
        }
    }

    pub fn contains_scene(&self, scene_name: &str) -> bool {
        self.scenes.contains_key(&scene_key(scene_name))
    }

    /// Scene keys, sorted.
    pub fn scenes(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.scenes.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Total number of directives across all scenes.
    pub fn len(&self) -> usize {
        self.scenes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::spawn::Vec3;

    #[test]
    fn record_and_resolve_preserves_order() {
        let mut registry = SpawnRegistry::new();
        registry.record("camp", SpawnDirective::new("first"));
        registry.record("camp", SpawnDirective::new("second"));
        registry.record("camp", SpawnDirective::new("third").at(Vec3::new(1.0, 0.0, 0.0)));

        let names: Vec<&str> = registry
            .resolve("camp")
            .iter()
            .map(|d| d.prefab_name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn scene_lookup_ignores_case() {
        let mut registry = SpawnRegistry::new();
        registry.record("CoastalRegion", SpawnDirective::new("rope"));
        assert_eq!(registry.resolve("coastalregion").len(), 1);
        assert_eq!(registry.resolve("COASTALREGION").len(), 1);
        assert!(registry.contains_scene("coastalRegion"));
    }

    #[test]
    fn unknown_scene_is_empty() {
        let registry = SpawnRegistry::new();
        assert!(registry.resolve("nowhere").is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn directive_stays_under_one_scene() {
        let mut registry = SpawnRegistry::new();
        registry.record("a", SpawnDirective::new("rope"));
        registry.record("b", SpawnDirective::new("flare"));
        assert_eq!(registry.resolve("a")[0].prefab_name, "rope");
        assert_eq!(registry.resolve("b")[0].prefab_name, "flare");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.scenes(), vec!["a", "b"]);
    }
}
