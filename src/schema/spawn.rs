use serde::{Deserialize, Serialize};

/// Tag carried by spawn directives declared before any `tag = ...` line.
pub const DEFAULT_TAG: &str = "none";

/// Spawn chance used when an `item =` line has no `c =` clause.
pub const DEFAULT_SPAWN_CHANCE: f32 = 100.0;

/// A plain three-component vector used for positions and Euler angles.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

/// One `item = ...` line declared inside a scene.
///
/// The prefab name is kept exactly as written; the item prefix is only
/// applied when the directive is resolved against the asset loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnDirective {
    pub prefab_name: String,
    pub position: Vec3,
    /// Euler angles in degrees. Conversion to the host's rotation type is
    /// left to the instantiator.
    pub rotation_euler: Vec3,
    pub spawn_chance: f32,
    pub tag: String,
}

impl SpawnDirective {
    /// A directive at the origin with full chance and the default tag.
    pub fn new(prefab_name: impl Into<String>) -> Self {
        Self {
            prefab_name: prefab_name.into(),
            position: Vec3::ZERO,
            rotation_euler: Vec3::ZERO,
            spawn_chance: DEFAULT_SPAWN_CHANCE,
            tag: DEFAULT_TAG.to_string(),
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, rotation_euler: Vec3) -> Self {
        self.rotation_euler = rotation_euler;
        self
    }

    pub fn with_chance(mut self, spawn_chance: f32) -> Self {
        self.spawn_chance = spawn_chance;
        self
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }
}
