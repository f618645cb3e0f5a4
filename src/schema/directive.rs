use super::spawn::Vec3;

/// The closed set of line shapes understood by the spawn language.
///
/// Produced by the line classifier before any context checks, so the
/// grammar can be tested without touching a registry.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// `scene = <name>`
    Scene(String),
    /// `tag = <name>`
    Tag(String),
    /// `item = <name> [p = x,y,z] [r = x,y,z] [c = <number>]`
    Spawn {
        prefab_name: String,
        position: Vec3,
        rotation_euler: Vec3,
        spawn_chance: f32,
    },
    /// `loottable = <name>`
    LootTable(String),
    /// `item = <name> w = <integer>`
    LootEntry { prefab_name: String, weight: u32 },
}

impl Directive {
    /// Short keyword naming the line shape, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scene(_) => "scene",
            Self::Tag(_) => "tag",
            Self::Spawn { .. } => "spawn",
            Self::LootTable(_) => "loottable",
            Self::LootEntry { .. } => "loot entry",
        }
    }
}
