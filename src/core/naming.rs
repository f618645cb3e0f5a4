//! Name normalization: canonical registry keys and asset names.

/// Prefix every spawnable item asset name carries on the host side.
pub const DEFAULT_ITEM_PREFIX: &str = "GEAR_";

/// Scene keys are case-insensitive and stored lowercase.
pub fn scene_key(scene_name: &str) -> String {
    scene_name.to_lowercase()
}

/// Map an author-facing loot-table name onto the host's table naming.
///
/// - `loot...` is used as-is (lowercased)
/// - `cargo...` becomes `loot` + name
/// - anything else becomes `loottable` + name
pub fn loot_table_key(table_name: &str) -> String {
    let lower = table_name.to_lowercase();
    if lower.starts_with("loot") {
        lower
    } else if lower.starts_with("cargo") {
        format!("loot{}", lower)
    } else {
        format!("loottable{}", lower)
    }
}

/// Key under which a host table looks up its stored entries: the host's
/// own table name, lowercased.
pub fn host_table_key(host_table_name: &str) -> String {
    host_table_name.to_lowercase()
}

/// Ensure an item name carries `prefix`.
///
/// The prefix test ignores ASCII case, so `gear_rope` and `GEAR_rope`
/// both come out as `GEAR_rope`.
pub fn item_name(raw: &str, prefix: &str) -> String {
    match raw.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => {
            format!("{}{}", prefix, &raw[prefix.len()..])
        }
        _ => format!("{}{}", prefix, raw),
    }
}

/// Scenes that never resolve spawns: the empty name and any configured
/// menu/loader scene, compared case-insensitively.
pub fn is_non_game_scene(scene_name: &str, non_game_scenes: &[String]) -> bool {
    scene_name.is_empty()
        || non_game_scenes
            .iter()
            .any(|s| s.eq_ignore_ascii_case(scene_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_key_lowercases() {
        assert_eq!(scene_key("CoastalRegion"), "coastalregion");
        assert_eq!(scene_key("camp"), "camp");
    }

    #[test]
    fn loot_table_key_prefix_rules() {
        assert_eq!(loot_table_key("cargodrop"), "lootcargodrop");
        assert_eq!(loot_table_key("lootcrate"), "lootcrate");
        assert_eq!(loot_table_key("bearcache"), "loottablebearcache");
    }

    #[test]
    fn loot_table_key_ignores_case() {
        assert_eq!(loot_table_key("LootTableLocker"), "loottablelocker");
        assert_eq!(loot_table_key("CargoContainer"), "lootcargocontainer");
        assert_eq!(loot_table_key("Backpack"), "loottablebackpack");
    }

    #[test]
    fn item_name_adds_missing_prefix() {
        assert_eq!(item_name("hatchet", DEFAULT_ITEM_PREFIX), "GEAR_hatchet");
    }

    #[test]
    fn item_name_keeps_existing_prefix() {
        assert_eq!(item_name("GEAR_Hatchet", DEFAULT_ITEM_PREFIX), "GEAR_Hatchet");
        assert_eq!(item_name("gear_hatchet", DEFAULT_ITEM_PREFIX), "GEAR_hatchet");
    }

    #[test]
    fn item_name_short_and_multibyte_names() {
        assert_eq!(item_name("ge", DEFAULT_ITEM_PREFIX), "GEAR_ge");
        assert_eq!(item_name("gé_x", DEFAULT_ITEM_PREFIX), "GEAR_gé_x");
    }

    #[test]
    fn non_game_scenes() {
        let menus = vec!["MainMenu".to_string(), "Boot".to_string()];
        assert!(is_non_game_scene("", &menus));
        assert!(is_non_game_scene("MainMenu", &menus));
        assert!(is_non_game_scene("mainmenu", &menus));
        assert!(!is_non_game_scene("CoastalRegion", &menus));
    }
}
