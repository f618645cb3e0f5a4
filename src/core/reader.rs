/// Spawn-file reader: line classification and the context-carrying fold.
///
/// The language is line oriented and case-insensitive:
///
/// ```text
/// scene = <name>
/// tag = <name>
/// item = <name> [p = x,y,z] [r = x,y,z] [c = <number>]
/// loottable = <name>
/// item = <name> w = <integer>
/// ```
///
/// Blank lines and lines starting with `#` are ignored.

use log::{info, trace};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::core::loot_registry::LootTableRegistry;
use crate::core::spawn_registry::SpawnRegistry;
use crate::schema::directive::Directive;
use crate::schema::loot::LootTableEntry;
use crate::schema::spawn::{SpawnDirective, Vec3, DEFAULT_SPAWN_CHANCE, DEFAULT_TAG};

/// A numeric token as captured by the line patterns. Validation of the
/// token happens afterwards so a bad number is reported as such instead
/// of as an unrecognized line.
const NUMBER: &str = r"[-+.\w]+";

static VECTOR: Lazy<String> = Lazy::new(|| format!(r"{n}(?:\s*,\s*{n})*", n = NUMBER));

static SCENE_REGEX: Lazy<Regex> = Lazy::new(|| line_regex(r"^scene\s*=\s*(\w+)$"));
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| line_regex(r"^tag\s*=\s*(\w+)$"));
static LOOTTABLE_REGEX: Lazy<Regex> = Lazy::new(|| line_regex(r"^loottable\s*=\s*(\w+)$"));

static SPAWN_REGEX: Lazy<Regex> = Lazy::new(|| {
    line_regex(&format!(
        r"^item\s*=\s*(\w+)(?:\W+p\s*=\s*({v}))?(?:\W+r\s*=\s*({v}))?(?:\W+c\s*=\s*({n}))?$",
        v = *VECTOR,
        n = NUMBER
    ))
});

static LOOTTABLE_ENTRY_REGEX: Lazy<Regex> = Lazy::new(|| {
    line_regex(&format!(
        r"^item\s*=\s*(\w+)\W+w\s*=\s*({n})$",
        n = NUMBER
    ))
});

static DECIMAL_REGEX: Lazy<Regex> = Lazy::new(|| line_regex(r"^-?\d+(?:\.\d+)?$"));
static INTEGER_REGEX: Lazy<Regex> = Lazy::new(|| line_regex(r"^\d+$"));

fn line_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(e) => panic!("invalid built-in pattern '{}': {}", pattern, e),
    }
}

/// What went wrong on a line, independent of where the line sits.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReadErrorKind {
    #[error("unrecognized line")]
    UnrecognizedLine,
    #[error("no scene defined before this line. Did you forget a 'scene = <SceneName>'?")]
    MissingScene,
    #[error("no loottable defined before this line. Did you forget a 'loottable = <LootTableName>'?")]
    MissingLootTable,
    #[error("could not parse '{0}' as a numeric value")]
    InvalidNumber(String),
    #[error("a vector requires 3 components, but found {0}")]
    VectorArity(usize),
}

/// A malformed line, carrying the line text exactly as it was written.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} (line {line_number}: '{line}')")]
pub struct ReadError {
    pub kind: ReadErrorKind,
    /// 1-based.
    pub line_number: usize,
    pub line: String,
}

/// A spawn directive waiting to be committed, with the scene it was
/// declared under.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedSpawn {
    pub line_number: usize,
    pub scene: String,
    pub directive: SpawnDirective,
}

/// A loot entry waiting to be committed, with its raw table name.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedLootEntry {
    pub line_number: usize,
    pub table: String,
    pub entry: LootTableEntry,
}

/// Everything one spawn source declared. Nothing reaches a registry until
/// [`SpawnFile::commit`] is called, so a failed read leaves no trace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnFile {
    pub spawns: Vec<StagedSpawn>,
    pub loot_entries: Vec<StagedLootEntry>,
    pub declared_scenes: Vec<(usize, String)>,
    pub declared_tables: Vec<(usize, String)>,
}

/// Counts reported after a commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub spawns: usize,
    pub loot_entries: usize,
}

impl SpawnFile {
    /// Move every staged directive into the registries, in file order.
    pub fn commit(self, spawns: &mut SpawnRegistry, loot: &mut LootTableRegistry) -> CommitSummary {
        let summary = CommitSummary {
            spawns: self.spawns.len(),
            loot_entries: self.loot_entries.len(),
        };
        for staged in self.spawns {
            spawns.record(&staged.scene, staged.directive);
        }
        for staged in self.loot_entries {
            loot.record(&staged.table, staged.entry);
        }
        summary
    }
}

/// Context carried from one line to the next.
///
/// Scene and loot table are mutually exclusive: declaring one forgets the
/// other. The tag survives both.
#[derive(Debug, Clone)]
struct ReaderState {
    scene: Option<String>,
    loot_table: Option<String>,
    tag: String,
    file: SpawnFile,
}

impl Default for ReaderState {
    fn default() -> Self {
        Self {
            scene: None,
            loot_table: None,
            tag: DEFAULT_TAG.to_string(),
            file: SpawnFile::default(),
        }
    }
}

impl ReaderState {
    fn apply(mut self, directive: Directive, line_number: usize) -> Result<Self, ReadErrorKind> {
        trace!("line {}: {} directive", line_number, directive.kind());
        match directive {
            Directive::Scene(name) => {
                self.file.declared_scenes.push((line_number, name.clone()));
                self.scene = Some(name);
                self.loot_table = None;
            }
            Directive::Tag(tag) => {
                info!("Tag found while reading spawn file. '{}'", tag);
                self.tag = tag;
            }
            Directive::Spawn {
                prefab_name,
                position,
                rotation_euler,
                spawn_chance,
            } => {
                let scene = self.scene.clone().ok_or(ReadErrorKind::MissingScene)?;
                let directive = SpawnDirective {
                    prefab_name,
                    position,
                    rotation_euler,
                    spawn_chance,
                    tag: self.tag.clone(),
                };
                self.file.spawns.push(StagedSpawn {
                    line_number,
                    scene,
                    directive,
                });
            }
            Directive::LootTable(name) => {
                self.file.declared_tables.push((line_number, name.clone()));
                self.loot_table = Some(name);
                self.scene = None;
            }
            Directive::LootEntry {
                prefab_name,
                weight,
            } => {
                let table = self
                    .loot_table
                    .clone()
                    .ok_or(ReadErrorKind::MissingLootTable)?;
                self.file.loot_entries.push(StagedLootEntry {
                    line_number,
                    table,
                    entry: LootTableEntry::new(prefab_name, weight),
                });
            }
        }
        Ok(self)
    }
}

/// Read a whole spawn source held in memory. A leading byte-order mark
/// is dropped.
pub fn read_str(source: &str) -> Result<SpawnFile, ReadError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    read_lines(source.lines())
}

/// Read spawn lines in order. Stops at the first malformed line.
pub fn read_lines<'a, I>(lines: I) -> Result<SpawnFile, ReadError>
where
    I: IntoIterator<Item = &'a str>,
{
    let state = lines.into_iter().enumerate().try_fold(
        ReaderState::default(),
        |state, (index, raw)| {
            let line_number = index + 1;
            let at_line = |kind| ReadError {
                kind,
                line_number,
                line: raw.to_string(),
            };
            match classify_line(raw).map_err(at_line)? {
                Some(directive) => state.apply(directive, line_number).map_err(at_line),
                None => Ok(state),
            }
        },
    )?;
    Ok(state.file)
}

/// Classify one line without any carried context.
///
/// Returns `Ok(None)` for blank and comment lines. The spawn shape is
/// tried before the loot-entry shape; the two cannot both match because
/// a spawn line has no `w =` clause and a loot entry has nothing else.
pub fn classify_line(raw: &str) -> Result<Option<Directive>, ReadErrorKind> {
    let line = raw.trim().to_lowercase();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    if let Some(caps) = SCENE_REGEX.captures(&line) {
        return Ok(Some(Directive::Scene(caps[1].to_string())));
    }

    if let Some(caps) = TAG_REGEX.captures(&line) {
        return Ok(Some(Directive::Tag(caps[1].to_string())));
    }

    if let Some(caps) = SPAWN_REGEX.captures(&line) {
        let capture = |i: usize| caps.get(i).map(|m| m.as_str());
        let spawn_chance = match capture(4) {
            Some(value) => parse_decimal(value)?,
            None => DEFAULT_SPAWN_CHANCE,
        };
        return Ok(Some(Directive::Spawn {
            prefab_name: caps[1].to_string(),
            position: parse_vector(capture(2))?,
            rotation_euler: parse_vector(capture(3))?,
            spawn_chance,
        }));
    }

    if let Some(caps) = LOOTTABLE_REGEX.captures(&line) {
        return Ok(Some(Directive::LootTable(caps[1].to_string())));
    }

    if let Some(caps) = LOOTTABLE_ENTRY_REGEX.captures(&line) {
        return Ok(Some(Directive::LootEntry {
            prefab_name: caps[1].to_string(),
            weight: parse_weight(&caps[2])?,
        }));
    }

    Err(ReadErrorKind::UnrecognizedLine)
}

/// Parse a decimal with `.` as separator, independent of any locale.
fn parse_decimal(value: &str) -> Result<f32, ReadErrorKind> {
    if !DECIMAL_REGEX.is_match(value) {
        return Err(ReadErrorKind::InvalidNumber(value.to_string()));
    }
    value
        .parse::<f32>()
        .map_err(|_| ReadErrorKind::InvalidNumber(value.to_string()))
}

fn parse_weight(value: &str) -> Result<u32, ReadErrorKind> {
    if !INTEGER_REGEX.is_match(value) {
        return Err(ReadErrorKind::InvalidNumber(value.to_string()));
    }
    value
        .parse::<u32>()
        .map_err(|_| ReadErrorKind::InvalidNumber(value.to_string()))
}

/// Parse `x,y,z`. A missing vector is the origin.
fn parse_vector(value: Option<&str>) -> Result<Vec3, ReadErrorKind> {
    let Some(value) = value else {
        return Ok(Vec3::ZERO);
    };

    let components: Vec<&str> = value.split(',').map(str::trim).collect();
    if components.len() != 3 {
        return Err(ReadErrorKind::VectorArity(components.len()));
    }

    Ok(Vec3::new(
        parse_decimal(components[0])?,
        parse_decimal(components[1])?,
        parse_decimal(components[2])?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(line: &str) -> (String, Vec3, Vec3, f32) {
        match classify_line(line).unwrap() {
            Some(Directive::Spawn {
                prefab_name,
                position,
                rotation_euler,
                spawn_chance,
            }) => (prefab_name, position, rotation_euler, spawn_chance),
            other => panic!("expected spawn directive, got {:?}", other),
        }
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(classify_line("").unwrap(), None);
        assert_eq!(classify_line("   \t ").unwrap(), None);
        assert_eq!(classify_line("# item = nothing").unwrap(), None);
        assert_eq!(classify_line("   #indented comment").unwrap(), None);
    }

    #[test]
    fn classify_context_lines() {
        assert_eq!(
            classify_line("Scene = CoastalRegion").unwrap(),
            Some(Directive::Scene("coastalregion".to_string()))
        );
        assert_eq!(
            classify_line("tag=Tools").unwrap(),
            Some(Directive::Tag("tools".to_string()))
        );
        assert_eq!(
            classify_line("  LOOTTABLE = BearCache  ").unwrap(),
            Some(Directive::LootTable("bearcache".to_string()))
        );
    }

    #[test]
    fn classify_spawn_with_all_clauses() {
        let (name, p, r, c) = spawn("item = Hatchet p = 1.5, -2, 3 r = 0,90,0 c = 12.5");
        assert_eq!(name, "hatchet");
        assert_eq!(p, Vec3::new(1.5, -2.0, 3.0));
        assert_eq!(r, Vec3::new(0.0, 90.0, 0.0));
        assert_eq!(c, 12.5);
    }

    #[test]
    fn classify_spawn_defaults() {
        let (name, p, r, c) = spawn("item = rope");
        assert_eq!(name, "rope");
        assert_eq!(p, Vec3::ZERO);
        assert_eq!(r, Vec3::ZERO);
        assert_eq!(c, 100.0);
    }

    #[test]
    fn classify_spawn_with_comma_separated_clauses() {
        let (_, p, _, c) = spawn("item = rope, p = 1,2,3, c = 40");
        assert_eq!(p, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(c, 40.0);
    }

    #[test]
    fn classify_loot_entry() {
        assert_eq!(
            classify_line("item = GEAR_Rope w = 7").unwrap(),
            Some(Directive::LootEntry {
                prefab_name: "gear_rope".to_string(),
                weight: 7
            })
        );
    }

    #[test]
    fn spawn_and_loot_entry_shapes_are_exclusive() {
        assert!(matches!(
            classify_line("item = rope w = 1"),
            Ok(Some(Directive::LootEntry { .. }))
        ));
        assert_eq!(
            classify_line("item = rope p = 1,2,3 w = 1"),
            Err(ReadErrorKind::UnrecognizedLine)
        );
        assert_eq!(
            classify_line("item = rope w = 1 c = 50"),
            Err(ReadErrorKind::UnrecognizedLine)
        );
    }

    #[test]
    fn clauses_out_of_order_are_unrecognized() {
        assert_eq!(
            classify_line("item = rope c = 50 p = 1,2,3"),
            Err(ReadErrorKind::UnrecognizedLine)
        );
    }

    #[test]
    fn unknown_shape_is_unrecognized() {
        assert_eq!(
            classify_line("spawn rope somewhere"),
            Err(ReadErrorKind::UnrecognizedLine)
        );
        assert_eq!(
            classify_line("scene = two words"),
            Err(ReadErrorKind::UnrecognizedLine)
        );
    }

    #[test]
    fn malformed_numbers_are_reported() {
        assert_eq!(
            classify_line("item = rope c = abc"),
            Err(ReadErrorKind::InvalidNumber("abc".to_string()))
        );
        assert_eq!(
            classify_line("item = rope p = 1,x2,3"),
            Err(ReadErrorKind::InvalidNumber("x2".to_string()))
        );
        assert_eq!(
            classify_line("item = rope c = 1e5"),
            Err(ReadErrorKind::InvalidNumber("1e5".to_string()))
        );
    }

    #[test]
    fn weights_must_be_non_negative_integers() {
        assert_eq!(
            classify_line("item = rope w = 1.5"),
            Err(ReadErrorKind::InvalidNumber("1.5".to_string()))
        );
        assert_eq!(
            classify_line("item = rope w = -3"),
            Err(ReadErrorKind::InvalidNumber("-3".to_string()))
        );
        assert_eq!(
            classify_line("item = rope w = 99999999999"),
            Err(ReadErrorKind::InvalidNumber("99999999999".to_string()))
        );
    }

    #[test]
    fn vector_arity_is_reported() {
        assert_eq!(
            classify_line("item = rope p = 1,2"),
            Err(ReadErrorKind::VectorArity(2))
        );
        assert_eq!(
            classify_line("item = rope r = 1,2,3,4"),
            Err(ReadErrorKind::VectorArity(4))
        );
    }

    #[test]
    fn read_scene_spawn() {
        let file = read_str("scene = camp\nitem = bearskin p = 1,2,3 c = 50").unwrap();
        assert_eq!(file.spawns.len(), 1);
        let staged = &file.spawns[0];
        assert_eq!(staged.scene, "camp");
        assert_eq!(staged.line_number, 2);
        assert_eq!(
            staged.directive,
            SpawnDirective::new("bearskin")
                .at(Vec3::new(1.0, 2.0, 3.0))
                .with_chance(50.0)
        );
    }

    #[test]
    fn tag_carries_across_scenes() {
        let file = read_str(
            "scene = a\nitem = one\ntag = rare\nitem = two\nscene = b\nitem = three\ntag = common\nitem = four",
        )
        .unwrap();
        let tags: Vec<&str> = file.spawns.iter().map(|s| s.directive.tag.as_str()).collect();
        assert_eq!(tags, vec!["none", "rare", "rare", "common"]);
        let scenes: Vec<&str> = file.spawns.iter().map(|s| s.scene.as_str()).collect();
        assert_eq!(scenes, vec!["a", "a", "b", "b"]);
    }

    #[test]
    fn tag_needs_no_context() {
        let file = read_str("tag = early\nscene = a\nitem = one").unwrap();
        assert_eq!(file.spawns[0].directive.tag, "early");
    }

    #[test]
    fn loot_entry_without_table_fails_with_line() {
        let err = read_str("item = foo w = 3").unwrap_err();
        assert_eq!(err.kind, ReadErrorKind::MissingLootTable);
        assert_eq!(err.line, "item = foo w = 3");
        assert_eq!(err.line_number, 1);
        assert!(err.to_string().contains("'item = foo w = 3'"));
    }

    #[test]
    fn spawn_without_scene_fails() {
        let err = read_str("# header\n\nitem = rope").unwrap_err();
        assert_eq!(err.kind, ReadErrorKind::MissingScene);
        assert_eq!(err.line_number, 3);
        assert!(err.to_string().contains("scene = <SceneName>"));
    }

    #[test]
    fn loottable_clears_scene() {
        let err = read_str("scene = camp\nloottable = cache\nitem = rope p = 1,2,3").unwrap_err();
        assert_eq!(err.kind, ReadErrorKind::MissingScene);
    }

    #[test]
    fn scene_clears_loottable() {
        let err = read_str("loottable = cache\nitem = rope w = 2\nscene = camp\nitem = rope w = 2")
            .unwrap_err();
        assert_eq!(err.kind, ReadErrorKind::MissingLootTable);
        assert_eq!(err.line_number, 4);
    }

    #[test]
    fn error_keeps_original_line_text() {
        let err = read_str("scene = camp\n   Item = Rope C = lots  ").unwrap_err();
        assert_eq!(err.line, "   Item = Rope C = lots  ");
        assert_eq!(err.kind, ReadErrorKind::InvalidNumber("lots".to_string()));
    }

    #[test]
    fn read_loot_entries() {
        let file = read_str("loottable = cargodrop\nitem = rope w = 3\nitem = gear_flare w = 0").unwrap();
        assert_eq!(file.loot_entries.len(), 2);
        assert_eq!(file.loot_entries[0].table, "cargodrop");
        assert_eq!(file.loot_entries[1].entry, LootTableEntry::new("gear_flare", 0));
        assert_eq!(file.declared_tables, vec![(1, "cargodrop".to_string())]);
    }

    #[test]
    fn byte_order_mark_and_crlf_are_accepted() {
        let file = read_str("\u{feff}scene = Camp\r\nitem = rope c = 50\r\n").unwrap();
        assert_eq!(file.declared_scenes, vec![(1, "camp".to_string())]);
        assert_eq!(file.spawns.len(), 1);
        assert_eq!(file.spawns[0].directive.spawn_chance, 50.0);
    }

    #[test]
    fn read_is_deterministic() {
        let source = "scene = a\nitem = one c = 5\nloottable = b\nitem = two w = 4";
        assert_eq!(read_str(source).unwrap(), read_str(source).unwrap());
    }

    #[test]
    fn commit_moves_into_registries() {
        let file = read_str("scene = Camp\nitem = rope\nloottable = bearcache\nitem = rope w = 2").unwrap();
        let mut spawns = SpawnRegistry::default();
        let mut loot = LootTableRegistry::default();
        let summary = file.commit(&mut spawns, &mut loot);
        assert_eq!(summary, CommitSummary { spawns: 1, loot_entries: 1 });
        assert_eq!(spawns.resolve("camp").len(), 1);
        assert_eq!(loot.entries("loottablebearcache").len(), 1);
    }
}
