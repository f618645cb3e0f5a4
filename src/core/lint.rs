/// Spawn-file linting: content checks beyond what the reader rejects.

use rustc_hash::FxHashMap;
use std::fmt;

use crate::core::naming::{item_name, loot_table_key};
use crate::core::reader::{ReadError, SpawnFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LintIssue {
    pub severity: Severity,
    pub origin: String,
    pub line_number: usize,
    pub message: String,
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        };
        write!(
            f,
            "{}: {}:{}: {}",
            label, self.origin, self.line_number, self.message
        )
    }
}

/// Accumulates issues across every file of a content set. Duplicate loot
/// entries are detected across files, since all files feed one registry.
#[derive(Debug, Clone)]
pub struct Linter {
    item_prefix: String,
    seen_loot: FxHashMap<(String, String), (String, usize)>,
    issues: Vec<LintIssue>,
}

impl Linter {
    pub fn new(item_prefix: &str) -> Self {
        Self {
            item_prefix: item_prefix.to_string(),
            seen_loot: FxHashMap::default(),
            issues: Vec::new(),
        }
    }

    /// Record a file the reader rejected.
    pub fn read_failed(&mut self, origin: &str, error: &ReadError) {
        self.push(Severity::Error, origin, error.line_number, error.kind.to_string());
    }

    /// Check a file the reader accepted.
    pub fn check(&mut self, origin: &str, file: &SpawnFile) {
        for staged in &file.spawns {
            let chance = staged.directive.spawn_chance;
            if chance == 0.0 {
                self.push(
                    Severity::Warning,
                    origin,
                    staged.line_number,
                    format!("'{}' has a spawn chance of 0 and can never spawn", staged.directive.prefab_name),
                );
            } else if !(0.0..=100.0).contains(&chance) {
                self.push(
                    Severity::Warning,
                    origin,
                    staged.line_number,
                    format!(
                        "'{}' has a spawn chance of {} outside 0-100",
                        staged.directive.prefab_name, chance
                    ),
                );
            }
        }

        for staged in &file.loot_entries {
            if staged.entry.weight == 0 {
                self.push(
                    Severity::Warning,
                    origin,
                    staged.line_number,
                    format!("'{}' has weight 0 and will never be drawn", staged.entry.prefab_name),
                );
            }

            let key = (
                loot_table_key(&staged.table),
                item_name(&staged.entry.prefab_name, &self.item_prefix).to_lowercase(),
            );
            if let Some((first_origin, first_line)) = self.seen_loot.get(&key).cloned() {
                self.push(
                    Severity::Warning,
                    origin,
                    staged.line_number,
                    format!(
                        "'{}' is already in loot table '{}' ({}:{}); this entry is ignored",
                        staged.entry.prefab_name, staged.table, first_origin, first_line
                    ),
                );
            } else {
                self.seen_loot
                    .insert(key, (origin.to_string(), staged.line_number));
            }
        }

        self.check_empty_contexts(origin, file);
    }

    /// A scene or loot table with no directives before the next context
    /// declaration is almost always a mistake.
    fn check_empty_contexts(&mut self, origin: &str, file: &SpawnFile) {
        let mut declarations: Vec<(usize, &str, &str)> = file
            .declared_scenes
            .iter()
            .map(|(line, name)| (*line, "scene", name.as_str()))
            .chain(
                file.declared_tables
                    .iter()
                    .map(|(line, name)| (*line, "loot table", name.as_str())),
            )
            .collect();
        declarations.sort_unstable_by_key(|(line, _, _)| *line);

        let used_lines: Vec<usize> = file
            .spawns
            .iter()
            .map(|s| s.line_number)
            .chain(file.loot_entries.iter().map(|e| e.line_number))
            .collect();

        for (i, (line, kind, name)) in declarations.iter().enumerate() {
            let next = declarations
                .get(i + 1)
                .map(|(next_line, _, _)| *next_line)
                .unwrap_or(usize::MAX);
            let has_items = used_lines.iter().any(|l| *l > *line && *l < next);
            if !has_items {
                self.push(
                    Severity::Warning,
                    origin,
                    *line,
                    format!("{} '{}' is declared without any items", kind, name),
                );
            }
        }
    }

    fn push(&mut self, severity: Severity, origin: &str, line_number: usize, message: String) {
        self.issues.push(LintIssue {
            severity,
            origin: origin.to_string(),
            line_number,
            message,
        });
    }

    pub fn issues(&self) -> &[LintIssue] {
        &self.issues
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::naming::DEFAULT_ITEM_PREFIX;
    use crate::core::reader::read_str;

    fn lint(source: &str) -> Linter {
        let mut linter = Linter::new(DEFAULT_ITEM_PREFIX);
        match read_str(source) {
            Ok(file) => linter.check("test.txt", &file),
            Err(e) => linter.read_failed("test.txt", &e),
        }
        linter
    }

    #[test]
    fn clean_file_has_no_issues() {
        let linter = lint("scene = camp\nitem = rope c = 50\nloottable = cache\nitem = rope w = 2");
        assert!(linter.issues().is_empty(), "{:?}", linter.issues());
    }

    #[test]
    fn read_failure_is_an_error() {
        let linter = lint("scene = camp\nitem = rope p = 1,2");
        assert_eq!(linter.error_count(), 1);
        assert_eq!(linter.issues()[0].line_number, 2);
        assert!(linter.issues()[0].to_string().starts_with("ERROR: test.txt:2:"));
    }

    #[test]
    fn chance_warnings() {
        let linter = lint("scene = camp\nitem = rope c = 0\nitem = flare c = 150\nitem = knife c = 100");
        assert_eq!(linter.warning_count(), 2);
        assert_eq!(linter.issues()[0].line_number, 2);
        assert_eq!(linter.issues()[1].line_number, 3);
    }

    #[test]
    fn zero_weight_warning() {
        let linter = lint("loottable = cache\nitem = rope w = 0");
        assert_eq!(linter.warning_count(), 1);
        assert!(linter.issues()[0].message.contains("weight 0"));
    }

    #[test]
    fn duplicate_loot_entries_across_files() {
        let mut linter = Linter::new(DEFAULT_ITEM_PREFIX);
        linter.check("a.txt", &read_str("loottable = cache\nitem = rope w = 1").unwrap());
        linter.check(
            "b.txt",
            &read_str("loottable = LootTableCache\nitem = gear_rope w = 3").unwrap(),
        );
        assert_eq!(linter.warning_count(), 1);
        let issue = &linter.issues()[0];
        assert_eq!(issue.origin, "b.txt");
        assert!(issue.message.contains("a.txt:2"));
    }

    #[test]
    fn empty_contexts_are_flagged() {
        let linter = lint("scene = camp\nscene = lake\nitem = rope\nloottable = cache");
        let lines: Vec<usize> = linter.issues().iter().map(|i| i.line_number).collect();
        assert_eq!(lines, vec![1, 4]);
    }
}
