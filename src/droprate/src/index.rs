//! Monster and item indices over a directory of drop files

use crate::decode::TextDecoder;
use crate::export::{ExportError, ExportRow, ExportSink};
use crate::parser::{parse_file, FileReadError, ParseWarning, ParsedFile};
use crate::types::{DropEntry, ItemSource, MonsterRecord};
use crate::DEFAULT_EXTENSION;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Drop directory not found: {0:?}")]
    DirectoryNotFound(PathBuf),

    #[error("No drop files could be parsed in {path:?} ({failed} failed)")]
    NoRecords { path: PathBuf, failed: usize },
}

/// How a directory is scanned and decoded
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// File extension without the dot, matched case-insensitively
    pub extension: String,
    pub decoder: TextDecoder,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            decoder: TextDecoder::default(),
        }
    }
}

/// Aggregate counts of one load
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub total_monsters: usize,
    pub total_drop_entries: usize,
    pub unique_item_count: usize,
    pub source_directory: Option<PathBuf>,
    /// Files with the drop extension that were attempted
    pub files_scanned: usize,
    pub files_failed: usize,
    pub elapsed: Duration,
}

/// A parse warning together with the file it came from
#[derive(Debug, Clone, PartialEq)]
pub struct FileWarning {
    pub path: PathBuf,
    pub warning: ParseWarning,
}

/// Immutable snapshot of every parsed monster file.
///
/// `by_item` lists sources in scan order and keeps repeats of the same
/// monster; collapsing them is left to [`crate::query`].
#[derive(Debug, Default)]
pub struct DropIndex {
    records: Vec<MonsterRecord>,
    by_monster: HashMap<String, usize>,
    by_item: BTreeMap<String, Vec<ItemSource>>,
    stats: Stats,
    failures: Vec<FileReadError>,
    warnings: Vec<FileWarning>,
}

impl DropIndex {
    /// Parse every drop file directly inside `dir`.
    ///
    /// Unreadable files are recorded in [`DropIndex::failures`] and skipped.
    /// Fails only if `dir` is not a directory or no file produced a record.
    pub fn load(dir: impl AsRef<Path>, options: &LoadOptions) -> Result<Self, LoadError> {
        let dir = dir.as_ref();
        let started = Instant::now();

        if !dir.is_dir() {
            tracing::error!("Drop directory not found: {}", dir.display());
            return Err(LoadError::DirectoryNotFound(dir.to_path_buf()));
        }

        let attempts = drop_files(dir, &options.extension)
            .into_iter()
            .map(|path| {
                let parsed = parse_file(&path, &options.decoder);
                (path, parsed)
            });

        let mut index = Self::assemble(dir, attempts)?;
        index.stats.elapsed = started.elapsed();

        tracing::info!(
            "Parsed {} monster files, {} drop entries, {} unique items ({} files failed, {} warnings)",
            index.stats.total_monsters,
            index.stats.total_drop_entries,
            index.stats.unique_item_count,
            index.stats.files_failed,
            index.warnings.len()
        );

        Ok(index)
    }

    /// Build an index from per-file parse outcomes, in scan order
    fn assemble<I>(dir: &Path, attempts: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = (PathBuf, Result<ParsedFile, FileReadError>)>,
    {
        let mut records = Vec::new();
        let mut failures = Vec::new();
        let mut warnings = Vec::new();
        let mut scanned = 0;

        for (path, attempt) in attempts {
            scanned += 1;
            match attempt {
                Ok(parsed) => {
                    warnings.extend(parsed.warnings.into_iter().map(|warning| FileWarning {
                        path: path.clone(),
                        warning,
                    }));
                    records.push(parsed.record);
                }
                Err(err) => {
                    tracing::warn!("Skipping {}: {}", path.display(), err);
                    failures.push(err);
                }
            }
        }

        if records.is_empty() {
            return Err(LoadError::NoRecords {
                path: dir.to_path_buf(),
                failed: failures.len(),
            });
        }

        let mut index = Self::from_records(records);
        index.stats.source_directory = Some(dir.to_path_buf());
        index.stats.files_scanned = scanned;
        index.stats.files_failed = failures.len();
        index.failures = failures;
        index.warnings = warnings;
        Ok(index)
    }

    /// Build from records already in memory.
    ///
    /// A record whose monster name was already seen replaces the earlier one
    /// in place.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = MonsterRecord>,
    {
        let mut index = Self::default();

        for record in records {
            if let Some(&slot) = index.by_monster.get(record.name()) {
                tracing::debug!("Monster '{}' redefined, keeping the later file", record.name());
                index.records[slot] = record;
            } else {
                index
                    .by_monster
                    .insert(record.name().to_string(), index.records.len());
                index.records.push(record);
            }
        }

        for record in &index.records {
            for entry in record.entries() {
                index
                    .by_item
                    .entry(entry.item_name.clone())
                    .or_default()
                    .push(ItemSource {
                        monster: record.name().to_string(),
                        probability: entry.probability,
                    });
            }
        }

        index.stats = Stats {
            total_monsters: index.records.len(),
            total_drop_entries: index.records.iter().map(MonsterRecord::len).sum(),
            unique_item_count: index.by_item.len(),
            ..Stats::default()
        };

        index
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Files skipped during the load that built this index
    pub fn failures(&self) -> &[FileReadError] {
        &self.failures
    }

    pub fn warnings(&self) -> &[FileWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in scan order
    pub fn monsters(&self) -> impl Iterator<Item = &MonsterRecord> {
        self.records.iter()
    }

    /// Items in name order with their sources
    pub fn items(&self) -> impl Iterator<Item = (&str, &[ItemSource])> {
        self.by_item.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn monster(&self, name: &str) -> Option<&MonsterRecord> {
        self.by_monster.get(name).map(|&i| &self.records[i])
    }

    /// Item names containing `keyword`, case-insensitive. An empty keyword
    /// returns every item.
    pub fn find_items(&self, keyword: &str) -> Vec<&str> {
        let keyword = keyword.trim().to_lowercase();
        self.by_item
            .keys()
            .filter(|name| keyword.is_empty() || name.to_lowercase().contains(&keyword))
            .map(String::as_str)
            .collect()
    }

    /// Monster names containing `keyword`, case-insensitive. An empty keyword
    /// returns every monster.
    pub fn find_monsters(&self, keyword: &str) -> Vec<&str> {
        let keyword = keyword.trim().to_lowercase();
        self.records
            .iter()
            .map(MonsterRecord::name)
            .filter(|name| keyword.is_empty() || name.to_lowercase().contains(&keyword))
            .collect()
    }

    /// Every monster that drops `item`, exact name
    pub fn drops_for_item(&self, item: &str) -> &[ItemSource] {
        self.by_item.get(item).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every drop of `monster`, exact name, in file order
    pub fn drops_for_monster(&self, monster: &str) -> &[DropEntry] {
        self.monster(monster)
            .map(MonsterRecord::entries)
            .unwrap_or(&[])
    }

    /// Monsters with the most drop entries first
    pub fn top_monsters_by_drop_count(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = self
            .records
            .iter()
            .map(|r| (r.name(), r.len()))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(limit);
        counts
    }

    /// Write every entry, monster by monster, to `sink`. Returns the row count.
    pub fn export_all<S>(&self, sink: &mut S) -> Result<usize, ExportError>
    where
        S: ExportSink + ?Sized,
    {
        let mut rows = 0;
        for record in &self.records {
            for entry in record.entries() {
                sink.write_row(&ExportRow {
                    monster: record.name().to_string(),
                    item: entry.item_name.clone(),
                    probability: entry.probability,
                    grouped: entry.is_grouped(),
                })?;
                rows += 1;
            }
        }
        Ok(rows)
    }
}

/// Owner of the current index snapshot.
///
/// A load builds a complete new index before replacing the current one, so
/// readers holding a [`DropCatalog::snapshot`] never see a partial state. A
/// failed load leaves the previous snapshot in place.
#[derive(Debug, Default)]
pub struct DropCatalog {
    current: Arc<DropIndex>,
    options: LoadOptions,
}

impl DropCatalog {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            current: Arc::new(DropIndex::default()),
            options,
        }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Load or reload `dir`, replacing the whole index on success
    pub fn load(&mut self, dir: impl AsRef<Path>) -> Result<Stats, LoadError> {
        let index = DropIndex::load(dir, &self.options)?;
        let stats = index.stats().clone();
        self.current = Arc::new(index);
        Ok(stats)
    }

    pub fn snapshot(&self) -> Arc<DropIndex> {
        Arc::clone(&self.current)
    }
}

/// Drop files directly inside `dir`, sorted by file name
fn drop_files(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let extension = extension.trim_start_matches('.');

    walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!("Cannot read directory entry: {}", err);
                None
            }
        })
        .filter(|e| !e.file_type().is_dir())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(extension))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportRow;
    use crate::parser::parse_str;
    use std::fs;
    use tempfile::TempDir;

    const ORC: &str = "1/100 Sword\n#CHILD 1/10 RANDOM\n(\n1/1 Gem\n1/1 Ring\n)\n";

    fn write(dir: &TempDir, name: &str, contents: &str) {
        fs::write(dir.path().join(name), contents).unwrap();
    }

    fn record(name: &str, drops: &[(&str, f64)]) -> MonsterRecord {
        let mut record = MonsterRecord::new(name);
        for &(item, rate) in drops {
            record.add_entry(item, rate);
        }
        record
    }

    fn pairs(entries: &[DropEntry]) -> Vec<(&str, f64)> {
        entries
            .iter()
            .map(|e| (e.item_name.as_str(), e.probability))
            .collect()
    }

    #[test]
    fn test_orc_end_to_end() {
        let dir = TempDir::new().unwrap();
        write(&dir, "orc.txt", ORC);

        let index = DropIndex::load(dir.path(), &LoadOptions::default()).unwrap();

        assert_eq!(
            pairs(index.drops_for_monster("orc")),
            vec![("Sword", 0.01), ("Gem", 0.05), ("Ring", 0.05)]
        );
        assert_eq!(
            index.drops_for_item("Gem"),
            &[ItemSource {
                monster: "orc".to_string(),
                probability: 0.05
            }]
        );

        let stats = index.stats();
        assert_eq!(stats.total_monsters, 1);
        assert_eq!(stats.total_drop_entries, 3);
        assert_eq!(stats.unique_item_count, 3);
        assert_eq!(stats.source_directory.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_item_index_matches_monster_entries() {
        let dir = TempDir::new().unwrap();
        write(&dir, "orc.txt", ORC);
        write(&dir, "goblin.txt", "1/50 Gem\n1/2 Gem\n1/3 Bone");

        let index = DropIndex::load(dir.path(), &LoadOptions::default()).unwrap();

        for (item, sources) in index.items() {
            for source in sources {
                let matching = index
                    .drops_for_monster(&source.monster)
                    .iter()
                    .filter(|e| e.item_name == item && e.probability == source.probability)
                    .count();
                assert!(matching >= 1, "{item} from {} missing", source.monster);
            }
        }

        // Same item twice in one file is kept twice; scan order is goblin then orc
        let gem: Vec<_> = index
            .drops_for_item("Gem")
            .iter()
            .map(|s| (s.monster.as_str(), s.probability))
            .collect();
        assert_eq!(gem, vec![("goblin", 0.02), ("goblin", 0.5), ("orc", 0.05)]);
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = DropIndex::load(&missing, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::DirectoryNotFound(p) if p == missing));
    }

    #[test]
    fn test_directory_without_drop_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "readme.md", "1/2 Gem");
        let err = DropIndex::load(dir.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::NoRecords { failed: 0, .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        write(&dir, "orc.txt", ORC);
        std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("ghost.txt"))
            .unwrap();

        let index = DropIndex::load(dir.path(), &LoadOptions::default()).unwrap();
        let stats = index.stats();
        assert_eq!(stats.total_monsters, 1);
        assert_eq!(stats.total_drop_entries, 3);
        assert_eq!(stats.files_scanned, 2);
        assert_eq!(stats.files_failed, 1);
        assert_eq!(index.failures()[0].path(), dir.path().join("ghost.txt"));
        assert!(index.monster("ghost").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_all_files_unreadable() {
        let dir = TempDir::new().unwrap();
        for name in ["a.txt", "b.txt"] {
            std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join(name))
                .unwrap();
        }
        let err = DropIndex::load(dir.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::NoRecords { failed: 2, .. }));
    }

    fn read_error(dir: &TempDir, name: &str) -> (PathBuf, Result<ParsedFile, FileReadError>) {
        let path = dir.path().join(name);
        let err = FileReadError::Io {
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        (path, Err(err))
    }

    #[test]
    fn test_failed_file_is_recorded_and_skipped() {
        let dir = TempDir::new().unwrap();
        let attempts = vec![
            read_error(&dir, "ghost.txt"),
            (dir.path().join("orc.txt"), Ok(parse_str("orc", ORC))),
        ];

        let index = DropIndex::assemble(dir.path(), attempts).unwrap();
        let stats = index.stats();
        assert_eq!(stats.total_monsters, 1);
        assert_eq!(stats.total_drop_entries, 3);
        assert_eq!(stats.files_scanned, 2);
        assert_eq!(stats.files_failed, 1);
        assert_eq!(index.failures()[0].path(), dir.path().join("ghost.txt"));
        assert!(index.monster("ghost").is_none());
    }

    #[test]
    fn test_every_file_failing_is_no_records() {
        let dir = TempDir::new().unwrap();
        let attempts = vec![read_error(&dir, "a.txt"), read_error(&dir, "b.txt")];

        let err = DropIndex::assemble(dir.path(), attempts).unwrap_err();
        assert!(matches!(err, LoadError::NoRecords { failed: 2, .. }));
    }

    #[test]
    fn test_extension_filter_and_no_recursion() {
        let dir = TempDir::new().unwrap();
        write(&dir, "orc.TXT", "1/2 Gem");
        write(&dir, "notes.log", "1/2 Junk");
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("deep.txt"), "1/2 Deep").unwrap();
        fs::create_dir(dir.path().join("folder.txt")).unwrap();

        let index = DropIndex::load(dir.path(), &LoadOptions::default()).unwrap();
        assert_eq!(index.find_monsters(""), vec!["orc"]);
        assert_eq!(index.stats().files_scanned, 1);
        assert!(index.failures().is_empty());
    }

    #[test]
    fn test_custom_extension() {
        let dir = TempDir::new().unwrap();
        write(&dir, "orc.drop", "1/2 Gem");
        let options = LoadOptions {
            extension: ".drop".to_string(),
            ..LoadOptions::default()
        };
        let index = DropIndex::load(dir.path(), &options).unwrap();
        assert_eq!(index.find_monsters(""), vec!["orc"]);
    }

    #[test]
    fn test_warnings_are_collected_per_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "orc.txt", "1/0 Gem\n1/2 Axe");
        let index = DropIndex::load(dir.path(), &LoadOptions::default()).unwrap();
        assert_eq!(index.warnings().len(), 1);
        assert_eq!(index.warnings()[0].path, dir.path().join("orc.txt"));
        assert_eq!(index.stats().total_drop_entries, 1);
    }

    #[test]
    fn test_empty_file_still_counts_as_monster() {
        let dir = TempDir::new().unwrap();
        write(&dir, "slime.txt", "# nothing here\n");
        let index = DropIndex::load(dir.path(), &LoadOptions::default()).unwrap();
        assert_eq!(index.stats().total_monsters, 1);
        assert!(index.drops_for_monster("slime").is_empty());
    }

    #[test]
    fn test_duplicate_monster_last_wins() {
        let index = DropIndex::from_records([
            record("orc", &[("Sword", 0.5)]),
            record("goblin", &[("Bone", 0.5)]),
            record("orc", &[("Axe", 0.25)]),
        ]);

        assert_eq!(index.find_monsters(""), vec!["orc", "goblin"]);
        assert_eq!(pairs(index.drops_for_monster("orc")), vec![("Axe", 0.25)]);
        assert!(index.drops_for_item("Sword").is_empty());
        assert_eq!(index.stats().total_monsters, 2);
        assert_eq!(index.stats().total_drop_entries, 2);
    }

    #[test]
    fn test_find_is_case_insensitive_substring() {
        let index = DropIndex::from_records([
            record("Orc Chief", &[("Iron Sword", 0.5), ("Gem", 0.1)]),
            record("Goblin", &[("Steel sword", 0.5)]),
        ]);

        assert_eq!(index.find_items("SWORD"), vec!["Iron Sword", "Steel sword"]);
        assert_eq!(index.find_items("  gem "), vec!["Gem"]);
        assert_eq!(index.find_items("").len(), 3);
        assert!(index.find_items("shield").is_empty());

        assert_eq!(index.find_monsters("orc"), vec!["Orc Chief"]);
        assert_eq!(index.find_monsters("").len(), 2);
    }

    #[test]
    fn test_unknown_lookups_are_empty() {
        let index = DropIndex::from_records([record("orc", &[("Gem", 0.1)])]);
        assert!(index.drops_for_item("gem").is_empty());
        assert!(index.drops_for_monster("ORC").is_empty());
        assert!(DropIndex::default().drops_for_item("Gem").is_empty());
    }

    #[test]
    fn test_top_monsters_by_drop_count() {
        let index = DropIndex::from_records([
            record("a", &[("x", 0.1)]),
            record("b", &[("x", 0.1), ("y", 0.1), ("z", 0.1)]),
            record("c", &[("x", 0.1), ("y", 0.1)]),
            record("d", &[("y", 0.1)]),
        ]);
        assert_eq!(
            index.top_monsters_by_drop_count(3),
            vec![("b", 3), ("c", 2), ("a", 1)]
        );
    }

    #[test]
    fn test_export_all_order() {
        let dir = TempDir::new().unwrap();
        write(&dir, "orc.txt", ORC);
        write(&dir, "bat.txt", "1/4 Wing");
        let index = DropIndex::load(dir.path(), &LoadOptions::default()).unwrap();

        let mut rows: Vec<ExportRow> = Vec::new();
        let written = index.export_all(&mut rows).unwrap();

        assert_eq!(written, 4);
        let summary: Vec<_> = rows
            .iter()
            .map(|r| (r.monster.as_str(), r.item.as_str(), r.grouped))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("bat", "Wing", false),
                ("orc", "Sword", false),
                ("orc", "Gem", true),
                ("orc", "Ring", true),
            ]
        );
    }

    #[test]
    fn test_reload_drops_removed_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "orc.txt", ORC);
        write(&dir, "bat.txt", "1/4 Wing\n1/8 Gem");

        let mut catalog = DropCatalog::new(LoadOptions::default());
        let stats = catalog.load(dir.path()).unwrap();
        assert_eq!(stats.total_monsters, 2);
        let before = catalog.snapshot();

        fs::remove_file(dir.path().join("bat.txt")).unwrap();
        let stats = catalog.load(dir.path()).unwrap();
        assert_eq!(stats.total_monsters, 1);

        let after = catalog.snapshot();
        assert!(after.monster("bat").is_none());
        assert!(after.drops_for_item("Wing").is_empty());
        assert_eq!(after.drops_for_item("Gem").len(), 1);

        // Earlier readers keep their own snapshot
        assert!(before.monster("bat").is_some());
    }

    #[test]
    fn test_failed_reload_keeps_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        write(&dir, "orc.txt", ORC);

        let mut catalog = DropCatalog::new(LoadOptions::default());
        catalog.load(dir.path()).unwrap();

        let err = catalog.load(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, LoadError::DirectoryNotFound(_)));
        assert!(catalog.snapshot().monster("orc").is_some());
    }
}
