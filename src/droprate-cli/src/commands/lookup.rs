//! Drop lookup command handlers

use droprate::calc::{
    expected_kills_for_confidence, to_approx_fraction, to_percent_display, RateDisplay,
};
use droprate::query::{dedup_max_per_monster, filter_by_monster, other_drops, sort_by_rate_desc};
use droprate::{DropEntry, DropIndex, ItemSource};

use super::Loaded;

/// Confidence shown next to a single drop in `detail`
const DETAIL_CONFIDENCE: f64 = 0.95;

/// Rate column: percentage, plus "1/N" odds when enabled
fn rate_column(p: f64, show_fraction: bool) -> String {
    if show_fraction {
        format!("{} (1/{})", to_percent_display(p), to_approx_fraction(p))
    } else {
        to_percent_display(p)
    }
}

fn entry_note(entry: &DropEntry) -> String {
    entry
        .group
        .map(|g| g.to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn stats(index: &DropIndex, top: usize) {
    let stats = index.stats();

    if let Some(dir) = &stats.source_directory {
        println!("Directory:      {}", dir.display());
    }
    println!("Files scanned:  {}", stats.files_scanned);
    if stats.files_failed > 0 {
        println!("Files failed:   {}", stats.files_failed);
    }
    println!("Monsters:       {}", stats.total_monsters);
    println!("Drop entries:   {}", stats.total_drop_entries);
    println!("Unique items:   {}", stats.unique_item_count);
    println!("Load time:      {:.2?}", stats.elapsed);

    for failure in index.failures() {
        tracing::debug!("{}", failure);
    }

    if top == 0 || index.is_empty() {
        return;
    }

    println!("\nMonsters with the most drops:\n");
    println!("{:<30} {:>8}", "Monster", "Drops");
    println!("{}", "-".repeat(39));
    for (name, count) in index.top_monsters_by_drop_count(top) {
        println!("{:<30} {:>8}", name, count);
    }
}

pub fn items(index: &DropIndex, keyword: &str) {
    let names = index.find_items(keyword);

    if names.is_empty() {
        println!("No items matching '{}'", keyword);
        return;
    }

    println!("Items ({}):\n", names.len());
    for name in names {
        println!("  {}", name);
    }
}

pub fn monsters(index: &DropIndex, keyword: &str) {
    let mut names = index.find_monsters(keyword);
    names.sort_unstable();

    if names.is_empty() {
        println!("No monsters matching '{}'", keyword);
        return;
    }

    println!("Monsters ({}):\n", names.len());
    for name in names {
        println!("  {}", name);
    }
}

pub fn item(loaded: &Loaded, name: &str, dedup: bool, monster: Option<&str>) {
    let index = &loaded.index;
    let sources = index.drops_for_item(name);

    if sources.is_empty() {
        println!("No drops found for '{}'", name);
        let suggestions = index.find_items(name);
        if !suggestions.is_empty() {
            println!("\nDid you mean:");
            for suggestion in suggestions.iter().take(10) {
                println!("  {}", suggestion);
            }
        }
        return;
    }

    let mut rows = item_rows(sources, dedup, monster);
    if rows.is_empty() {
        println!(
            "No monster matching '{}' drops '{}'",
            monster.unwrap_or_default(),
            name
        );
        return;
    }

    println!("'{}' drops from {} source(s):\n", name, rows.len());
    println!("{:<30} {:>24}", "Monster", "Rate");
    println!("{}", "-".repeat(55));
    for source in &rows {
        println!(
            "{:<30} {:>24}",
            source.monster,
            rate_column(source.probability, loaded.show_fraction)
        );
    }
}

/// Sources of an item as listed by `item`: filtered, optionally deduplicated,
/// highest rate first
fn item_rows(sources: &[ItemSource], dedup: bool, monster: Option<&str>) -> Vec<ItemSource> {
    let mut rows = match monster {
        Some(keyword) => filter_by_monster(sources, keyword),
        None => sources.to_vec(),
    };
    if dedup {
        rows = dedup_max_per_monster(&rows);
    }
    sort_by_rate_desc(&mut rows, |s| s.probability);
    rows
}

pub fn monster(loaded: &Loaded, name: &str, filter: Option<&str>) {
    let Some(record) = loaded.index.monster(name) else {
        println!("No monster named '{}'", name);
        let suggestions = loaded.index.find_monsters(name);
        if !suggestions.is_empty() {
            println!("\nDid you mean:");
            for suggestion in suggestions.iter().take(10) {
                println!("  {}", suggestion);
            }
        }
        return;
    };

    let entries = match filter {
        Some(f) => record.entries_matching(f),
        None => record.entries().iter().collect(),
    };
    if entries.is_empty() {
        match filter {
            Some(f) => println!("'{}' has no drops matching '{}'", name, f),
            None => println!("'{}' has no drops", name),
        }
        return;
    }

    println!("Drops from '{}' ({}):\n", record.name(), entries.len());
    println!("{:<30} {:>24} {:<16}", "Item", "Rate", "Group");
    println!("{}", "-".repeat(72));
    for entry in entries {
        println!(
            "{:<30} {:>24} {:<16}",
            entry.item_name,
            rate_column(entry.probability, loaded.show_fraction),
            entry_note(entry)
        );
    }
}

pub fn detail(index: &DropIndex, item: &str, monster: &str, limit: usize) {
    let Some(source) = index
        .drops_for_item(item)
        .iter()
        .filter(|s| s.monster == monster)
        .max_by(|a, b| a.probability.total_cmp(&b.probability))
    else {
        println!("'{}' does not drop '{}'", monster, item);
        return;
    };

    let display = RateDisplay::new(source.probability);
    println!("{} from {}\n", item, monster);
    println!("  Percent:    {}", display.percent);
    println!("  Fraction:   {}", display.fraction);
    println!("  Odds:       {}", display.inverse);
    println!("  Expected:   {} kills", display.expected);
    println!(
        "  {:.0}% sure:   {} kills",
        DETAIL_CONFIDENCE * 100.0,
        expected_kills_for_confidence(source.probability, DETAIL_CONFIDENCE)
    );

    let others = other_drops(index, monster, item, limit);
    if others.is_empty() {
        return;
    }

    println!("\nOther drops from {}:\n", monster);
    println!("{:<30} {:>12} {:>10}", "Item", "Percent", "Odds");
    println!("{}", "-".repeat(54));
    for entry in others {
        println!(
            "{:<30} {:>12} {:>10}",
            entry.item_name,
            to_percent_display(entry.probability),
            format!("1/{}", to_approx_fraction(entry.probability))
        );
    }
}
