//! Display-time helpers layered over [`DropIndex`] lookups
//!
//! None of these change the index; they reshape query results the way an
//! interactive front end shows them.

use crate::index::DropIndex;
use crate::types::{DropEntry, ItemSource};

/// Rows shown by default in [`other_drops`]
pub const DEFAULT_OTHER_DROPS_LIMIT: usize = 20;

/// Collapse repeated monsters, keeping each monster's highest probability.
/// Order follows the first appearance of each monster.
pub fn dedup_max_per_monster(sources: &[ItemSource]) -> Vec<ItemSource> {
    let mut result: Vec<ItemSource> = Vec::with_capacity(sources.len());

    for source in sources {
        match result.iter_mut().find(|s| s.monster == source.monster) {
            Some(existing) => {
                if source.probability > existing.probability {
                    existing.probability = source.probability;
                }
            }
            None => result.push(source.clone()),
        }
    }

    result
}

/// Sources whose monster name contains `keyword`, case-insensitive. An empty
/// keyword keeps every source.
pub fn filter_by_monster(sources: &[ItemSource], keyword: &str) -> Vec<ItemSource> {
    let keyword = keyword.trim().to_lowercase();
    sources
        .iter()
        .filter(|s| keyword.is_empty() || s.monster.to_lowercase().contains(&keyword))
        .cloned()
        .collect()
}

/// Stable sort, highest rate first
pub fn sort_by_rate_desc<T, F>(rows: &mut [T], rate: F)
where
    F: Fn(&T) -> f64,
{
    rows.sort_by(|a, b| rate(b).total_cmp(&rate(a)));
}

/// A monster's drops other than `excluding_item`, highest rate first
pub fn other_drops<'a>(
    index: &'a DropIndex,
    monster: &str,
    excluding_item: &str,
    limit: usize,
) -> Vec<&'a DropEntry> {
    let mut drops: Vec<&DropEntry> = index
        .drops_for_monster(monster)
        .iter()
        .filter(|e| e.item_name != excluding_item)
        .collect();
    sort_by_rate_desc(&mut drops, |e| e.probability);
    drops.truncate(limit);
    drops
}
