//! Drop record types

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a child group, unique within one monster record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupId(pub usize);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "child_group_{}", self.0)
    }
}

/// A single item a monster can drop
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropEntry {
    /// Item name as written in the file
    pub item_name: String,
    /// Drop probability, always in (0, 1]
    pub probability: f64,
    /// Child group this entry was distributed from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupId>,
}

impl DropEntry {
    pub fn is_grouped(&self) -> bool {
        self.group.is_some()
    }
}

/// A `#CHILD ... RANDOM` group after distribution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildGroup {
    pub id: GroupId,
    /// Rate from the group header, shared by all members
    pub total_rate: f64,
    /// Positions of the member entries in [`MonsterRecord::entries`]
    pub members: Vec<usize>,
}

/// Parsed drop table of one monster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonsterRecord {
    name: String,
    entries: Vec<DropEntry>,
    groups: BTreeMap<GroupId, ChildGroup>,
}

impl MonsterRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            groups: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries in file order
    pub fn entries(&self) -> &[DropEntry] {
        &self.entries
    }

    pub fn groups(&self) -> &BTreeMap<GroupId, ChildGroup> {
        &self.groups
    }

    /// Member entries of one child group, in file order
    pub fn group_entries(&self, id: GroupId) -> Vec<&DropEntry> {
        self.groups
            .get(&id)
            .map(|g| g.members.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    /// Entries whose item name contains `filter` (case-insensitive).
    /// An empty filter matches everything.
    pub fn entries_matching(&self, filter: &str) -> Vec<&DropEntry> {
        let filter = filter.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| filter.is_empty() || e.item_name.to_lowercase().contains(&filter))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a plain entry. Returns false when the probability has no effect
    /// (zero, negative or NaN) and nothing was added.
    pub fn add_entry(&mut self, item_name: impl Into<String>, probability: f64) -> bool {
        if probability.is_nan() || probability <= 0.0 {
            return false;
        }
        self.entries.push(DropEntry {
            item_name: item_name.into(),
            probability: probability.min(1.0),
            group: None,
        });
        true
    }

    /// Add a child group, splitting `total_rate` equally over `items`.
    ///
    /// Returns the new group id, or `None` if nothing was added (no items or
    /// a rate with no effect).
    pub fn add_child_group<I, S>(&mut self, total_rate: f64, items: I) -> Option<GroupId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        if items.is_empty() || total_rate.is_nan() || total_rate <= 0.0 {
            return None;
        }

        let total_rate = total_rate.min(1.0);
        let probability = total_rate / items.len() as f64;
        let id = GroupId(self.groups.len());
        let start = self.entries.len();

        self.entries.extend(items.into_iter().map(|item_name| DropEntry {
            item_name,
            probability,
            group: Some(id),
        }));

        self.groups.insert(
            id,
            ChildGroup {
                id,
                total_rate,
                members: (start..self.entries.len()).collect(),
            },
        );
        Some(id)
    }
}

/// One monster that drops a given item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSource {
    pub monster: String,
    pub probability: f64,
}
