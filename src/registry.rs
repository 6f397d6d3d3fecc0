// 🗂️ Group Registry - the universe of group keys and their members
//
// Built once per run from the whole corpus, before the store is touched.
// Member lists and counts are fixed here (discovery time); the resolver
// may later link extra anchor words that are NOT counted.

use crate::classifier::CompoundClassifier;
use crate::error::Result;
use crate::headword::HeadwordRecord;
use crate::tags::record_tags;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// GROUP KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    /// Words sharing a component used to form compounds
    CompoundFamily,

    /// Thematic grouping ("plants", "names of monks")
    Set,
}

impl GroupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKind::CompoundFamily => "compound family",
            GroupKind::Set => "set",
        }
    }

    /// Entity name used in the audit trail
    pub fn entity_type(&self) -> &'static str {
        match self {
            GroupKind::CompoundFamily => "family_compound",
            GroupKind::Set => "family_set",
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// One flashcard row: (headword, pos, gloss, construction)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    pub headword: String,
    pub pos: String,
    pub gloss: String,
    pub construction: String,
}

impl ExportRow {
    fn from_record(record: &HeadwordRecord) -> Self {
        ExportRow {
            headword: record.pali_1.clone(),
            pos: record.pos.clone(),
            gloss: record.gloss(),
            construction: record.clean_construction(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupItem {
    /// Display forms of discovery-time members, in corpus order
    pub headwords: IndexSet<String>,

    /// Rows for the flashcard export (members with a defined gloss)
    pub export_rows: Vec<ExportRow>,
}

impl GroupItem {
    /// Member count stored on the group entity
    pub fn count(&self) -> usize {
        self.headwords.len()
    }

    pub fn contains(&self, pali_1: &str) -> bool {
        self.headwords.contains(pali_1)
    }

    fn add(&mut self, record: &HeadwordRecord) {
        if self.headwords.insert(record.pali_1.clone()) && record.has_meaning() {
            self.export_rows.push(ExportRow::from_record(record));
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupRegistry {
    kind: GroupKind,
    groups: IndexMap<String, GroupItem>,
}

impl GroupRegistry {
    pub fn new(kind: GroupKind) -> Self {
        GroupRegistry {
            kind,
            groups: IndexMap::new(),
        }
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn get(&self, key: &str) -> Option<&GroupItem> {
        self.groups.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.groups.contains_key(key)
    }

    /// Is `pali_1` a discovery-time member of group `key`?
    pub fn is_member(&self, key: &str, pali_1: &str) -> bool {
        self.groups.get(key).is_some_and(|item| item.contains(pali_1))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &GroupItem)> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups with fewer than `min` members, with their counts
    pub fn underpopulated(&self, min: usize) -> Vec<(String, usize)> {
        self.groups
            .iter()
            .filter(|(_, item)| item.count() < min)
            .map(|(key, item)| (key.clone(), item.count()))
            .collect()
    }

    fn add_member(&mut self, key: &str, record: &HeadwordRecord) {
        self.groups.entry(key.to_string()).or_default().add(record);
    }
}

// ============================================================================
// BUILDERS
// ============================================================================

/// Compound families: every tag is validated, but only classifier-qualified
/// words become members. `records` should already be in collation order.
pub fn build_compound_registry(
    records: &[HeadwordRecord],
    separator: &str,
    classifier: &CompoundClassifier,
) -> Result<GroupRegistry> {
    let mut registry = GroupRegistry::new(GroupKind::CompoundFamily);

    for record in records {
        let keys = record_tags(record, GroupKind::CompoundFamily, separator)?;

        if keys.is_empty() || !classifier.is_compound_member(record) {
            continue;
        }

        for key in &keys {
            registry.add_member(key, record);
        }
    }

    tracing::info!(groups = registry.len(), "extracted compound families");
    Ok(registry)
}

/// Sets: every tagged word with a defined gloss is a member
pub fn build_set_registry(records: &[HeadwordRecord], separator: &str) -> Result<GroupRegistry> {
    let mut registry = GroupRegistry::new(GroupKind::Set);

    for record in records {
        let keys = record_tags(record, GroupKind::Set, separator)?;

        if keys.is_empty() || !record.has_meaning() {
            continue;
        }

        for key in &keys {
            registry.add_member(key, record);
        }
    }

    tracing::info!(groups = registry.len(), "extracted set names");
    Ok(registry)
}
