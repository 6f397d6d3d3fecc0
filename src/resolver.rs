// 🔗 Association Resolver - links headwords to their groups
//
// Two strategies:
//   Tagged   - link to every tagged group the word qualified for at discovery
//   Untagged - (compound families) link to the group named by the base form,
//              so "gata 1" anchors the "gata" family without being tagged
//
// Anchor words are linked but not counted: Group.count stays the
// discovery-time value. Keep the two numbers apart.

use crate::db::{find_group, link_member};
use crate::error::{FamilyError, Result};
use crate::headword::HeadwordRecord;
use crate::registry::{GroupKind, GroupRegistry};
use crate::tags::MatchStrategy;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStats {
    /// New membership rows
    pub linked: usize,

    /// Pairs that already existed
    pub already_linked: usize,

    /// Links made through the base-form fallback
    pub anchored: usize,
}

/// Link every record to its groups.
///
/// Groups must already exist in the store for every key in `registry`;
/// a missing one is an internal bug and aborts with `MissingGroup`.
pub fn resolve_associations(
    conn: &Connection,
    records: &[HeadwordRecord],
    registry: &GroupRegistry,
    separator: &str,
) -> Result<ResolutionStats> {
    let kind = registry.kind();
    let mut stats = ResolutionStats::default();

    for record in records {
        match MatchStrategy::for_record(record, kind, separator)? {
            MatchStrategy::Tagged(keys) => {
                for key in &keys {
                    if !registry.is_member(key, &record.pali_1) {
                        continue;
                    }

                    let group = find_group(conn, kind, key)?.ok_or_else(|| {
                        FamilyError::MissingGroup {
                            kind,
                            key: key.clone(),
                        }
                    })?;

                    link(conn, kind, group.id, record, &mut stats)?;
                }
            }

            MatchStrategy::Untagged { base_form } => {
                if let Some(group) = find_group(conn, kind, &base_form)? {
                    if link(conn, kind, group.id, record, &mut stats)? {
                        stats.anchored += 1;
                    }
                }
            }

            MatchStrategy::Unmatched => {}
        }
    }

    tracing::info!(
        kind = %kind,
        linked = stats.linked,
        already_linked = stats.already_linked,
        anchored = stats.anchored,
        "associations resolved"
    );

    Ok(stats)
}

fn link(
    conn: &Connection,
    kind: GroupKind,
    group_id: i64,
    record: &HeadwordRecord,
    stats: &mut ResolutionStats,
) -> Result<bool> {
    if link_member(conn, kind, group_id, record.id)? {
        tracing::debug!(headword = %record.pali_1, group_id, "linked");
        stats.linked += 1;
        Ok(true)
    } else {
        stats.already_linked += 1;
        Ok(false)
    }
}
