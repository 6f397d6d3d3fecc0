use crate::error::{FamilyError, Result};
use crate::headword::HeadwordRecord;
use crate::registry::GroupKind;
use crate::tags::record_tags;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Group entity as stored: one row per key, rebuilt every run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub kind: GroupKind,
    pub key: String,
    pub html: String,
    /// Discovery-time member count. Not the size of the membership relation.
    pub count: i64,
}

/// Event for audit trail: one per pipeline run
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

// ============================================================================
// TABLE NAMES PER KIND
// ============================================================================

struct Tables {
    groups: &'static str,
    members: &'static str,
    key: &'static str,
}

fn tables(kind: GroupKind) -> Tables {
    match kind {
        GroupKind::CompoundFamily => Tables {
            groups: "family_compounds",
            members: "family_compound_members",
            key: "compound_family",
        },
        GroupKind::Set => Tables {
            groups: "family_sets",
            members: "family_set_members",
            key: "set_name",
        },
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Headwords (external corpus, read-only for the pipelines)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS headwords (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            pali_1 TEXT UNIQUE NOT NULL,
            pos TEXT NOT NULL DEFAULT '',
            grammar TEXT NOT NULL DEFAULT '',
            meaning_1 TEXT,
            meaning_lit TEXT,
            construction TEXT NOT NULL DEFAULT '',
            family_compound TEXT,
            family_set TEXT,
            source_1 TEXT
        )",
        [],
    )?;

    // ==========================================================================
    // Group entities and membership relations, one pair per kind
    // ==========================================================================
    for kind in [GroupKind::CompoundFamily, GroupKind::Set] {
        let t = tables(kind);

        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {groups} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    {key} TEXT UNIQUE NOT NULL,
                    html TEXT NOT NULL DEFAULT '',
                    count INTEGER NOT NULL DEFAULT 0
                )",
                groups = t.groups,
                key = t.key,
            ),
            [],
        )?;

        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {members} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    group_id INTEGER NOT NULL REFERENCES {groups}(id),
                    headword_id INTEGER NOT NULL REFERENCES headwords(id),
                    UNIQUE (group_id, headword_id)
                )",
                members = t.members,
                groups = t.groups,
            ),
            [],
        )?;

        conn.execute(
            &format!(
                "CREATE INDEX IF NOT EXISTS idx_{members}_headword ON {members}(headword_id)",
                members = t.members,
            ),
            [],
        )?;
    }

    // ==========================================================================
    // Events Table (audit trail)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// HEADWORDS
// ============================================================================

const HEADWORD_COLUMNS: &str = "h.id, h.pali_1, h.pos, h.grammar, h.meaning_1, h.meaning_lit,
     h.construction, h.family_compound, h.family_set, h.source_1";

fn headword_from_row(row: &Row<'_>) -> rusqlite::Result<HeadwordRecord> {
    Ok(HeadwordRecord {
        id: row.get(0)?,
        pali_1: row.get(1)?,
        pos: row.get(2)?,
        grammar: row.get(3)?,
        meaning_1: row.get(4)?,
        meaning_lit: row.get(5)?,
        construction: row.get(6)?,
        family_compound: row.get(7)?,
        family_set: row.get(8)?,
        source_1: row.get(9)?,
    })
}

/// Load headwords from a corpus CSV export (header row required)
pub fn load_headwords_csv(csv_path: &Path) -> Result<Vec<HeadwordRecord>> {
    let mut rdr = csv::Reader::from_path(csv_path)?;

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: HeadwordRecord = result?;
        records.push(record);
    }

    Ok(records)
}

/// Insert headwords, skipping display forms already present.
/// Returns how many were inserted.
pub fn insert_headwords(conn: &Connection, records: &[HeadwordRecord]) -> Result<usize> {
    let mut inserted = 0;
    let mut duplicates = 0;

    for w in records {
        let result = conn.execute(
            "INSERT INTO headwords (
                pali_1, pos, grammar, meaning_1, meaning_lit,
                construction, family_compound, family_set, source_1
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                w.pali_1,
                w.pos,
                w.grammar,
                w.meaning_1,
                w.meaning_lit,
                w.construction,
                w.family_compound,
                w.family_set,
                w.source_1,
            ],
        );

        match result {
            Ok(_) => inserted += 1,
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(inserted, duplicates, "headwords imported");
    Ok(inserted)
}

/// Full scan of the corpus, in store order
pub fn get_all_headwords(conn: &Connection) -> Result<Vec<HeadwordRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {HEADWORD_COLUMNS} FROM headwords h ORDER BY h.id"
    ))?;

    let records = stmt
        .query_map([], headword_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(records)
}

/// Headword by display form; missing is an error
pub fn get_headword(conn: &Connection, pali_1: &str) -> Result<HeadwordRecord> {
    conn.query_row(
        &format!("SELECT {HEADWORD_COLUMNS} FROM headwords h WHERE h.pali_1 = ?1"),
        [pali_1],
        headword_from_row,
    )
    .optional()?
    .ok_or_else(|| FamilyError::UnknownHeadword {
        pali_1: pali_1.to_string(),
    })
}

// ============================================================================
// GROUPS
// ============================================================================

fn group_from_row(kind: GroupKind) -> impl Fn(&Row<'_>) -> rusqlite::Result<Group> {
    move |row: &Row<'_>| {
        Ok(Group {
            id: row.get(0)?,
            kind,
            key: row.get(1)?,
            html: row.get(2)?,
            count: row.get(3)?,
        })
    }
}

/// Delete every group of `kind` together with its memberships
pub fn clear_groups(conn: &Connection, kind: GroupKind) -> Result<usize> {
    let t = tables(kind);
    conn.execute(&format!("DELETE FROM {}", t.members), [])?;
    let deleted = conn.execute(&format!("DELETE FROM {}", t.groups), [])?;
    Ok(deleted)
}

/// Create a group with an empty html cache. Returns its id.
pub fn insert_group(conn: &Connection, kind: GroupKind, key: &str, count: usize) -> Result<i64> {
    let t = tables(kind);
    conn.execute(
        &format!(
            "INSERT INTO {} ({}, html, count) VALUES (?1, '', ?2)",
            t.groups, t.key
        ),
        params![key, count as i64],
    )?;

    Ok(conn.last_insert_rowid())
}

pub fn find_group(conn: &Connection, kind: GroupKind, key: &str) -> Result<Option<Group>> {
    let t = tables(kind);
    let group = conn
        .query_row(
            &format!(
                "SELECT id, {key}, html, count FROM {groups} WHERE {key} = ?1",
                key = t.key,
                groups = t.groups,
            ),
            [key],
            group_from_row(kind),
        )
        .optional()?;

    Ok(group)
}

/// All groups of `kind`, in creation order
pub fn all_groups(conn: &Connection, kind: GroupKind) -> Result<Vec<Group>> {
    let t = tables(kind);
    let mut stmt = conn.prepare(&format!(
        "SELECT id, {key}, html, count FROM {groups} ORDER BY id",
        key = t.key,
        groups = t.groups,
    ))?;

    let groups = stmt
        .query_map([], group_from_row(kind))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(groups)
}

pub fn update_group_html(conn: &Connection, kind: GroupKind, group_id: i64, html: &str) -> Result<()> {
    let t = tables(kind);
    conn.execute(
        &format!("UPDATE {} SET html = ?1 WHERE id = ?2", t.groups),
        params![html, group_id],
    )?;
    Ok(())
}

// ============================================================================
// MEMBERSHIP RELATION
// ============================================================================

/// Link a headword to a group. Returns false when the pair already existed.
pub fn link_member(conn: &Connection, kind: GroupKind, group_id: i64, headword_id: i64) -> Result<bool> {
    let t = tables(kind);
    let result = conn.execute(
        &format!(
            "INSERT INTO {} (group_id, headword_id) VALUES (?1, ?2)",
            t.members
        ),
        params![group_id, headword_id],
    );

    match result {
        Ok(_) => Ok(true),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Members of a group in insertion order (NOT collation order)
pub fn members_of(conn: &Connection, kind: GroupKind, group_id: i64) -> Result<Vec<HeadwordRecord>> {
    let t = tables(kind);
    let mut stmt = conn.prepare(&format!(
        "SELECT {HEADWORD_COLUMNS}
         FROM {members} m JOIN headwords h ON h.id = m.headword_id
         WHERE m.group_id = ?1
         ORDER BY m.id",
        members = t.members,
    ))?;

    let members = stmt
        .query_map([group_id], headword_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(members)
}

/// Size of the membership relation for one group
pub fn count_members(conn: &Connection, kind: GroupKind, group_id: i64) -> Result<i64> {
    let t = tables(kind);
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {} WHERE group_id = ?1", t.members),
        [group_id],
        |row| row.get(0),
    )?;

    Ok(count)
}

/// Total number of membership rows for `kind`
pub fn count_all_members(conn: &Connection, kind: GroupKind) -> Result<i64> {
    let t = tables(kind);
    let count: i64 =
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", t.members), [], |row| row.get(0))?;

    Ok(count)
}

/// Number of groups of `kind` a headword is linked to
pub fn count_member_links_for_headword(
    conn: &Connection,
    kind: GroupKind,
    headword_id: i64,
) -> Result<i64> {
    let t = tables(kind);
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {} WHERE headword_id = ?1", t.members),
        [headword_id],
        |row| row.get(0),
    )?;

    Ok(count)
}

/// Resolved groups of a headword.
///
/// Ordered by the word's own tag order when it is tagged, so
/// "aṭṭha1 kusala kamma paccayā" comes back in that order.
pub fn groups_for_headword(
    conn: &Connection,
    kind: GroupKind,
    record: &HeadwordRecord,
    separator: &str,
) -> Result<Vec<Group>> {
    let t = tables(kind);
    let mut stmt = conn.prepare(&format!(
        "SELECT g.id, g.{key}, g.html, g.count
         FROM {members} m JOIN {groups} g ON g.id = m.group_id
         WHERE m.headword_id = ?1
         ORDER BY m.id",
        key = t.key,
        members = t.members,
        groups = t.groups,
    ))?;

    let mut groups = stmt
        .query_map([record.id], group_from_row(kind))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let tags = record_tags(record, kind, separator)?;
    if !tags.is_empty() {
        groups.sort_by_key(|g| tags.iter().position(|t| *t == g.key).unwrap_or(usize::MAX));
    }

    Ok(groups)
}

// ============================================================================
// AUDIT TRAIL
// ============================================================================

/// Insert event into audit trail
pub fn insert_event(conn: &Connection, event: &Event) -> Result<()> {
    let data_json = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

/// Get events for a specific entity, newest first
pub fn get_events_for_entity(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY timestamp DESC, id DESC",
    )?;

    let rows = stmt
        .query_map(params![entity_type, entity_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut events = Vec::with_capacity(rows.len());
    for (event_id, timestamp, event_type, entity_type, entity_id, data, actor) in rows {
        let timestamp = DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?
            .with_timezone(&Utc);

        events.push(Event {
            event_id,
            timestamp,
            event_type,
            entity_type,
            entity_id,
            data: serde_json::from_str(&data)?,
            actor,
        });
    }

    Ok(events)
}
