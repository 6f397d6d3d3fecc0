// ⚠️ Error Taxonomy - everything the family pipelines can fail with
//
// Fatal errors abort the whole batch. Soft problems (small sets, oversized
// flashcard rows) are not errors: they are collected as RunWarning values.

use crate::registry::GroupKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FamilyError {
    /// A tag field holds an empty piece, a lone space or a bare "+".
    /// Upstream data-entry mistake: the batch halts before any group is touched.
    #[error("malformed {kind} tag {tag:?} on headword {headword:?}, please remove")]
    MalformedTag {
        kind: GroupKind,
        headword: String,
        tag: String,
    },

    /// A group that was just created cannot be found again. Internal bug.
    #[error("{kind} group {key:?} missing after registry creation")]
    MissingGroup { kind: GroupKind, key: String },

    #[error("cannot find headword: {pali_1}")]
    UnknownHeadword { pali_1: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FamilyError>;
