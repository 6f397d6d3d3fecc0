// 🏷️ Tag Parser - group keys from a headword's tag field
//
// Tag fields are separator-delimited lists of group keys:
//   family_compound = "aṭṭha1 kusala kamma paccayā"
//   family_set      = "plants; trees"

use crate::error::{FamilyError, Result};
use crate::headword::HeadwordRecord;
use crate::registry::GroupKind;

/// Parse a raw tag field into its keys.
///
/// Pieces are trimmed, kept in field order, and duplicates collapsed.
/// A missing or empty field yields no keys. An empty piece, a lone space
/// or a bare "+" means the field was mistyped upstream and is rejected.
pub fn parse_tags(
    raw: Option<&str>,
    separator: &str,
    kind: GroupKind,
    headword: &str,
) -> Result<Vec<String>> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(Vec::new()),
    };

    let mut keys: Vec<String> = Vec::new();

    for piece in raw.split(separator) {
        let tag = piece.trim();
        check_tag(tag, piece, kind, headword)?;

        if !keys.iter().any(|k| k == tag) {
            keys.push(tag.to_string());
        }
    }

    Ok(keys)
}

fn check_tag(tag: &str, piece: &str, kind: GroupKind, headword: &str) -> Result<()> {
    let malformed = tag.is_empty()
        || tag == "+"
        || (kind == GroupKind::CompoundFamily && tag.chars().any(char::is_whitespace));

    if malformed {
        return Err(FamilyError::MalformedTag {
            kind,
            headword: headword.to_string(),
            tag: piece.to_string(),
        });
    }

    Ok(())
}

/// Parse the tag field of `record` that belongs to `kind`
pub fn record_tags(
    record: &HeadwordRecord,
    kind: GroupKind,
    separator: &str,
) -> Result<Vec<String>> {
    let raw = match kind {
        GroupKind::CompoundFamily => record.compound_field(),
        GroupKind::Set => record.set_field(),
    };

    parse_tags(raw, separator, kind, &record.pali_1)
}

// ============================================================================
// MATCH STRATEGY
// ============================================================================

/// How a headword finds its groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Explicit keys from the tag field
    Tagged(Vec<String>),

    /// No tags: the word anchors the group named by its base form
    /// ("gata 1" → "gata"). Compound families only.
    Untagged { base_form: String },

    /// No tags and no fallback (sets)
    Unmatched,
}

impl MatchStrategy {
    pub fn for_record(
        record: &HeadwordRecord,
        kind: GroupKind,
        separator: &str,
    ) -> Result<MatchStrategy> {
        let keys = record_tags(record, kind, separator)?;

        if !keys.is_empty() {
            return Ok(MatchStrategy::Tagged(keys));
        }

        Ok(match kind {
            GroupKind::CompoundFamily => MatchStrategy::Untagged {
                base_form: record.pali_clean(),
            },
            GroupKind::Set => MatchStrategy::Unmatched,
        })
    }
}
