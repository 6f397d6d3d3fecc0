// 📖 Headword Record - a dictionary entry as read from the corpus
//
// Read-only for the family pipelines: nothing here is ever written back.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static HOMOGRAPH_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" \d.*$").expect("valid homograph regex"));

static CONSTRUCTION_PHONETIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" > [^+]+").expect("valid phonetic regex"));

static CONSTRUCTION_BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\[[^\]]*\]\s*\+?").expect("valid bracket regex"));

/// HeadwordRecord - one entry of the dictionary
///
/// Columns mirror the corpus export, so the same struct is used for CSV
/// import and for rows read back from SQLite.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeadwordRecord {
    /// Store id (0 until inserted)
    #[serde(default)]
    pub id: i64,

    /// Display form, unique, may carry a homograph number ("gata 1")
    pub pali_1: String,

    /// Part of speech ("masc", "adj", "sandhi", "idiom", ...)
    #[serde(default)]
    pub pos: String,

    /// Grammar / classification notes ("masc, comp", ...)
    #[serde(default)]
    pub grammar: String,

    /// Primary gloss. Empty or missing = not yet defined
    #[serde(default)]
    pub meaning_1: Option<String>,

    /// Literal meaning
    #[serde(default)]
    pub meaning_lit: Option<String>,

    /// Construction / etymology ("kusala + kamma")
    #[serde(default)]
    pub construction: String,

    /// Raw compound family tag field. Empty or missing = untagged
    #[serde(default)]
    pub family_compound: Option<String>,

    /// Raw set tag field
    #[serde(default)]
    pub family_set: Option<String>,

    /// Citation for the gloss
    #[serde(default)]
    pub source_1: Option<String>,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl HeadwordRecord {
    /// Minimal record, mostly for tests and fixtures
    pub fn new(pali_1: &str, pos: &str, grammar: &str, meaning_1: &str) -> Self {
        HeadwordRecord {
            pali_1: pali_1.to_string(),
            pos: pos.to_string(),
            grammar: grammar.to_string(),
            meaning_1: Some(meaning_1.to_string()).filter(|m| !m.is_empty()),
            ..Default::default()
        }
    }

    pub fn with_compound_family(mut self, tags: &str) -> Self {
        self.family_compound = Some(tags.to_string());
        self
    }

    pub fn with_family_set(mut self, tags: &str) -> Self {
        self.family_set = Some(tags.to_string());
        self
    }

    pub fn with_construction(mut self, construction: &str) -> Self {
        self.construction = construction.to_string();
        self
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source_1 = Some(source.to_string());
        self
    }

    /// Base form: display form without the homograph number ("gata 1" → "gata")
    pub fn pali_clean(&self) -> String {
        base_form(&self.pali_1)
    }

    /// Has a defined primary gloss
    pub fn has_meaning(&self) -> bool {
        non_empty(&self.meaning_1).is_some()
    }

    /// Raw compound family field, None when untagged
    pub fn compound_field(&self) -> Option<&str> {
        non_empty(&self.family_compound)
    }

    /// Raw set field, None when untagged
    pub fn set_field(&self) -> Option<&str> {
        non_empty(&self.family_set)
    }

    /// Gloss shown in tables: meaning_1 plus the literal meaning if any
    pub fn gloss(&self) -> String {
        let mut gloss = non_empty(&self.meaning_1).unwrap_or("").to_string();

        if let Some(lit) = non_empty(&self.meaning_lit) {
            if gloss.is_empty() {
                gloss = format!("lit. {}", lit);
            } else {
                gloss = format!("{}; lit. {}", gloss, lit);
            }
        }

        gloss
    }

    /// How finished the entry is: defined and sourced, defined, or undefined
    pub fn degree_of_completion(&self) -> &'static str {
        if self.has_meaning() {
            if non_empty(&self.source_1).is_some() {
                "<span class='gray'>✓</span>"
            } else {
                "<span class='gray'>-</span>"
            }
        } else {
            "<span class='gray'>✗</span>"
        }
    }

    /// Construction reduced to its components, for flashcards
    pub fn clean_construction(&self) -> String {
        clean_construction(&self.construction)
    }
}

/// Strip a trailing homograph number: everything from " <digit>" on
pub fn base_form(pali_1: &str) -> String {
    HOMOGRAPH_SUFFIX.replace(pali_1, "").into_owned()
}

/// First line only, without phonetic-change steps ("> x") or bracketed notes
pub fn clean_construction(construction: &str) -> String {
    let first_line = construction.lines().next().unwrap_or("");
    let without_steps = CONSTRUCTION_PHONETIC.replace_all(first_line, " ");
    let without_brackets = CONSTRUCTION_BRACKETS.replace_all(&without_steps, " ");

    without_brackets
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(" +")
        .to_string()
}
