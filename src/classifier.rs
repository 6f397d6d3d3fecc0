// 🔬 Compound Classifier - is this headword a member of its families?
//
// The compound tag field over-includes: a word that merely names a family
// (e.g. glossing the family's head term) carries the tag too. Only words
// that are themselves compounds, sandhi or idioms count as members.

use crate::headword::HeadwordRecord;
use regex::Regex;
use std::sync::LazyLock;

static COMP_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bcomp\b").expect("valid compound marker regex"));

/// Default ceiling for the base-form length (exclusive)
pub const MAX_COMPOUND_LEN: usize = 30;

/// Classifier with the length ceiling as its only parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompoundClassifier {
    pub max_len: usize,
}

impl Default for CompoundClassifier {
    fn default() -> Self {
        CompoundClassifier {
            max_len: MAX_COMPOUND_LEN,
        }
    }
}

impl CompoundClassifier {
    pub fn new(max_len: usize) -> Self {
        CompoundClassifier { max_len }
    }

    /// A headword is a compound family member when all three hold:
    /// - grammar has the whole word "comp", or pos mentions sandhi / idiom
    /// - its base form is shorter than `max_len` characters
    /// - it has a primary gloss
    pub fn is_compound_member(&self, record: &HeadwordRecord) -> bool {
        let structural = COMP_MARKER.is_match(&record.grammar)
            || record.pos.contains("sandhi")
            || record.pos.contains("idiom");

        structural
            && record.pali_clean().chars().count() < self.max_len
            && record.has_meaning()
    }
}

/// Classify with the default ceiling
pub fn is_compound_member(record: &HeadwordRecord) -> bool {
    CompoundClassifier::default().is_compound_member(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comp_in_grammar() {
        let w = HeadwordRecord::new("bodhirukkha", "masc", "masc, comp", "Bodhi tree");
        assert!(is_compound_member(&w));
    }

    #[test]
    fn test_comp_must_be_whole_word() {
        let w = HeadwordRecord::new("saṅgaha", "masc", "compar, complete", "collection");
        assert!(!is_compound_member(&w));

        let w = HeadwordRecord::new("saṅgaha", "masc", "from sam, comp, pp", "collection");
        assert!(is_compound_member(&w));
    }

    #[test]
    fn test_sandhi_and_idiom_pos() {
        let sandhi = HeadwordRecord::new("tenāha", "sandhi", "", "therefore he said");
        let idiom = HeadwordRecord::new("evaṃ me sutaṃ", "idiom", "", "thus have I heard");
        assert!(is_compound_member(&sandhi));
        assert!(is_compound_member(&idiom));
    }

    #[test]
    fn test_plain_word_is_not_member() {
        let w = HeadwordRecord::new("kamma 1", "nt", "nt", "action")
            .with_compound_family("kamma");
        assert!(!is_compound_member(&w));
    }

    #[test]
    fn test_undefined_word_is_not_member() {
        let w = HeadwordRecord::new("issatta", "nt", "comp", "");
        assert!(!is_compound_member(&w));
    }

    #[test]
    fn test_length_ceiling_uses_base_form() {
        // 29 characters: under the ceiling
        let short = "a".repeat(29);
        let w = HeadwordRecord::new(&format!("{short} 1"), "masc", "comp", "x");
        assert!(is_compound_member(&w));

        // 30 characters: at the ceiling, excluded
        let long = "a".repeat(30);
        let w = HeadwordRecord::new(&long, "masc", "comp", "x");
        assert!(!is_compound_member(&w));

        // ceiling counts characters, not bytes
        let diacritics = "ā".repeat(29);
        let w = HeadwordRecord::new(&diacritics, "masc", "comp", "x");
        assert!(is_compound_member(&w));
    }

    #[test]
    fn test_custom_ceiling() {
        let w = HeadwordRecord::new("bodhirukkha", "masc", "comp", "Bodhi tree");
        assert!(!CompoundClassifier::new(5).is_compound_member(&w));
        assert!(CompoundClassifier::new(12).is_compound_member(&w));
    }

    #[test]
    fn test_deterministic() {
        let w = HeadwordRecord::new("dvipadagga", "masc", "masc, comp", "best of bipeds");
        let first = is_compound_member(&w);
        for _ in 0..10 {
            assert_eq!(is_compound_member(&w), first);
        }
    }
}
