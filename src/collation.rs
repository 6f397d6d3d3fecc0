// 🔤 Collation - headword sort order
//
// The engine only needs a deterministic total order over display forms.
// It never looks inside a CollationKey.

use std::cmp::Ordering;

/// Opaque sort key produced by a Collator
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollationKey(Vec<u32>);

pub trait Collator {
    fn sort_key(&self, text: &str) -> CollationKey;

    fn compare(&self, a: &str, b: &str) -> Ordering {
        self.sort_key(a).cmp(&self.sort_key(b))
    }
}

/// Sort items by the collation key of a string field
pub fn sort_by_collation<T, C, F>(items: &mut [T], collator: &C, text: F)
where
    C: Collator + ?Sized,
    F: Fn(&T) -> &str,
{
    items.sort_by_cached_key(|item| collator.sort_key(text(item)));
}

// ============================================================================
// CODEPOINT ORDER
// ============================================================================

/// Plain Unicode scalar order
#[derive(Debug, Clone, Copy, Default)]
pub struct CodepointCollator;

impl Collator for CodepointCollator {
    fn sort_key(&self, text: &str) -> CollationKey {
        CollationKey(text.chars().map(|c| c as u32).collect())
    }
}

// ============================================================================
// PALI ALPHABET ORDER
// ============================================================================

/// Pāli alphabetical order. Aspirates are single letters.
const PALI_ALPHABET: [&str; 41] = [
    "a", "ā", "i", "ī", "u", "ū", "e", "o", "k", "kh", "g", "gh", "ṅ", "c", "ch", "j", "jh", "ñ",
    "ṭ", "ṭh", "ḍ", "ḍh", "ṇ", "t", "th", "d", "dh", "n", "p", "ph", "b", "bh", "m", "y", "r",
    "l", "v", "s", "h", "ḷ", "ṃ",
];

// Space and digits sort before letters so "gata" < "gata 1" < "gata 2" < "gataka".
// TIE_BREAK sits below every rank, so the codepoint suffix only decides between
// strings whose folded ranks are equal ("Kamma" vs "kamma").
const TIE_BREAK: u32 = 0;
const SPACE_RANK: u32 = 1;
const DIGIT_BASE: u32 = 10;
const LETTER_BASE: u32 = 100;
const OTHER_BASE: u32 = 1_000;

#[derive(Debug, Clone, Copy, Default)]
pub struct PaliCollator;

impl PaliCollator {
    fn letter_rank(letter: &str) -> Option<u32> {
        PALI_ALPHABET
            .iter()
            .position(|l| *l == letter)
            .map(|i| LETTER_BASE + i as u32)
    }
}

impl Collator for PaliCollator {
    fn sort_key(&self, text: &str) -> CollationKey {
        let lower = text.to_lowercase();
        let chars: Vec<char> = lower.chars().collect();
        let mut key = Vec::with_capacity(chars.len());
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            // aspirate digraph: consonant + h
            if i + 1 < chars.len() && chars[i + 1] == 'h' {
                let digraph: String = [c, 'h'].iter().collect();
                if let Some(rank) = Self::letter_rank(&digraph) {
                    key.push(rank);
                    i += 2;
                    continue;
                }
            }

            let rank = if c == ' ' {
                SPACE_RANK
            } else if let Some(d) = c.to_digit(10) {
                DIGIT_BASE + d
            } else {
                let mut buf = [0u8; 4];
                Self::letter_rank(c.encode_utf8(&mut buf)).unwrap_or(OTHER_BASE + c as u32)
            };

            key.push(rank);
            i += 1;
        }

        key.push(TIE_BREAK);
        key.extend(text.chars().map(|c| c as u32));

        CollationKey(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(words: &[&str]) -> Vec<String> {
        let mut v: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        sort_by_collation(&mut v, &PaliCollator, |s| s.as_str());
        v
    }

    #[test]
    fn test_long_vowel_after_short() {
        assert_eq!(sorted(&["āgata", "agata", "bodhi"]), vec!["agata", "āgata", "bodhi"]);
    }

    #[test]
    fn test_aspirate_is_one_letter() {
        // kh sorts after every k + vowel
        assert_eq!(sorted(&["khanti", "kusala", "kamma"]), vec!["kamma", "kusala", "khanti"]);
        // dh after d + anything
        assert_eq!(sorted(&["dhamma", "dvi"]), vec!["dvi", "dhamma"]);
    }

    #[test]
    fn test_pali_order_differs_from_codepoints() {
        // ṭ comes before t in the Pāli alphabet but after it in Unicode
        assert_eq!(PaliCollator.compare("ṭīkā", "tap"), Ordering::Less);
        assert_eq!(CodepointCollator.compare("ṭīkā", "tap"), Ordering::Greater);
    }

    #[test]
    fn test_homographs_follow_bare_form() {
        assert_eq!(
            sorted(&["gata 2", "gataka", "gata 1", "gata"]),
            vec!["gata", "gata 1", "gata 2", "gataka"]
        );
    }

    #[test]
    fn test_case_variants_are_not_equal() {
        assert_ne!(PaliCollator.compare("Kamma", "kamma"), Ordering::Equal);
        assert_eq!(sorted(&["kamma", "Kamma"]), sorted(&["Kamma", "kamma"]));
        // case folding still decides first
        assert_eq!(sorted(&["kusala", "Kamma"]), vec!["Kamma", "kusala"]);
    }

    #[test]
    fn test_total_order_is_deterministic() {
        let a = PaliCollator.sort_key("aṭṭhakusalakammapaccayā");
        let b = PaliCollator.sort_key("aṭṭhakusalakammapaccayā");
        assert_eq!(a, b);
    }
}
