//! Character-level canonicalization of Arabic words
//!
//! Strips non-key characters (diacritics, tatweel, joiners) and, when a
//! voweled form is compared against its unvoweled lexicon key, prefers the
//! key's spelling of letters that only differ by hamza/alef/ta/ya variant.

use crate::error::{MorphError, Result};

/// Maximum number of characters the normalizer accepts
pub const MAX_NORMALIZED_LEN: usize = 500;

/// Ta marbuta, dropped when it trails a voweled form without a key match
pub const FEMININE_ENDING: char = '\u{0629}';

/// Groups of letters that are interchangeable during normalization
const EQUIVALENCE_GROUPS: &[&[char]] = &[
    // alef forms
    &['\u{0627}', '\u{0623}', '\u{0625}', '\u{0622}', '\u{0671}'],
    // hamza forms
    &['\u{0621}', '\u{0623}', '\u{0625}', '\u{0624}', '\u{0626}'],
    // ta / ta marbuta / ha
    &['\u{062A}', '\u{0629}', '\u{0647}'],
    // ya / alef maksura / ya with hamza
    &['\u{064A}', '\u{0649}', '\u{0626}'],
];

/// True for characters that carry no lexical identity
#[inline]
pub fn is_non_key(c: char) -> bool {
    matches!(c,
        '\u{064B}'..='\u{0655}' | // tanween, short vowels, shadda, sukun, combining hamza
        '\u{0670}' |              // dagger alef
        '\u{0640}' |              // tatweel
        '\u{200C}'..='\u{200F}'   // zero-width joiners, bidi marks
    )
}

/// Symmetric equivalence used by [`Normalizer::normalize_against`]
pub fn is_equivalent(a: char, b: char) -> bool {
    a == b
        || EQUIVALENCE_GROUPS
            .iter()
            .any(|group| group.contains(&a) && group.contains(&b))
}

/// True if `c` lies in the Arabic Unicode block
#[inline]
pub fn is_arabic_char(c: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&c)
}

/// True if any character of `text` lies in the Arabic block
pub fn contains_arabic(text: &str) -> bool {
    text.chars().any(is_arabic_char)
}

/// Bounded normalizer
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    max_len: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            max_len: MAX_NORMALIZED_LEN,
        }
    }
}

impl Normalizer {
    /// Create a normalizer with the default bound
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer accepting at most `max_len` characters
    pub fn with_max_len(max_len: usize) -> Self {
        Self { max_len }
    }

    /// Maximum accepted input length
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    fn check_len(&self, text: &str) -> Result<usize> {
        let len = text.chars().count();
        if len > self.max_len {
            return Err(MorphError::InputTooLarge {
                input: text.to_string(),
                len,
                max: self.max_len,
            });
        }
        Ok(len)
    }

    /// Remove every non-key character, keeping order
    pub fn normalize(&self, text: &str) -> Result<String> {
        let len = self.check_len(text)?;
        let mut out = String::with_capacity(len * 2);
        out.extend(text.chars().filter(|c| !is_non_key(*c)));
        Ok(out)
    }

    /// Normalize a voweled form against its unvoweled reference
    ///
    /// Both strings are walked together. When the current voweled letter is
    /// equivalent to the next reference letter the reference spelling wins.
    /// Otherwise the voweled letter is kept unless it is non-key, or it is a
    /// trailing ta marbuta. Unmatched voweled letters do not consume the
    /// reference.
    pub fn normalize_against(&self, voweled: &str, reference: &str) -> Result<String> {
        let len = self.check_len(voweled)?;
        let refs: Vec<char> = reference.chars().filter(|c| !is_non_key(*c)).collect();
        let mut out = String::with_capacity(len * 2);
        let mut j = 0;

        for (i, v) in voweled.chars().enumerate() {
            if j < refs.len() && is_equivalent(v, refs[j]) {
                out.push(refs[j]);
                j += 1;
                continue;
            }
            if is_non_key(v) {
                continue;
            }
            if i + 1 == len && v == FEMININE_ENDING {
                continue;
            }
            out.push(v);
        }

        Ok(out)
    }
}

/// Normalize with the default bound
pub fn normalize(text: &str) -> Result<String> {
    Normalizer::default().normalize(text)
}

/// Normalize a voweled form against its reference with the default bound
pub fn normalize_against(voweled: &str, reference: &str) -> Result<String> {
    Normalizer::default().normalize_against(voweled, reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buckwalter::to_arabic;
    use proptest::prelude::*;

    #[test]
    fn test_strips_diacritics() {
        assert_eq!(normalize(&to_arabic("kataba")).unwrap(), to_arabic("ktb"));
        assert_eq!(normalize(&to_arabic("ka_ta~ba")).unwrap(), to_arabic("ktb"));
    }

    #[test]
    fn test_keeps_non_arabic() {
        assert_eq!(normalize("abc").unwrap(), "abc");
        assert_eq!(normalize("").unwrap(), "");
    }

    #[test]
    fn test_input_too_large() {
        let long = "b".repeat(MAX_NORMALIZED_LEN + 1);
        match normalize(&long) {
            Err(MorphError::InputTooLarge { len, max, .. }) => {
                assert_eq!(len, MAX_NORMALIZED_LEN + 1);
                assert_eq!(max, MAX_NORMALIZED_LEN);
            }
            other => panic!("expected InputTooLarge, got {other:?}"),
        }
        assert!(normalize(&"b".repeat(MAX_NORMALIZED_LEN)).is_ok());
    }

    #[test]
    fn test_against_prefers_reference_spelling() {
        // voweled form spells the initial alef with hamza, the key uses bare alef
        let out = normalize_against(&to_arabic(">akala"), &to_arabic("Akl")).unwrap();
        assert_eq!(out, to_arabic("Akl"));
    }

    #[test]
    fn test_against_drops_trailing_feminine_ending() {
        let out = normalize_against(&to_arabic("madorasap"), &to_arabic("mdrs")).unwrap();
        assert_eq!(out, to_arabic("mdrs"));
    }

    #[test]
    fn test_against_keeps_matched_feminine_ending() {
        let out = normalize_against(&to_arabic("madorasap"), &to_arabic("mdrsp")).unwrap();
        assert_eq!(out, to_arabic("mdrsp"));
    }

    #[test]
    fn test_against_keeps_unmatched_key_letters() {
        let out = normalize_against(&to_arabic("kAtib"), &to_arabic("ktb")).unwrap();
        assert_eq!(out, to_arabic("kAtb"));
    }

    #[test]
    fn test_equivalence_is_symmetric() {
        for group in EQUIVALENCE_GROUPS {
            for a in group.iter() {
                for b in group.iter() {
                    assert!(is_equivalent(*a, *b));
                    assert!(is_equivalent(*b, *a));
                }
            }
        }
        assert!(!is_equivalent('\u{0628}', '\u{062A}'));
    }

    #[test]
    fn test_contains_arabic() {
        assert!(contains_arabic("abc \u{0643}"));
        assert!(!contains_arabic("abc 123"));
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(s in "[\u{0621}-\u{0652}a-z_ ]{0,40}") {
            let once = normalize(&s).unwrap();
            let twice = normalize(&once).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_normalized_has_no_non_key(s in "[\u{0621}-\u{0670}]{0,40}") {
            let out = normalize(&s).unwrap();
            prop_assert!(out.chars().all(|c| !is_non_key(c)));
        }
    }
}
