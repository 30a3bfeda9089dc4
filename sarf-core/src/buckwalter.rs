//! BuckWalter transliteration
//!
//! One-to-one ASCII encoding of the Arabic letters and diacritics used by
//! the analysis alphabet. Characters outside the table pass through
//! unchanged in both directions.

/// (BuckWalter, Arabic) pairs
const TABLE: &[(char, char)] = &[
    ('\'', '\u{0621}'), // hamza
    ('|', '\u{0622}'),  // alef with madda
    ('>', '\u{0623}'),  // alef with hamza above
    ('&', '\u{0624}'),  // waw with hamza
    ('<', '\u{0625}'),  // alef with hamza below
    ('}', '\u{0626}'),  // ya with hamza
    ('A', '\u{0627}'),
    ('b', '\u{0628}'),
    ('p', '\u{0629}'), // ta marbuta
    ('t', '\u{062A}'),
    ('v', '\u{062B}'),
    ('j', '\u{062C}'),
    ('H', '\u{062D}'),
    ('x', '\u{062E}'),
    ('d', '\u{062F}'),
    ('*', '\u{0630}'),
    ('r', '\u{0631}'),
    ('z', '\u{0632}'),
    ('s', '\u{0633}'),
    ('$', '\u{0634}'),
    ('S', '\u{0635}'),
    ('D', '\u{0636}'),
    ('T', '\u{0637}'),
    ('Z', '\u{0638}'),
    ('E', '\u{0639}'),
    ('g', '\u{063A}'),
    ('_', '\u{0640}'), // tatweel
    ('f', '\u{0641}'),
    ('q', '\u{0642}'),
    ('k', '\u{0643}'),
    ('l', '\u{0644}'),
    ('m', '\u{0645}'),
    ('n', '\u{0646}'),
    ('h', '\u{0647}'),
    ('w', '\u{0648}'),
    ('Y', '\u{0649}'), // alef maksura
    ('y', '\u{064A}'),
    ('F', '\u{064B}'), // fathatan
    ('N', '\u{064C}'), // dammatan
    ('K', '\u{064D}'), // kasratan
    ('a', '\u{064E}'),
    ('u', '\u{064F}'),
    ('i', '\u{0650}'),
    ('~', '\u{0651}'), // shadda
    ('o', '\u{0652}'), // sukun
    ('`', '\u{0670}'), // dagger alef
    ('{', '\u{0671}'), // alef wasla
];

/// Map one BuckWalter character to Arabic script
#[inline]
pub fn bw_char_to_arabic(c: char) -> char {
    TABLE
        .iter()
        .find(|(bw, _)| *bw == c)
        .map(|(_, ar)| *ar)
        .unwrap_or(c)
}

/// Map one Arabic character to BuckWalter
#[inline]
pub fn arabic_char_to_bw(c: char) -> char {
    TABLE
        .iter()
        .find(|(_, ar)| *ar == c)
        .map(|(bw, _)| *bw)
        .unwrap_or(c)
}

/// Convert a BuckWalter string to Arabic script
pub fn to_arabic(text: &str) -> String {
    text.chars().map(bw_char_to_arabic).collect()
}

/// Convert Arabic script to BuckWalter
pub fn to_buckwalter(text: &str) -> String {
    text.chars().map(arabic_char_to_bw).collect()
}
