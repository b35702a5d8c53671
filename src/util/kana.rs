//! Character-class helpers for Japanese text.

/// Offset between a hiragana code point and its katakana counterpart.
const KANA_OFFSET: u32 = 0x60;

/// Coarse script classification used for grouping unknown words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Hiragana,
    Katakana,
    Kanji,
    Alphanumeric,
    Whitespace,
    Symbol,
}

/// Classify a single character.
pub fn script_of(c: char) -> Script {
    if c.is_whitespace() {
        Script::Whitespace
    } else if is_hiragana(c) {
        Script::Hiragana
    } else if is_katakana(c) {
        Script::Katakana
    } else if is_kanji(c) {
        Script::Kanji
    } else if c.is_alphanumeric() {
        Script::Alphanumeric
    } else {
        Script::Symbol
    }
}

pub fn is_hiragana(c: char) -> bool {
    matches!(c, '\u{3041}'..='\u{3096}' | '\u{309D}' | '\u{309E}')
}

/// Full-width katakana including the prolonged sound mark.
pub fn is_katakana(c: char) -> bool {
    matches!(c, '\u{30A1}'..='\u{30FA}' | '\u{30FC}'..='\u{30FE}')
}

pub fn is_kanji(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '\u{F900}'..='\u{FAFF}' | '々')
}

/// True when every character is hiragana or katakana.
pub fn is_kana(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| is_hiragana(c) || is_katakana(c))
}

/// True when the text contains at least one hiragana character.
pub fn contains_hiragana(text: &str) -> bool {
    text.chars().any(is_hiragana)
}

/// Map hiragana to katakana, leaving every other character untouched.
pub fn hiragana_to_katakana(text: &str) -> String {
    text.chars()
        .map(|c| {
            if is_hiragana(c) {
                char::from_u32(c as u32 + KANA_OFFSET).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}
