//! Katakana to romaji expansion.
//!
//! Every plausible romanized spelling of a kana string is produced, so a user
//! typing `shi` or `si` reaches the same suggestion. Branching is bounded by a
//! hard cap on the number of candidates per input string.
//!
//! # Algorithm
//!
//! The input is scanned left to right, trying a two-character grapheme before a
//! single character; characters missing from the table pass through unchanged.
//! A flat arena of in-progress candidates is kept. The first variant of a
//! grapheme extends every candidate; each further variant extends a copy of the
//! candidates as they were before this grapheme, while room remains under the
//! cap. Completed candidates are width-folded and lower-cased.
//!
//! ```
//! use sarissa_suggest::converter::ReadingConverter;
//! use sarissa_suggest::converter::alphabet::AlphabetConverter;
//!
//! let converter = AlphabetConverter::new();
//! assert_eq!(converter.convert("シカ"), vec!["sika", "shika"]);
//! ```

use ahash::AHashMap;
use lazy_static::lazy_static;

use crate::converter::ReadingConverter;
use crate::normalize::{Normalizer, WidthNormalizer};
use crate::util::kana;

/// Default ceiling on candidates per input string.
pub const DEFAULT_MAX_READING_PATTERNS: usize = 10;

#[rustfmt::skip]
static ROMAJI_TABLE: &[(&str, &[&str])] = &[
    ("ア", &["a"]), ("イ", &["i"]), ("ウ", &["u"]), ("エ", &["e"]),
    ("オ", &["o"]), ("カ", &["ka"]), ("キ", &["ki"]), ("ク", &["ku"]),
    ("ケ", &["ke"]), ("コ", &["ko"]), ("サ", &["sa"]), ("シ", &["si", "shi"]),
    ("ス", &["su"]), ("セ", &["se"]), ("ソ", &["so"]), ("タ", &["ta"]),
    ("チ", &["ti", "chi"]), ("ツ", &["tu", "tsu"]), ("テ", &["te"]), ("ト", &["to"]),
    ("ナ", &["na"]), ("ニ", &["ni"]), ("ヌ", &["nu"]), ("ネ", &["ne"]),
    ("ノ", &["no"]), ("ハ", &["ha"]), ("ヒ", &["hi"]), ("フ", &["hu", "fu"]),
    ("ヘ", &["he"]), ("ホ", &["ho"]), ("マ", &["ma"]), ("ミ", &["mi"]),
    ("ム", &["mu"]), ("メ", &["me"]), ("モ", &["mo"]), ("ヤ", &["ya"]),
    ("ユ", &["yu"]), ("ヨ", &["yo"]), ("ラ", &["ra"]), ("リ", &["ri"]),
    ("ル", &["ru"]), ("レ", &["re"]), ("ロ", &["ro"]), ("ワ", &["wa"]),
    ("ヲ", &["wo"]), ("ン", &["nn", "n"]), ("ガ", &["ga"]), ("ギ", &["gi"]),
    ("グ", &["gu"]), ("ゲ", &["ge"]), ("ゴ", &["go"]), ("ザ", &["za"]),
    ("ジ", &["zi", "ji"]), ("ズ", &["zu"]), ("ゼ", &["ze"]), ("ゾ", &["zo"]),
    ("ダ", &["da"]), ("ヂ", &["di"]), ("ヅ", &["du"]), ("デ", &["de"]),
    ("ド", &["do"]), ("バ", &["ba"]), ("ビ", &["bi"]), ("ブ", &["bu"]),
    ("ベ", &["be"]), ("ボ", &["bo"]), ("パ", &["pa"]), ("ピ", &["pi"]),
    ("プ", &["pu"]), ("ペ", &["pe"]), ("ポ", &["po"]), ("ヴァ", &["va"]),
    ("ヴィ", &["vi"]), ("ヴ", &["vu"]), ("ヴェ", &["ve"]), ("ヴォ", &["vo"]),
    ("ギャ", &["gya"]), ("ギュ", &["gyu"]), ("ギョ", &["gyo"]), ("ギェ", &["gye"]),
    ("ジャ", &["zya", "ja", "jya"]), ("ジュ", &["zyu", "ju", "jyu"]), ("ジョ", &["zyo", "jo", "jyo"]), ("ジェ", &["zye", "je", "jye"]),
    ("キャ", &["kya"]), ("キュ", &["kyu"]), ("キョ", &["kyo"]), ("シャ", &["sya", "sha"]),
    ("シュ", &["syu", "shu"]), ("ショ", &["syo", "sho"]), ("シェ", &["sye", "she"]), ("チャ", &["tya", "cha"]),
    ("チュ", &["tyu", "chu"]), ("チョ", &["tyo", "cho"]), ("チェ", &["tye", "che"]), ("ニャ", &["nya"]),
    ("ニュ", &["nyu"]), ("ニョ", &["nyo"]), ("ヒャ", &["hya"]), ("ヒュ", &["hyu"]),
    ("ヒョ", &["hyo"]), ("フャ", &["fya"]), ("フュ", &["hyu", "fyu"]), ("フョ", &["fyo"]),
    ("ファ", &["fa"]), ("フィ", &["fi"]), ("フェ", &["fe"]), ("フォ", &["fo"]),
    ("ミャ", &["mya"]), ("ミュ", &["myu"]), ("ミョ", &["myo"]), ("リャ", &["rya"]),
    ("リュ", &["ryu"]), ("リョ", &["ryo"]), ("ァ", &["a"]), ("ィ", &["i"]),
    ("ゥ", &["u"]), ("ェ", &["e"]), ("ォ", &["o"]), ("ャ", &["ya"]),
    ("ュ", &["yu"]), ("ョ", &["yo"]), ("ッ", &["tu", "tsu"]),
];

lazy_static! {
    static ref ROMAJI: AHashMap<&'static str, &'static [&'static str]> =
        ROMAJI_TABLE.iter().copied().collect();
}

/// Expands katakana (and hiragana) into romanized readings.
#[derive(Debug)]
pub struct AlphabetConverter {
    max_reading_patterns: usize,
    normalizer: Box<dyn Normalizer>,
}

impl Default for AlphabetConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl AlphabetConverter {
    /// Create a converter with the default cap and width normalizer.
    pub fn new() -> Self {
        AlphabetConverter {
            max_reading_patterns: DEFAULT_MAX_READING_PATTERNS,
            normalizer: Box::new(WidthNormalizer::new()),
        }
    }

    /// Set the ceiling on candidates per input string.
    pub fn with_max_reading_patterns(mut self, max: usize) -> Self {
        self.max_reading_patterns = max.max(1);
        self
    }

    /// Replace the normalizer applied to completed candidates.
    pub fn with_normalizer(mut self, normalizer: Box<dyn Normalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn max_reading_patterns(&self) -> usize {
        self.max_reading_patterns
    }

    /// Longest table match at `pos`: (variants, chars consumed).
    fn lookup(chars: &[char], pos: usize) -> Option<(&'static [&'static str], usize)> {
        if pos + 1 < chars.len() {
            let pair: String = chars[pos..pos + 2].iter().collect();
            if let Some(variants) = ROMAJI.get(pair.as_str()) {
                return Some((*variants, 2));
            }
        }
        let single = chars[pos].to_string();
        ROMAJI.get(single.as_str()).map(|variants| (*variants, 1))
    }

    fn expand(&self, katakana: &str) -> Vec<String> {
        let chars: Vec<char> = katakana.chars().collect();
        let mut candidates: Vec<String> = vec![String::new()];
        let mut pos = 0;

        while pos < chars.len() {
            let (variants, consumed) = match Self::lookup(&chars, pos) {
                Some(found) => found,
                None => {
                    let c = chars[pos];
                    candidates.iter_mut().for_each(|buf| buf.push(c));
                    pos += 1;
                    continue;
                }
            };
            pos += consumed;

            // Copy of the arena before this grapheme, only when it may branch.
            let snapshot = if variants.len() > 1 && candidates.len() < self.max_reading_patterns {
                Some(candidates.clone())
            } else {
                None
            };

            for buf in candidates.iter_mut() {
                buf.push_str(variants[0]);
            }

            if let Some(snapshot) = snapshot {
                for variant in &variants[1..] {
                    let room = self.max_reading_patterns.saturating_sub(candidates.len());
                    if room == 0 {
                        break;
                    }
                    candidates.extend(snapshot.iter().take(room).map(|prefix| {
                        let mut buf = String::with_capacity(prefix.len() + variant.len());
                        buf.push_str(prefix);
                        buf.push_str(variant);
                        buf
                    }));
                }
            }
        }

        let mut readings: Vec<String> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let reading = self.normalizer.normalize(&candidate);
            if !readings.contains(&reading) {
                readings.push(reading);
            }
        }
        readings
    }
}

impl ReadingConverter for AlphabetConverter {
    fn convert(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return vec![text.to_string()];
        }
        self.expand(&kana::hiragana_to_katakana(text))
    }

    fn name(&self) -> &'static str {
        "alphabet"
    }
}
