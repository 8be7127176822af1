//! Language tag detection from free-form column headers.
//!
//! Translation sheets label their columns in many ways: `en`, `zh_rCN`,
//! `values-zh-rTW`, `英语/en`, `Japanese`. [`normalize_header`] maps such a label to
//! a [`LanguageTag`] and returns `None` for anything it does not recognize, so an
//! unrelated column is never mistaken for a language.
//!
//! Detection runs in two passes with a fixed precedence:
//!
//! 1. **Codes**: every ASCII word of the header, left to right, is checked against
//!    the table of known language subtags. A known language may be followed by a
//!    region (`CN`, Android-style `rCN`, `419`) or a script (`Hant`) joined with a
//!    single `-` or `_`. A code without such a subtag only counts when no
//!    whitespace touches it (`en`, `英语/en`, `French (fr)`), so ordinary words of a
//!    phrase like `my notes` are left alone.
//! 2. **Names**: the whole header, then each segment between separators, then each
//!    word is looked up in a table of language names (English, native and Chinese).
//!
//! Matching is case-insensitive.

use std::borrow::Borrow;
use std::fmt;

use phf::{phf_map, phf_set};
use serde::Serialize;

/// Known primary language subtags, lowercase.
static LANGUAGES: phf::Set<&'static str> = phf_set! {
    "ar", "bn", "cs", "da", "de", "el", "en", "es", "fa", "fi", "fil", "fr", "he",
    "hi", "hu", "id", "it", "ja", "ko", "ms", "nb", "nl", "pl", "pt", "ro", "ru",
    "sv", "th", "tr", "uk", "ur", "vi", "zh",
};

/// Language names, lowercase with single spaces, mapped to canonical tags.
static LANGUAGE_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "english" => "en",
    "英语" => "en",
    "英文" => "en",
    "chinese" => "zh-CN",
    "simplified chinese" => "zh-CN",
    "chinese simplified" => "zh-CN",
    "中文" => "zh-CN",
    "简体中文" => "zh-CN",
    "简体" => "zh-CN",
    "简中" => "zh-CN",
    "traditional chinese" => "zh-TW",
    "chinese traditional" => "zh-TW",
    "繁体中文" => "zh-TW",
    "繁體中文" => "zh-TW",
    "繁体" => "zh-TW",
    "繁體" => "zh-TW",
    "繁中" => "zh-TW",
    "cantonese" => "zh-HK",
    "粤语" => "zh-HK",
    "香港繁体" => "zh-HK",
    "japanese" => "ja",
    "日语" => "ja",
    "日文" => "ja",
    "日本語" => "ja",
    "korean" => "ko",
    "韩语" => "ko",
    "韩文" => "ko",
    "한국어" => "ko",
    "arabic" => "ar",
    "阿拉伯语" => "ar",
    "german" => "de",
    "deutsch" => "de",
    "德语" => "de",
    "french" => "fr",
    "français" => "fr",
    "法语" => "fr",
    "spanish" => "es",
    "español" => "es",
    "西班牙语" => "es",
    "italian" => "it",
    "italiano" => "it",
    "意大利语" => "it",
    "portuguese" => "pt",
    "português" => "pt",
    "葡萄牙语" => "pt",
    "russian" => "ru",
    "русский" => "ru",
    "俄语" => "ru",
    "hindi" => "hi",
    "印地语" => "hi",
    "bengali" => "bn",
    "孟加拉语" => "bn",
    "vietnamese" => "vi",
    "tiếng việt" => "vi",
    "越南语" => "vi",
    "thai" => "th",
    "泰语" => "th",
    "indonesian" => "id",
    "bahasa indonesia" => "id",
    "印尼语" => "id",
    "malay" => "ms",
    "bahasa melayu" => "ms",
    "马来语" => "ms",
    "filipino" => "fil",
    "tagalog" => "fil",
    "菲律宾语" => "fil",
    "polish" => "pl",
    "polski" => "pl",
    "波兰语" => "pl",
    "dutch" => "nl",
    "nederlands" => "nl",
    "荷兰语" => "nl",
    "turkish" => "tr",
    "türkçe" => "tr",
    "土耳其语" => "tr",
    "persian" => "fa",
    "farsi" => "fa",
    "波斯语" => "fa",
    "urdu" => "ur",
    "乌尔都语" => "ur",
};

/// How a detected code is written in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagStyle {
    /// Canonical hyphenated form: `zh_rCN` becomes `zh-CN`
    #[default]
    Abbreviated,
    /// The code as written in the header: `zh_rCN` stays `zh_rCN`
    Preserved,
}

/// A language identifier used as a top-level key of the output document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LanguageTag(String);

impl LanguageTag {
    /// Wrap a tag as given (e.g. from the command line); no normalization is applied.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The tag text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LanguageTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for LanguageTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// An ASCII word of a header with its byte span.
#[derive(Debug, Clone, Copy)]
struct Word<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

/// Split a header into maximal runs of ASCII letters and digits.
fn ascii_words(header: &str) -> Vec<Word<'_>> {
    let mut words = Vec::new();
    let mut start = None;

    for (idx, ch) in header.char_indices() {
        match (ch.is_ascii_alphanumeric(), start) {
            (true, None) => start = Some(idx),
            (false, Some(s)) => {
                words.push(Word {
                    text: &header[s..idx],
                    start: s,
                    end: idx,
                });
                start = None;
            },
            _ => {},
        }
    }
    if let Some(s) = start {
        words.push(Word {
            text: &header[s..],
            start: s,
            end: header.len(),
        });
    }

    words
}

/// Subtag that may follow a language code.
enum Qualifier {
    Region(String),
    Script(String),
}

fn parse_qualifier(word: &str) -> Option<Qualifier> {
    let bytes = word.as_bytes();
    let all_alpha = bytes.iter().all(u8::is_ascii_alphabetic);

    match bytes.len() {
        2 if all_alpha => Some(Qualifier::Region(word.to_ascii_uppercase())),
        // Android resource qualifier, e.g. "rCN"
        3 if all_alpha && (bytes[0] == b'r' || bytes[0] == b'R') => {
            Some(Qualifier::Region(word[1..].to_ascii_uppercase()))
        },
        3 if bytes.iter().all(u8::is_ascii_digit) => Some(Qualifier::Region(word.to_string())),
        4 if all_alpha => {
            let mut script = word.to_ascii_lowercase();
            script[..1].make_ascii_uppercase();
            Some(Qualifier::Script(script))
        },
        _ => None,
    }
}

/// Whether two adjacent words are joined by exactly one `-` or `_`.
fn linked(header: &str, left: &Word<'_>, right: &Word<'_>) -> bool {
    matches!(&header[left.end..right.start], "-" | "_")
}

/// Whether no whitespace sits directly before or after `word`.
fn stands_alone(header: &str, word: &Word<'_>) -> bool {
    let before = header[..word.start].chars().next_back();
    let after = header[word.end..].chars().next();
    !before.is_some_and(char::is_whitespace) && !after.is_some_and(char::is_whitespace)
}

/// First pass: a known language code, optionally qualified.
fn detect_code(header: &str, style: TagStyle) -> Option<LanguageTag> {
    let words = ascii_words(header);

    for (idx, word) in words.iter().enumerate() {
        let lang = word.text.to_ascii_lowercase();
        if !(2..=3).contains(&lang.len()) || !LANGUAGES.contains(lang.as_str()) {
            continue;
        }

        let qualifier = words
            .get(idx + 1)
            .filter(|next| linked(header, word, next))
            .and_then(|next| parse_qualifier(next.text).map(|q| (next.end, q)));
        if qualifier.is_none() && !stands_alone(header, word) {
            continue;
        }

        let tag = match style {
            TagStyle::Preserved => {
                let end = qualifier.as_ref().map_or(word.end, |(end, _)| *end);
                header[word.start..end].to_string()
            },
            TagStyle::Abbreviated => match qualifier {
                Some((_, Qualifier::Region(region))) => format!("{}-{}", lang, region),
                Some((_, Qualifier::Script(script))) => format!("{}-{}", lang, script),
                None => lang,
            },
        };
        return Some(LanguageTag(tag));
    }

    None
}

fn lookup_name(candidate: &str) -> Option<LanguageTag> {
    let key = candidate.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    if key.is_empty() {
        return None;
    }
    LANGUAGE_NAMES.get(key.as_str()).map(|tag| LanguageTag::new(*tag))
}

/// Second pass: a language name.
fn detect_name(header: &str) -> Option<LanguageTag> {
    let is_separator = |c: char| !c.is_alphanumeric() && !c.is_whitespace();

    lookup_name(header)
        .or_else(|| header.split(is_separator).find_map(lookup_name))
        .or_else(|| {
            header
                .split(|c: char| is_separator(c) || c.is_whitespace())
                .find_map(lookup_name)
        })
}

/// Detect the language a column header names.
///
/// Returns `None` when the header matches neither a known code nor a known name.
pub fn normalize_header(header: &str, style: TagStyle) -> Option<LanguageTag> {
    let header = header.trim();
    if header.is_empty() {
        return None;
    }
    detect_code(header, style).or_else(|| detect_name(header))
}
