//! The i18n output document.
//!
//! An [`OutputDocument`] maps language tags to [`LanguageMap`]s, each mapping
//! translation keys to text. Both levels keep first-seen order so that the
//! serialized JSON follows the source sheet.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::lang::LanguageTag;

/// Translations for one language, in first-seen key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl LanguageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the text for `key`.
    ///
    /// A replaced entry keeps its original position. Returns the previous text.
    pub fn insert(&mut self, key: &str, text: String) -> Option<String> {
        match self.index.get(key) {
            Some(&idx) => Some(std::mem::replace(&mut self.entries[idx].1, text)),
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), text));
                None
            },
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&idx| self.entries[idx].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for LanguageMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, text) in &self.entries {
            map.serialize_entry(key, text)?;
        }
        map.end()
    }
}

/// Language tag to [`LanguageMap`], in order of each language's first entry.
///
/// A language appears only once some row contributed text to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputDocument {
    languages: Vec<(LanguageTag, LanguageMap)>,
    index: HashMap<LanguageTag, usize>,
}

impl OutputDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text of `key` for `tag`, creating the language on first use.
    ///
    /// Returns the text that was replaced, if the key was already present.
    pub fn insert(&mut self, tag: &LanguageTag, key: &str, text: String) -> Option<String> {
        let idx = match self.index.get(tag) {
            Some(&idx) => idx,
            None => {
                let idx = self.languages.len();
                self.index.insert(tag.clone(), idx);
                self.languages.push((tag.clone(), LanguageMap::new()));
                idx
            },
        };
        self.languages[idx].1.insert(key, text)
    }

    /// The translations for a language.
    pub fn language(&self, tag: &str) -> Option<&LanguageMap> {
        self.index.get(tag).map(|&idx| &self.languages[idx].1)
    }

    /// Look up one translation.
    pub fn get(&self, tag: &str, key: &str) -> Option<&str> {
        self.language(tag)?.get(key)
    }

    /// Languages with their translations, in first-entry order.
    pub fn iter(&self) -> impl Iterator<Item = (&LanguageTag, &LanguageMap)> {
        self.languages.iter().map(|(tag, map)| (tag, map))
    }

    /// Language tags in first-entry order.
    pub fn tags(&self) -> Vec<&str> {
        self.languages.iter().map(|(tag, _)| tag.as_str()).collect()
    }

    /// Number of languages.
    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

impl Serialize for OutputDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.languages.len()))?;
        for (tag, translations) in &self.languages {
            map.serialize_entry(tag, translations)?;
        }
        map.end()
    }
}
