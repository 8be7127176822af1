//! Header row classification.
//!
//! Decides which column holds the translation keys and which columns hold text for
//! which language. Every language tag is claimed by at most one column: scanning
//! left to right, the first column to produce a tag keeps it.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::lang::{LanguageTag, TagStyle, normalize_header};
use crate::error::{Error, Result};
use crate::ooxml::xlsx::Row;

/// A column whose cells are translations into one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageColumn {
    /// 1-based column index
    pub column: u32,
    /// Language the column's cells are written in
    pub tag: LanguageTag,
    /// Header text as found in the sheet
    pub header: String,
}

/// The outcome of classifying a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    /// 1-based index of the key column
    pub key_column: u32,
    /// 1-based index of the default-language column, when the sheet has one
    pub default_column: Option<u32>,
    /// Language columns in left-to-right order, with distinct tags
    pub languages: Vec<LanguageColumn>,
}

/// Classifies header rows according to the configured labels.
#[derive(Debug, Clone)]
pub struct HeaderClassifier {
    key_label: String,
    default_label: String,
    default_lang: LanguageTag,
    excluded: HashSet<String>,
    style: TagStyle,
}

impl HeaderClassifier {
    /// Create a classifier.
    ///
    /// Labels are compared with trimmed header text, exactly and case-sensitively.
    pub fn new(
        key_label: impl Into<String>,
        default_label: impl Into<String>,
        default_lang: LanguageTag,
        excluded: impl IntoIterator<Item = String>,
        style: TagStyle,
    ) -> Self {
        Self {
            key_label: key_label.into().trim().to_string(),
            default_label: default_label.into().trim().to_string(),
            default_lang,
            excluded: excluded.into_iter().map(|s| s.trim().to_string()).collect(),
            style,
        }
    }

    /// Classify the cells of a header row.
    pub fn classify(&self, header: &Row) -> Result<ColumnPlan> {
        let headers: Vec<(u32, &str)> = header
            .cells()
            .iter()
            .map(|(col, text)| (*col, text.trim()))
            .filter(|(_, text)| !text.is_empty())
            .collect();

        let key_column = headers
            .iter()
            .find(|(_, text)| *text == self.key_label)
            .map(|(col, _)| *col)
            .ok_or_else(|| Error::KeyColumnNotFound {
                label: self.key_label.clone(),
                headers: headers.iter().map(|(_, text)| text.to_string()).collect(),
            })?;

        let default_column = headers
            .iter()
            .find(|(col, text)| *col != key_column && *text == self.default_label)
            .map(|(col, _)| *col);

        if default_column.is_none() {
            warn!(
                label = %self.default_label,
                "default column not found; only detected language columns are used"
            );
        }

        let mut claimed: HashMap<LanguageTag, u32> = HashMap::new();
        let mut languages = Vec::new();

        for &(column, text) in &headers {
            if column == key_column {
                continue;
            }

            let tag = if Some(column) == default_column {
                self.default_lang.clone()
            } else if text == self.key_label
                || text == self.default_label
                || self.excluded.contains(text)
            {
                debug!(column, header = text, "skipping reserved column");
                continue;
            } else {
                match normalize_header(text, self.style) {
                    Some(tag) => tag,
                    None => {
                        debug!(column, header = text, "header names no known language");
                        continue;
                    },
                }
            };

            if let Some(&first) = claimed.get(&tag) {
                warn!(
                    %tag,
                    column,
                    header = text,
                    first_column = first,
                    "duplicate language column ignored"
                );
                continue;
            }

            claimed.insert(tag.clone(), column);
            languages.push(LanguageColumn {
                column,
                tag,
                header: text.to_string(),
            });
        }

        Ok(ColumnPlan {
            key_column,
            default_column,
            languages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> Row {
        let mut row = Row::new(1);
        for (idx, text) in cells.iter().enumerate() {
            if !text.is_empty() {
                row.push(idx as u32 + 1, text.to_string());
            }
        }
        row
    }

    fn classifier(style: TagStyle) -> HeaderClassifier {
        HeaderClassifier::new(
            "key",
            "default",
            LanguageTag::new("en"),
            ["特殊说明".to_string(), "location".to_string()],
            style,
        )
    }

    fn tags(plan: &ColumnPlan) -> Vec<(u32, &str)> {
        plan.languages.iter().map(|l| (l.column, l.tag.as_str())).collect()
    }

    #[test]
    fn test_basic_plan() {
        let plan = classifier(TagStyle::Abbreviated)
            .classify(&header(&["key", "en", "zh_rCN"]))
            .unwrap();

        assert_eq!(plan.key_column, 1);
        assert_eq!(plan.default_column, None);
        assert_eq!(tags(&plan), vec![(2, "en"), (3, "zh-CN")]);
        assert_eq!(plan.languages[1].header, "zh_rCN");
    }

    #[test]
    fn test_key_column_anywhere() {
        let plan = classifier(TagStyle::Abbreviated)
            .classify(&header(&["英语/en", "", " key ", "Japanese"]))
            .unwrap();

        assert_eq!(plan.key_column, 3);
        assert_eq!(tags(&plan), vec![(1, "en"), (4, "ja")]);
    }

    #[test]
    fn test_missing_key_column() {
        let err = classifier(TagStyle::Abbreviated)
            .classify(&header(&["id", "en", "fr"]))
            .unwrap_err();

        match err {
            Error::KeyColumnNotFound { label, headers } => {
                assert_eq!(label, "key");
                assert_eq!(headers, vec!["id", "en", "fr"]);
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_default_column_claims_default_lang() {
        let plan = classifier(TagStyle::Abbreviated)
            .classify(&header(&["key", "default", "zh_rCN", "en"]))
            .unwrap();

        assert_eq!(plan.default_column, Some(2));
        // The later "en" column loses to the default column
        assert_eq!(tags(&plan), vec![(2, "en"), (3, "zh-CN")]);
    }

    #[test]
    fn test_language_column_left_of_default_wins() {
        let plan = classifier(TagStyle::Abbreviated)
            .classify(&header(&["key", "en", "default"]))
            .unwrap();

        assert_eq!(plan.default_column, Some(3));
        assert_eq!(tags(&plan), vec![(2, "en")]);
    }

    #[test]
    fn test_duplicate_tags_first_wins() {
        let plan = classifier(TagStyle::Abbreviated)
            .classify(&header(&["key", "English", "en", "zh-CN", "zh_rCN"]))
            .unwrap();

        assert_eq!(tags(&plan), vec![(2, "en"), (4, "zh-CN")]);
    }

    #[test]
    fn test_preserved_style_distinguishes_spellings() {
        let plan = classifier(TagStyle::Preserved)
            .classify(&header(&["key", "zh-CN", "zh_rCN"]))
            .unwrap();

        assert_eq!(tags(&plan), vec![(2, "zh-CN"), (3, "zh_rCN")]);
    }

    #[test]
    fn test_excluded_and_unknown_columns() {
        let plan = classifier(TagStyle::Abbreviated)
            .classify(&header(&["key", "特殊说明", "location", "comment", "fr", "key"]))
            .unwrap();

        assert_eq!(tags(&plan), vec![(5, "fr")]);
    }
}
