// src/category.rs
//! Topic classification by keyword groups.
//!
//! A category is assigned iff any of its keywords is found in the searchable text.
//! The output is a set; its iteration order is the declaration order of
//! [`Category`], which doubles as the fixed priority used to pick a primary tag.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::lexicon::Lexicon;
use crate::normalize::{contains_any, MatchMode};

/// Topic tags. Declaration order is the primary-category priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Price,
    Regulation,
    Institutional,
    Defi,
    Nft,
    Exchange,
    Partnership,
    Technology,
    Security,
    Macro,
    General,
}

impl Category {
    /// Every tag in priority order.
    pub const PRIORITY: [Category; 11] = [
        Category::Price,
        Category::Regulation,
        Category::Institutional,
        Category::Defi,
        Category::Nft,
        Category::Exchange,
        Category::Partnership,
        Category::Technology,
        Category::Security,
        Category::Macro,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Price => "price",
            Category::Regulation => "regulation",
            Category::Institutional => "institutional",
            Category::Defi => "defi",
            Category::Nft => "nft",
            Category::Exchange => "exchange",
            Category::Partnership => "partnership",
            Category::Technology => "technology",
            Category::Security => "security",
            Category::Macro => "macro",
            Category::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a lower-cased searchable text. Never returns an empty set.
pub fn classify(text: &str, lexicon: &Lexicon, mode: MatchMode) -> BTreeSet<Category> {
    let mut out: BTreeSet<Category> = lexicon
        .categories
        .iter()
        .filter(|rule| contains_any(text, &rule.keywords, mode))
        .map(|rule| rule.category)
        .collect();

    if out.is_empty() {
        out.insert(Category::General);
    }
    out
}

/// First tag by [`Category::PRIORITY`]; `General` for an empty set.
pub fn primary_category(categories: &BTreeSet<Category>) -> Category {
    categories.iter().next().copied().unwrap_or(Category::General)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex() -> Lexicon {
        Lexicon::default_seed()
    }

    fn tags(text: &str) -> Vec<Category> {
        classify(&text.to_lowercase(), &lex(), MatchMode::Substring)
            .into_iter()
            .collect()
    }

    #[test]
    fn unmatched_text_is_general() {
        assert_eq!(tags("quiet day"), vec![Category::General]);
        assert_eq!(tags(""), vec![Category::General]);
    }

    #[test]
    fn multiple_tags_come_back_in_priority_order() {
        let got = tags("Exchange hack: hackers drain staking protocol");
        assert_eq!(
            got,
            vec![
                Category::Defi,
                Category::Exchange,
                Category::Security
            ]
        );
    }

    #[test]
    fn primary_follows_fixed_priority_not_insertion() {
        let mut set = BTreeSet::new();
        set.insert(Category::Security);
        set.insert(Category::Regulation);
        set.insert(Category::Macro);
        assert_eq!(primary_category(&set), Category::Regulation);
        assert_eq!(primary_category(&BTreeSet::new()), Category::General);

        let all: BTreeSet<Category> = Category::PRIORITY.into_iter().collect();
        assert_eq!(all.into_iter().collect::<Vec<_>>(), Category::PRIORITY.to_vec());
    }

    #[test]
    fn serializes_lowercase() {
        let s = serde_json::to_string(&Category::Defi).unwrap();
        assert_eq!(s, "\"defi\"");
        assert_eq!(Category::Nft.to_string(), "nft");
    }
}
