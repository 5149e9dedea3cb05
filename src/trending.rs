// src/trending.rs
//! Most frequent content words across a batch of items.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::types::NewsItem;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w{3,}\b").expect("word regex"));

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was", "one",
    "our", "out", "day", "get", "has", "him", "his", "how", "man", "new", "now", "old", "see",
    "two", "way", "who", "boy", "did", "its", "let", "put", "say", "she", "too", "use",
];

/// Top `limit` words by count; ties keep first-appearance order.
pub fn trending_topics(items: &[NewsItem], limit: usize) -> Vec<String> {
    // word -> (count, first position)
    let mut freq: HashMap<String, (usize, usize)> = HashMap::new();
    let mut pos = 0usize;

    for it in items {
        let text = format!("{} {}", it.title, it.description).to_lowercase();
        for m in WORD_RE.find_iter(&text) {
            let w = m.as_str();
            if STOP_WORDS.contains(&w) {
                continue;
            }
            freq.entry(w.to_string()).or_insert((0, pos)).0 += 1;
            pos += 1;
        }
    }

    let mut words: Vec<(String, usize, usize)> =
        freq.into_iter().map(|(w, (c, first))| (w, c, first)).collect();
    words.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    words.into_iter().take(limit).map(|(w, _, _)| w).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, desc: &str) -> NewsItem {
        NewsItem::new(title, desc, "https://x.test", "CoinDesk")
    }

    #[test]
    fn counts_across_titles_and_descriptions() {
        let items = vec![
            item("Bitcoin ETF inflows", "The bitcoin market rallies"),
            item("ETF approval for Bitcoin", "Market watchers cheer"),
        ];
        let top = trending_topics(&items, 3);
        assert_eq!(top, vec!["bitcoin", "etf", "market"]);
    }

    #[test]
    fn stop_words_and_short_words_are_ignored() {
        let items = vec![item("The new way to BTC is out", "")];
        assert_eq!(trending_topics(&items, 10), vec!["btc"]);
    }

    #[test]
    fn ties_follow_first_appearance() {
        let items = vec![item("solana cardano ripple", "")];
        assert_eq!(
            trending_topics(&items, 2),
            vec!["solana".to_string(), "cardano".to_string()]
        );
    }

    #[test]
    fn empty_batch() {
        assert!(trending_topics(&[], 5).is_empty());
    }
}
