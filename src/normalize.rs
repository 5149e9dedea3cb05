// src/normalize.rs
//! Text preparation shared by every scoring stage.
//!
//! - `searchable_text`: `lower(title + " " + description)`, the single string all
//!   keyword lookups run against.
//! - `contains_keyword`: plain substring match by default. `MatchMode::WordBoundary`
//!   additionally requires that a keyword edge made of an ASCII word character is not
//!   glued to another one ("eth" no longer matches inside "method").
//! - `clean_field`: tidy a fetched title/description (entities, tags, quotes, spaces).

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Max chars kept from a feed description.
pub const DESCRIPTION_MAX_CHARS: usize = 300;
/// Max chars kept from a feed title.
pub const TITLE_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Substring anywhere in the text.
    #[default]
    Substring,
    /// Substring whose ASCII alphanumeric edges sit on word boundaries.
    WordBoundary,
}

/// Lower-cased `title + " " + description`.
pub fn searchable_text(title: &str, description: &str) -> String {
    let mut out = String::with_capacity(title.len() + description.len() + 1);
    out.push_str(title);
    out.push(' ');
    out.push_str(description);
    out.to_lowercase()
}

/// Both `text` and `keyword` are expected lower-cased (the lexicon lower-cases on load).
pub fn contains_keyword(text: &str, keyword: &str, mode: MatchMode) -> bool {
    if keyword.is_empty() {
        return false;
    }
    match mode {
        MatchMode::Substring => text.contains(keyword),
        MatchMode::WordBoundary => contains_on_boundary(text, keyword),
    }
}

/// True if any keyword of `keywords` matches.
pub fn contains_any<S: AsRef<str>>(text: &str, keywords: &[S], mode: MatchMode) -> bool {
    keywords
        .iter()
        .any(|k| contains_keyword(text, k.as_ref(), mode))
}

fn contains_on_boundary(text: &str, kw: &str) -> bool {
    let first = kw.chars().next();
    let last = kw.chars().last();
    let (Some(first), Some(last)) = (first, last) else {
        return false;
    };

    let mut from = 0usize;
    while let Some(pos) = text[from..].find(kw) {
        let start = from + pos;
        let end = start + kw.len();

        let left_ok = !is_word_char(first)
            || text[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !is_word_char(c));
        let right_ok = !is_word_char(last)
            || text[end..].chars().next().map_or(true, |c| !is_word_char(c));

        if left_ok && right_ok {
            return true;
        }
        // Overlapping occurrences are possible, so step one char, not one keyword.
        from = start + first.len_utf8();
    }
    false
}

// Only ASCII counts: CJK text has no spaces, so kana and kanji never form a boundary.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Normalize a fetched field: decode entities, strip tags, ASCII quotes,
/// collapse whitespace, trim, and cap at `max_chars`.
pub fn clean_field(s: &str, max_chars: usize) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap
    if out.chars().count() > max_chars {
        out = out
            .chars()
            .take(max_chars)
            .collect::<String>()
            .trim_end()
            .to_string();
    }

    out
}

/// Clean title and description of a fetched item with their respective caps.
pub fn clean_item(item: &crate::types::NewsItem) -> crate::types::NewsItem {
    crate::types::NewsItem {
        title: clean_field(&item.title, TITLE_MAX_CHARS),
        description: clean_field(&item.description, DESCRIPTION_MAX_CHARS),
        url: item.url.trim().to_string(),
        source: item.source.trim().to_string(),
        published_at: item.published_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn searchable_text_lowercases_and_joins() {
        assert_eq!(searchable_text("Bitcoin SURGES", "ETF"), "bitcoin surges etf");
        assert_eq!(searchable_text("Title", ""), "title ");
    }

    #[test]
    fn substring_mode_keeps_the_eth_in_method_quirk() {
        assert!(contains_keyword("a new method", "eth", MatchMode::Substring));
        assert!(!contains_keyword("a new method", "eth", MatchMode::WordBoundary));
        assert!(contains_keyword("eth rallies", "eth", MatchMode::WordBoundary));
        assert!(contains_keyword("price of eth.", "eth", MatchMode::WordBoundary));
    }

    #[test]
    fn boundary_mode_matches_inside_japanese_text() {
        assert!(contains_keyword("ビットコインが急騰", "ビットコイン", MatchMode::WordBoundary));
        assert!(contains_keyword("国内取引所で上場", "取引所", MatchMode::WordBoundary));
        // ASCII keyword next to kana still counts as a boundary
        assert!(contains_keyword("btcが急騰", "btc", MatchMode::WordBoundary));
        assert!(!contains_keyword("btcusdが急騰", "btc", MatchMode::WordBoundary));
    }

    #[test]
    fn boundary_mode_handles_symbols_and_phrases() {
        assert!(contains_keyword("btc at $70k", "$", MatchMode::WordBoundary));
        assert!(contains_keyword(
            "new all-time high",
            "all-time high",
            MatchMode::WordBoundary
        ));
        // first occurrence glued, second one free
        assert!(contains_keyword("ethereal eth", "eth", MatchMode::WordBoundary));
    }

    #[test]
    fn empty_keyword_never_matches() {
        assert!(!contains_keyword("anything", "", MatchMode::Substring));
    }

    #[test]
    fn clean_field_strips_markup_and_caps() {
        let s = "  <p>Bitcoin&nbsp;&amp; “ETH”</p>\n\n rally ";
        assert_eq!(clean_field(s, 300), "Bitcoin & \"ETH\" rally");
        let long = "x".repeat(400);
        assert_eq!(clean_field(&long, DESCRIPTION_MAX_CHARS).chars().count(), 300);
    }
}
