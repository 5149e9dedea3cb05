// src/relevance.rs
//! Relevance gate: is an item crypto-related at all.
//!
//! Also home of the anonymized dev logging helpers shared by the pipeline stages.

use sha2::{Digest, Sha256};
use tracing::info;

use crate::lexicon::Lexicon;
use crate::normalize::{contains_keyword, MatchMode};

// Dev logging gate: RANKER_DEV_LOG=1 AND dev env (debug or SHUTTLE_ENV in {local,development,dev})
pub(crate) fn dev_logging_enabled() -> bool {
    let on = std::env::var("RANKER_DEV_LOG").ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    is_dev_env()
}

pub fn is_dev_env() -> bool {
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// Short stable id for log lines (first 6 bytes of SHA-256, hex).
pub(crate) fn anon_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

pub(crate) fn truncate_vec<T: ToString>(v: &[T], max: usize) -> Vec<String> {
    v.iter().take(max).map(|x| x.to_string()).collect()
}

/// Minimal, anonymized dev logger for per-item events. Never logs raw text.
pub(crate) fn dev_log_item(event: &str, text: &str, score: f32, matched: &[String]) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(text);
    let matched_short = truncate_vec(matched, 5);
    info!(target: "relevance", %id, %score, event, matched = ?matched_short);
}

/// First relevance keyword found in `text`, if any.
pub fn first_relevance_hit<'a>(text: &str, lexicon: &'a Lexicon, mode: MatchMode) -> Option<&'a str> {
    lexicon
        .relevance_keywords()
        .find(|k| contains_keyword(text, k, mode))
}

/// `text` is the lower-cased title + description. Empty text is never relevant.
pub fn is_relevant(text: &str, lexicon: &Lexicon, mode: MatchMode) -> bool {
    first_relevance_hit(text, lexicon, mode).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::searchable_text;

    fn rel(title: &str, desc: &str) -> bool {
        is_relevant(
            &searchable_text(title, desc),
            &Lexicon::default_seed(),
            MatchMode::Substring,
        )
    }

    #[test]
    fn crypto_headlines_pass() {
        assert!(rel("Bitcoin climbs", ""));
        assert!(rel("Markets", "Altcoin season is back"));
        assert!(rel("ビットコインが急騰", ""));
    }

    #[test]
    fn unrelated_and_empty_text_fail() {
        assert!(!rel("Local bakery wins award", "Bread and pastries"));
        assert!(!rel("", ""));
    }

    #[test]
    fn substring_quirk_is_default() {
        // "eth" inside "method" counts unless word-boundary mode is chosen.
        let lex = Lexicon::default_seed();
        let text = searchable_text("A new method for baking", "");
        assert!(is_relevant(&text, &lex, MatchMode::Substring));
        assert!(!is_relevant(&text, &lex, MatchMode::WordBoundary));
    }

    #[test]
    fn word_boundary_mode_still_sees_japanese_keywords() {
        let lex = Lexicon::default_seed();
        let text = searchable_text("ビットコインが急騰", "");
        assert!(is_relevant(&text, &lex, MatchMode::WordBoundary));
    }

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("bitcoin");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("bitcoin"));
        assert_ne!(a, anon_hash("ethereum"));
    }
}
