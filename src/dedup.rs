// src/dedup.rs
//! URL-hash deduplication within a single run.

use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::types::ScoredNewsItem;

/// Full SHA-256 of the trimmed url, lowercase hex (64 chars).
pub fn url_hash(url: &str) -> String {
    let digest = Sha256::digest(url.trim().as_bytes());
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Keep the first item for each `url_hash`, preserving input order.
pub fn dedup(items: Vec<ScoredNewsItem>) -> Vec<ScoredNewsItem> {
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let mut keep = Vec::with_capacity(items.len());
    for it in items {
        if seen.insert(it.url_hash.clone()) {
            keep.push(it);
        }
    }
    keep
}
