//! # Source Weights
//!
//! Per-feed multipliers applied by the source-weighted scoring strategy
//! (e.g. "CoinDesk" → 1.2, "CoinBureau" → 0.9).
//!
//! - Loads from JSON config (weights + aliases).
//! - Case-insensitive lookup with normalization of punctuation, dashes, etc.
//! - Aliases map alternative spellings/domains to canonical feeds.
//! - Fallback order: aliases → exact match → substring match → default.
//! - Weights are clamped to `[0.0, MAX_SOURCE_WEIGHT]`.

use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path};
use tracing::warn;

pub const DEFAULT_SOURCE_WEIGHTS_PATH: &str = "config/source_weights.json";
pub const ENV_SOURCE_WEIGHTS_PATH: &str = "SOURCE_WEIGHTS_PATH";
pub const MAX_SOURCE_WEIGHT: f32 = 2.0;

/// Configuration for source weights, loaded from JSON or defaults.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SourceWeights {
    /// Multiplier if no match is found.
    #[serde(default = "default_default_weight")]
    pub default_weight: f32,
    /// Explicit multipliers for canonical feed names.
    #[serde(default)]
    pub weights: BTreeMap<String, f32>,
    /// Aliases mapping non-canonical names → canonical names.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

fn default_default_weight() -> f32 {
    1.0
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl SourceWeights {
    /// Load configuration from a JSON file.
    /// Falls back to `default_seed()` on error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(s) => match serde_json::from_str::<SourceWeights>(&s) {
                Ok(cfg) => cfg.normalized(),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid source weights, using seed");
                    Self::default_seed()
                }
            },
            Err(_) => Self::default_seed(),
        }
    }

    /// Keys are stored normalized so lookups can compare directly.
    fn normalized(self) -> Self {
        Self {
            default_weight: self.default_weight,
            weights: self
                .weights
                .into_iter()
                .map(|(k, v)| (normalize(&k), v))
                .collect(),
            aliases: self
                .aliases
                .into_iter()
                .map(|(a, c)| (normalize(&a), normalize(&c)))
                .collect(),
        }
    }

    /// Get the multiplier for a given source name.
    ///
    /// Steps:
    /// 1. Alias lookup (normalized) → canonical → weight.
    /// 2. Exact weight match.
    /// 3. Substring fallback (e.g. "CoinDesk Markets" → "coindesk").
    /// 4. Default weight.
    pub fn weight_for(&self, source: &str) -> f32 {
        let s = normalize(source);

        // 1) Alias resolution.
        if let Some(canon) = self.aliases.get(&s) {
            if let Some(&w) = self.weights.get(canon) {
                return clamp_weight(w);
            }
        }

        // 2) Exact weight match.
        if let Some(&w) = self.weights.get(&s) {
            return clamp_weight(w);
        }

        // 3) Substring fallback; longest key wins so results don't depend on map order.
        if let Some((_, &w)) = self
            .weights
            .iter()
            .filter(|(k, _)| !k.is_empty() && s.contains(k.as_str()))
            .max_by_key(|(k, _)| k.len())
        {
            return clamp_weight(w);
        }

        // 4) Default.
        clamp_weight(self.default_weight)
    }

    /// Built-in seed with the main crypto news feeds.
    pub fn default_seed() -> Self {
        let mut weights = BTreeMap::new();
        let mut aliases = BTreeMap::new();

        for (k, v) in [
            ("coindesk", 1.2),
            ("cointelegraph", 1.1),
            ("decrypt", 1.0),
            ("coinbureau", 0.9),
        ] {
            weights.insert(k.to_string(), v);
        }

        for (a, c) in [
            ("coindesk com", "coindesk"),
            ("coin desk", "coindesk"),
            ("cointelegraph com", "cointelegraph"),
            ("coin telegraph", "cointelegraph"),
            ("decrypt co", "decrypt"),
            ("coin bureau", "coinbureau"),
        ] {
            aliases.insert(a.to_string(), c.to_string());
        }

        Self {
            default_weight: default_default_weight(),
            weights,
            aliases,
        }
    }
}

/// Normalize input string: lowercase, replace punctuation/dashes with spaces,
/// collapse multiple spaces into one.
fn normalize(s: &str) -> String {
    let mut out = s.trim().to_lowercase();

    // Replace common separators with spaces.
    out = out.replace(['—', '–', '-', '_', '/', '\\'], " ");

    // Replace disruptive punctuation/whitespace with spaces.
    out = out.replace(['\n', '\r', '\t', '.', ',', '’', '\''], " ");

    // Collapse multiple spaces.
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn clamp_weight(x: f32) -> f32 {
    if x.is_nan() {
        return default_default_weight();
    }
    x.clamp(0.0, MAX_SOURCE_WEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SourceWeights {
        SourceWeights::default_seed()
    }

    #[test]
    fn exact_match_case_insensitive() {
        let c = cfg();
        assert!((c.weight_for("CoinDesk") - 1.2).abs() < 1e-6);
        assert!((c.weight_for("COINTELEGRAPH") - 1.1).abs() < 1e-6);
    }

    #[test]
    fn alias_match_with_punctuation() {
        let c = cfg();
        assert!((c.weight_for("coindesk.com") - 1.2).abs() < 1e-6);
        assert!((c.weight_for("Coin-Bureau") - 0.9).abs() < 1e-6);
    }

    #[test]
    fn substring_match() {
        let c = cfg();
        assert!((c.weight_for("CoinDesk Markets Daily") - 1.2).abs() < 1e-6);
    }

    #[test]
    fn default_weight_used() {
        let c = cfg();
        assert!((c.weight_for("TheBlock") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn json_keys_are_normalized_and_clamped() {
        let json = r#"{
            "default_weight": 0.8,
            "weights": { "The Block": 5.0, "U.Today": 0.7 },
            "aliases": { "theblock.co": "the block" }
        }"#;
        let c: SourceWeights = serde_json::from_str(json).unwrap();
        let c = c.normalized();
        assert!((c.weight_for("theblock.co") - MAX_SOURCE_WEIGHT).abs() < 1e-6);
        assert!((c.weight_for("u today") - 0.7).abs() < 1e-6);
        assert!((c.weight_for("unknown") - 0.8).abs() < 1e-6);
    }

    #[test]
    fn missing_file_falls_back_to_seed() {
        let c = SourceWeights::load_from_file("__missing_source_weights__.json");
        assert_eq!(c, SourceWeights::default_seed());
    }
}
