// src/config.rs
//! Pipeline configuration (TOML) with env overrides.
//!
//! ```toml
//! [pipeline]
//! strategy = "keyword_additive"   # | "source_weighted"
//! match_mode = "substring"        # | "word_boundary"
//! limit = 10
//! max_age_hours = 24              # omit to disable the recency window
//! estimate_interest = true
//! clean_fields = false            # decode/strip HTML in title and description
//!
//! [ranking]
//! key = "blended"                 # | "importance"
//! importance_weight = 0.6
//! interest_weight = 0.4
//!
//! [paths]
//! lexicon = "config/lexicon.toml"
//! source_weights = "config/source_weights.json"
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::normalize::MatchMode;
use crate::rank::RankKey;
use crate::scoring::ScoringStrategy;
use crate::source_weights::{DEFAULT_SOURCE_WEIGHTS_PATH, ENV_SOURCE_WEIGHTS_PATH};

// --- env defaults & names ---
pub const DEFAULT_PIPELINE_CONFIG_PATH: &str = "config/pipeline.toml";
pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 500;

pub const ENV_PIPELINE_CONFIG_PATH: &str = "PIPELINE_CONFIG_PATH";
pub const ENV_PIPELINE_LIMIT: &str = "PIPELINE_LIMIT";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PipelineConfig {
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub ranking: RankKey,
    #[serde(default)]
    pub paths: PathsCfg,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PipelineSettings {
    #[serde(default)]
    pub strategy: ScoringStrategy,
    #[serde(default)]
    pub match_mode: MatchMode,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub max_age_hours: Option<u32>,
    #[serde(default = "default_true")]
    pub estimate_interest: bool,
    #[serde(default)]
    pub clean_fields: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            strategy: ScoringStrategy::default(),
            match_mode: MatchMode::default(),
            limit: DEFAULT_LIMIT,
            max_age_hours: None,
            estimate_interest: true,
            clean_fields: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PathsCfg {
    #[serde(default)]
    pub lexicon: Option<PathBuf>,
    #[serde(default)]
    pub source_weights: Option<PathBuf>,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_true() -> bool {
    true
}

// parse optional limit env and clamp to <1..=MAX_LIMIT>
fn parse_limit_env(raw: Option<String>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .map(|v| v.clamp(1, MAX_LIMIT))
}

impl PipelineConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let mut cfg: PipelineConfig = toml::from_str(toml_str)?;
        cfg.pipeline.limit = cfg.pipeline.limit.clamp(1, MAX_LIMIT);
        Ok(cfg)
    }

    /// Load from $PIPELINE_CONFIG_PATH or "config/pipeline.toml"; a missing file
    /// yields defaults. Env overrides are applied last.
    pub fn from_env() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_PIPELINE_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PIPELINE_CONFIG_PATH));

        let mut cfg = if path.exists() {
            Self::from_path(&path)?
        } else {
            Self::default()
        };

        if let Some(limit) = parse_limit_env(std::env::var(ENV_PIPELINE_LIMIT).ok()) {
            cfg.pipeline.limit = limit;
        }
        if let Ok(p) = std::env::var(ENV_SOURCE_WEIGHTS_PATH) {
            cfg.paths.source_weights = Some(PathBuf::from(p));
        }
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing pipeline config at {}", path.display()))
    }

    pub fn source_weights_path(&self) -> PathBuf {
        self.paths
            .source_weights
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_WEIGHTS_PATH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, PipelineConfig::default());
        assert_eq!(cfg.pipeline.limit, DEFAULT_LIMIT);
        assert!(cfg.pipeline.estimate_interest);
        assert_eq!(cfg.ranking, RankKey::Importance);
    }

    #[test]
    fn full_toml_parses() {
        let cfg = PipelineConfig::from_toml_str(
            r#"
[pipeline]
strategy = "source_weighted"
match_mode = "word_boundary"
limit = 5000
max_age_hours = 24
estimate_interest = false
clean_fields = true

[ranking]
key = "blended"
importance_weight = 0.7

[paths]
lexicon = "config/lexicon.toml"
"#,
        )
        .unwrap();
        assert_eq!(cfg.pipeline.strategy, ScoringStrategy::SourceWeighted);
        assert_eq!(cfg.pipeline.match_mode, MatchMode::WordBoundary);
        assert_eq!(cfg.pipeline.limit, MAX_LIMIT);
        assert_eq!(cfg.pipeline.max_age_hours, Some(24));
        assert!(!cfg.pipeline.estimate_interest);
        assert!(cfg.pipeline.clean_fields);
        assert_eq!(
            cfg.ranking,
            RankKey::Blended {
                importance_weight: 0.7,
                interest_weight: 0.4
            }
        );
        assert_eq!(cfg.paths.lexicon, Some(PathBuf::from("config/lexicon.toml")));
        assert_eq!(
            cfg.source_weights_path(),
            PathBuf::from(DEFAULT_SOURCE_WEIGHTS_PATH)
        );
    }

    #[test]
    fn limit_env_is_clamped() {
        assert_eq!(parse_limit_env(Some(" 0 ".into())), Some(1));
        assert_eq!(parse_limit_env(Some("9999".into())), Some(MAX_LIMIT));
        assert_eq!(parse_limit_env(Some("abc".into())), None);
        assert_eq!(parse_limit_env(None), None);
    }
}
