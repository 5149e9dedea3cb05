//! Importance scoring.
//!
//! `KeywordAdditive` (default):
//!   base 30 + points of every matching keyword in every scoring group
//!   + 10 when at least three distinct groups matched
//!   + 5 when the title alone carries a priority keyword,
//!   clamped to [0, 100].
//!
//! `SourceWeighted`: the same raw sum multiplied by the feed's source weight,
//! halved once when a promotional marker is present, then clamped.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::lexicon::Lexicon;
use crate::normalize::{contains_any, contains_keyword, searchable_text, MatchMode};
use crate::source_weights::SourceWeights;

pub const BASE_SCORE: f32 = 30.0;
pub const MULTI_GROUP_BONUS: f32 = 10.0;
pub const MULTI_GROUP_MIN: usize = 3;
pub const TITLE_BONUS: f32 = 5.0;
pub const PROMOTIONAL_FACTOR: f32 = 0.5;
pub const MAX_SCORE: f32 = 100.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    #[default]
    KeywordAdditive,
    SourceWeighted,
}

/// Score plus the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Importance {
    /// Clamped to [0, 100].
    pub score: f32,
    /// `"<group>:<keyword>"` for every match.
    pub matched: Vec<String>,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ImportanceScorer {
    lexicon: Arc<Lexicon>,
    source_weights: Arc<SourceWeights>,
    strategy: ScoringStrategy,
    mode: MatchMode,
}

impl ImportanceScorer {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            lexicon,
            source_weights: Arc::new(SourceWeights::default_seed()),
            strategy: ScoringStrategy::default(),
            mode: MatchMode::default(),
        }
    }

    pub fn strategy(mut self, strategy: ScoringStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn source_weights(mut self, weights: Arc<SourceWeights>) -> Self {
        self.source_weights = weights;
        self
    }

    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn current_strategy(&self) -> ScoringStrategy {
        self.strategy
    }

    pub fn weights(&self) -> &Arc<SourceWeights> {
        &self.source_weights
    }

    /// Pure function of its inputs; `source` only matters for `SourceWeighted`.
    pub fn score(&self, title: &str, description: &str, source: &str) -> f32 {
        self.evaluate(title, description, source).score
    }

    pub fn evaluate(&self, title: &str, description: &str, source: &str) -> Importance {
        let text = searchable_text(title, description);
        let mut matched = Vec::new();
        let mut reasons = Vec::new();

        let mut raw = BASE_SCORE;
        let mut groups_hit = 0usize;

        for group in &self.lexicon.scoring {
            let mut hit = false;
            for (keyword, points) in &group.keywords {
                if contains_keyword(&text, keyword, self.mode) {
                    raw += points;
                    matched.push(format!("{}:{}", group.name, keyword));
                    hit = true;
                }
            }
            if hit {
                groups_hit += 1;
            }
        }

        if groups_hit >= MULTI_GROUP_MIN {
            raw += MULTI_GROUP_BONUS;
            reasons.push(format!("multi_group_bonus:{groups_hit}"));
        }

        let title_lower = title.to_lowercase();
        if contains_any(&title_lower, &self.lexicon.title_priority, self.mode) {
            raw += TITLE_BONUS;
            reasons.push("title_bonus".to_string());
        }

        if self.strategy == ScoringStrategy::SourceWeighted {
            let w = self.source_weights.weight_for(source);
            raw *= w;
            reasons.push(format!("source_weight:{w:.2}"));

            if contains_any(&text, &self.lexicon.promotional, self.mode) {
                raw *= PROMOTIONAL_FACTOR;
                reasons.push("promotional_penalty".to_string());
            }
        }

        if raw > MAX_SCORE {
            reasons.push("clamped".to_string());
        }

        Importance {
            score: raw.clamp(0.0, MAX_SCORE),
            matched,
            reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> ImportanceScorer {
        ImportanceScorer::new(Arc::new(Lexicon::default_seed()))
    }

    #[test]
    fn empty_input_is_base_score() {
        let s = scorer();
        assert_eq!(s.score("", "", ""), BASE_SCORE);
    }

    #[test]
    fn additive_sum_with_title_bonus() {
        // bitcoin 15 + price 12, two groups only, title bonus 5
        let imp = scorer().evaluate("Bitcoin price update", "", "CoinDesk");
        assert_eq!(imp.score, 62.0);
        assert!(imp.matched.contains(&"assets:bitcoin".to_string()));
        assert!(imp.matched.contains(&"price_action:price".to_string()));
        assert_eq!(imp.reasons, vec!["title_bonus".to_string()]);
    }

    #[test]
    fn ath_etf_headline_clamps_to_max() {
        let imp = scorer().evaluate(
            "Bitcoin hits new all-time high as ETF inflows surge",
            "",
            "CoinDesk",
        );
        assert_eq!(imp.score, MAX_SCORE);
        assert!(imp.reasons.iter().any(|r| r.starts_with("multi_group_bonus")));
        assert!(imp.reasons.iter().any(|r| r == "clamped"));
    }

    #[test]
    fn description_keywords_do_not_grant_title_bonus() {
        let s = scorer();
        let in_title = s.score("Bitcoin steady", "", "");
        let in_desc = s.score("Steady", "bitcoin", "");
        assert_eq!(in_title - in_desc, TITLE_BONUS);
    }

    #[test]
    fn source_weighted_multiplies_raw_score() {
        let s = scorer().strategy(ScoringStrategy::SourceWeighted);
        let imp = s.evaluate("Bitcoin price update", "", "CoinDesk");
        assert!((imp.score - 62.0 * 1.2).abs() < 1e-4, "{imp:?}");

        let additive = scorer().score("Bitcoin price update", "", "CoinDesk");
        assert_eq!(additive, 62.0, "source ignored by the additive strategy");
    }

    #[test]
    fn promotional_marker_halves_weighted_score() {
        let s = scorer().strategy(ScoringStrategy::SourceWeighted);
        let imp = s.evaluate("Sponsored: Bitcoin price update", "", "Unknown Feed");
        assert!((imp.score - 31.0).abs() < 1e-4, "{imp:?}");
        assert!(imp.reasons.iter().any(|r| r == "promotional_penalty"));
    }

    #[test]
    fn word_boundary_mode_drops_embedded_matches() {
        let sub = scorer().score("Steady", "new method", "");
        let wb = scorer()
            .match_mode(MatchMode::WordBoundary)
            .score("Steady", "new method", "");
        assert_eq!(sub, BASE_SCORE + 12.0); // "eth" inside "method"
        assert_eq!(wb, BASE_SCORE);
    }
}
