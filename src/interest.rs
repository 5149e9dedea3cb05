// src/interest.rs
//! Reader-interest estimate used only for candidate presentation.
//!
//! Starts from the importance score and applies each title rule at most once
//! (audience affinity bonuses, a penalty for overly technical titles), then a
//! small penalty for long titles. Clamped on both ends.

use crate::lexicon::InterestRules;
use crate::normalize::{contains_any, MatchMode};

pub fn estimate_interest(
    title: &str,
    importance_score: f32,
    rules: &InterestRules,
    mode: MatchMode,
) -> f32 {
    let t = title.to_lowercase();
    let mut score = importance_score;

    for rule in &rules.rules {
        if contains_any(&t, &rule.keywords, mode) {
            score += rule.delta;
        }
    }

    if t.split_whitespace().count() > rules.long_title_tokens {
        score += rules.long_title_penalty;
    }

    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn est(title: &str, importance: f32) -> f32 {
        estimate_interest(
            title,
            importance,
            &InterestRules::default_seed(),
            MatchMode::Substring,
        )
    }

    #[test]
    fn regional_and_asset_bonuses_stack() {
        // bitcoin +15, japan +20, etf +12
        assert_eq!(est("Bitcoin ETF approved in Japan", 50.0), 97.0);
    }

    #[test]
    fn clamps_both_ends() {
        assert_eq!(est("Bitcoin surge in Asia", 90.0), 100.0);
        assert_eq!(est("Consensus node deep dive", 2.0), 0.0);
    }

    #[test]
    fn long_title_penalty() {
        let title = "one two three four five six seven nine ten also more words here today now please";
        assert_eq!(title.split_whitespace().count(), 16);
        assert_eq!(est(title, 40.0), 37.0);
        // exactly 15 tokens is not "long"
        let fifteen = "one two three four five six seven nine ten also more words here today now";
        assert_eq!(est(fifteen, 40.0), 40.0);
    }

    #[test]
    fn each_rule_applies_once() {
        // "bitcoin" and "btc" belong to one rule: +15 once
        assert_eq!(est("Bitcoin BTC", 10.0), 25.0);
    }
}
