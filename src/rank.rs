// src/rank.rs
//! Ranking: stable descending sort by a caller-supplied key, then top-N.
//!
//! Keys are computed once per item. NaN keys sort last. Equal keys keep their
//! input order (`sort_by` is stable).

use serde::{Deserialize, Serialize};

use crate::types::ScoredNewsItem;

pub const DEFAULT_IMPORTANCE_WEIGHT: f32 = 0.6;
pub const DEFAULT_INTEREST_WEIGHT: f32 = 0.4;

pub fn rank<T, F>(items: Vec<T>, key_fn: F, limit: usize) -> Vec<T>
where
    F: Fn(&T) -> f32,
{
    let mut keyed: Vec<(f32, T)> = items
        .into_iter()
        .map(|it| {
            let k = key_fn(&it);
            (if k.is_nan() { f32::NEG_INFINITY } else { k }, it)
        })
        .collect();

    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
    keyed.into_iter().take(limit).map(|(_, it)| it).collect()
}

/// Composite keys used by the pipeline and the candidate view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", rename_all = "snake_case")]
pub enum RankKey {
    /// Raw importance score.
    #[default]
    Importance,
    /// `importance_weight * importance + interest_weight * interest`.
    /// Items without an interest score use their importance in its place.
    Blended {
        #[serde(default = "default_importance_weight")]
        importance_weight: f32,
        #[serde(default = "default_interest_weight")]
        interest_weight: f32,
    },
}

fn default_importance_weight() -> f32 {
    DEFAULT_IMPORTANCE_WEIGHT
}

fn default_interest_weight() -> f32 {
    DEFAULT_INTEREST_WEIGHT
}

impl RankKey {
    pub fn blended_default() -> Self {
        RankKey::Blended {
            importance_weight: DEFAULT_IMPORTANCE_WEIGHT,
            interest_weight: DEFAULT_INTEREST_WEIGHT,
        }
    }

    pub fn key(&self, item: &ScoredNewsItem) -> f32 {
        match *self {
            RankKey::Importance => item.importance_score,
            RankKey::Blended {
                importance_weight,
                interest_weight,
            } => {
                let interest = item.interest_score.unwrap_or(item.importance_score);
                importance_weight * item.importance_score + interest_weight * interest
            }
        }
    }

    pub fn needs_interest(&self) -> bool {
        matches!(self, RankKey::Blended { .. })
    }
}

/// Rank scored items by `key`, keeping at most `limit`.
pub fn rank_scored(
    items: Vec<ScoredNewsItem>,
    key: RankKey,
    limit: usize,
) -> Vec<ScoredNewsItem> {
    rank(items, |it| key.key(it), limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descending_and_truncated() {
        let out = rank(vec![3, 9, 1, 7], |x| *x as f32, 2);
        assert_eq!(out, vec![9, 7]);
    }

    #[test]
    fn ties_keep_input_order() {
        let items = vec![("a", 5.0), ("b", 7.0), ("c", 5.0), ("d", 5.0)];
        let out = rank(items, |(_, k)| *k, 10);
        let names: Vec<_> = out.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn nan_keys_sink() {
        let out = rank(vec![f32::NAN, 1.0, 2.0], |x| *x, 3);
        assert_eq!(out[0], 2.0);
        assert_eq!(out[1], 1.0);
        assert!(out[2].is_nan());
    }

    #[test]
    fn zero_limit_is_empty() {
        assert!(rank(vec![1, 2], |x| *x as f32, 0).is_empty());
    }
}
