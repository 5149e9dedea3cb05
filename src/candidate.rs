// src/candidate.rs
//! Candidate view: which scored items are worth writing up.

use serde::Serialize;

use crate::category::Category;
use crate::interest::estimate_interest;
use crate::lexicon::InterestRules;
use crate::normalize::MatchMode;
use crate::rank::{rank, DEFAULT_IMPORTANCE_WEIGHT, DEFAULT_INTEREST_WEIGHT};
use crate::types::ScoredNewsItem;

pub const HIGH_PRIORITY_MIN: f32 = 70.0;
pub const MEDIUM_PRIORITY_MIN: f32 = 50.0;
pub const LOW_PRIORITY_MIN: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
    Minimal,
}

impl Priority {
    pub fn of(importance: f32) -> Self {
        if importance >= HIGH_PRIORITY_MIN {
            Priority::High
        } else if importance >= MEDIUM_PRIORITY_MIN {
            Priority::Medium
        } else if importance >= LOW_PRIORITY_MIN {
            Priority::Low
        } else {
            Priority::Minimal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Strong,
    Recommended,
    Consider,
    Niche,
}

impl Recommendation {
    /// `total` is the mean of importance and interest.
    pub fn of(total: f32) -> Self {
        if total >= 70.0 {
            Recommendation::Strong
        } else if total >= 50.0 {
            Recommendation::Recommended
        } else if total >= 30.0 {
            Recommendation::Consider
        } else {
            Recommendation::Niche
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// 1-based.
    pub rank: usize,
    pub item: ScoredNewsItem,
    pub interest: f32,
    /// 0.6 * importance + 0.4 * interest
    pub composite: f32,
    /// (importance + interest) / 2
    pub total: f32,
    pub priority: Priority,
    pub recommendation: Recommendation,
    pub primary_category: Category,
}

/// Rank by the composite of importance and interest and keep the top `limit`.
/// Items without an interest score get one estimated from their title.
pub fn select_candidates(
    items: Vec<ScoredNewsItem>,
    rules: &InterestRules,
    mode: MatchMode,
    limit: usize,
) -> Vec<Candidate> {
    let with_interest: Vec<(f32, ScoredNewsItem)> = items
        .into_iter()
        .map(|it| {
            let interest = it.interest_score.unwrap_or_else(|| {
                estimate_interest(&it.item.title, it.importance_score, rules, mode)
            });
            (interest, it)
        })
        .collect();

    let composite = |importance: f32, interest: f32| {
        DEFAULT_IMPORTANCE_WEIGHT * importance + DEFAULT_INTEREST_WEIGHT * interest
    };

    rank(
        with_interest,
        |(interest, it)| composite(it.importance_score, *interest),
        limit,
    )
    .into_iter()
    .enumerate()
    .map(|(i, (interest, item))| {
        let total = (item.importance_score + interest) / 2.0;
        Candidate {
            rank: i + 1,
            interest,
            composite: composite(item.importance_score, interest),
            total,
            priority: Priority::of(item.importance_score),
            recommendation: Recommendation::of(total),
            primary_category: item.primary_category(),
            item,
        }
    })
    .collect()
}

/// High (>= 70) and medium (50..70) tiers; everything else is left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriorityTiers {
    pub high: Vec<ScoredNewsItem>,
    pub medium: Vec<ScoredNewsItem>,
}

pub fn partition_by_priority(items: &[ScoredNewsItem]) -> PriorityTiers {
    let mut tiers = PriorityTiers::default();
    for it in items {
        match Priority::of(it.importance_score) {
            Priority::High => tiers.high.push(it.clone()),
            Priority::Medium => tiers.medium.push(it.clone()),
            Priority::Low | Priority::Minimal => {}
        }
    }
    tiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::url_hash;
    use crate::types::NewsItem;

    fn scored(title: &str, importance: f32, interest: Option<f32>) -> ScoredNewsItem {
        let url = format!("https://x.test/{}", title.replace(' ', "-"));
        ScoredNewsItem {
            url_hash: url_hash(&url),
            item: NewsItem::new(title, "", url, "CoinDesk"),
            importance_score: importance,
            categories: [Category::Price, Category::Macro].into_iter().collect(),
            interest_score: interest,
        }
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(Priority::of(70.0), Priority::High);
        assert_eq!(Priority::of(69.9), Priority::Medium);
        assert_eq!(Priority::of(50.0), Priority::Medium);
        assert_eq!(Priority::of(30.0), Priority::Low);
        assert_eq!(Priority::of(29.9), Priority::Minimal);

        assert_eq!(Recommendation::of(70.0), Recommendation::Strong);
        assert_eq!(Recommendation::of(50.0), Recommendation::Recommended);
        assert_eq!(Recommendation::of(30.0), Recommendation::Consider);
        assert_eq!(Recommendation::of(0.0), Recommendation::Niche);
    }

    #[test]
    fn composite_orders_candidates() {
        let items = vec![
            scored("alpha", 80.0, Some(20.0)), // 56
            scored("beta", 60.0, Some(90.0)),  // 72
            scored("gamma", 40.0, Some(40.0)), // 40
        ];
        let out = select_candidates(
            items,
            &InterestRules::default_seed(),
            MatchMode::Substring,
            2,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].item.item.title, "beta");
        assert_eq!(out[0].rank, 1);
        assert!((out[0].composite - 72.0).abs() < 1e-4);
        assert_eq!(out[0].total, 75.0);
        assert_eq!(out[0].recommendation, Recommendation::Strong);
        assert_eq!(out[0].priority, Priority::Medium);
        assert_eq!(out[0].primary_category, Category::Price);
        assert_eq!(out[1].item.item.title, "alpha");
        assert_eq!(out[1].rank, 2);
    }

    #[test]
    fn missing_interest_is_estimated() {
        let out = select_candidates(
            vec![scored("Bitcoin in Japan", 50.0, None)],
            &InterestRules::default_seed(),
            MatchMode::Substring,
            5,
        );
        // 50 + bitcoin 15 + japan 20
        assert_eq!(out[0].interest, 85.0);
    }

    #[test]
    fn partition_keeps_only_high_and_medium() {
        let items = vec![
            scored("a", 95.0, None),
            scored("b", 55.0, None),
            scored("c", 70.0, None),
            scored("d", 31.0, None),
        ];
        let tiers = partition_by_priority(&items);
        let high: Vec<_> = tiers.high.iter().map(|s| s.item.title.as_str()).collect();
        let medium: Vec<_> = tiers.medium.iter().map(|s| s.item.title.as_str()).collect();
        assert_eq!(high, vec!["a", "c"]);
        assert_eq!(medium, vec!["b"]);
    }
}
