// src/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::category::Category;
use crate::error::PipelineError;

/// A raw news record as produced by the fetch step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    pub source: String, // e.g., "CoinDesk", "CoinTelegraph"
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl NewsItem {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            url: url.into(),
            source: source.into(),
            published_at: None,
        }
    }

    pub fn published(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    /// Title and url must carry something other than whitespace.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.title.trim().is_empty() {
            return Err(PipelineError::invalid("title"));
        }
        if self.url.trim().is_empty() {
            return Err(PipelineError::invalid("url"));
        }
        Ok(())
    }
}

/// A news item after scoring. Built once per unique item and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredNewsItem {
    #[serde(flatten)]
    pub item: NewsItem,
    /// 0.0..=100.0
    pub importance_score: f32,
    /// Never empty; `{General}` when nothing matched.
    pub categories: BTreeSet<Category>,
    pub url_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_score: Option<f32>,
}

impl ScoredNewsItem {
    pub fn primary_category(&self) -> Category {
        crate::category::primary_category(&self.categories)
    }
}
