// src/lib.rs
// Public library surface for the service binary and integration tests.

pub mod api;
pub mod candidate;
pub mod category;
pub mod config;
pub mod dedup;
pub mod error;
pub mod interest;
pub mod lexicon;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod rank;
pub mod relevance;
pub mod scoring;
pub mod source_weights;
pub mod trending;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::category::Category;
pub use crate::error::PipelineError;
pub use crate::lexicon::Lexicon;
pub use crate::pipeline::{Pipeline, PipelineHandle};
pub use crate::rank::RankKey;
pub use crate::scoring::{ImportanceScorer, ScoringStrategy};
pub use crate::types::{NewsItem, ScoredNewsItem};

use shuttle_axum::axum::Router;

/// Full service router (API + `/metrics`) and the shared pipeline handle.
pub fn build_app(cfg: &config::PipelineConfig) -> anyhow::Result<(Router, PipelineHandle)> {
    let handle = PipelineHandle::new(Pipeline::from_config(cfg)?);
    let metrics = crate::metrics::Metrics::init(&cfg.pipeline)?;
    let router = api::router(api::AppState::new(handle.clone())).merge(metrics.router());
    Ok((router, handle))
}
