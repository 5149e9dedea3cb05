use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use shuttle_axum::axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::config::{PipelineConfig, MAX_LIMIT};
use crate::error::PipelineError;
use crate::pipeline::{CandidateReport, Pipeline, PipelineHandle};
use crate::trending::trending_topics;
use crate::types::{NewsItem, ScoredNewsItem};

pub const DEFAULT_TRENDING_LIMIT: usize = 5;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: PipelineHandle,
}

impl AppState {
    pub fn new(pipeline: PipelineHandle) -> Self {
        Self { pipeline }
    }

    /// Pipeline built from `PIPELINE_CONFIG_PATH` (or defaults) and the env overrides.
    pub fn from_env() -> anyhow::Result<Self> {
        let cfg = PipelineConfig::from_env()?;
        Ok(Self::new(PipelineHandle::new(Pipeline::from_config(&cfg)?)))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/score", post(score))
        .route("/rank", post(rank))
        .route("/candidates", post(candidates))
        .route("/trending", post(trending))
        .route("/debug/source-weight", get(debug_source_weight))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// `PipelineError` as a 400 with `{"error": "..."}`.
pub struct ApiError(PipelineError);

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.0.to_string() });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum ScoreResp {
    Scored(Box<ScoredNewsItem>),
    Irrelevant { relevant: bool },
}

async fn score(
    State(state): State<AppState>,
    Json(item): Json<NewsItem>,
) -> Result<Json<ScoreResp>, ApiError> {
    let resp = match state.pipeline.current().score_item(&item)? {
        Some(scored) => ScoreResp::Scored(Box::new(scored)),
        None => ScoreResp::Irrelevant { relevant: false },
    };
    Ok(Json(resp))
}

#[derive(Deserialize)]
struct BatchReq {
    items: Vec<NewsItem>,
    #[serde(default)]
    limit: Option<usize>, // falls back to the configured limit
}

fn effective_limit(requested: Option<usize>, configured: usize) -> usize {
    requested.unwrap_or(configured).clamp(1, MAX_LIMIT)
}

async fn rank(
    State(state): State<AppState>,
    Json(body): Json<BatchReq>,
) -> Result<Json<Vec<ScoredNewsItem>>, ApiError> {
    let p = state.pipeline.current();
    let limit = effective_limit(body.limit, p.settings().limit);
    let scored = p.score_batch(&body.items, Utc::now())?;
    Ok(Json(p.finalize_top(scored, limit)))
}

async fn candidates(
    State(state): State<AppState>,
    Json(body): Json<BatchReq>,
) -> Result<Json<CandidateReport>, ApiError> {
    let p = state.pipeline.current();
    let limit = effective_limit(body.limit, p.settings().limit);
    Ok(Json(p.candidates(&body.items, Utc::now(), limit)?))
}

async fn trending(Json(body): Json<BatchReq>) -> Json<Vec<String>> {
    let limit = body.limit.unwrap_or(DEFAULT_TRENDING_LIMIT).min(MAX_LIMIT);
    Json(trending_topics(&body.items, limit))
}

async fn debug_source_weight(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> String {
    let s = q.get("source").cloned().unwrap_or_default();
    let w = state.pipeline.current().scorer().weights().weight_for(&s);
    format!("source='{}' -> weight={:.2}", s, w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(effective_limit(None, 10), 10);
        assert_eq!(effective_limit(Some(0), 10), 1);
        assert_eq!(effective_limit(Some(100_000), 10), MAX_LIMIT);
    }

    #[test]
    fn irrelevant_body_shape() {
        let v = serde_json::to_value(ScoreResp::Irrelevant { relevant: false }).unwrap();
        assert_eq!(v, serde_json::json!({ "relevant": false }));
    }
}
