// src/pipeline.rs
//! Scoring pipeline: validate → relevance → recency → score/classify/interest →
//! dedup → rank.
//!
//! A `Pipeline` is immutable once built and is `Send + Sync`; batches can be scored
//! on separate threads and combined with [`Pipeline::merge`], which yields the same
//! output as one sequential [`Pipeline::run`] over the concatenated input.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

use crate::candidate::{partition_by_priority, select_candidates, Candidate, PriorityTiers};
use crate::category::classify;
use crate::config::{PipelineConfig, PipelineSettings};
use crate::dedup::{dedup, url_hash};
use crate::error::PipelineError;
use crate::interest::estimate_interest;
use crate::lexicon::Lexicon;
use crate::normalize::{clean_item, searchable_text};
use crate::rank::{rank_scored, RankKey};
use crate::relevance::{dev_log_item, is_dev_env, is_relevant};
use crate::scoring::{Importance, ImportanceScorer};
use crate::source_weights::SourceWeights;
use crate::types::{NewsItem, ScoredNewsItem};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("pipeline_items_total", "News items submitted for scoring.");
        describe_counter!(
            "pipeline_irrelevant_total",
            "Items dropped by the relevance gate."
        );
        describe_counter!(
            "pipeline_stale_total",
            "Items dropped by the recency window."
        );
        describe_counter!(
            "pipeline_duplicates_total",
            "Items removed by url_hash deduplication."
        );
        describe_counter!(
            "pipeline_selected_total",
            "Items returned after ranking and truncation."
        );
        describe_counter!(
            "pipeline_invalid_total",
            "Batches rejected because of an invalid item."
        );
        describe_histogram!(
            "pipeline_importance_score",
            "Importance score of relevant items."
        );
    });
}

/// Ranked candidates plus the high/medium importance tiers of the same batch.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateReport {
    pub candidates: Vec<Candidate>,
    pub tiers: PriorityTiers,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    lexicon: Arc<Lexicon>,
    scorer: ImportanceScorer,
    settings: PipelineSettings,
    rank_key: RankKey,
}

impl Pipeline {
    pub fn new(
        lexicon: Lexicon,
        source_weights: SourceWeights,
        settings: PipelineSettings,
        rank_key: RankKey,
    ) -> Self {
        let lexicon = Arc::new(lexicon);
        let scorer = ImportanceScorer::new(lexicon.clone())
            .strategy(settings.strategy)
            .source_weights(Arc::new(source_weights))
            .match_mode(settings.match_mode);
        Self {
            lexicon,
            scorer,
            settings,
            rank_key,
        }
    }

    /// Built-in lexicon and source weights, default settings.
    pub fn with_defaults() -> Self {
        Self::new(
            Lexicon::default_seed(),
            SourceWeights::default_seed(),
            PipelineSettings::default(),
            RankKey::default(),
        )
    }

    /// Build from a loaded config: lexicon path (or env / seed), source weights file.
    pub fn from_config(cfg: &PipelineConfig) -> anyhow::Result<Self> {
        let lexicon = Lexicon::load(cfg.paths.lexicon.as_deref())?;
        let weights = SourceWeights::load_from_file(cfg.source_weights_path());
        Ok(Self::new(
            lexicon,
            weights,
            cfg.pipeline.clone(),
            cfg.ranking,
        ))
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn scorer(&self) -> &ImportanceScorer {
        &self.scorer
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn rank_key(&self) -> RankKey {
        self.rank_key
    }

    pub fn is_relevant(&self, item: &NewsItem) -> bool {
        let text = searchable_text(&item.title, &item.description);
        is_relevant(&text, &self.lexicon, self.settings.match_mode)
    }

    /// Importance breakdown without validation or relevance gating.
    pub fn evaluate(&self, item: &NewsItem) -> Importance {
        self.scorer
            .evaluate(&item.title, &item.description, &item.source)
    }

    pub fn interest_for(&self, title: &str, importance: f32) -> f32 {
        estimate_interest(
            title,
            importance,
            &self.lexicon.interest,
            self.settings.match_mode,
        )
    }

    /// Score one item. `Ok(None)` when it is not crypto-related.
    pub fn score_item(&self, item: &NewsItem) -> Result<Option<ScoredNewsItem>, PipelineError> {
        self.score_prepared(self.prepare(item).as_ref())
    }

    fn score_prepared(&self, item: &NewsItem) -> Result<Option<ScoredNewsItem>, PipelineError> {
        item.validate()?;

        let text = searchable_text(&item.title, &item.description);
        if !is_relevant(&text, &self.lexicon, self.settings.match_mode) {
            dev_log_item("irrelevant", &text, 0.0, &[]);
            return Ok(None);
        }

        let imp = self.evaluate(item);
        let categories = classify(&text, &self.lexicon, self.settings.match_mode);
        let interest_score = (self.settings.estimate_interest || self.rank_key.needs_interest())
            .then(|| self.interest_for(&item.title, imp.score));

        dev_log_item("scored", &text, imp.score, &imp.matched);

        Ok(Some(ScoredNewsItem {
            item: item.clone(),
            importance_score: imp.score,
            categories,
            url_hash: url_hash(&item.url),
            interest_score,
        }))
    }

    fn prepare<'a>(&self, item: &'a NewsItem) -> Cow<'a, NewsItem> {
        if self.settings.clean_fields {
            Cow::Owned(clean_item(item))
        } else {
            Cow::Borrowed(item)
        }
    }

    /// Validate, gate and score a batch; no dedup or ranking.
    /// The first invalid item aborts the batch.
    pub fn score_batch(
        &self,
        items: &[NewsItem],
        now: DateTime<Utc>,
    ) -> Result<Vec<ScoredNewsItem>, PipelineError> {
        ensure_metrics_described();
        counter!("pipeline_items_total").increment(items.len() as u64);

        // A window reaching past chrono's range keeps everything.
        let cutoff = self
            .settings
            .max_age_hours
            .and_then(|h| ChronoDuration::try_hours(i64::from(h)))
            .and_then(|age| now.checked_sub_signed(age));

        let mut out = Vec::with_capacity(items.len());
        let mut irrelevant = 0u64;
        let mut stale = 0u64;

        for (i, raw) in items.iter().enumerate() {
            let item = self.prepare(raw);
            let item = item.as_ref();
            if let Err(e) = item.validate() {
                counter!("pipeline_invalid_total").increment(1);
                let e = e.at(i);
                warn!(error = %e, "rejecting batch");
                return Err(e);
            }

            if let (Some(cutoff), Some(published)) = (cutoff, item.published_at) {
                if published < cutoff {
                    stale += 1;
                    continue;
                }
            }

            match self.score_prepared(item).map_err(|e| e.at(i))? {
                Some(scored) => {
                    histogram!("pipeline_importance_score").record(scored.importance_score as f64);
                    out.push(scored);
                }
                None => irrelevant += 1,
            }
        }

        counter!("pipeline_irrelevant_total").increment(irrelevant);
        counter!("pipeline_stale_total").increment(stale);
        debug!(kept = out.len(), irrelevant, stale, "batch scored");
        Ok(out)
    }

    /// Dedup (first occurrence wins) then rank by the configured key and truncate.
    pub fn finalize(&self, scored: Vec<ScoredNewsItem>) -> Vec<ScoredNewsItem> {
        self.finalize_top(scored, self.settings.limit)
    }

    /// `finalize` with an explicit limit.
    pub fn finalize_top(&self, scored: Vec<ScoredNewsItem>, limit: usize) -> Vec<ScoredNewsItem> {
        ensure_metrics_described();
        let unique = self.dedup_counted(scored);
        let ranked = rank_scored(unique, self.rank_key, limit);

        counter!("pipeline_selected_total").increment(ranked.len() as u64);
        ranked
    }

    fn dedup_counted(&self, scored: Vec<ScoredNewsItem>) -> Vec<ScoredNewsItem> {
        let before = scored.len();
        let unique = dedup(scored);
        counter!("pipeline_duplicates_total").increment((before - unique.len()) as u64);
        unique
    }

    /// Score, dedup and pick writing candidates by the importance/interest composite.
    pub fn candidates(
        &self,
        items: &[NewsItem],
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<CandidateReport, PipelineError> {
        let unique = self.dedup_counted(self.score_batch(items, now)?);
        let tiers = partition_by_priority(&rank_scored(
            unique.clone(),
            RankKey::Importance,
            unique.len(),
        ));
        let candidates = select_candidates(
            unique,
            &self.lexicon.interest,
            self.settings.match_mode,
            limit,
        );
        counter!("pipeline_selected_total").increment(candidates.len() as u64);
        Ok(CandidateReport { candidates, tiers })
    }

    /// Full run over one batch.
    pub fn run(
        &self,
        items: &[NewsItem],
        now: DateTime<Utc>,
    ) -> Result<Vec<ScoredNewsItem>, PipelineError> {
        let scored = self.score_batch(items, now)?;
        let out = self.finalize(scored);
        info!(submitted = items.len(), selected = out.len(), "pipeline run");
        Ok(out)
    }

    /// Combine independently scored batches (in submission order).
    pub fn merge<I>(&self, batches: I) -> Vec<ScoredNewsItem>
    where
        I: IntoIterator<Item = Vec<ScoredNewsItem>>,
    {
        let all: Vec<ScoredNewsItem> = batches.into_iter().flatten().collect();
        self.finalize(all)
    }
}

/* ----------------------------
Thread-safe handle + hot reload
---------------------------- */

/// Shared, swappable pipeline used by the HTTP service.
/// Readers take an `Arc` snapshot; a reload swaps the whole pipeline.
#[derive(Clone)]
pub struct PipelineHandle {
    inner: Arc<RwLock<Arc<Pipeline>>>,
}

impl PipelineHandle {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(pipeline))),
        }
    }

    pub fn current(&self) -> Arc<Pipeline> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn replace(&self, pipeline: Pipeline) {
        match self.inner.write() {
            Ok(mut guard) => *guard = Arc::new(pipeline),
            Err(poisoned) => *poisoned.into_inner() = Arc::new(pipeline),
        }
    }

    /// Rebuild with a new lexicon, keeping weights/settings of the current pipeline.
    pub fn reload_lexicon(&self, path: &Path) -> anyhow::Result<()> {
        let lexicon = Lexicon::from_path(path)?;
        let cur = self.current();
        let weights = SourceWeights::clone(cur.scorer.weights());
        self.replace(Pipeline::new(
            lexicon,
            weights,
            cur.settings.clone(),
            cur.rank_key,
        ));
        Ok(())
    }
}

/// Returns true if we should enable hot reload (dev/local only).
fn hot_reload_enabled() -> bool {
    let want = std::env::var("RANKER_HOT_RELOAD")
        .ok()
        .map(|v| v == "1")
        .unwrap_or(false);
    want && is_dev_env()
}

/// Poll the lexicon file's mtime every 2s and swap in a rebuilt pipeline on change.
/// Invalid files are logged and ignored; the previous pipeline stays active.
pub fn start_hot_reload_thread(handle: PipelineHandle, path: PathBuf) {
    if !hot_reload_enabled() {
        return;
    }

    thread::spawn(move || {
        let poll = Duration::from_secs(2);
        let mut last_mtime: Option<SystemTime> = None;

        loop {
            if let Ok(mtime) = std::fs::metadata(&path).and_then(|m| m.modified()) {
                let changed = match last_mtime {
                    None => {
                        last_mtime = Some(mtime);
                        false
                    }
                    Some(prev) => mtime > prev,
                };
                if changed {
                    match handle.reload_lexicon(&path) {
                        Ok(()) => info!(path = %path.display(), "lexicon hot-reloaded"),
                        Err(e) => warn!(error = %format!("{e:#}"), "lexicon reload failed"),
                    }
                    last_mtime = Some(mtime);
                }
            }
            thread::sleep(poll);
        }
    });
}
