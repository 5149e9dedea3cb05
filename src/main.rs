//! Crypto news ranking service: binary entrypoint.
//! Boots the Axum HTTP server with the scoring pipeline, metrics and dev tooling.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crypto_news_ranker::build_app;
use crypto_news_ranker::config::PipelineConfig;
use crypto_news_ranker::lexicon::ENV_LEXICON_CONFIG_PATH;
use crypto_news_ranker::pipeline::start_hot_reload_thread;
use crypto_news_ranker::relevance::is_dev_env;

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - RANKER_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("RANKER_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    if !(dev_flag && is_dev_env()) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("crypto_news_ranker=info,relevance=info,warn"));

    // try_init: tests or the runtime may already have installed a subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let cfg = PipelineConfig::from_env()?;
    let (router, handle) = build_app(&cfg)?;

    // Hot reload watches the lexicon file, when one is configured.
    let lexicon_path = cfg
        .paths
        .lexicon
        .clone()
        .or_else(|| std::env::var(ENV_LEXICON_CONFIG_PATH).ok().map(Into::into));
    if let Some(path) = lexicon_path {
        start_hot_reload_thread(handle, path);
    }

    Ok(router.into())
}
