// src/lexicon.rs
//! Keyword lexicon: every table that drives relevance, scoring, classification
//! and interest estimation.
//!
//! The lexicon is plain data. It is built once (from the built-in seed or a TOML
//! file), validated, lower-cased, and then shared read-only by the pipeline.
//!
//! TOML shape (all sections optional except `relevance`, `scoring`, `categories`):
//!
//! ```toml
//! title_priority = ["bitcoin", "btc", "breaking"]
//! promotional = ["sponsored", "ad:"]
//!
//! [relevance]
//! bitcoin = ["bitcoin", "btc"]
//!
//! [[scoring]]
//! name = "high_impact"
//! keywords = { breaking = 25, crash = 20 }
//!
//! [[categories]]
//! category = "price"
//! keywords = ["price", "$"]
//!
//! [interest]
//! long_title_tokens = 15
//! long_title_penalty = -3
//! rules = [{ id = "bitcoin", keywords = ["bitcoin", "btc"], delta = 15 }]
//! ```

use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::category::Category;

pub const ENV_LEXICON_CONFIG_PATH: &str = "LEXICON_CONFIG_PATH";

/// Full lexicon. Construct through [`Lexicon::default_seed`] or the TOML loaders so
/// that keywords are lower-cased and tables validated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lexicon {
    /// Title-only keywords granting the flat title bonus.
    #[serde(default)]
    pub title_priority: Vec<String>,
    /// Advertisement markers; halve the source-weighted score.
    #[serde(default)]
    pub promotional: Vec<String>,
    /// Topic → keywords. Any hit makes an item crypto-related.
    pub relevance: BTreeMap<String, Vec<String>>,
    /// Independent additive groups (keyword → points).
    pub scoring: Vec<ScoringGroup>,
    /// Category rules; order is irrelevant, classification returns a set.
    pub categories: Vec<CategoryRule>,
    #[serde(default = "InterestRules::default_seed")]
    pub interest: InterestRules,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringGroup {
    pub name: String,
    pub keywords: BTreeMap<String, f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterestRules {
    #[serde(default)]
    pub rules: Vec<InterestRule>,
    /// Titles with more whitespace tokens than this get `long_title_penalty`.
    #[serde(default = "default_long_title_tokens")]
    pub long_title_tokens: usize,
    #[serde(default = "default_long_title_penalty")]
    pub long_title_penalty: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterestRule {
    pub id: String,
    pub keywords: Vec<String>,
    /// Added once when any keyword is in the title; negative for penalties.
    pub delta: f32,
}

fn default_long_title_tokens() -> usize {
    15
}

fn default_long_title_penalty() -> f32 {
    -3.0
}

impl Lexicon {
    /// Parse, validate and lower-case a TOML lexicon.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let lex: Lexicon = toml::from_str(toml_str)?;
        lex.validate()?;
        Ok(lex.lowercased())
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading lexicon from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing lexicon at {}", path.display()))
    }

    /// Resolve the lexicon:
    /// 1) explicit `path`
    /// 2) $LEXICON_CONFIG_PATH
    /// 3) built-in seed
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let resolved = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(ENV_LEXICON_CONFIG_PATH).ok().map(PathBuf::from));

        match resolved {
            Some(p) => {
                let lex = Self::from_path(&p)?;
                info!(target: "lexicon", path = %p.display(), groups = lex.scoring.len(), "lexicon loaded");
                Ok(lex)
            }
            None => Ok(Self::default_seed()),
        }
    }

    /// Reject tables that would break scoring invariants.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.relevance_keywords().all(|k| k.trim().is_empty()) {
            bail!("lexicon: `relevance` must contain at least one keyword");
        }

        let mut names = HashSet::new();
        for g in &self.scoring {
            if !names.insert(g.name.as_str()) {
                bail!("lexicon: duplicate scoring group `{}`", g.name);
            }
            if let Some((k, p)) = g.keywords.iter().find(|(_, p)| !p.is_finite() || **p < 0.0) {
                bail!(
                    "lexicon: scoring group `{}` keyword `{}` has invalid points {}",
                    g.name,
                    k,
                    p
                );
            }
            let mut seen = HashSet::new();
            if let Some(k) = g.keywords.keys().find(|k| !seen.insert(k.trim().to_lowercase())) {
                bail!(
                    "lexicon: scoring group `{}` repeats keyword `{}` (keywords are case-insensitive)",
                    g.name,
                    k
                );
            }
        }

        for rule in &self.categories {
            if rule.category == Category::General {
                bail!("lexicon: `general` is the fallback tag and cannot have keywords");
            }
            if rule.keywords.iter().all(|k| k.trim().is_empty()) {
                bail!("lexicon: category `{}` has no keywords", rule.category);
            }
        }

        if let Some(r) = self.interest.rules.iter().find(|r| !r.delta.is_finite()) {
            return Err(anyhow!("lexicon: interest rule `{}` has a non-finite delta", r.id));
        }
        Ok(())
    }

    fn lowercased(mut self) -> Self {
        fn low(v: &mut [String]) {
            for k in v.iter_mut() {
                *k = k.trim().to_lowercase();
            }
        }
        low(&mut self.title_priority);
        low(&mut self.promotional);
        for v in self.relevance.values_mut() {
            low(v);
        }
        for g in &mut self.scoring {
            g.keywords = std::mem::take(&mut g.keywords)
                .into_iter()
                .map(|(k, p)| (k.trim().to_lowercase(), p))
                .collect();
        }
        for c in &mut self.categories {
            low(&mut c.keywords);
        }
        for r in &mut self.interest.rules {
            low(&mut r.keywords);
        }
        self
    }

    /// All relevance keywords, flattened.
    pub fn relevance_keywords(&self) -> impl Iterator<Item = &str> {
        self.relevance.values().flatten().map(String::as_str)
    }

    /// Built-in tables tuned for English and Japanese crypto headlines.
    pub fn default_seed() -> Self {
        let topics: [(&str, &[&str]); 10] = [
            ("bitcoin", &["bitcoin", "btc", "ビットコイン"]),
            ("ethereum", &["ethereum", "eth", "イーサリアム", "イーサ"]),
            (
                "crypto",
                &["crypto", "cryptocurrency", "altcoin", "仮想通貨", "暗号資産", "デジタル通貨"],
            ),
            ("blockchain", &["blockchain", "ブロックチェーン"]),
            ("defi", &["defi", "decentralized finance", "分散金融"]),
            ("nft", &["nft", "non-fungible token", "エヌエフティー"]),
            ("mining", &["mining", "マイニング", "採掘"]),
            ("trading", &["trading", "取引", "トレード"]),
            ("exchange", &["exchange", "取引所"]),
            ("wallet", &["wallet", "ウォレット"]),
        ];
        let relevance = topics
            .into_iter()
            .map(|(topic, kws)| (topic.to_string(), strings(kws)))
            .collect();

        let scoring = vec![
            group(
                "high_impact",
                &[
                    ("breaking", 25.0),
                    ("urgent", 25.0),
                    ("alert", 20.0),
                    ("crash", 20.0),
                    ("surge", 18.0),
                    ("soar", 18.0),
                    ("plunge", 20.0),
                    ("record", 15.0),
                    ("ath", 15.0),
                    ("all-time high", 15.0),
                    ("sec approves", 20.0),
                    ("sec approval", 20.0),
                    ("etf", 18.0),
                    ("regulation", 15.0),
                    ("government", 12.0),
                    ("ban", 18.0),
                    ("hack", 15.0),
                    ("hacked", 15.0),
                    ("exploit", 12.0),
                    ("partnership", 12.0),
                    ("acquisition", 15.0),
                    ("merger", 15.0),
                ],
            ),
            group(
                "assets",
                &[
                    ("bitcoin", 15.0),
                    ("btc", 15.0),
                    ("ethereum", 12.0),
                    ("eth", 12.0),
                    ("xrp", 10.0),
                    ("ripple", 10.0),
                    ("ada", 8.0),
                    ("cardano", 8.0),
                    ("sol", 10.0),
                    ("solana", 10.0),
                    ("doge", 8.0),
                    ("dogecoin", 8.0),
                ],
            ),
            group(
                "price_action",
                &[
                    ("price", 12.0),
                    ("$", 8.0),
                    ("hits", 10.0),
                    ("reaches", 8.0),
                    ("rally", 10.0),
                    ("pump", 10.0),
                    ("dump", 12.0),
                    ("correction", 8.0),
                    ("bull", 8.0),
                    ("bear", 8.0),
                    ("market", 6.0),
                ],
            ),
            group(
                "institutional",
                &[
                    ("institutional", 12.0),
                    ("fund", 10.0),
                    ("investment", 8.0),
                    ("corporate", 10.0),
                    ("treasury", 12.0),
                    ("adoption", 10.0),
                    ("microstrategy", 15.0),
                    ("tesla", 15.0),
                    ("blackrock", 18.0),
                ],
            ),
            group(
                "technical",
                &[
                    ("defi", 8.0),
                    ("yield", 6.0),
                    ("staking", 8.0),
                    ("protocol", 6.0),
                    ("upgrade", 8.0),
                    ("fork", 8.0),
                    ("consensus", 6.0),
                    ("layer", 6.0),
                ],
            ),
        ];

        let rules: [(Category, &[&str]); 10] = [
            (
                Category::Price,
                &["price", "hits", "surge", "soar", "plunge", "crash", "$", "ath", "high"],
            ),
            (
                Category::Regulation,
                &["regulation", "sec", "government", "legal", "approve", "ban"],
            ),
            (
                Category::Institutional,
                &["etf", "fund", "institutional", "investment", "treasury"],
            ),
            (
                Category::Defi,
                &["defi", "yield", "liquidity", "staking", "protocol"],
            ),
            (Category::Nft, &["nft", "collectible", "art", "gaming"]),
            (
                Category::Exchange,
                &["exchange", "trading", "platform", "listing"],
            ),
            (
                Category::Partnership,
                &["partnership", "adoption", "integration", "corporate"],
            ),
            (
                Category::Technology,
                &["technology", "upgrade", "fork", "consensus", "blockchain"],
            ),
            (
                Category::Security,
                &["hack", "security", "breach", "exploit", "vulnerability"],
            ),
            (
                Category::Macro,
                &["market", "macro", "economic", "fed", "inflation", "geopolitical"],
            ),
        ];
        let categories = rules
            .into_iter()
            .map(|(category, kws)| CategoryRule {
                category,
                keywords: strings(kws),
            })
            .collect();

        Self {
            title_priority: strings(&[
                "bitcoin", "btc", "ethereum", "eth", "breaking", "surge", "crash",
            ]),
            promotional: strings(&[
                "advertisement",
                "sponsored",
                "ad:",
                "pr:",
                "広告",
                "スポンサー",
                "提供",
            ]),
            relevance,
            scoring,
            categories,
            interest: InterestRules::default_seed(),
        }
    }
}

impl InterestRules {
    pub fn default_seed() -> Self {
        let rule = |id: &str, kws: &[&str], delta: f32| InterestRule {
            id: id.to_string(),
            keywords: strings(kws),
            delta,
        };
        Self {
            rules: vec![
                rule("bitcoin", &["bitcoin", "btc"], 15.0),
                rule("ethereum", &["ethereum", "eth"], 10.0),
                rule("price", &["$", "price", "yen", "surge", "crash"], 10.0),
                rule("regional", &["japan", "japanese", "asia"], 20.0),
                rule("regulation", &["regulation", "government"], 8.0),
                rule("institutional", &["etf", "institutional"], 12.0),
                rule("too_technical", &["technical", "fork", "consensus", "node"], -5.0),
            ],
            long_title_tokens: default_long_title_tokens(),
            long_title_penalty: default_long_title_penalty(),
        }
    }
}

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn group(name: &str, kws: &[(&str, f32)]) -> ScoringGroup {
    ScoringGroup {
        name: name.to_string(),
        keywords: kws.iter().map(|(k, p)| (k.to_string(), *p)).collect(),
    }
}
