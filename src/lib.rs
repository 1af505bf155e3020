//! # news_aggregator
//!
//! Search The Guardian, The New York Times and NewsAPI in one call and get
//! back a single list: deduplicated by URL, newest first.
//!
//! ## Architecture
//!
//! | Layer | Module | Role |
//! |-------|--------|------|
//! | Adapters | [`sources`] | One [`sources::NewsSource`] per provider: build the request, map the response, never fail |
//! | Aggregation | [`aggregator`] | Resolve sources, fan out per category, merge, dedupe, sort |
//! | Preferences | [`preferences`] | Saved sources, categories and authors behind a key-value store |
//! | Session | [`session`] | Observable articles / loading / error state with a stale-result guard |
//! | Output | [`outputs`] | Terminal text and dated JSON files |
//!
//! ## Example
//!
//! ```no_run
//! use news_aggregator::{AppConfig, Aggregator, Filters, MemoryStore, PreferenceStore, build_sources};
//!
//! # async fn run() -> news_aggregator::Result<()> {
//! let config = AppConfig::default().with_api_keys(Some("guardian-key".into()), None, None);
//! let sources = build_sources(&config, config.http_client()?);
//! let prefs = PreferenceStore::open(Box::new(MemoryStore::new())).shared();
//! let aggregator = Aggregator::new(sources, prefs);
//!
//! let articles = aggregator
//!     .fetch_all("climate", &Filters::new().category("world,science"))
//!     .await;
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod config;
pub mod error;
pub mod models;
pub mod outputs;
pub mod preferences;
pub mod session;
pub mod sources;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::Aggregator;
pub use config::AppConfig;
pub use error::{Error, Result};
pub use models::{Article, ArticleSource, Filters, Preferences, PreferencesPatch, SearchFilters, SourceId};
pub use preferences::{JsonFileStore, KeyValueStore, MemoryStore, PreferenceStore, SharedPreferences};
pub use session::NewsSession;
pub use sources::{NewsSource, build_sources};
