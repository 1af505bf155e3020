//! Multi-source fetch, merge, dedupe and sort.
//!
//! # Algorithm
//!
//! 1. **Resolve sources**: an explicit `source` filter wins, otherwise the
//!    saved preference sources. An empty set means every registered adapter.
//! 2. **Plan rounds**: one round per category when more than one category is
//!    requested, otherwise a single round.
//! 3. **Fan out**: rounds run as separate tasks; inside a round every selected
//!    adapter is queried concurrently and all of them are awaited.
//! 4. **Merge**: results are flattened in round order, then adapter
//!    registration order, and deduplicated by URL. A repeated URL replaces the
//!    earlier value in place.
//! 5. **Sort**: newest first by parsed `publishedAt`; unparsable timestamps
//!    go last, ties keep merge order.
//!
//! Adapters never fail (see [`NewsSource::search`]). A round task that
//! aborts is an orchestration failure: it is logged and the whole fetch
//! resolves to an empty list.

use futures::future::{join_all, try_join_all};
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::error::Result;
use crate::models::{Article, Filters, SearchFilters};
use crate::preferences::SharedPreferences;
use crate::sources::NewsSource;
use crate::utils::parse_published_at;

/// Fans a search out over the registered adapters and merges the results.
pub struct Aggregator {
    sources: Vec<Arc<dyn NewsSource>>,
    preferences: SharedPreferences,
}

impl Aggregator {
    /// Create an aggregator over `sources`.
    ///
    /// # Arguments
    ///
    /// * `sources` - Adapters in registration order, which is also merge order
    /// * `preferences` - Saved preferences, read on every fetch to pick the
    ///   default source set
    pub fn new(sources: Vec<Arc<dyn NewsSource>>, preferences: SharedPreferences) -> Self {
        Self { sources, preferences }
    }

    /// Every registered adapter, selected or not.
    pub fn sources(&self) -> &[Arc<dyn NewsSource>] {
        &self.sources
    }

    /// Search every selected source and return one merged, newest-first list.
    ///
    /// # Arguments
    ///
    /// * `query` - Free text; empty asks each provider for its latest articles
    /// * `filters` - Dates, categories (one round each) and an explicit source set
    ///
    /// # Returns
    ///
    /// The merged list. Never fails; see the module docs for what "empty" can mean.
    #[instrument(level = "info", skip_all, fields(%query))]
    pub async fn fetch_all(&self, query: &str, filters: &Filters) -> Vec<Article> {
        let t0 = Instant::now();
        match self.try_fetch_all(query, filters).await {
            Ok(articles) => {
                info!(
                    count = articles.len(),
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "Aggregated articles"
                );
                articles
            }
            Err(e) => {
                error!(error = %e, "Aggregation failed; returning no articles");
                Vec::new()
            }
        }
    }

    async fn try_fetch_all(&self, query: &str, filters: &Filters) -> Result<Vec<Article>> {
        let selected = self.resolve_sources(filters).await;
        if selected.is_empty() {
            warn!(requested = ?filters.source_list(), "No registered source matches the requested set");
            return Ok(Vec::new());
        }

        let categories = filters.category_list();
        let rounds: Vec<Option<&str>> = if categories.len() > 1 {
            categories.iter().map(|c| Some(c.as_str())).collect()
        } else {
            vec![categories.first().map(String::as_str)]
        };
        debug!(
            sources = selected.len(),
            rounds = rounds.len(),
            "Starting fan-out"
        );

        let tasks = rounds.into_iter().map(|category| {
            let sources = selected.clone();
            let query = query.to_string();
            let round_filters = filters.for_round(category);
            tokio::spawn(async move { run_round(sources, query, round_filters).await })
        });
        let results = try_join_all(tasks).await?;

        let merged = dedupe_by_url(results.into_iter().flatten());
        Ok(sort_newest_first(merged))
    }

    /// The adapters to query, in registration order.
    async fn resolve_sources(&self, filters: &Filters) -> Vec<Arc<dyn NewsSource>> {
        let wanted: BTreeSet<String> = if filters.source_list().is_empty() {
            self.preferences.read().await.get().sources.clone()
        } else {
            filters.source_list().iter().cloned().collect()
        };

        if wanted.is_empty() {
            return self.sources.clone();
        }
        self.sources
            .iter()
            .filter(|source| wanted.contains(source.id()))
            .cloned()
            .collect()
    }
}

/// Query every source with the same request and concatenate in source order.
async fn run_round(
    sources: Vec<Arc<dyn NewsSource>>,
    query: String,
    filters: SearchFilters,
) -> Vec<Article> {
    let searches = sources.iter().map(|source| source.search(&query, &filters));
    let per_source = join_all(searches).await;
    debug!(category = ?filters.category, "Round complete");
    per_source.into_iter().flatten().collect()
}

/// Deduplicate by URL. A repeated URL keeps its first position but takes the
/// later value.
pub fn dedupe_by_url(articles: impl IntoIterator<Item = Article>) -> Vec<Article> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<Article> = Vec::new();
    for article in articles {
        match positions.get(&article.url) {
            Some(&idx) => unique[idx] = article,
            None => {
                positions.insert(article.url.clone(), unique.len());
                unique.push(article);
            }
        }
    }
    unique
}

/// Stable sort, newest first; unparsable timestamps last.
pub fn sort_newest_first(mut articles: Vec<Article>) -> Vec<Article> {
    articles.sort_by_cached_key(|a| Reverse(parse_published_at(&a.published_at)));
    articles
}
