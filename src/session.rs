//! Consumer-facing search session.
//!
//! A [`NewsSession`] owns the observable `articles` / `loading` / `error`
//! state a front end renders, and exposes the two operations that change it:
//! [`NewsSession::search_articles`] and [`NewsSession::clear_articles`].
//!
//! # Stale responses
//!
//! Every search takes a token from a monotonically increasing counter. When
//! its fetch completes, results are committed only if no newer search has
//! been issued since. A slow search that finishes after a fast, later one
//! is dropped instead of overwriting the newer results.

use itertools::Itertools;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

use crate::aggregator::Aggregator;
use crate::models::{Article, Filters, Preferences};
use crate::preferences::SharedPreferences;

/// The only failure message a user ever sees.
pub const GENERIC_ERROR: &str = "Failed to fetch articles. Please try again later.";

/// What a front end renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub articles: Vec<Article>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Search state for one user, shared by reference between tasks.
pub struct NewsSession {
    aggregator: Arc<Aggregator>,
    preferences: SharedPreferences,
    state: RwLock<SessionState>,
    generation: AtomicU64,
}

impl NewsSession {
    /// Create an idle session with no articles.
    ///
    /// # Arguments
    ///
    /// * `aggregator` - Runs the searches; shared so each search can own a handle
    /// * `preferences` - Same store the aggregator reads, used here for the
    ///   author filter and the personalized feed
    pub fn new(aggregator: Arc<Aggregator>, preferences: SharedPreferences) -> Self {
        Self {
            aggregator,
            preferences,
            state: RwLock::new(SessionState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Run a search and publish its results, unless a newer search has
    /// started in the meantime.
    #[instrument(level = "info", skip_all, fields(%query))]
    pub async fn search_articles(&self, query: &str, filters: Filters) {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        let aggregator = Arc::clone(&self.aggregator);
        let owned_query = query.to_string();
        let outcome =
            tokio::spawn(async move { aggregator.fetch_all(&owned_query, &filters).await }).await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != token {
            debug!(token, "A newer search was issued; discarding these results");
            return;
        }
        match outcome {
            Ok(articles) => {
                info!(token, count = articles.len(), "Search results committed");
                state.articles = articles;
            }
            Err(e) => {
                error!(token, error = %e, "Search failed");
                state.error = Some(GENERIC_ERROR.to_string());
            }
        }
        state.loading = false;
    }

    /// Search with the saved sources and categories and no query, the
    /// personalized front page.
    pub async fn load_feed(&self) {
        let filters = feed_filters(self.preferences.read().await.get());
        self.search_articles("", filters).await;
    }

    pub async fn clear_articles(&self) {
        self.state.write().await.articles.clear();
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn articles(&self) -> Vec<Article> {
        self.state.read().await.articles.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// Articles after the saved author filter. No saved authors means no
    /// filtering.
    pub async fn visible_articles(&self) -> Vec<Article> {
        let authors = self.preferences.read().await.get().authors.clone();
        let state = self.state.read().await;
        if authors.is_empty() {
            return state.articles.clone();
        }
        state
            .articles
            .iter()
            .filter(|article| authors.contains(&article.author))
            .cloned()
            .collect()
    }

    /// Distinct authors of the current articles, first-seen order.
    pub async fn unique_authors(&self) -> Vec<String> {
        self.state
            .read()
            .await
            .articles
            .iter()
            .map(|article| article.author.clone())
            .unique()
            .collect()
    }
}

/// Filters for the personalized feed.
pub fn feed_filters(prefs: &Preferences) -> Filters {
    Filters::new()
        .sources(&prefs.sources)
        .categories(&prefs.categories)
}
