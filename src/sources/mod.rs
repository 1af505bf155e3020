//! News provider adapters.
//!
//! Each adapter translates a generic query plus [`SearchFilters`] into one
//! provider-specific HTTP call, and maps the provider's response into
//! [`Article`]s.
//!
//! # Supported Sources
//!
//! | Source | Module | Endpoint | Notes |
//! |--------|--------|----------|-------|
//! | The Guardian | [`guardian`] | `/search` | Always searches, even with no query |
//! | The New York Times | [`nytimes`] | Article Search | Category becomes an `fq` qualifier |
//! | NewsAPI | [`newsapi`] | `/top-headlines` or `/everything` | Picked by query presence |
//!
//! # Fail-soft
//!
//! Adapters implement [`NewsSource::fetch`], which returns errors normally.
//! Callers use [`NewsSource::search`], which logs any error and yields an
//! empty list, so one provider's outage never fails an aggregate search.

pub mod guardian;
pub mod newsapi;
pub mod nytimes;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::AppConfig;
use crate::error::Result;
use crate::models::{Article, SearchFilters};
use crate::utils::truncate_for_log;

pub use guardian::GuardianSource;
pub use newsapi::NewsApiSource;
pub use nytimes::NytSource;

/// Query parameters for one provider request.
pub type QueryParams = Vec<(&'static str, String)>;

/// One news provider.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Stable id, matched against the `source` filter and preferences.
    fn id(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Query the provider. May fail on transport, status or decoding.
    async fn fetch(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Article>>;

    /// Query the provider, turning any failure into an empty list.
    async fn search(&self, query: &str, filters: &SearchFilters) -> Vec<Article> {
        let t0 = Instant::now();
        match self.fetch(query, filters).await {
            Ok(articles) => {
                info!(
                    source = self.id(),
                    count = articles.len(),
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "Fetched articles"
                );
                articles
            }
            Err(e) => {
                error!(
                    source = self.id(),
                    error = %e,
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "Source failed; continuing without it"
                );
                Vec::new()
            }
        }
    }
}

/// Build the built-in adapters, in the order their results are merged.
pub fn build_sources(config: &AppConfig, client: Client) -> Vec<Arc<dyn NewsSource>> {
    for (name, key) in [
        ("guardian", &config.guardian.api_key),
        ("nytimes", &config.nytimes.api_key),
        ("newsapi", &config.newsapi.api_key),
    ] {
        if key.is_none() {
            warn!(source = name, "No API key configured; requests will likely be rejected");
        }
    }

    vec![
        Arc::new(GuardianSource::new(client.clone(), config.guardian.clone())) as Arc<dyn NewsSource>,
        Arc::new(NewsApiSource::new(client.clone(), config.newsapi.clone())),
        Arc::new(NytSource::new(client, config.nytimes.clone())),
    ]
}

/// Join a path onto a configured base URL without doubling slashes.
pub(crate) fn endpoint(base_url: &str, path: &str) -> Result<Url> {
    let url = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Ok(Url::parse(&url)?)
}

/// GET a JSON document, failing on non-success status or a body that does
/// not decode as `T`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: Url,
    params: &QueryParams,
) -> Result<T> {
    debug!(%url, "Requesting");
    let response = client.get(url).query(params).send().await?;
    let response = response.error_for_status()?;
    let body = response.text().await?;
    serde_json::from_str::<T>(&body).map_err(|e| {
        warn!(
            error = %e,
            body_preview = %truncate_for_log(&body, 300),
            "Response did not match the expected shape"
        );
        e.into()
    })
}

/// Decode provider items one at a time, skipping any that do not fit `T`.
///
/// A single irregular item costs that item, never the whole response.
pub(crate) fn decode_items<T: DeserializeOwned>(
    source: &str,
    items: Vec<serde_json::Value>,
) -> Vec<T> {
    let total = items.len();
    let mut decoded = Vec::with_capacity(total);
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<T>(item) {
            Ok(value) => decoded.push(value),
            Err(e) => warn!(source, index, error = %e, "Skipping malformed item"),
        }
    }
    if decoded.len() < total {
        debug!(source, kept = decoded.len(), total, "Some items were skipped");
    }
    decoded
}
