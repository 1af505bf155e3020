//! The Guardian Open Platform adapter.
//!
//! Always calls `/search`: with an empty query the Guardian returns its most
//! recent content, which doubles as a headlines feed. Field expansion is
//! requested explicitly, otherwise trail text, byline, thumbnail and body
//! are missing from the response.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use super::{NewsSource, QueryParams, decode_items, endpoint, get_json};
use crate::config::GuardianConfig;
use crate::error::Result;
use crate::models::{Article, ArticleSource, SearchFilters, SourceId};
use crate::utils::non_blank;

const SHOW_FIELDS: &str = "headline,trailText,byline,thumbnail,body";

#[derive(Debug, Deserialize)]
struct GuardianResponse {
    response: GuardianResults,
}

#[derive(Debug, Deserialize)]
struct GuardianResults {
    /// Decoded item by item; see [`decode_items`].
    #[serde(default)]
    results: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuardianItem {
    id: String,
    #[serde(default)]
    section_name: Option<String>,
    web_publication_date: String,
    #[serde(default)]
    web_title: Option<String>,
    web_url: String,
    #[serde(default)]
    fields: Option<GuardianFields>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuardianFields {
    trail_text: Option<String>,
    byline: Option<String>,
    thumbnail: Option<String>,
    body: Option<String>,
}

/// Adapter for the Guardian Content API.
pub struct GuardianSource {
    client: Client,
    config: GuardianConfig,
}

impl GuardianSource {
    /// Create the adapter.
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client (timeout and user agent already set)
    /// * `config` - API key and base URL; a missing key is sent as no key at all
    pub fn new(client: Client, config: GuardianConfig) -> Self {
        Self { client, config }
    }

    fn request(&self, query: &str, filters: &SearchFilters) -> Result<(Url, QueryParams)> {
        let url = endpoint(&self.config.base_url, "search")?;
        let mut params: QueryParams = vec![("show-fields", SHOW_FIELDS.to_string())];
        if let Some(key) = &self.config.api_key {
            params.push(("api-key", key.clone()));
        }
        if !query.is_empty() {
            params.push(("q", query.to_string()));
        }
        if let Some(from) = &filters.from {
            params.push(("from-date", from.clone()));
        }
        if let Some(to) = &filters.to {
            params.push(("to-date", to.clone()));
        }
        if let Some(category) = &filters.category {
            params.push(("section", category.clone()));
        }
        Ok((url, params))
    }
}

fn to_article(item: GuardianItem) -> Article {
    let source = SourceId::Guardian;
    let fields = item.fields.unwrap_or_default();
    Article {
        id: item.id,
        title: item.web_title.unwrap_or_default(),
        description: non_blank(fields.trail_text).unwrap_or_default(),
        content: non_blank(fields.body).unwrap_or_default(),
        author: non_blank(fields.byline).unwrap_or_else(|| source.display_name().to_string()),
        published_at: item.web_publication_date,
        url: item.web_url,
        url_to_image: non_blank(fields.thumbnail),
        source: ArticleSource {
            id: source.as_str().to_string(),
            name: source.display_name().to_string(),
        },
        category: item.section_name,
    }
}

fn to_articles(response: GuardianResponse) -> Vec<Article> {
    let items = response.response.results.unwrap_or_default();
    decode_items::<GuardianItem>(SourceId::Guardian.as_str(), items)
        .into_iter()
        .map(to_article)
        .collect()
}

#[async_trait]
impl NewsSource for GuardianSource {
    fn id(&self) -> &str {
        SourceId::Guardian.as_str()
    }

    fn name(&self) -> &str {
        SourceId::Guardian.display_name()
    }

    #[instrument(level = "info", skip_all, fields(source = "the-guardian", %query))]
    async fn fetch(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Article>> {
        let (url, params) = self.request(query, filters)?;
        let response: GuardianResponse = get_json(&self.client, url, &params).await?;
        Ok(to_articles(response))
    }
}
