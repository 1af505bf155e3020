//! New York Times Article Search adapter.
//!
//! One endpoint serves both search and "latest" requests. The date filter
//! only has a lower bound (`begin_date`, compact `YYYYMMDD`), and a category
//! becomes a field-qualifier expression `section_name:<value>` rather than a
//! plain parameter. A comma-joined value is passed through verbatim, never
//! split into several qualifiers.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use super::{NewsSource, QueryParams, decode_items, get_json};
use crate::config::NytConfig;
use crate::error::Result;
use crate::models::{Article, ArticleSource, SearchFilters, SourceId};
use crate::utils::{compact_date, non_blank};

#[derive(Debug, Deserialize)]
struct NytResponse {
    response: NytDocs,
}

#[derive(Debug, Deserialize)]
struct NytDocs {
    #[serde(default)]
    docs: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct NytItem {
    #[serde(rename = "_id")]
    id: String,
    web_url: String,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    lead_paragraph: Option<String>,
    #[serde(default, rename = "abstract")]
    summary: Option<String>,
    #[serde(default)]
    headline: Option<NytHeadline>,
    /// A list in the classic API, an object in newer responses, sometimes
    /// `null`. Only the list form yields an image.
    #[serde(default)]
    multimedia: Option<serde_json::Value>,
    #[serde(default)]
    byline: Option<NytByline>,
    pub_date: String,
    #[serde(default)]
    section_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NytHeadline {
    #[serde(default)]
    main: String,
}

#[derive(Debug, Deserialize)]
struct NytByline {
    #[serde(default)]
    original: Option<String>,
}

/// Adapter for the New York Times Article Search API.
pub struct NytSource {
    client: Client,
    config: NytConfig,
}

impl NytSource {
    /// Create the adapter.
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `config` - API key, full Article Search URL, and the host that
    ///   relative multimedia paths are resolved against
    pub fn new(client: Client, config: NytConfig) -> Self {
        Self { client, config }
    }

    fn request(&self, query: &str, filters: &SearchFilters) -> Result<(Url, QueryParams)> {
        let url = Url::parse(&self.config.base_url)?;
        let mut params = QueryParams::new();
        if let Some(key) = &self.config.api_key {
            params.push(("api-key", key.clone()));
        }
        if !query.is_empty() {
            params.push(("q", query.to_string()));
        }
        if let Some(from) = &filters.from {
            params.push(("begin_date", compact_date(from)));
        }
        if let Some(category) = &filters.category {
            params.push(("fq", format!("section_name:{category}")));
        }
        Ok((url, params))
    }

    fn to_articles(&self, response: NytResponse) -> Vec<Article> {
        let items = response.response.docs.unwrap_or_default();
        decode_items::<NytItem>(SourceId::NewYorkTimes.as_str(), items)
            .into_iter()
            .map(|item| self.to_article(item))
            .collect()
    }

    fn image_url(&self, multimedia: Option<&serde_json::Value>) -> Option<String> {
        let path = multimedia?.as_array()?.first()?.get("url")?.as_str()?;
        Some(format!(
            "{}/{}",
            self.config.image_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }

    fn to_article(&self, item: NytItem) -> Article {
        let source = SourceId::NewYorkTimes;
        let url_to_image = self.image_url(item.multimedia.as_ref());
        let description = non_blank(item.snippet)
            .or_else(|| non_blank(item.summary))
            .unwrap_or_default();

        Article {
            id: item.id,
            title: item.headline.map(|h| h.main).unwrap_or_default(),
            description,
            content: non_blank(item.lead_paragraph).unwrap_or_default(),
            author: non_blank(item.byline.and_then(|b| b.original))
                .unwrap_or_else(|| source.display_name().to_string()),
            published_at: item.pub_date,
            url: item.web_url,
            url_to_image,
            source: ArticleSource {
                id: source.as_str().to_string(),
                name: source.display_name().to_string(),
            },
            category: item.section_name,
        }
    }
}

#[async_trait]
impl NewsSource for NytSource {
    fn id(&self) -> &str {
        SourceId::NewYorkTimes.as_str()
    }

    fn name(&self) -> &str {
        SourceId::NewYorkTimes.display_name()
    }

    #[instrument(level = "info", skip_all, fields(source = "new-york-times", %query))]
    async fn fetch(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Article>> {
        let (url, params) = self.request(query, filters)?;
        let response: NytResponse = get_json(&self.client, url, &params).await?;
        Ok(self.to_articles(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockServer, param};

    const SAMPLE: &str = r#"{
        "status": "OK",
        "copyright": "Copyright (c) The New York Times Company.",
        "response": {
            "docs": [
                {
                    "_id": "nyt://article/1",
                    "web_url": "https://www.nytimes.com/2024/01/05/world/one.html",
                    "snippet": "",
                    "abstract": "An abstract",
                    "lead_paragraph": "Lead",
                    "source": "The New York Times",
                    "headline": { "main": "One", "kicker": null },
                    "multimedia": [
                        { "url": "images/2024/01/05/one.jpg", "format": "xlarge", "height": 400, "width": 600 }
                    ],
                    "byline": { "original": "By Sam Writer", "person": [] },
                    "pub_date": "2024-01-05T12:00:00+0000",
                    "section_name": "World"
                },
                {
                    "_id": "nyt://article/2",
                    "web_url": "https://www.nytimes.com/2024/01/04/us/two.html",
                    "headline": { "main": "Two" },
                    "multimedia": [],
                    "byline": { "original": null },
                    "pub_date": "2024-01-04T08:00:00+0000"
                }
            ],
            "meta": { "hits": 2, "offset": 0, "time": 12 }
        }
    }"#;

    fn source(base_url: &str) -> NytSource {
        NytSource::new(
            Client::new(),
            NytConfig {
                api_key: Some("nyt-key".to_string()),
                base_url: base_url.to_string(),
                image_base_url: "https://www.nytimes.com/".to_string(),
            },
        )
    }

    #[test]
    fn test_from_date_is_compacted() {
        let filters = SearchFilters {
            from: Some("2024-01-05".to_string()),
            to: Some("2024-01-31".to_string()),
            ..Default::default()
        };
        let (_, params) = source("https://api.nytimes.com/svc/search/v2/articlesearch.json")
            .request("", &filters)
            .unwrap();
        assert!(params.contains(&("begin_date", "20240105".to_string())));
        assert!(params.iter().all(|(k, _)| *k != "end_date" && *k != "q"));
    }

    #[test]
    fn test_category_becomes_single_qualifier() {
        let filters = SearchFilters {
            category: Some("tech,sports".to_string()),
            ..Default::default()
        };
        let (_, params) = source("https://api.nytimes.com/svc/search/v2/articlesearch.json")
            .request("mars", &filters)
            .unwrap();
        assert!(params.contains(&("fq", "section_name:tech,sports".to_string())));
        assert!(params.contains(&("q", "mars".to_string())));
    }

    #[test]
    fn test_mapping_fallbacks() {
        let nyt = source("https://api.nytimes.com/svc/search/v2/articlesearch.json");
        let articles = nyt.to_articles(serde_json::from_str(SAMPLE).unwrap());

        assert_eq!(articles[0].description, "An abstract");
        assert_eq!(articles[0].author, "By Sam Writer");
        assert_eq!(
            articles[0].url_to_image.as_deref(),
            Some("https://www.nytimes.com/images/2024/01/05/one.jpg")
        );
        assert_eq!(articles[0].source.id, "new-york-times");

        assert_eq!(articles[1].description, "");
        assert_eq!(articles[1].content, "");
        assert_eq!(articles[1].author, "The New York Times");
        assert_eq!(articles[1].url_to_image, None);
        assert_eq!(articles[1].category, None);
    }

    #[test]
    fn test_object_or_null_multimedia_means_no_image() {
        let body = r#"{
            "response": {
                "docs": [
                    {
                        "_id": "nyt://article/list",
                        "web_url": "https://www.nytimes.com/list.html",
                        "headline": { "main": "List" },
                        "multimedia": [{ "url": "images/list.jpg" }],
                        "pub_date": "2024-01-05T12:00:00+0000"
                    },
                    {
                        "_id": "nyt://article/object",
                        "web_url": "https://www.nytimes.com/object.html",
                        "headline": { "main": "Object" },
                        "multimedia": {
                            "caption": "",
                            "default": { "url": "https://static01.nyt.com/object.jpg", "height": 400, "width": 600 }
                        },
                        "pub_date": "2024-01-04T12:00:00+0000"
                    },
                    {
                        "_id": "nyt://article/null",
                        "web_url": "https://www.nytimes.com/null.html",
                        "headline": { "main": "Null" },
                        "multimedia": null,
                        "pub_date": "2024-01-03T12:00:00+0000"
                    }
                ]
            }
        }"#;
        let nyt = source("https://api.nytimes.com/svc/search/v2/articlesearch.json");
        let articles = nyt.to_articles(serde_json::from_str(body).unwrap());

        assert_eq!(articles.len(), 3);
        assert_eq!(
            articles[0].url_to_image.as_deref(),
            Some("https://www.nytimes.com/images/list.jpg")
        );
        assert_eq!(articles[1].title, "Object");
        assert_eq!(articles[1].url_to_image, None);
        assert_eq!(articles[2].url_to_image, None);
    }

    #[test]
    fn test_doc_without_url_is_skipped_alone() {
        let body = r#"{
            "response": {
                "docs": [
                    { "_id": "nyt://article/broken", "headline": { "main": "Broken" }, "pub_date": "2024-01-05T12:00:00+0000" },
                    {
                        "_id": "nyt://article/fine",
                        "web_url": "https://www.nytimes.com/fine.html",
                        "pub_date": "2024-01-04T12:00:00+0000"
                    }
                ]
            }
        }"#;
        let nyt = source("https://api.nytimes.com/svc/search/v2/articlesearch.json");
        let articles = nyt.to_articles(serde_json::from_str(body).unwrap());

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, "nyt://article/fine");
        assert_eq!(articles[0].title, "");
    }

    #[tokio::test]
    async fn test_begin_date_on_the_wire() {
        let server = MockServer::start(200, SAMPLE).await;
        let nyt = source(&format!("{}/svc/search/v2/articlesearch.json", server.base_url));
        let filters = SearchFilters {
            from: Some("2024-01-05".to_string()),
            ..Default::default()
        };
        let articles = nyt.search("", &filters).await;

        assert_eq!(articles.len(), 2);
        assert_eq!(server.single_path(), "/svc/search/v2/articlesearch.json");
        let query = server.single_query();
        assert_eq!(param(&query, "begin_date"), Some("20240105"));
        assert_eq!(param(&query, "api-key"), Some("nyt-key"));
    }

    #[tokio::test]
    async fn test_rate_limited_resolves_to_empty() {
        let server = MockServer::start(429, r#"{"fault":"rate limit"}"#).await;
        let nyt = source(&format!("{}/articlesearch.json", server.base_url));
        assert!(nyt.search("x", &SearchFilters::default()).await.is_empty());
    }
}
