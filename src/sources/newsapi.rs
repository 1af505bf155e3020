//! NewsAPI.org adapter.
//!
//! An empty query asks `/top-headlines` for a fixed country; anything else
//! goes to `/everything`. `category` is forwarded either way, though only the
//! headlines endpoint honours it. NewsAPI has no stable article id, so the
//! article URL stands in.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use super::{NewsSource, QueryParams, decode_items, endpoint, get_json};
use crate::config::NewsApiConfig;
use crate::error::Result;
use crate::models::{Article, ArticleSource, SearchFilters, SourceId};
use crate::utils::non_blank;

const UNKNOWN_SOURCE: &str = "unknown";

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiItem {
    #[serde(default)]
    source: Option<NewsApiSourceRef>,
    author: Option<String>,
    #[serde(default)]
    title: Option<String>,
    description: Option<String>,
    url: String,
    url_to_image: Option<String>,
    published_at: String,
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NewsApiSourceRef {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Adapter for NewsAPI.org.
///
/// Articles from every outlet NewsAPI indexes come back through this one
/// adapter; `source.id` and `source.name` carry the outlet, not NewsAPI.
pub struct NewsApiSource {
    client: Client,
    config: NewsApiConfig,
}

impl NewsApiSource {
    /// Create the adapter.
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `config` - API key, base URL, headline country and placeholder image
    pub fn new(client: Client, config: NewsApiConfig) -> Self {
        Self { client, config }
    }

    fn request(&self, query: &str, filters: &SearchFilters) -> Result<(Url, QueryParams)> {
        let mut params = QueryParams::new();
        if let Some(key) = &self.config.api_key {
            params.push(("apiKey", key.clone()));
        }
        let path = if query.is_empty() {
            params.push(("country", self.config.country.clone()));
            "top-headlines"
        } else {
            params.push(("q", query.to_string()));
            "everything"
        };
        if let Some(from) = &filters.from {
            params.push(("from", from.clone()));
        }
        if let Some(to) = &filters.to {
            params.push(("to", to.clone()));
        }
        if let Some(category) = &filters.category {
            params.push(("category", category.clone()));
        }
        Ok((endpoint(&self.config.base_url, path)?, params))
    }

    fn to_articles(&self, response: NewsApiResponse) -> Vec<Article> {
        let items = response.articles.unwrap_or_default();
        decode_items::<NewsApiItem>(SourceId::NewsApi.as_str(), items)
            .into_iter()
            .map(|item| self.to_article(item))
            .collect()
    }

    fn to_article(&self, item: NewsApiItem) -> Article {
        let outlet = item.source.unwrap_or_default();
        let source_name =
            non_blank(outlet.name).unwrap_or_else(|| SourceId::NewsApi.display_name().to_string());
        Article {
            id: item.url.clone(),
            title: item.title.unwrap_or_default(),
            description: non_blank(item.description).unwrap_or_default(),
            content: non_blank(item.content).unwrap_or_default(),
            author: non_blank(item.author).unwrap_or_else(|| source_name.clone()),
            published_at: item.published_at,
            url: item.url,
            url_to_image: Some(
                non_blank(item.url_to_image)
                    .unwrap_or_else(|| self.config.placeholder_image.clone()),
            ),
            source: ArticleSource {
                id: non_blank(outlet.id).unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
                name: source_name,
            },
            category: None,
        }
    }
}

#[async_trait]
impl NewsSource for NewsApiSource {
    fn id(&self) -> &str {
        SourceId::NewsApi.as_str()
    }

    fn name(&self) -> &str {
        SourceId::NewsApi.display_name()
    }

    #[instrument(level = "info", skip_all, fields(source = "news-api", %query))]
    async fn fetch(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Article>> {
        let (url, params) = self.request(query, filters)?;
        let response: NewsApiResponse = get_json(&self.client, url, &params).await?;
        Ok(self.to_articles(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockServer, param};

    const SAMPLE: &str = r#"{
        "status": "ok",
        "totalResults": 2,
        "articles": [
            {
                "source": { "id": "bbc-news", "name": "BBC News" },
                "author": null,
                "title": "Headline one",
                "description": null,
                "url": "https://www.bbc.co.uk/news/one",
                "urlToImage": null,
                "publishedAt": "2024-01-03T07:00:00Z",
                "content": null
            },
            {
                "source": { "id": null, "name": "Some Blog" },
                "author": "Alex Author",
                "title": "Headline two",
                "description": "Desc",
                "url": "https://blog.example.com/two",
                "urlToImage": "https://blog.example.com/two.png",
                "publishedAt": "2024-01-02T07:00:00Z",
                "content": "Body [+200 chars]"
            }
        ]
    }"#;

    fn source(base_url: &str) -> NewsApiSource {
        NewsApiSource::new(
            Client::new(),
            NewsApiConfig {
                api_key: Some("newsapi-key".to_string()),
                base_url: base_url.to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_empty_query_uses_top_headlines() {
        let (url, params) = source("https://newsapi.org/v2")
            .request("", &SearchFilters::default())
            .unwrap();
        assert_eq!(url.as_str(), "https://newsapi.org/v2/top-headlines");
        assert!(params.contains(&("country", "us".to_string())));
        assert!(params.iter().all(|(k, _)| *k != "q"));
    }

    #[test]
    fn test_query_uses_everything() {
        let filters = SearchFilters {
            from: Some("2024-01-01".to_string()),
            to: Some("2024-01-02".to_string()),
            category: Some("business".to_string()),
        };
        let (url, params) = source("https://newsapi.org/v2").request("rates", &filters).unwrap();
        assert_eq!(url.as_str(), "https://newsapi.org/v2/everything");
        assert!(params.contains(&("q", "rates".to_string())));
        assert!(params.contains(&("from", "2024-01-01".to_string())));
        assert!(params.contains(&("to", "2024-01-02".to_string())));
        assert!(params.contains(&("category", "business".to_string())));
        assert!(params.iter().all(|(k, _)| *k != "country"));
    }

    #[test]
    fn test_mapping_fallbacks() {
        let articles = source("https://newsapi.org/v2").to_articles(serde_json::from_str(SAMPLE).unwrap());

        assert_eq!(articles[0].id, "https://www.bbc.co.uk/news/one");
        assert_eq!(articles[0].author, "BBC News");
        assert_eq!(articles[0].description, "");
        assert_eq!(articles[0].content, "");
        assert_eq!(articles[0].url_to_image.as_deref(), Some("/placeholder-news.jpg"));
        assert_eq!(articles[0].source.id, "bbc-news");

        assert_eq!(articles[1].author, "Alex Author");
        assert_eq!(articles[1].source.id, "unknown");
        assert_eq!(articles[1].source.name, "Some Blog");
        assert_eq!(articles[1].category, None);
    }

    #[test]
    fn test_null_outlet_name_and_broken_item() {
        let body = r#"{
            "status": "ok",
            "articles": [
                {
                    "source": { "id": null, "name": null },
                    "author": null,
                    "title": "Nameless outlet",
                    "url": "https://nameless.example/a",
                    "publishedAt": "2024-01-03T07:00:00Z"
                },
                { "source": { "id": null, "name": "Broken" }, "url": null, "publishedAt": "2024-01-03T07:00:00Z" },
                {
                    "source": { "id": "reuters", "name": "Reuters" },
                    "author": "Reuters",
                    "title": "Fine",
                    "url": "https://reuters.example/fine",
                    "publishedAt": "2024-01-02T07:00:00Z"
                }
            ]
        }"#;
        let articles = source("https://newsapi.org/v2").to_articles(serde_json::from_str(body).unwrap());

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].source.name, "NewsAPI");
        assert_eq!(articles[0].author, "NewsAPI");
        assert_eq!(articles[0].source.id, "unknown");
        assert_eq!(articles[1].url, "https://reuters.example/fine");
    }

    #[tokio::test]
    async fn test_headlines_on_the_wire() {
        let server = MockServer::start(200, SAMPLE).await;
        let articles = source(&format!("{}/v2", server.base_url))
            .search("", &SearchFilters::default())
            .await;

        assert_eq!(articles.len(), 2);
        assert_eq!(server.single_path(), "/v2/top-headlines");
        let query = server.single_query();
        assert_eq!(param(&query, "apiKey"), Some("newsapi-key"));
        assert_eq!(param(&query, "country"), Some("us"));
    }

    #[tokio::test]
    async fn test_unauthorized_resolves_to_empty() {
        let server = MockServer::start(401, r#"{"status":"error","code":"apiKeyInvalid"}"#).await;
        let articles = source(&server.base_url).search("rates", &SearchFilters::default()).await;
        assert!(articles.is_empty());
    }
}
