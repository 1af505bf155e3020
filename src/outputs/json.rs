//! JSON output of search results.
//!
//! # Output Structure
//!
//! Files are organized by local date, named after the query:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── top.json
//!     └── climate-summit.json
//! ```
//!
//! Running the same query twice on one day overwrites the earlier file.

use chrono::{Local, NaiveDate, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::models::Article;
use crate::utils::{ensure_writable_dir, slugify};

/// File stem used when the query is empty or slugifies to nothing.
pub const EMPTY_QUERY_STEM: &str = "top";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResultsFile<'a> {
    query: &'a str,
    generated_at: String,
    count: usize,
    articles: &'a [Article],
}

/// Write `articles` to `{json_output_dir}/{today}/{slug}.json`.
///
/// Returns the path written.
pub async fn write_results(
    articles: &[Article],
    query: &str,
    json_output_dir: &Path,
) -> Result<PathBuf> {
    write_results_for_date(articles, query, json_output_dir, Local::now().date_naive()).await
}

#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir.display(), %date))]
pub async fn write_results_for_date(
    articles: &[Article],
    query: &str,
    json_output_dir: &Path,
    date: NaiveDate,
) -> Result<PathBuf> {
    let file = ResultsFile {
        query,
        generated_at: Utc::now().to_rfc3339(),
        count: articles.len(),
        articles,
    };
    let json = serde_json::to_string_pretty(&file)?;

    let full_json_dir = json_output_dir.join(date.to_string());
    info!(full_json_dir = %full_json_dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = ensure_writable_dir(&full_json_dir).await {
        error!(full_json_dir = %full_json_dir.display(), error = %e, "JSON directory is not writable");
        return Err(e);
    }

    let path = full_json_dir.join(format!("{}.json", file_stem(query)));
    info!(path = %path.display(), count = articles.len(), "Writing JSON");
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON results file");

    Ok(path)
}

fn file_stem(query: &str) -> String {
    let slug = slugify(query);
    if slug.is_empty() {
        EMPTY_QUERY_STEM.to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleSource;

    fn article(url: &str) -> Article {
        Article {
            id: url.to_string(),
            title: "Title".to_string(),
            description: String::new(),
            content: String::new(),
            author: "Jane Reporter".to_string(),
            published_at: "2024-01-03T07:00:00Z".to_string(),
            url: url.to_string(),
            url_to_image: None,
            source: ArticleSource {
                id: "the-guardian".to_string(),
                name: "The Guardian".to_string(),
            },
            category: Some("World news".to_string()),
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("news_json_{}_{}", name, std::process::id()))
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Climate Summit!"), "climate-summit");
        assert_eq!(file_stem(""), "top");
        assert_eq!(file_stem("?!"), "top");
    }

    #[tokio::test]
    async fn test_write_results_layout_and_contents() {
        let dir = scratch_dir("layout");
        let date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let articles = vec![article("https://a/1"), article("https://a/2")];

        let path = write_results_for_date(&articles, "Interest Rates", &dir, date)
            .await
            .unwrap();

        assert_eq!(path, dir.join("2024-01-03").join("interest-rates.json"));
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["query"], "Interest Rates");
        assert_eq!(written["count"], 2);
        assert_eq!(written["articles"][1]["url"], "https://a/2");
        assert_eq!(written["articles"][0]["publishedAt"], "2024-01-03T07:00:00Z");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_empty_query_writes_top() {
        let dir = scratch_dir("top");
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        let path = write_results_for_date(&[], "", &dir, date).await.unwrap();

        assert!(path.ends_with("2024-02-01/top.json"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
