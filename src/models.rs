//! Data models shared by the adapters, the aggregator and the session.
//!
//! - [`Article`]: one normalized news item, whatever provider it came from
//! - [`Filters`]: a search request as the caller describes it
//! - [`SearchFilters`]: the narrower request a single adapter receives per round
//! - [`Preferences`] / [`PreferencesPatch`]: persisted user configuration
//! - [`SourceId`]: the catalogue of built-in providers
//!
//! [`Article`] serializes with camelCase field names (`publishedAt`,
//! `urlToImage`) so JSON output reads the same as the providers' own feeds.

use crate::utils::split_list;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A news article normalized from any provider.
///
/// Text fields are never absent: providers that omit a description, content
/// or author get an empty string or a display-name fallback while mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Provider-local identifier. NewsAPI has none, so its URL is used.
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub author: String,
    /// Provider-native timestamp. Only parsed when sorting.
    pub published_at: String,
    /// Canonical URL, also the deduplication key across providers.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_to_image: Option<String>,
    pub source: ArticleSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Where an article came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    /// `the-guardian`, `new-york-times`, the id NewsAPI reports, or `unknown`.
    pub id: String,
    pub name: String,
}

/// Built-in news providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceId {
    Guardian,
    NewYorkTimes,
    NewsApi,
}

impl SourceId {
    pub const ALL: [SourceId; 3] = [SourceId::Guardian, SourceId::NewYorkTimes, SourceId::NewsApi];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Guardian => "the-guardian",
            SourceId::NewYorkTimes => "new-york-times",
            SourceId::NewsApi => "news-api",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SourceId::Guardian => "The Guardian",
            SourceId::NewYorkTimes => "The New York Times",
            SourceId::NewsApi => "NewsAPI",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceId::ALL
            .into_iter()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| format!("unknown source id: {s}"))
    }
}

/// A search request as issued by a caller.
///
/// Comma-joined category and source strings are split here, once. Past this
/// point everything works on explicit lists of trimmed, non-empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub from: Option<String>,
    pub to: Option<String>,
    categories: Vec<String>,
    sources: Vec<String>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower date bound, `YYYY-MM-DD`. Blank clears it.
    pub fn from_date(mut self, date: impl Into<String>) -> Self {
        self.from = Some(date.into()).filter(|d| !d.trim().is_empty());
        self
    }

    /// Upper date bound, `YYYY-MM-DD`. Blank clears it.
    pub fn to_date(mut self, date: impl Into<String>) -> Self {
        self.to = Some(date.into()).filter(|d| !d.trim().is_empty());
        self
    }

    /// A single category or a comma-joined list of them.
    pub fn category(mut self, raw: &str) -> Self {
        self.categories = split_list(raw);
        self
    }

    /// An explicit list of categories.
    pub fn categories<I, S>(mut self, list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.categories = normalize(list);
        self
    }

    /// A single source id or a comma-joined list of them.
    pub fn source(mut self, raw: &str) -> Self {
        self.sources = split_list(raw);
        self
    }

    /// An explicit list of source ids.
    pub fn sources<I, S>(mut self, list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.sources = normalize(list);
        self
    }

    pub fn category_list(&self) -> &[String] {
        &self.categories
    }

    pub fn source_list(&self) -> &[String] {
        &self.sources
    }

    /// The per-adapter request for one round, with at most one category.
    pub fn for_round(&self, category: Option<&str>) -> SearchFilters {
        SearchFilters {
            from: self.from.clone(),
            to: self.to.clone(),
            category: category.map(str::to_string),
        }
    }
}

fn normalize<I, S>(list: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    list.into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// What a single adapter is asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub from: Option<String>,
    pub to: Option<String>,
    pub category: Option<String>,
}

/// Persisted user configuration.
///
/// Decoding is strict: a stored blob missing any of the three keys is
/// rejected by serde and the store falls back to [`Preferences::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub sources: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    /// Only used to post-filter articles that were already fetched.
    pub authors: BTreeSet<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sources: SourceId::ALL.iter().map(|id| id.as_str().to_string()).collect(),
            categories: BTreeSet::new(),
            authors: BTreeSet::new(),
        }
    }
}

/// A partial update to [`Preferences`]. `Some` keys replace, `None` keys stay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencesPatch {
    pub sources: Option<BTreeSet<String>>,
    pub categories: Option<BTreeSet<String>>,
    pub authors: Option<BTreeSet<String>>,
}

impl PreferencesPatch {
    pub fn is_empty(&self) -> bool {
        self.sources.is_none() && self.categories.is_none() && self.authors.is_none()
    }

    pub fn apply(self, prefs: &mut Preferences) {
        if let Some(sources) = self.sources {
            prefs.sources = sources;
        }
        if let Some(categories) = self.categories {
            prefs.categories = categories;
        }
        if let Some(authors) = self.authors {
            prefs.authors = authors;
        }
    }
}
