//! Runtime configuration.
//!
//! Values come from three layers, later ones winning:
//!
//! 1. Built-in defaults (public provider endpoints, 10 second timeout)
//! 2. An optional YAML file passed with `--config`
//! 3. Command-line flags and their environment variables (API keys, paths)
//!
//! ```yaml
//! http:
//!   timeout_secs: 10
//! guardian:
//!   api_key: "..."
//! nytimes:
//!   api_key: "..."
//! newsapi:
//!   api_key: "..."
//!   country: gb
//! preferences_path: ~/.news_prefs.json
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::{Error, Result};

pub const GUARDIAN_API_URL: &str = "https://content.guardianapis.com";
pub const NYT_API_URL: &str = "https://api.nytimes.com/svc/search/v2/articlesearch.json";
pub const NYT_IMAGE_BASE_URL: &str = "https://www.nytimes.com/";
pub const NEWS_API_URL: &str = "https://newsapi.org/v2";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub guardian: GuardianConfig,
    pub nytimes: NytConfig,
    pub newsapi: NewsApiConfig,
    /// File backing the preference store.
    pub preferences_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: format!("news_aggregator/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GuardianConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: GUARDIAN_API_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NytConfig {
    pub api_key: Option<String>,
    /// Full article-search endpoint, not just the host.
    pub base_url: String,
    /// Prefix for the relative multimedia paths NYT returns.
    pub image_base_url: String,
}

impl Default for NytConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: NYT_API_URL.to_string(),
            image_base_url: NYT_IMAGE_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsApiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Country for top headlines when the query is empty.
    pub country: String,
    /// Used when an article has no thumbnail.
    pub placeholder_image: String,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: NEWS_API_URL.to_string(),
            country: "us".to_string(),
            placeholder_image: "/placeholder-news.jpg".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file, or the defaults when no path is given.
    ///
    /// A path that was given but cannot be read is an error; a config the
    /// user asked for should never be silently ignored.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("No config file given; using defaults");
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: AppConfig = serde_yaml::from_str(&raw)?;
        config.validate()?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Override API keys with values from the command line or environment.
    pub fn with_api_keys(
        mut self,
        guardian: Option<String>,
        nytimes: Option<String>,
        newsapi: Option<String>,
    ) -> Self {
        if guardian.is_some() {
            self.guardian.api_key = guardian;
        }
        if nytimes.is_some() {
            self.nytimes.api_key = nytimes;
        }
        if newsapi.is_some() {
            self.newsapi.api_key = newsapi;
        }
        self
    }

    /// Base URLs must parse; everything else has a usable default.
    pub fn validate(&self) -> Result<()> {
        for (name, raw) in [
            ("guardian.base_url", &self.guardian.base_url),
            ("nytimes.base_url", &self.nytimes.base_url),
            ("nytimes.image_base_url", &self.nytimes.image_base_url),
            ("newsapi.base_url", &self.newsapi.base_url),
        ] {
            Url::parse(raw).map_err(|e| Error::Config(format!("{name}: {e}")))?;
        }
        if self.http.timeout_secs == 0 {
            return Err(Error::Config("http.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Build the HTTP client every adapter shares.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .user_agent(&self.http.user_agent)
            .timeout(self.http.timeout())
            .build()?;
        Ok(client)
    }
}
