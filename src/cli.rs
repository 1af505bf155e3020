//! Command-line interface definitions for the news aggregator.
//!
//! This module defines the CLI arguments and subcommands using the `clap` crate.
//! API keys and the preferences file can also come from environment variables.

use clap::{ArgAction, Args, Parser, Subcommand};
use news_aggregator::utils::split_list;
use news_aggregator::{Error, Filters, PreferencesPatch, Result, SourceId};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Command-line arguments for the news aggregator.
///
/// # Examples
///
/// ```sh
/// # Search everything saved in preferences
/// news_aggregator search "climate summit"
///
/// # Two categories from two sources, also written to ./json/<date>/rates.json
/// news_aggregator search rates -C business,politics -s the-guardian,news-api -j ./json
///
/// # Personalized front page
/// news_aggregator feed --limit 20
///
/// # Only keep The Guardian and NewsAPI from now on
/// news_aggregator prefs set --sources the-guardian,news-api
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to config.yaml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// File holding saved preferences
    #[arg(long, env = "NEWS_PREFS_FILE", global = true)]
    pub prefs_file: Option<PathBuf>,

    /// The Guardian Open Platform API key
    #[arg(long, env = "GUARDIAN_API_KEY", hide_env_values = true, global = true)]
    pub guardian_api_key: Option<String>,

    /// New York Times API key
    #[arg(long, env = "NYT_API_KEY", hide_env_values = true, global = true)]
    pub nyt_api_key: Option<String>,

    /// NewsAPI.org API key
    #[arg(long, env = "NEWSAPI_API_KEY", hide_env_values = true, global = true)]
    pub newsapi_api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search the selected sources and print the merged results
    Search(SearchArgs),
    /// Latest articles from the saved sources and categories
    Feed(OutputArgs),
    /// Distinct authors appearing in a search
    Authors {
        /// Free-text query; empty fetches latest headlines
        query: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show or change saved preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
    /// List the built-in sources
    Sources,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Free-text query; empty fetches latest headlines
    pub query: Option<String>,

    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl SearchArgs {
    pub fn query(&self) -> &str {
        self.query.as_deref().unwrap_or("").trim()
    }
}

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Earliest publication date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Latest publication date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Category, or several joined with commas
    #[arg(short = 'C', long)]
    pub category: Option<String>,

    /// Source id, or several joined with commas; overrides saved sources
    #[arg(short, long)]
    pub source: Option<String>,
}

impl FilterArgs {
    pub fn to_filters(&self) -> Filters {
        let mut filters = Filters::new();
        if let Some(from) = &self.from {
            filters = filters.from_date(from.as_str());
        }
        if let Some(to) = &self.to {
            filters = filters.to_date(to.as_str());
        }
        if let Some(category) = &self.category {
            filters = filters.category(category);
        }
        if let Some(source) = &self.source {
            filters = filters.source(source);
        }
        filters
    }
}

#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    /// Also write the results to <DIR>/<date>/<query>.json
    #[arg(short, long)]
    pub json_output_dir: Option<PathBuf>,

    /// Print at most this many articles
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Ignore the saved author filter
    #[arg(long)]
    pub all_authors: bool,
}

#[derive(Subcommand, Debug)]
pub enum PrefsAction {
    /// Print the saved preferences
    Show,
    /// Replace one or more preference lists
    Set(PrefsSetArgs),
    /// Restore the defaults
    Reset,
}

#[derive(Args, Debug)]
pub struct PrefsSetArgs {
    #[arg(long)]
    pub sources: Option<String>,

    /// Empty string clears the list
    #[arg(long)]
    pub categories: Option<String>,

    /// One author per flag, matched exactly against bylines; repeat for
    /// more. A single empty value clears the list
    #[arg(long = "author", action = ArgAction::Append)]
    pub authors: Option<Vec<String>>,
}

impl PrefsSetArgs {
    /// Validate and convert to a patch.
    ///
    /// At least one source must stay selected, and every source id must be
    /// a known one.
    pub fn to_patch(&self) -> Result<PreferencesPatch> {
        let sources = match &self.sources {
            Some(raw) => {
                let ids = split_list(raw);
                if ids.is_empty() {
                    return Err(Error::Config("select at least one news source".to_string()));
                }
                for id in &ids {
                    id.parse::<SourceId>().map_err(Error::Config)?;
                }
                Some(ids.into_iter().collect())
            }
            None => None,
        };
        let patch = PreferencesPatch {
            sources,
            categories: self.categories.as_deref().map(to_set),
            authors: self.authors.as_ref().map(|names| {
                names
                    .iter()
                    .map(|name| name.trim())
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            }),
        };
        if patch.is_empty() {
            return Err(Error::Config(
                "nothing to change; pass --sources, --categories or --author".to_string(),
            ));
        }
        Ok(patch)
    }
}

fn to_set(raw: &str) -> BTreeSet<String> {
    split_list(raw).into_iter().collect()
}
