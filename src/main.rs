//! # news_aggregator
//!
//! Query The Guardian, The New York Times and NewsAPI together and print one
//! merged, deduplicated, newest-first list of articles.
//!
//! ## Usage
//!
//! ```sh
//! GUARDIAN_API_KEY=... NYT_API_KEY=... NEWSAPI_API_KEY=... news_aggregator search "interest rates"
//! ```
//!
//! ## Flow
//!
//! 1. **Configuration**: defaults, then `--config` YAML, then flags and environment
//! 2. **Preferences**: loaded from the preferences file (`news_prefs.json` by default)
//! 3. **Search**: every selected source queried concurrently, per category
//! 4. **Output**: text on stdout, optionally a dated JSON file

use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::{Cli, Command, OutputArgs, PrefsAction};
use news_aggregator::outputs::{json, text};
use news_aggregator::utils::ensure_writable_dir;
use news_aggregator::{
    Aggregator, AppConfig, JsonFileStore, NewsSession, PreferenceStore, SharedPreferences,
    build_sources,
};

const DEFAULT_PREFS_FILE: &str = "news_prefs.json";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();

    let args = Cli::parse();
    debug!(command = ?args.command, "Parsed CLI arguments");

    let config = AppConfig::load(args.config.as_deref())?.with_api_keys(
        args.guardian_api_key.clone(),
        args.nyt_api_key.clone(),
        args.newsapi_api_key.clone(),
    );

    let prefs_path = args
        .prefs_file
        .clone()
        .or_else(|| config.preferences_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PREFS_FILE));
    let preferences = PreferenceStore::open(Box::new(JsonFileStore::open(&prefs_path)?)).shared();
    info!(path = %prefs_path.display(), "Preferences loaded");

    match args.command {
        Command::Sources => print!("{}", text::render_catalogue()),
        Command::Prefs { action } => run_prefs(action, &preferences).await?,
        Command::Search(search) => {
            check_output_dir(&search.output).await?;
            let session = build_session(&config, preferences)?;
            let query = search.query();
            session
                .search_articles(query, search.filters.to_filters())
                .await;
            emit(&session, query, &search.output).await?;
        }
        Command::Feed(output) => {
            check_output_dir(&output).await?;
            let session = build_session(&config, preferences)?;
            session.load_feed().await;
            emit(&session, "", &output).await?;
        }
        Command::Authors { query, filters } => {
            let session = build_session(&config, preferences)?;
            let query = query.as_deref().unwrap_or("").trim();
            session.search_articles(query, filters.to_filters()).await;
            fail_on_session_error(&session).await?;
            for author in session.unique_authors().await {
                println!("{author}");
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

fn build_session(
    config: &AppConfig,
    preferences: SharedPreferences,
) -> Result<NewsSession, Box<dyn Error>> {
    let sources = build_sources(config, config.http_client()?);
    info!(count = sources.len(), "Sources registered");
    let aggregator = Arc::new(Aggregator::new(sources, preferences.clone()));
    Ok(NewsSession::new(aggregator, preferences))
}

/// Early check: fail before any network work if the JSON directory is unusable.
async fn check_output_dir(output: &OutputArgs) -> Result<(), Box<dyn Error>> {
    if let Some(dir) = &output.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir.display(),
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e.into());
        }
    }
    Ok(())
}

async fn fail_on_session_error(session: &NewsSession) -> Result<(), Box<dyn Error>> {
    match session.error().await {
        Some(message) => Err(message.into()),
        None => Ok(()),
    }
}

async fn emit(session: &NewsSession, query: &str, output: &OutputArgs) -> Result<(), Box<dyn Error>> {
    fail_on_session_error(session).await?;

    let articles = if output.all_authors {
        session.articles().await
    } else {
        session.visible_articles().await
    };
    let total = session.articles().await.len();
    if articles.len() < total {
        info!(shown = articles.len(), total, "Author preferences filtered results");
    }

    print!("{}", text::render_articles(&articles, output.limit));

    if let Some(dir) = &output.json_output_dir {
        let path = json::write_results(&articles, query, dir).await?;
        info!(path = %path.display(), "Results saved");
    }
    Ok(())
}

async fn run_prefs(action: PrefsAction, preferences: &SharedPreferences) -> Result<(), Box<dyn Error>> {
    let mut store = preferences.write().await;
    match action {
        PrefsAction::Show => {}
        PrefsAction::Set(set) => {
            let patch = set.to_patch()?;
            store.update(patch)?;
        }
        PrefsAction::Reset => {
            store.reset()?;
            warn!("Preferences reset to defaults");
        }
    }
    print!("{}", text::render_preferences(store.get()));
    Ok(())
}

