//! Plain-text rendering for the terminal.

use itertools::Itertools;
use std::fmt::Write;

use crate::models::{Article, Preferences, SourceId};
use crate::utils::truncate_for_log;

const DESCRIPTION_WIDTH: usize = 200;

/// Render a numbered article list, at most `limit` entries.
pub fn render_articles(articles: &[Article], limit: Option<usize>) -> String {
    if articles.is_empty() {
        return "No articles found.\n".to_string();
    }

    let shown = limit.unwrap_or(articles.len()).min(articles.len());
    let mut out = String::new();
    for (i, article) in articles.iter().take(shown).enumerate() {
        let _ = writeln!(out, "{:>3}. {}", i + 1, article.title);
        let byline = [
            Some(article.source.name.as_str()),
            Some(article.author.as_str()).filter(|a| !a.is_empty() && *a != article.source.name),
            article.category.as_deref(),
            Some(article.published_at.as_str()),
        ]
        .into_iter()
        .flatten()
        .join(" | ");
        let _ = writeln!(out, "     {byline}");
        if !article.description.is_empty() {
            let _ = writeln!(out, "     {}", truncate_for_log(&article.description, DESCRIPTION_WIDTH));
        }
        let _ = writeln!(out, "     {}", article.url);
    }
    if shown < articles.len() {
        let _ = writeln!(out, "... {} more", articles.len() - shown);
    }
    out
}

pub fn render_preferences(prefs: &Preferences) -> String {
    fn list(items: &std::collections::BTreeSet<String>) -> String {
        if items.is_empty() {
            "(any)".to_string()
        } else {
            items.iter().join(", ")
        }
    }
    format!(
        "sources:    {}\ncategories: {}\nauthors:    {}\n",
        list(&prefs.sources),
        list(&prefs.categories),
        list(&prefs.authors)
    )
}

/// The built-in source catalogue, one `id  name` pair per line.
pub fn render_catalogue() -> String {
    SourceId::ALL
        .iter()
        .map(|id| format!("{:<16}{}\n", id.as_str(), id.display_name()))
        .collect()
}
