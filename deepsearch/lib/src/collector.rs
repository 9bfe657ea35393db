//! Content collection: run every planned query and format the hits.
//!
//! Queries run one after another in plan order. A failing query is logged
//! and skipped; it never aborts the rest of the collection.

use tracing::{debug, info, instrument, warn};

use crate::config::DEFAULT_MAX_RESULTS;
use crate::search::{SearchHit, SearchProvider, SearchRequest};

/// Maximum number of characters of a hit's body kept in a content block.
pub const SNIPPET_CHAR_BUDGET: usize = 800;

/// Appended to every truncated body, whether or not anything was cut.
pub const TRUNCATION_MARKER: &str = "...";

/// Turns a list of queries into formatted content blocks.
#[derive(Debug, Clone)]
pub struct ContentCollector<S> {
    search: S,
    max_results: u32,
    include_answer: bool,
}

impl<S: SearchProvider> ContentCollector<S> {
    pub fn new(search: S) -> Self {
        Self {
            search,
            max_results: DEFAULT_MAX_RESULTS,
            include_answer: true,
        }
    }

    #[must_use]
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    #[must_use]
    pub fn with_include_answer(mut self, include_answer: bool) -> Self {
        self.include_answer = include_answer;
        self
    }

    /// Search each query in order and collect one block per hit.
    ///
    /// The output follows plan order, then per-query result order. Search
    /// failures are logged at `warn` and contribute nothing.
    #[instrument(name = "research", skip_all, fields(queries = queries.len()))]
    pub async fn collect(&self, queries: &[String]) -> Vec<String> {
        let mut collected = Vec::new();
        let mut failed = 0usize;

        for query in queries {
            let mut request = SearchRequest::new(query.as_str(), self.max_results);
            if self.include_answer {
                request = request.with_answer();
            }

            match self.search.search(&request).await {
                Ok(response) => {
                    if let Some(answer) = &response.answer {
                        debug!(query = %query, answer = %answer, "Provider returned a direct answer");
                    }
                    debug!(query = %query, hits = response.results.len(), "Query returned results");
                    collected.extend(response.results.iter().map(format_block));
                }
                Err(e) => {
                    failed += 1;
                    warn!(query = %query, error = %e, "Search error, skipping query");
                }
            }
        }

        info!(
            blocks = collected.len(),
            failed_queries = failed,
            "Collected research content"
        );

        collected
    }
}

/// Format one hit as a content block:
///
/// ```text
/// [Source: <url>]
/// Title: <title>
/// Content: <first 800 chars of body>...
/// ```
pub fn format_block(hit: &SearchHit) -> String {
    format!(
        "[Source: {}]\nTitle: {}\nContent: {}{}",
        hit.url,
        hit.title,
        truncate_chars(&hit.content, SNIPPET_CHAR_BUDGET),
        TRUNCATION_MARKER
    )
}

/// Longest prefix of `s` holding at most `max` characters.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
