//! Tavily search backend.
//!
//! Talks to the [Tavily Search API](https://docs.tavily.com/) with a JSON POST
//! and bearer authentication. Tavily returns page extracts rather than short
//! snippets, and can optionally produce a direct answer for the query.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{Span, debug, info, instrument, warn};

use super::{SearchError, SearchHit, SearchProvider, SearchRequest, SearchResponse};

/// Default Tavily search endpoint
pub const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

/// Environment variable for the Tavily API key
pub const TAVILY_API_KEY_ENV: &str = "TAVILY_API_KEY";

/// Configuration for the Tavily client.
#[derive(Clone)]
pub struct TavilyConfig {
    pub api_key: String,
    pub endpoint: String,
}

impl TavilyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: TAVILY_ENDPOINT.to_string(),
        }
    }

    /// Set a custom endpoint (useful for testing).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl std::fmt::Debug for TavilyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyConfig")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: u32,
    include_answer: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    answer: Option<String>,
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
}

/// Tavily search client.
#[derive(Clone)]
pub struct TavilySearch {
    config: TavilyConfig,
    client: Client,
}

impl TavilySearch {
    pub fn new(config: TavilyConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    #[instrument(
        name = "tavily_search",
        skip(self, request),
        fields(
            search.provider = "tavily",
            search.query = %request.query,
            search.max_results = request.max_results,
            http.status_code = tracing::field::Empty,
            otel.kind = "client"
        )
    )]
    async fn perform_search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        let start = std::time::Instant::now();

        if request.query.trim().is_empty() {
            warn!("Search query is empty");
            return Err(SearchError::EmptyQuery);
        }

        let body = TavilyRequest {
            query: &request.query,
            max_results: request.max_results,
            include_answer: request.include_answer,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await;

        match &response {
            Ok(resp) => {
                let status = resp.status().as_u16();
                Span::current().record("http.status_code", status);
                debug!(http.status_code = status, "Received API response");
            }
            Err(e) => {
                warn!(error = %e, "Search request failed");
            }
        }

        let response = response?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            warn!(status, %message, "API returned error");
            return Err(SearchError::Api { status, message });
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;

        let results: Vec<SearchHit> = parsed
            .results
            .into_iter()
            .map(|r| SearchHit {
                url: r.url,
                title: r.title,
                content: r.content,
            })
            .collect();

        info!(
            search.results_count = results.len(),
            search.has_answer = parsed.answer.is_some(),
            search.duration_ms = start.elapsed().as_millis() as u64,
            "Search completed"
        );

        Ok(SearchResponse {
            answer: parsed.answer,
            results,
        })
    }
}

impl std::fmt::Debug for TavilySearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilySearch")
            .field("endpoint", &self.config.endpoint)
            .finish_non_exhaustive()
    }
}

impl SearchProvider for TavilySearch {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        self.perform_search(request).await
    }
}
