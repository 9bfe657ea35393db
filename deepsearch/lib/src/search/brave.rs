//! Brave Search backend.
//!
//! Uses the [Brave Search API](https://api.search.brave.com/) web endpoint.
//! Brave has no direct-answer mode, so `include_answer` is ignored and the
//! returned `answer` is always `None`. Hits carry Brave's short description
//! as their body text.
//!
//! Requests are rate limited according to the `BRAVE_PLAN` tier:
//! - `free` (default): 1 request per second
//! - `base`: 20 requests per second
//! - `pro`: 50 requests per second

use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{Span, debug, info, instrument, warn};

use super::{SearchError, SearchHit, SearchProvider, SearchRequest, SearchResponse};

/// Brave web search endpoint
pub const BRAVE_ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";

/// Environment variable for the Brave API key
pub const BRAVE_API_KEY_ENV: &str = "BRAVE_API_KEY";

/// Subscription tier of the Brave key. Each tier allows a fixed request rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BravePlan {
    #[default]
    Free,
    Base,
    Pro,
}

impl BravePlan {
    pub fn requests_per_second(self) -> u32 {
        match self {
            Self::Free => 1,
            Self::Base => 20,
            Self::Pro => 50,
        }
    }

    /// Gap kept between two consecutive request start times.
    pub fn spacing(self) -> Duration {
        Duration::from_secs(1) / self.requests_per_second()
    }
}

/// Tier names are matched case-insensitively; anything unrecognized is `Free`.
impl From<&str> for BravePlan {
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "base" => Self::Base,
            "pro" => Self::Pro,
            _ => Self::Free,
        }
    }
}

/// Hands out request slots at most one `spacing` apart.
///
/// A caller reserves the next free slot under the lock and sleeps outside
/// it, so concurrent callers queue up in reservation order. Clones share
/// the same schedule.
#[derive(Clone)]
struct RequestPacer {
    next_slot: Arc<Mutex<Option<Instant>>>,
    spacing: Duration,
}

impl RequestPacer {
    fn for_plan(plan: BravePlan) -> Self {
        Self {
            next_slot: Arc::default(),
            spacing: plan.spacing(),
        }
    }

    async fn wait_turn(&self) {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = next.map_or(now, |reserved| reserved.max(now));
            *next = Some(slot + self.spacing);
            slot
        };

        let now = Instant::now();
        if slot > now {
            debug!(wait_ms = (slot - now).as_millis() as u64, "Pacing Brave request");
            tokio::time::sleep_until(slot).await;
        }
    }
}

/// Configuration for the Brave Search client.
#[derive(Clone)]
pub struct BraveSearchConfig {
    pub api_key: String,
    pub endpoint: String,
    pub plan: BravePlan,
}

impl BraveSearchConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: BRAVE_ENDPOINT.to_string(),
            plan: BravePlan::default(),
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn with_plan(mut self, plan: BravePlan) -> Self {
        self.plan = plan;
        self
    }
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    web: Option<WebResults>,
}

#[derive(Debug, Deserialize)]
struct WebResults {
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    title: String,
    url: String,
    #[serde(default)]
    description: String,
}

/// Brave Search client.
#[derive(Clone)]
pub struct BraveSearch {
    config: BraveSearchConfig,
    client: Client,
    pacer: RequestPacer,
}

impl BraveSearch {
    pub fn new(config: BraveSearchConfig) -> Self {
        let pacer = RequestPacer::for_plan(config.plan);
        Self {
            config,
            client: Client::new(),
            pacer,
        }
    }

    #[instrument(
        name = "brave_search",
        skip(self, request),
        fields(
            search.provider = "brave",
            search.query = %request.query,
            search.max_results = request.max_results,
            http.status_code = tracing::field::Empty,
            otel.kind = "client"
        )
    )]
    async fn perform_search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        let start = Instant::now();

        if request.query.trim().is_empty() {
            warn!("Search query is empty");
            return Err(SearchError::EmptyQuery);
        }

        self.pacer.wait_turn().await;

        let count = request.max_results.clamp(1, 20).to_string();

        let response = self
            .client
            .get(&self.config.endpoint)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.config.api_key)
            .query(&[("q", request.query.as_str()), ("count", count.as_str())])
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

        let parsed: BraveResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;

        let results: Vec<SearchHit> = parsed
            .web
            .map(|web| {
                web.results
                    .into_iter()
                    .map(|r| SearchHit {
                        url: r.url,
                        title: r.title,
                        content: r.description,
                    })
                    .collect()
            })
            .unwrap_or_default();

        info!(
            search.results_count = results.len(),
            search.duration_ms = start.elapsed().as_millis() as u64,
            "Search completed"
        );

        Ok(SearchResponse {
            answer: None,
            results,
        })
    }
}

impl std::fmt::Debug for BraveSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BraveSearch")
            .field("endpoint", &self.config.endpoint)
            .field("plan", &self.config.plan)
            .finish_non_exhaustive()
    }
}

impl SearchProvider for BraveSearch {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        self.perform_search(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool_for(server: &MockServer) -> BraveSearch {
        BraveSearch::new(
            BraveSearchConfig::new("test-api-key")
                .with_endpoint(format!("{}/search", server.uri()))
                .with_plan(BravePlan::Pro),
        )
    }

    #[test]
    fn test_brave_plan_from_tier_name() {
        assert_eq!(BravePlan::from("BASE"), BravePlan::Base);
        assert_eq!(BravePlan::from(" pro "), BravePlan::Pro);
        assert_eq!(BravePlan::from("enterprise"), BravePlan::Free);
        assert_eq!(BravePlan::from(""), BravePlan::Free);
    }

    #[test]
    fn test_brave_plan_spacing_follows_rate() {
        assert_eq!(BravePlan::Free.spacing(), Duration::from_millis(1000));
        assert_eq!(BravePlan::Base.spacing(), Duration::from_millis(50));
        assert_eq!(BravePlan::Pro.spacing(), Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_pacer_spaces_consecutive_requests() {
        let pacer = RequestPacer::for_plan(BravePlan::Base);
        let start = Instant::now();

        // First slot is immediate, the next two wait one spacing each.
        pacer.wait_turn().await;
        assert!(start.elapsed() < Duration::from_millis(50));
        pacer.wait_turn().await;
        pacer.wait_turn().await;

        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_pacer_clones_share_schedule() {
        let pacer = RequestPacer::for_plan(BravePlan::Base);
        let other = pacer.clone();
        let start = Instant::now();

        pacer.wait_turn().await;
        other.wait_turn().await;

        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_successful_search_with_mock() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "rust performance"))
            .and(query_param("count", "2"))
            .and(header("X-Subscription-Token", "test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "web": {
                    "results": [
                        {
                            "title": "Rust Performance Book",
                            "url": "https://nnethercote.github.io/perf-book/",
                            "description": "Techniques to improve Rust performance."
                        }
                    ]
                },
                "query": { "original": "rust performance" }
            })))
            .mount(&mock_server)
            .await;

        let tool = tool_for(&mock_server);
        let response = tool
            .search(&SearchRequest::new("rust performance", 2).with_answer())
            .await
            .unwrap();

        assert!(response.answer.is_none());
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].title, "Rust Performance Book");
        assert!(response.results[0].content.contains("improve Rust"));
    }

    #[tokio::test]
    async fn test_missing_web_section_is_empty() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&mock_server)
            .await;

        let tool = tool_for(&mock_server);
        let response = tool.search(&SearchRequest::new("nothing", 2)).await.unwrap();
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_api_error_is_reported_and_logged() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too many requests"))
            .mount(&mock_server)
            .await;

        let tool = tool_for(&mock_server);
        let result = tool.search(&SearchRequest::new("test", 2)).await;

        assert!(matches!(result, Err(SearchError::Api { status: 429, .. })));
        assert!(logs_contain("API returned error"));
    }
}
