//! Web search capability.
//!
//! [`SearchProvider`] is the seam the collector depends on. Two backends are
//! provided: [`tavily::TavilySearch`] (the default, supports the direct-answer
//! hint) and [`brave::BraveSearch`]. [`WebSearch`] picks one at runtime from
//! [`SearchSettings`](crate::config::SearchSettings).

pub mod brave;
pub mod tavily;

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SearchSettings;
use brave::{BraveSearch, BraveSearchConfig};
use tavily::{TavilyConfig, TavilySearch};

/// One search call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: u32,
    /// Ask the provider to attempt a pre-summarized answer alongside results.
    pub include_answer: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, max_results: u32) -> Self {
        Self {
            query: query.into(),
            max_results,
            include_answer: false,
        }
    }

    #[must_use]
    pub fn with_answer(mut self) -> Self {
        self.include_answer = true;
        self
    }
}

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    /// Body text of the hit (page extract or snippet, depending on backend)
    pub content: String,
}

/// Results of one search call, in provider order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Direct answer, when requested and the provider produced one
    pub answer: Option<String>,
    pub results: Vec<SearchHit>,
}

/// Errors that can occur during a search call.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Query cannot be empty")]
    EmptyQuery,
}

/// Something that can answer a [`SearchRequest`].
///
/// Implementations must report failure through `Err` rather than returning
/// an empty success, so callers can tell "nothing found" from "call failed".
pub trait SearchProvider: Send + Sync {
    fn search(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<SearchResponse, SearchError>> + Send;
}

impl<S: SearchProvider> SearchProvider for &S {
    fn search(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<SearchResponse, SearchError>> + Send {
        (**self).search(request)
    }
}

impl<S: SearchProvider> SearchProvider for std::sync::Arc<S> {
    fn search(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<SearchResponse, SearchError>> + Send {
        (**self).search(request)
    }
}

/// The configured search backend.
#[derive(Debug, Clone)]
pub enum WebSearch {
    Tavily(TavilySearch),
    Brave(BraveSearch),
}

impl WebSearch {
    pub fn from_settings(settings: &SearchSettings) -> Self {
        match settings {
            SearchSettings::Tavily { api_key, endpoint } => Self::Tavily(TavilySearch::new(
                TavilyConfig::new(api_key.clone()).with_endpoint(endpoint.clone()),
            )),
            SearchSettings::Brave {
                api_key,
                endpoint,
                plan,
            } => Self::Brave(BraveSearch::new(
                BraveSearchConfig::new(api_key.clone())
                    .with_endpoint(endpoint.clone())
                    .with_plan(*plan),
            )),
        }
    }
}

impl SearchProvider for WebSearch {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        match self {
            Self::Tavily(tavily) => tavily.search(request).await,
            Self::Brave(brave) => brave.search(request).await,
        }
    }
}
