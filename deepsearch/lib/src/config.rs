//! Runtime configuration for the research workflow.
//!
//! Everything is read from environment variables (the CLI loads a `.env`
//! file first). Credentials are checked here so that a missing key fails
//! before any client is built or any request leaves the process.
//!
//! | Variable | Default |
//! |---|---|
//! | `GROQ_API_KEY` | required |
//! | `TAVILY_API_KEY` | required for the `tavily` backend |
//! | `BRAVE_API_KEY` | required for the `brave` backend |
//! | `DEEPSEARCH_SEARCH_PROVIDER` | `tavily` |
//! | `DEEPSEARCH_MODEL` | `llama-3.3-70b-versatile` |
//! | `DEEPSEARCH_QUERY_COUNT` | `3` |
//! | `DEEPSEARCH_MAX_RESULTS` | `2` |
//! | `GROQ_BASE_URL` | `https://api.groq.com/openai/v1` |
//! | `TAVILY_ENDPOINT` | `https://api.tavily.com/search` |
//! | `BRAVE_PLAN` | `free` |

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::llm::groq::{GROQ_API_BASE_URL, GROQ_API_KEY_ENV, LLAMA_3_3_70B_VERSATILE};
use crate::search::brave::{BRAVE_API_KEY_ENV, BRAVE_ENDPOINT, BravePlan};
use crate::search::tavily::{TAVILY_API_KEY_ENV, TAVILY_ENDPOINT};

/// Model used when `DEEPSEARCH_MODEL` is not set.
pub const DEFAULT_MODEL: &str = LLAMA_3_3_70B_VERSATILE;

/// Number of keyword phrases the planner asks for.
pub const DEFAULT_QUERY_COUNT: usize = 3;

/// Number of search results requested per query.
pub const DEFAULT_MAX_RESULTS: u32 = 2;

/// Sampling temperature for every model call.
pub const TEMPERATURE: f64 = 0.0;

pub const SEARCH_PROVIDER_ENV: &str = "DEEPSEARCH_SEARCH_PROVIDER";
pub const MODEL_ENV: &str = "DEEPSEARCH_MODEL";
pub const QUERY_COUNT_ENV: &str = "DEEPSEARCH_QUERY_COUNT";
pub const MAX_RESULTS_ENV: &str = "DEEPSEARCH_MAX_RESULTS";
pub const GROQ_BASE_URL_ENV: &str = "GROQ_BASE_URL";
pub const TAVILY_ENDPOINT_ENV: &str = "TAVILY_ENDPOINT";
pub const BRAVE_PLAN_ENV: &str = "BRAVE_PLAN";

/// Errors raised while assembling configuration.
///
/// These are distinct from runtime call failures: a `ConfigError` means no
/// network call was attempted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing API key for {provider}. Set one of: {}", env_vars.join(", "))]
    MissingApiKey {
        provider: String,
        env_vars: Vec<String>,
    },

    #[error("Invalid value for {var}: '{value}' ({reason})")]
    InvalidValue {
        var: String,
        value: String,
        reason: String,
    },

    #[error("Failed to build client for {provider}: {reason}")]
    ClientBuildFailed { provider: String, reason: String },
}

/// Which web search backend the collector talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchBackend {
    #[default]
    Tavily,
    Brave,
}

impl FromStr for SearchBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tavily" => Ok(Self::Tavily),
            "brave" => Ok(Self::Brave),
            other => Err(ConfigError::InvalidValue {
                var: SEARCH_PROVIDER_ENV.to_string(),
                value: other.to_string(),
                reason: "expected 'tavily' or 'brave'".to_string(),
            }),
        }
    }
}

impl fmt::Display for SearchBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tavily => write!(f, "tavily"),
            Self::Brave => write!(f, "brave"),
        }
    }
}

/// Credentials and endpoint for the selected search backend.
#[derive(Clone, PartialEq, Eq)]
pub enum SearchSettings {
    Tavily { api_key: String, endpoint: String },
    Brave {
        api_key: String,
        endpoint: String,
        plan: BravePlan,
    },
}

impl SearchSettings {
    pub fn backend(&self) -> SearchBackend {
        match self {
            Self::Tavily { .. } => SearchBackend::Tavily,
            Self::Brave { .. } => SearchBackend::Brave,
        }
    }
}

impl fmt::Debug for SearchSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tavily { endpoint, .. } => f
                .debug_struct("Tavily")
                .field("endpoint", endpoint)
                .finish_non_exhaustive(),
            Self::Brave { endpoint, plan, .. } => f
                .debug_struct("Brave")
                .field("endpoint", endpoint)
                .field("plan", plan)
                .finish_non_exhaustive(),
        }
    }
}

/// Fully validated configuration for one research agent.
#[derive(Clone, PartialEq, Eq)]
pub struct DeepSearchConfig {
    pub groq_api_key: String,
    pub groq_base_url: String,
    pub model: String,
    pub query_count: usize,
    pub max_results: u32,
    pub search: SearchSettings,
}

impl fmt::Debug for DeepSearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepSearchConfig")
            .field("groq_base_url", &self.groq_base_url)
            .field("model", &self.model)
            .field("query_count", &self.query_count)
            .field("max_results", &self.max_results)
            .field("search", &self.search)
            .finish_non_exhaustive()
    }
}

impl DeepSearchConfig {
    /// Read configuration from the process environment.
    ///
    /// ## Errors
    ///
    /// Returns `ConfigError::MissingApiKey` when a required credential is
    /// unset or blank, and `ConfigError::InvalidValue` for unparseable
    /// settings.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// Blank values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let groq_api_key = get(GROQ_API_KEY_ENV).ok_or_else(|| ConfigError::MissingApiKey {
            provider: "Groq".to_string(),
            env_vars: vec![GROQ_API_KEY_ENV.to_string()],
        })?;

        let backend = match get(SEARCH_PROVIDER_ENV) {
            Some(value) => value.parse::<SearchBackend>()?,
            None => SearchBackend::default(),
        };

        let search = match backend {
            SearchBackend::Tavily => SearchSettings::Tavily {
                api_key: get(TAVILY_API_KEY_ENV).ok_or_else(|| ConfigError::MissingApiKey {
                    provider: "Tavily".to_string(),
                    env_vars: vec![TAVILY_API_KEY_ENV.to_string()],
                })?,
                endpoint: get(TAVILY_ENDPOINT_ENV).unwrap_or_else(|| TAVILY_ENDPOINT.to_string()),
            },
            SearchBackend::Brave => SearchSettings::Brave {
                api_key: get(BRAVE_API_KEY_ENV).ok_or_else(|| ConfigError::MissingApiKey {
                    provider: "Brave".to_string(),
                    env_vars: vec![BRAVE_API_KEY_ENV.to_string()],
                })?,
                endpoint: BRAVE_ENDPOINT.to_string(),
                plan: get(BRAVE_PLAN_ENV)
                    .map(|s| BravePlan::from(s.as_str()))
                    .unwrap_or_default(),
            },
        };

        let config = Self {
            groq_api_key,
            groq_base_url: get(GROQ_BASE_URL_ENV).unwrap_or_else(|| GROQ_API_BASE_URL.to_string()),
            model: get(MODEL_ENV).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            query_count: parse_number(QUERY_COUNT_ENV, get(QUERY_COUNT_ENV), DEFAULT_QUERY_COUNT)?,
            max_results: parse_number(MAX_RESULTS_ENV, get(MAX_RESULTS_ENV), DEFAULT_MAX_RESULTS)?,
            search,
        };

        debug!(
            model = %config.model,
            search.backend = %config.search.backend(),
            query_count = config.query_count,
            max_results = config.max_results,
            "Configuration loaded"
        );

        Ok(config)
    }
}

fn parse_number<T>(var: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + From<u8>,
    T::Err: fmt::Display,
{
    let Some(raw) = value else {
        return Ok(default);
    };
    let parsed: T = raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        var: var.to_string(),
        value: raw.clone(),
        reason: e.to_string(),
    })?;
    if parsed < T::from(1) {
        return Err(ConfigError::InvalidValue {
            var: var.to_string(),
            value: raw,
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(parsed)
}
