//! Groq API client built on rig's OpenAI-compatible Chat Completions client.
//!
//! ```no_run
//! use deepsearch_lib::llm::groq::{Client, LLAMA_3_3_70B_VERSATILE};
//!
//! let client = Client::new("gsk_...").expect("client builds");
//! let model = client.language_model(LLAMA_3_3_70B_VERSATILE);
//! ```
//!
//! See: <https://console.groq.com/docs/openai>

use rig::client::CompletionClient;
use rig::providers::openai;
use rig::providers::openai::completion::CompletionModel;

use crate::config::ConfigError;
use crate::llm::RigModel;

/// Groq OpenAI-compatible base URL
pub const GROQ_API_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Environment variable for the Groq API key
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";

pub const LLAMA_3_3_70B_VERSATILE: &str = "llama-3.3-70b-versatile";

/// Groq client wrapping the OpenAI-compatible Chat Completions API
pub struct Client {
    inner: openai::CompletionsClient,
    base_url: String,
}

impl Client {
    /// Create a new Groq client with the given API key
    ///
    /// ## Errors
    ///
    /// Returns `ConfigError::ClientBuildFailed` if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(api_key: &str) -> Result<Self, ConfigError> {
        ClientBuilder::new(api_key).build()
    }

    pub fn builder(api_key: &str) -> ClientBuilder {
        ClientBuilder::new(api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get a completion model by name
    pub fn completion_model(&self, model: &str) -> CompletionModel {
        self.inner.completion_model(model)
    }

    /// Get a completion model already adapted for the research workflow
    pub fn language_model(&self, model: &str) -> RigModel<CompletionModel> {
        RigModel::new(self.completion_model(model), model)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Builder for Groq client configuration
pub struct ClientBuilder {
    api_key: String,
    base_url: String,
}

impl ClientBuilder {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: GROQ_API_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different OpenAI-compatible endpoint
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Build the Groq client
    ///
    /// ## Errors
    ///
    /// Returns `ConfigError::ClientBuildFailed` if the underlying HTTP client
    /// cannot be constructed.
    pub fn build(self) -> Result<Client, ConfigError> {
        let inner = openai::CompletionsClient::builder()
            .api_key(&self.api_key)
            .base_url(&self.base_url)
            .build()
            .map_err(|e| ConfigError::ClientBuildFailed {
                provider: "Groq".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Client {
            inner,
            base_url: self.base_url,
        })
    }
}
