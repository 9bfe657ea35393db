//! Language-model capability.
//!
//! The workflow only ever needs one thing from a model: given a system turn
//! and a user turn, produce text. [`LanguageModel`] captures that, and
//! [`RigModel`] implements it for any rig-core completion model.

pub mod groq;

use std::future::Future;

use rig::completion::{AssistantContent, CompletionError, CompletionModel};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::TEMPERATURE;

/// Errors from a language-model call.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Completion request failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("{0}")]
    Other(String),
}

/// A synchronous-per-call text generator driven by a two-turn prompt.
pub trait LanguageModel: Send + Sync {
    /// Send one system turn and one user turn, returning the generated text.
    fn complete(
        &self,
        system: &str,
        user: &str,
    ) -> impl Future<Output = Result<String, ModelError>> + Send;
}

/// Adapts a rig-core [`CompletionModel`] to [`LanguageModel`].
///
/// The system turn is sent as the request preamble and the temperature is
/// pinned so repeated runs over the same inputs stay close to deterministic.
#[derive(Clone)]
pub struct RigModel<M> {
    model: M,
    name: String,
    temperature: f64,
}

impl<M: CompletionModel> RigModel<M> {
    pub fn new(model: M, name: impl Into<String>) -> Self {
        Self {
            model,
            name: name.into(),
            temperature: TEMPERATURE,
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<M> std::fmt::Debug for RigModel<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RigModel")
            .field("name", &self.name)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl<M> LanguageModel for RigModel<M>
where
    M: CompletionModel + Send + Sync,
{
    #[instrument(name = "llm_complete", skip_all, fields(model = %self.name))]
    async fn complete(&self, system: &str, user: &str) -> Result<String, ModelError> {
        let response = self
            .model
            .completion_request(user.to_string())
            .preamble(system.to_string())
            .temperature(self.temperature)
            .send()
            .await?;

        let text = response
            .choice
            .into_iter()
            .filter_map(|c| match c {
                AssistantContent::Text(text) => Some(text.text),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            response_len = text.len(),
            "Model responded"
        );

        Ok(text)
    }
}

impl<L: LanguageModel> LanguageModel for std::sync::Arc<L> {
    fn complete(
        &self,
        system: &str,
        user: &str,
    ) -> impl Future<Output = Result<String, ModelError>> + Send {
        (**self).complete(system, user)
    }
}

impl<L: LanguageModel> LanguageModel for &L {
    fn complete(
        &self,
        system: &str,
        user: &str,
    ) -> impl Future<Output = Result<String, ModelError>> + Send {
        (**self).complete(system, user)
    }
}
