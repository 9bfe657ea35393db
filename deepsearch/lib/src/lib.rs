//! DeepSearch - plan, search and write research reports
//!
//! Given a topic, the workflow:
//!
//! 1. asks a language model for a few search phrases ([`planner`]),
//! 2. runs each phrase against a web search API and formats the hits
//!    as cited content blocks ([`collector`]),
//! 3. asks the model to synthesize the blocks into a markdown report
//!    with `[Source: URL]` citations ([`writer`]).
//!
//! [`ResearchAgent`] strings the three steps together. The model is reached
//! through rig-core (Groq's OpenAI-compatible API by default) and search goes
//! to Tavily or Brave.
//!
//! ```no_run
//! use deepsearch_lib::{DeepSearchConfig, DefaultAgent};
//!
//! # async fn demo() -> Result<(), deepsearch_lib::ResearchError> {
//! let config = DeepSearchConfig::from_env()?;
//! let agent = DefaultAgent::from_config(&config)?;
//! let state = agent.run("benefits of rust for systems programming").await?;
//! println!("{}", state.final_report);
//! # Ok(())
//! # }
//! ```

pub mod citations;
pub mod collector;
pub mod config;
pub mod export;
pub mod llm;
pub mod planner;
pub mod prompts;
pub mod search;
pub mod workflow;
pub mod writer;

use thiserror::Error;

pub use citations::{CitationAudit, audit_citations, extract_citations};
pub use collector::ContentCollector;
pub use config::{ConfigError, DeepSearchConfig, SearchBackend};
pub use llm::{LanguageModel, ModelError, RigModel};
pub use planner::QueryPlanner;
pub use search::{SearchError, SearchHit, SearchProvider, SearchRequest, SearchResponse, WebSearch};
pub use workflow::{DefaultAgent, ResearchAgent, WorkflowState};
pub use writer::ReportWriter;

/// Errors that can end a research run
#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Planning failed: {0}")]
    Planning(#[source] ModelError),

    #[error("Report writing failed: {0}")]
    Writing(#[source] ModelError),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

impl ResearchError {
    /// True for errors raised before any network call was attempted.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
