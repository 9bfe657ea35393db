//! The plan → research → write workflow.
//!
//! [`ResearchAgent::run`] calls the three steps in fixed order. Each step
//! gets only what it reads and returns only what it produces; the agent
//! assembles the [`WorkflowState`] once all three have succeeded, so a
//! failed run never exposes a partially filled state.

use std::sync::Arc;
use std::time::Instant;

use rig::providers::openai::completion::CompletionModel;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::ResearchError;
use crate::citations::{CitationAudit, audit_citations};
use crate::collector::ContentCollector;
use crate::config::DeepSearchConfig;
use crate::llm::groq;
use crate::llm::{LanguageModel, RigModel};
use crate::planner::QueryPlanner;
use crate::search::{SearchProvider, WebSearch};
use crate::writer::ReportWriter;

/// Result of one research run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// The research topic as supplied by the caller
    pub task: String,
    /// Search phrases produced by the planner
    pub plan: Vec<String>,
    /// Formatted content blocks, in plan order then result order
    pub content: Vec<String>,
    /// Markdown report produced by the writer
    pub final_report: String,
}

impl WorkflowState {
    /// Check the report's `[Source: URL]` tags against the collected content.
    pub fn citation_audit(&self) -> CitationAudit {
        audit_citations(&self.final_report, &self.content)
    }
}

/// The production agent: Groq for the model, the configured search backend.
pub type DefaultAgent = ResearchAgent<Arc<RigModel<CompletionModel>>, WebSearch>;

/// Runs the research workflow against a language model and a search provider.
#[derive(Debug)]
pub struct ResearchAgent<L, S> {
    planner: QueryPlanner<L>,
    collector: ContentCollector<S>,
    writer: ReportWriter<L>,
}

impl<L, S> ResearchAgent<L, S>
where
    L: LanguageModel + Clone,
    S: SearchProvider,
{
    /// Build an agent with default step settings.
    pub fn new(model: L, search: S) -> Self {
        Self {
            planner: QueryPlanner::new(model.clone()),
            collector: ContentCollector::new(search),
            writer: ReportWriter::new(model),
        }
    }

    /// Build an agent from explicitly configured steps.
    pub fn from_steps(
        planner: QueryPlanner<L>,
        collector: ContentCollector<S>,
        writer: ReportWriter<L>,
    ) -> Self {
        Self {
            planner,
            collector,
            writer,
        }
    }

    /// Run plan → research → write for `task`.
    ///
    /// ## Errors
    ///
    /// Returns `ResearchError::Planning` or `ResearchError::Writing` when the
    /// corresponding model call fails. Search failures never fail the run.
    #[instrument(name = "research_run", skip_all, fields(task = %task))]
    pub async fn run(&self, task: &str) -> Result<WorkflowState, ResearchError> {
        let start = Instant::now();
        info!("Starting research");

        let plan = self
            .planner
            .plan(task)
            .await
            .map_err(ResearchError::Planning)?;

        let content = self.collector.collect(&plan).await;

        let final_report = self
            .writer
            .write(task, &content)
            .await
            .map_err(ResearchError::Writing)?;

        let state = WorkflowState {
            task: task.to_string(),
            plan,
            content,
            final_report,
        };

        let audit = state.citation_audit();
        if !audit.is_clean() {
            warn!(
                unverified = ?audit.unverified,
                "Report cites sources that were not collected"
            );
        }

        info!(
            queries = state.plan.len(),
            blocks = state.content.len(),
            citations = audit.cited.len(),
            elapsed_secs = start.elapsed().as_secs_f32(),
            "Research complete"
        );

        Ok(state)
    }
}

impl DefaultAgent {
    /// Build the production agent from configuration.
    ///
    /// No request is sent here; only clients are constructed.
    ///
    /// ## Errors
    ///
    /// Returns `ResearchError::Config` if the model client cannot be built.
    pub fn from_config(config: &DeepSearchConfig) -> Result<Self, ResearchError> {
        let client = groq::Client::builder(&config.groq_api_key)
            .base_url(&config.groq_base_url)
            .build()?;
        let model = Arc::new(client.language_model(&config.model));
        let search = WebSearch::from_settings(&config.search);

        info!(
            model = %config.model,
            search.backend = %config.search.backend(),
            "Research agent ready"
        );

        Ok(Self::from_steps(
            QueryPlanner::new(Arc::clone(&model)).with_query_count(config.query_count),
            ContentCollector::new(search).with_max_results(config.max_results),
            ReportWriter::new(model),
        ))
    }

    /// Load configuration from the environment and build the production agent.
    ///
    /// ## Errors
    ///
    /// Returns `ResearchError::Config` when credentials are missing or a
    /// setting is invalid.
    pub fn from_env() -> Result<Self, ResearchError> {
        let config = DeepSearchConfig::from_env()?;
        Self::from_config(&config)
    }
}
