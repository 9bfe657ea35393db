//! Report writing: synthesize the task and collected content into markdown.

use tracing::{info, instrument};

use crate::llm::{LanguageModel, ModelError};
use crate::prompts;

/// Separator placed between content blocks in the reference materials.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Asks the language model for a cited markdown report.
#[derive(Debug, Clone)]
pub struct ReportWriter<L> {
    model: L,
}

impl<L: LanguageModel> ReportWriter<L> {
    pub fn new(model: L) -> Self {
        Self { model }
    }

    /// Write the report. The model's reply is returned verbatim.
    ///
    /// Empty `content` is not an error; the prompt tells the model to say
    /// when the materials are insufficient.
    ///
    /// ## Errors
    ///
    /// Returns the `ModelError` of the underlying model call.
    #[instrument(name = "write", skip_all, fields(blocks = content.len()))]
    pub async fn write(&self, task: &str, content: &[String]) -> Result<String, ModelError> {
        let materials = content.join(BLOCK_SEPARATOR);
        let user = prompts::render(
            prompts::WRITER_USER,
            &[("task", task), ("content", materials.as_str())],
        );

        let report = self
            .model
            .complete(prompts::WRITER_SYSTEM.trim_end(), &user)
            .await?;

        info!(report_len = report.len(), "Report written");
        Ok(report)
    }
}
