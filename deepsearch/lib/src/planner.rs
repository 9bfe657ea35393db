//! Query planning: turn a free-text task into search keyword phrases.

use tracing::{info, instrument, warn};

use crate::config::DEFAULT_QUERY_COUNT;
use crate::llm::{LanguageModel, ModelError};
use crate::prompts;

/// Asks the language model for a comma-separated list of search phrases.
#[derive(Debug, Clone)]
pub struct QueryPlanner<L> {
    model: L,
    query_count: usize,
}

impl<L: LanguageModel> QueryPlanner<L> {
    pub fn new(model: L) -> Self {
        Self {
            model,
            query_count: DEFAULT_QUERY_COUNT,
        }
    }

    /// Number of phrases requested from the model. Not enforced on the reply.
    #[must_use]
    pub fn with_query_count(mut self, query_count: usize) -> Self {
        self.query_count = query_count;
        self
    }

    /// Produce the search plan for `task`.
    ///
    /// An empty task is passed to the model as-is. Model failures propagate.
    ///
    /// ## Errors
    ///
    /// Returns the `ModelError` of the underlying model call.
    #[instrument(name = "plan", skip_all, fields(task = %task))]
    pub async fn plan(&self, task: &str) -> Result<Vec<String>, ModelError> {
        let count = self.query_count.to_string();
        let user = prompts::render(
            prompts::PLANNER_USER,
            &[("task", task), ("count", count.as_str())],
        );

        let response = self
            .model
            .complete(prompts::PLANNER_SYSTEM.trim_end(), &user)
            .await?;

        let queries = parse_queries(&response);
        if queries.is_empty() {
            warn!(response = %response, "Planner response contained no queries");
        } else {
            info!(queries = ?queries, "Generated search plan");
        }

        Ok(queries)
    }
}

/// Split a model reply into trimmed, non-empty phrases.
///
/// ```
/// use deepsearch_lib::planner::parse_queries;
///
/// assert_eq!(parse_queries("a, b ,c"), vec!["a", "b", "c"]);
/// assert!(parse_queries("").is_empty());
/// ```
pub fn parse_queries(response: &str) -> Vec<String> {
    response
        .split(',')
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Returns a fixed reply and records every prompt it sees.
    struct CannedModel {
        reply: Result<String, String>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl CannedModel {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl LanguageModel for CannedModel {
        async fn complete(&self, system: &str, user: &str) -> Result<String, ModelError> {
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            self.reply.clone().map_err(ModelError::Other)
        }
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse_queries("a, b ,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_drops_trailing_and_doubled_commas() {
        assert_eq!(parse_queries("a, b,"), vec!["a", "b"]);
        assert_eq!(parse_queries("a,, b"), vec!["a", "b"]);
        assert_eq!(parse_queries(" , "), Vec::<String>::new());
    }

    #[test]
    fn test_parse_keeps_single_phrase_and_duplicates() {
        assert_eq!(parse_queries("just one phrase"), vec!["just one phrase"]);
        assert_eq!(parse_queries("x, x"), vec!["x", "x"]);
    }

    #[tokio::test]
    async fn test_plan_builds_prompt_from_task() {
        let model = CannedModel::replying("rust memory safety, rust performance, rust vs c++");
        let planner = QueryPlanner::new(&model);

        let plan = planner
            .plan("benefits of rust for systems programming")
            .await
            .unwrap();

        assert_eq!(
            plan,
            vec!["rust memory safety", "rust performance", "rust vs c++"]
        );

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        let (system, user) = &prompts[0];
        assert_eq!(system, "You are an expert search planner.");
        assert!(user.starts_with("Task: benefits of rust for systems programming"));
        assert!(user.contains("generate 3 highly effective"));
    }

    #[tokio::test]
    async fn test_plan_uses_configured_count() {
        let model = CannedModel::replying("a, b, c, d, e");
        let planner = QueryPlanner::new(&model).with_query_count(5);

        let plan = planner.plan("topic").await.unwrap();
        assert_eq!(plan.len(), 5);
        assert!(model.prompts.lock().unwrap()[0].1.contains("generate 5 highly"));
    }

    #[tokio::test]
    async fn test_plan_passes_empty_task_through() {
        let model = CannedModel::replying("");
        let planner = QueryPlanner::new(&model);

        let plan = planner.plan("").await.unwrap();
        assert!(plan.is_empty());
        assert!(model.prompts.lock().unwrap()[0].1.starts_with("Task: \n"));
    }

    #[tokio::test]
    async fn test_plan_propagates_model_failure() {
        let model = CannedModel::failing("rate limited");
        let planner = QueryPlanner::new(&model);

        let err = planner.plan("topic").await.unwrap_err();
        assert!(err.to_string().contains("rate limited"));
    }
}
