//! Saving reports to disk.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

/// Number of task characters used in the default report filename.
const FILENAME_TASK_CHARS: usize = 10;

/// Default filename for a report: `report_<first 10 chars of task>.md`.
///
/// Whitespace and path separators in that prefix become `_`.
///
/// ```
/// use deepsearch_lib::export::report_filename;
///
/// assert_eq!(report_filename("AI trends in healthcare"), "report_AI_trends_.md");
/// ```
pub fn report_filename(task: &str) -> String {
    let stem: String = task
        .chars()
        .take(FILENAME_TASK_CHARS)
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!("report_{stem}.md")
}

/// Write `report` to `path`, creating parent directories as needed.
///
/// ## Errors
///
/// Returns any I/O error from creating directories or writing the file.
pub async fn save_report(path: &Path, report: &str) -> Result<PathBuf, std::io::Error> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, report).await?;
    info!(path = %path.display(), bytes = report.len(), "Saved report");
    Ok(path.to_path_buf())
}
