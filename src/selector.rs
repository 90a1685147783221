//! Model-driven target file selection.
//!
//! The selector enumerates candidate files, asks the completion model to
//! pick exactly one for the issue title, and validates the answer against
//! the candidate set. A hallucinated filename is reported as "not found"
//! rather than reaching the edit step.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::completion::TextCompleter;
use crate::errors::PipelineError;

pub struct FileSelector<'a> {
    completer: &'a dyn TextCompleter,
    project_dir: &'a Path,
}

impl<'a> FileSelector<'a> {
    pub fn new(completer: &'a dyn TextCompleter, project_dir: &'a Path) -> Self {
        Self {
            completer,
            project_dir,
        }
    }

    /// Returns the selected repository-relative path, or `None` when no
    /// file could be resolved. Selection is best-effort: relevance is the
    /// model's guess, existence is verified here.
    pub async fn select(&self, title: &str) -> Result<Option<String>, PipelineError> {
        let candidates = candidate_files(self.project_dir)?;
        if candidates.is_empty() {
            debug!("no candidate files in {}", self.project_dir.display());
            return Ok(None);
        }

        let prompt = selection_prompt(&candidates, title);
        let response = self
            .completer
            .complete(&prompt)
            .await
            .context("File selection request failed")?;
        let chosen = response.trim();

        if candidates.iter().any(|c| c == chosen) {
            Ok(Some(chosen.to_string()))
        } else {
            debug!(chosen, "selector response is not an existing candidate file");
            Ok(None)
        }
    }
}

/// Non-hidden regular files at the top level of the project directory,
/// sorted so the prompt (and thus the selection) is deterministic for a
/// given tree.
pub fn candidate_files(project_dir: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(project_dir)
        .with_context(|| format!("Failed to list files in {}", project_dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.context("Failed to read directory entry")?;
        if !entry.file_type().context("Failed to stat entry")?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        files.push(name);
    }
    files.sort();
    Ok(files)
}

fn selection_prompt(candidates: &[String], title: &str) -> String {
    format!(
        "Given these files: [{}], which one relates to: '{}'? Output ONLY the filename.",
        candidates.join(", "),
        title
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::test_support::StubCompleter;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_candidate_files_skips_hidden_and_dirs() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("auth.py"), "x").unwrap();
        fs::write(dir.path().join("readme.md"), "x").unwrap();
        fs::write(dir.path().join(".env"), "SECRET=1").unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();

        let files = candidate_files(dir.path()).unwrap();
        assert_eq!(files, vec!["auth.py", "readme.md"]);
    }

    #[test]
    fn test_selection_prompt_lists_candidates_and_title() {
        let candidates = vec!["auth.py".to_string(), "readme.md".to_string()];
        let prompt = selection_prompt(&candidates, "Login button broken");
        assert!(prompt.contains("auth.py, readme.md"));
        assert!(prompt.contains("Login button broken"));
        assert!(prompt.contains("ONLY the filename"));
    }

    #[tokio::test]
    async fn test_select_returns_existing_candidate() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("auth.py"), "x").unwrap();
        fs::write(dir.path().join("readme.md"), "x").unwrap();
        let stub = StubCompleter::new(vec!["auth.py"]);

        let selector = FileSelector::new(&stub, dir.path());
        let chosen = selector.select("Login button broken").await.unwrap();
        assert_eq!(chosen.as_deref(), Some("auth.py"));
    }

    #[tokio::test]
    async fn test_select_trims_model_response() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("auth.py"), "x").unwrap();
        let stub = StubCompleter::new(vec!["  auth.py\n"]);

        let selector = FileSelector::new(&stub, dir.path());
        let chosen = selector.select("Login broken").await.unwrap();
        assert_eq!(chosen.as_deref(), Some("auth.py"));
    }

    #[tokio::test]
    async fn test_select_rejects_hallucinated_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("auth.py"), "x").unwrap();
        let stub = StubCompleter::new(vec!["database.py"]);

        let selector = FileSelector::new(&stub, dir.path());
        assert!(selector.select("DB is slow").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_select_empty_dir_skips_completion_call() {
        let dir = tempdir().unwrap();
        let stub = StubCompleter::new(vec![]);

        let selector = FileSelector::new(&stub, dir.path());
        assert!(selector.select("anything").await.unwrap().is_none());
        assert_eq!(stub.prompt_count(), 0);
    }

    #[tokio::test]
    async fn test_select_propagates_completer_failure() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("auth.py"), "x").unwrap();
        let stub = StubCompleter::failing("connection refused");

        let selector = FileSelector::new(&stub, dir.path());
        assert!(selector.select("Login broken").await.is_err());
    }
}
