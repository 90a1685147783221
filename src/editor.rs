//! Edit generation: rewrite one file to address an issue.

use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::completion::TextCompleter;
use crate::errors::PipelineError;
use crate::util::strip_code_fences;

pub struct EditGenerator<'a> {
    completer: &'a dyn TextCompleter,
}

impl<'a> EditGenerator<'a> {
    pub fn new(completer: &'a dyn TextCompleter) -> Self {
        Self { completer }
    }

    /// Read `target`, ask the model for a complete replacement body, and
    /// overwrite the file with the fence-stripped response plus exactly
    /// one trailing newline. The prior content is not backed up; version
    /// history is the branch's job.
    pub async fn apply(
        &self,
        project_dir: &Path,
        target: &str,
        title: &str,
        body: &str,
    ) -> Result<String, PipelineError> {
        let path = project_dir.join(target);
        let original = std::fs::read_to_string(&path).map_err(|source| {
            PipelineError::ReadTarget {
                path: path.clone(),
                source,
            }
        })?;

        let prompt = rewrite_prompt(target, title, body, &original);
        info!(file = target, "generating fix");
        let response = self
            .completer
            .complete(&prompt)
            .await
            .context("Edit generation request failed")?;

        let mut fixed = strip_code_fences(&response);
        fixed.push('\n');

        std::fs::write(&path, &fixed).map_err(|source| PipelineError::WriteTarget {
            path: path.clone(),
            source,
        })?;
        info!(file = target, "fix written");

        Ok(fixed)
    }
}

fn rewrite_prompt(target: &str, title: &str, body: &str, original: &str) -> String {
    format!(
        "You are a senior developer. A GitHub issue was filed:\n\
         Title: {}\n\
         Description: {}\n\n\
         Here is the current content of `{}`:\n\
         ```\n{}\n```\n\n\
         Return ONLY the complete updated file content that addresses the issue. \
         No markdown fences, no explanation, no commentary, just the raw code.",
        title, body, target, original
    )
}
