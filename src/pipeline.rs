//! The orchestration core: sequences file selection, branch creation,
//! edit generation, and the stage/commit/push/PR finalization.
//!
//! Three modes share one deterministic branch-derivation rule:
//! - `generate` stops after the edit and reports a diff (preview),
//! - `commit` finalizes a branch a prior generate run produced,
//! - `full` runs both halves in one uninterrupted pass.
//!
//! Any failing step aborts the run immediately; branches or edits created
//! before the failure are left in place for manual cleanup.

use std::path::Path;

use tracing::info;

use crate::completion::TextCompleter;
use crate::editor::EditGenerator;
use crate::errors::PipelineError;
use crate::selector::FileSelector;
use crate::vcs::{CommandRunner, Git};

/// The (title, body) pair describing a requested change. Immutable input
/// to a run.
#[derive(Debug, Clone)]
pub struct IssueReport {
    pub title: String,
    pub body: String,
}

impl IssueReport {
    pub fn new(title: &str, body: Option<&str>) -> Self {
        Self {
            title: title.to_string(),
            body: body.unwrap_or("").to_string(),
        }
    }
}

/// Result of a generate-mode (preview) run.
#[derive(Debug)]
pub struct GenerateReport {
    pub target_file: String,
    pub branch: String,
    pub diff: String,
    pub files_changed: Vec<String>,
}

/// Result of a commit-mode or full-mode run.
#[derive(Debug)]
pub struct CommitReport {
    pub target_file: String,
    pub branch: String,
    pub pr_url: String,
    pub files_changed: Vec<String>,
}

/// Derive the branch name for a target file: `fix-` plus everything
/// before the first `.` of the path. Pure function of the path only, so
/// a later commit-mode invocation reconnects to the branch a generate
/// run created.
pub fn branch_for_file(target_file: &str) -> String {
    let stem = target_file.split('.').next().unwrap_or(target_file);
    format!("fix-{}", stem)
}

/// Fixed commit message template.
pub fn commit_message(title: &str) -> String {
    format!("AI Refactor: {}", title)
}

pub struct Pipeline<'a> {
    project_dir: &'a Path,
    completer: &'a dyn TextCompleter,
    git: Git<'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        project_dir: &'a Path,
        completer: &'a dyn TextCompleter,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            project_dir,
            completer,
            git: Git::new(runner),
        }
    }

    /// Phase 1: select the target, create its branch, apply the edit, and
    /// report the unstaged diff. Nothing is staged, committed or pushed.
    pub async fn run_generate(
        &self,
        issue: &IssueReport,
    ) -> Result<GenerateReport, PipelineError> {
        let (target_file, branch) = self.select_and_branch(issue).await?;

        EditGenerator::new(self.completer)
            .apply(self.project_dir, &target_file, &issue.title, &issue.body)
            .await?;

        let diff = self.git.diff_file(&target_file).await?;

        Ok(GenerateReport {
            files_changed: vec![target_file.clone()],
            target_file,
            branch,
            diff,
        })
    }

    /// Phase 2: finalize a previously generated edit on `branch` into a
    /// pushed pull request. Assumes the edit already exists on that
    /// branch; verifies the working tree actually differs before staging
    /// so an empty generate run cannot produce an empty commit.
    pub async fn run_commit(
        &self,
        issue: &IssueReport,
        branch: &str,
        target_file: &str,
    ) -> Result<CommitReport, PipelineError> {
        let current = self.git.current_branch().await?;
        if current != branch {
            info!(from = %current, to = %branch, "switching branch");
            self.git.checkout(branch).await?;
        }

        self.finalize(issue, branch, target_file).await
    }

    /// Full mode: generate and finalize in one uninterrupted run, with no
    /// preview pause. The branch was just created, so no checkout switch
    /// is needed.
    pub async fn run_full(&self, issue: &IssueReport) -> Result<CommitReport, PipelineError> {
        let (target_file, branch) = self.select_and_branch(issue).await?;

        EditGenerator::new(self.completer)
            .apply(self.project_dir, &target_file, &issue.title, &issue.body)
            .await?;

        self.finalize(issue, &branch, &target_file).await
    }

    async fn select_and_branch(
        &self,
        issue: &IssueReport,
    ) -> Result<(String, String), PipelineError> {
        let selector = FileSelector::new(self.completer, self.project_dir);
        let target_file = selector
            .select(&issue.title)
            .await?
            .ok_or(PipelineError::NoTargetFile)?;
        info!(file = %target_file, "selector identified target");

        let branch = branch_for_file(&target_file);
        self.git.create_branch(&branch).await?;
        info!(branch = %branch, "branch created");

        Ok((target_file, branch))
    }

    async fn finalize(
        &self,
        issue: &IssueReport,
        branch: &str,
        target_file: &str,
    ) -> Result<CommitReport, PipelineError> {
        if !self.git.has_changes(target_file).await? {
            return Err(PipelineError::NothingToCommit {
                path: target_file.to_string(),
            });
        }

        self.git.stage(target_file).await?;
        self.git.commit(&commit_message(&issue.title)).await?;
        info!("changes committed");
        self.git.push(branch).await?;
        info!(branch = %branch, "pushed to origin");
        let pr_url = self.git.create_pr(&issue.title, &issue.body).await?;
        info!(pr_url = %pr_url, "pull request created");

        Ok(CommitReport {
            target_file: target_file.to_string(),
            branch: branch.to_string(),
            pr_url,
            files_changed: vec![target_file.to_string()],
        })
    }
}
