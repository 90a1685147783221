//! External command execution and the git/hosting operations built on it.
//!
//! Every command is an explicit program + argument vector run through
//! `tokio::process::Command`. No shell is ever involved, so issue titles,
//! bodies, filenames and branch names are inert single arguments no matter
//! what metacharacters they contain.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

use crate::errors::PipelineError;

/// Captured result of one external command.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Executes a program with an argument vector. The trait exists so the
/// orchestrator can be driven against a recording double in tests.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutcome>;
}

/// Real runner: spawns the process in the project directory and captures
/// stdout/stderr, trimmed of surrounding whitespace.
pub struct ProcessRunner {
    project_dir: PathBuf,
}

impl ProcessRunner {
    pub fn new(project_dir: &Path) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
        }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutcome> {
        let output = Command::new(program)
            .args(args)
            .current_dir(&self.project_dir)
            .output()
            .await
            .with_context(|| format!("Failed to spawn `{}`", program))?;

        Ok(CommandOutcome {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Git and code-hosting operations used by the pipeline. All domain
/// meaning (which commands, in which order) lives in the orchestrator;
/// this type only knows how to phrase each step as an argument vector.
pub struct Git<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Git<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Run a command whose non-zero exit aborts the pipeline.
    async fn run_checked(
        &self,
        program: &str,
        args: &[&str],
    ) -> Result<CommandOutcome, PipelineError> {
        let outcome = self.runner.run(program, args).await?;
        if !outcome.success() {
            return Err(PipelineError::Command {
                command: format!("{} {}", program, args.join(" ")),
                exit_code: outcome.exit_code,
                stderr: outcome.stderr,
            });
        }
        Ok(outcome)
    }

    pub async fn create_branch(&self, name: &str) -> Result<(), PipelineError> {
        self.run_checked("git", &["checkout", "-b", name]).await?;
        Ok(())
    }

    pub async fn checkout(&self, name: &str) -> Result<(), PipelineError> {
        self.run_checked("git", &["checkout", name]).await?;
        Ok(())
    }

    pub async fn current_branch(&self) -> Result<String, PipelineError> {
        let outcome = self
            .run_checked("git", &["branch", "--show-current"])
            .await?;
        Ok(outcome.stdout)
    }

    /// Unstaged diff for one file. A non-zero exit is not meaningful here
    /// and an empty diff is a valid outcome, so the raw stdout is returned
    /// either way.
    pub async fn diff_file(&self, path: &str) -> Result<String, PipelineError> {
        let outcome = self.runner.run("git", &["diff", "--", path]).await?;
        Ok(outcome.stdout)
    }

    /// Whether the working tree differs from HEAD for the given file.
    pub async fn has_changes(&self, path: &str) -> Result<bool, PipelineError> {
        let outcome = self
            .run_checked("git", &["status", "--porcelain", "--", path])
            .await?;
        Ok(!outcome.stdout.is_empty())
    }

    pub async fn stage(&self, path: &str) -> Result<(), PipelineError> {
        self.run_checked("git", &["add", "--", path]).await?;
        Ok(())
    }

    pub async fn commit(&self, message: &str) -> Result<(), PipelineError> {
        self.run_checked("git", &["commit", "-m", message]).await?;
        Ok(())
    }

    pub async fn push(&self, branch: &str) -> Result<(), PipelineError> {
        self.run_checked("git", &["push", "origin", branch]).await?;
        Ok(())
    }

    /// Open a pull request via `gh`. Returns the PR URL from stdout.
    pub async fn create_pr(&self, title: &str, body: &str) -> Result<String, PipelineError> {
        let outcome = self
            .run_checked("gh", &["pr", "create", "--title", title, "--body", body])
            .await?;
        Ok(outcome.stdout)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingRunner;
    use super::*;

    #[tokio::test]
    async fn test_process_runner_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(dir.path());
        let outcome = runner.run("echo", &["hello world"]).await.unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.stdout, "hello world");
        assert!(outcome.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_process_runner_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(dir.path());
        let outcome = runner.run("false", &[]).await.unwrap();
        assert!(!outcome.success());
        assert_eq!(outcome.exit_code, 1);
    }

    #[tokio::test]
    async fn test_process_runner_missing_program_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(dir.path());
        assert!(
            runner
                .run("autopr-no-such-program", &[])
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_metacharacters_stay_in_one_argument() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(dir.path());
        let hostile = "fix; rm -rf / && echo pwned";
        let outcome = runner.run("echo", &[hostile]).await.unwrap();
        // The shell never sees the string: echo prints it back verbatim.
        assert_eq!(outcome.stdout, hostile);
    }

    #[tokio::test]
    async fn test_checked_command_failure_carries_stderr() {
        let runner = RecordingRunner::new()
            .script(vec![RecordingRunner::fail(128, "fatal: not a git repository")]);
        let git = Git::new(&runner);
        let err = git.create_branch("fix-auth").await.unwrap_err();
        match err {
            PipelineError::Command {
                command,
                exit_code,
                stderr,
            } => {
                assert_eq!(command, "git checkout -b fix-auth");
                assert_eq!(exit_code, 128);
                assert_eq!(stderr, "fatal: not a git repository");
            }
            other => panic!("Expected Command error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_diff_file_tolerates_nonzero_exit() {
        let runner =
            RecordingRunner::new().script(vec![RecordingRunner::fail(1, "some warning")]);
        let git = Git::new(&runner);
        let diff = git.diff_file("auth.py").await.unwrap();
        assert_eq!(diff, "");
    }

    #[tokio::test]
    async fn test_has_changes_reflects_porcelain_output() {
        let runner = RecordingRunner::new().script(vec![
            RecordingRunner::ok(" M auth.py"),
            RecordingRunner::ok(""),
        ]);
        let git = Git::new(&runner);
        assert!(git.has_changes("auth.py").await.unwrap());
        assert!(!git.has_changes("auth.py").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_pr_returns_url() {
        let runner = RecordingRunner::new()
            .script(vec![RecordingRunner::ok("https://github.com/o/r/pull/7")]);
        let git = Git::new(&runner);
        let url = git.create_pr("Login button broken", "").await.unwrap();
        assert_eq!(url, "https://github.com/o/r/pull/7");
        assert_eq!(
            runner.command_lines(),
            vec!["gh pr create --title Login button broken --body "]
        );
    }

    #[tokio::test]
    async fn test_commit_message_is_a_single_argument() {
        let runner = RecordingRunner::new();
        let git = Git::new(&runner);
        git.commit("AI Refactor: fix; rm -rf /").await.unwrap();
        let calls = runner.calls.lock().unwrap();
        let (program, args) = &calls[0];
        assert_eq!(program, "git");
        assert_eq!(args, &["commit", "-m", "AI Refactor: fix; rm -rf /"]);
    }
}
