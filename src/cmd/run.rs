//! Pipeline-mode commands: full, generate (preview), commit (finalize).
//!
//! Each command assembles the production collaborators and prints the
//! machine-readable result markers a wrapping system parses:
//! `TARGET_FILE:`, `BRANCH:`, `DIFF_START`/`DIFF_END`, `FILES_CHANGED:`,
//! `PR_URL:`.

use std::path::Path;

use anyhow::Result;

use autopr::completion::OllamaClient;
use autopr::config::Config;
use autopr::pipeline::{CommitReport, IssueReport, Pipeline};
use autopr::vcs::ProcessRunner;

/// Full mode: select, branch, edit, commit, push, open a PR.
pub async fn cmd_run(project_dir: &Path, title: &str, body: Option<&str>) -> Result<()> {
    let config = Config::load(project_dir.to_path_buf())?;
    let runner = ProcessRunner::new(&config.project_dir);
    let completer = OllamaClient::new(&config.ollama_host, &config.model);
    let pipeline = Pipeline::new(&config.project_dir, &completer, &runner);

    let issue = IssueReport::new(title, body);
    let report = pipeline.run_full(&issue).await?;
    print_commit_report(&report);
    Ok(())
}

/// Generate mode: stop after the edit and print the unstaged diff.
pub async fn cmd_generate(project_dir: &Path, title: &str, body: Option<&str>) -> Result<()> {
    let config = Config::load(project_dir.to_path_buf())?;
    let runner = ProcessRunner::new(&config.project_dir);
    let completer = OllamaClient::new(&config.ollama_host, &config.model);
    let pipeline = Pipeline::new(&config.project_dir, &completer, &runner);

    let issue = IssueReport::new(title, body);
    let report = pipeline.run_generate(&issue).await?;

    println!("TARGET_FILE: {}", report.target_file);
    println!("BRANCH: {}", report.branch);
    println!("DIFF_START");
    println!("{}", report.diff);
    println!("DIFF_END");
    println!("FILES_CHANGED: {}", report.files_changed.join(", "));
    Ok(())
}

/// Commit mode: finalize a branch an earlier generate run produced.
pub async fn cmd_commit(
    project_dir: &Path,
    title: &str,
    body: Option<&str>,
    branch: &str,
    file: &str,
) -> Result<()> {
    let config = Config::load(project_dir.to_path_buf())?;
    let runner = ProcessRunner::new(&config.project_dir);
    let completer = OllamaClient::new(&config.ollama_host, &config.model);
    let pipeline = Pipeline::new(&config.project_dir, &completer, &runner);

    let issue = IssueReport::new(title, body);
    let report = pipeline.run_commit(&issue, branch, file).await?;
    print_commit_report(&report);
    Ok(())
}

fn print_commit_report(report: &CommitReport) {
    println!("PR_URL: {}", report.pr_url);
    println!("FILES_CHANGED: {}", report.files_changed.join(", "));
    println!("BRANCH: {}", report.branch);
    println!("Pull request created for {}", report.target_file);
}
