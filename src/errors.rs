//! Typed error hierarchy for the triage pipeline.
//!
//! One enum covers the whole run: selection failures, external command
//! failures, target-file I/O, and the empty-commit guard. Anything that
//! doesn't fit a variant flows through the transparent `anyhow` arm.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The selector produced no usable target file. No VCS command has
    /// been executed when this is raised.
    #[error("No target file resolved for the issue. Aborting.")]
    NoTargetFile,

    /// An external command exited non-zero.
    #[error("Command `{command}` exited with status {exit_code}: {stderr}")]
    Command {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// Commit was requested but the working tree has no change for the
    /// target file (e.g. commit mode without a prior generate run).
    #[error("Nothing to commit for {path}: working tree is clean. Run generate first.")]
    NothingToCommit { path: String },

    #[error("Failed to read target file {path}: {source}")]
    ReadTarget {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write target file {path}: {source}")]
    WriteTarget {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
