use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "autopr")]
#[command(version, about = "Automated issue-to-pull-request triage pipeline")]
pub struct Cli {
    /// Repository to operate on. Defaults to the current directory.
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline: select a file, generate a fix, commit,
    /// push, and open a pull request
    Run {
        /// Issue title
        title: String,
        /// Issue body
        body: Option<String>,
    },
    /// Preview mode: create the branch and edit, print the diff, but do
    /// not stage, commit, or push
    Generate {
        /// Issue title
        title: String,
        /// Issue body
        body: Option<String>,
    },
    /// Finalize a previously generated edit into a pushed pull request
    Commit {
        /// Issue title
        title: String,
        /// Issue body
        body: Option<String>,
        /// Branch the generate run created
        #[arg(long)]
        branch: String,
        /// Target file the generate run edited
        #[arg(long)]
        file: String,
    },
    /// Listen for GitHub issue webhooks and run the full pipeline per
    /// newly opened issue
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Permissive CORS for local development
        #[arg(long)]
        dev: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Run { title, body } => {
            cmd::cmd_run(&project_dir, title, body.as_deref()).await?;
        }
        Commands::Generate { title, body } => {
            cmd::cmd_generate(&project_dir, title, body.as_deref()).await?;
        }
        Commands::Commit {
            title,
            body,
            branch,
            file,
        } => {
            cmd::cmd_commit(&project_dir, title, body.as_deref(), branch, file).await?;
        }
        Commands::Serve { port, dev } => {
            cmd::cmd_serve(&project_dir, *port, *dev).await?;
        }
    }

    Ok(())
}
