//! Stagehand CLI
//!
//! Stages a developer's pending work as a build job on the shared queue.
//!
//! Usage: `stagehand <commit|local> [build-size]`

mod config;
mod error;
mod service;
mod vcs;

use clap::Parser;
use colored::*;
use config::Config;
use error::StageError;
use service::stage::{StageOutcome, StageRequest};
use stagehand_core::domain::patch::PatchMode;
use stagehand_core::dto::job::EnqueueOutcome;
use stagehand_queue::LazyPgJobQueue;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vcs::GitCli;

#[derive(Parser)]
#[command(name = "stagehand")]
#[command(about = "Stage local work as a docs build job", long_about = None)]
struct Cli {
    /// Working tree to stage from
    #[arg(long, env = "STAGE_REPO_DIR", default_value = ".")]
    repo: PathBuf,

    /// What to stage: "commit" or "local"
    mode: Option<String>,

    /// Build size hint
    build_size: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("{} {:#}", "warning:".yellow().bold(), e);
    }

    match stage(cli).await {
        Ok(outcome) => {
            report(&outcome);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("Staging failed: {}", err);
            eprintln!("{} {}", "error:".red().bold(), err);
            match err.guidance() {
                // Usage guidance is part of the command's normal output
                Some(hint) if err.is_usage_error() => println!("{}", hint),
                Some(hint) => eprintln!("  {}", hint),
                None => {}
            }
            ExitCode::from(err.exit_code())
        }
    }
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stagehand=info,stagehand_queue=info".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}

async fn stage(cli: Cli) -> Result<StageOutcome, StageError> {
    let config = Config::from_env(cli.repo)?;
    config.validate()?;

    let mode = cli.mode.ok_or(StageError::MissingMode)?.parse::<PatchMode>()?;
    let request = StageRequest {
        mode,
        build_size: cli.build_size,
    };

    let git = GitCli::new(config.repo_dir.clone(), config.git_timeout);
    let queue = LazyPgJobQueue::new(config.store.clone());

    service::stage::run(&git, &queue, &request).await
}

fn report(outcome: &StageOutcome) {
    match outcome {
        StageOutcome::NothingToStage { mode } => {
            println!(
                "{}",
                format!("Nothing to stage: {} mode found no unpushed commits", mode).yellow()
            );
        }
        StageOutcome::Submitted {
            repo_name,
            branch_name,
            strategy,
            outcome,
        } => {
            match outcome {
                EnqueueOutcome::Inserted(id) => {
                    println!(
                        "{}",
                        "✓ You successfully enqueued a staging job to docs autobuilder"
                            .green()
                            .bold()
                    );
                    println!("  Record id: {}", id.to_string().cyan());
                }
                EnqueueOutcome::AlreadyExists => {
                    println!("{}", "This job already exists".yellow().bold());
                }
            }
            println!("  Repo:      {}", repo_name);
            println!("  Branch:    {}", branch_name);
            println!("  Patch:     {}", strategy);
        }
    }
}
