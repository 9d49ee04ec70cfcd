//! linkcheck
//!
//! Reads a markdown document, classifies each link as a citation or a
//! regular link, and checks that links work and that citations support the
//! claims made around them.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cmd;
mod config;
mod input;
mod render;

#[derive(Parser)]
#[command(name = "linkcheck")]
#[command(about = "Check links and citations in a markdown document")]
#[command(version)]
struct Cli {
    /// Log pipeline progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify every link: liveness for regular links, grounding for citations
    Check(cmd::check::CheckArgs),

    /// Only extract and classify links
    Classify(cmd::classify::ClassifyArgs),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "info,link_verifier=debug"
    } else {
        "warn"
    };
    // stdout carries only the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Check(args) => cmd::check::run(args).await,
        Commands::Classify(args) => {
            cmd::classify::run(args).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
