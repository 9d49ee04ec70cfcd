use anyhow::{Context, Result};
use clap::Args;
use link_verifier::{LinkVerifier, VerifierConfig, VerifierError};
use std::io;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::CommonArgs;
use crate::input::read_document;
use crate::render::{JsonRenderer, ReportRenderer, TerminalRenderer};

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Exit with status 1 when any link is invalid or inaccurate
    #[arg(long)]
    pub strict: bool,

    /// Links fetched concurrently
    #[arg(long, default_value_t = 10)]
    pub fetch_batch: usize,

    /// Links verified concurrently
    #[arg(long, default_value_t = 5)]
    pub verify_batch: usize,
}

pub async fn run(args: CheckArgs) -> Result<ExitCode> {
    let markdown = read_document(args.common.input.as_deref())?;
    let config = VerifierConfig::new().with_batch_sizes(args.fetch_batch, args.verify_batch);
    let verifier = args.common.verifier(config)?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping after the current batch");
                cancel.cancel();
            }
        }
    });

    let failed = if args.common.json {
        check_with(&verifier, &markdown, &JsonRenderer::new(io::stdout()), &cancel).await?
    } else {
        check_with(&verifier, &markdown, &TerminalRenderer::new(io::stdout()), &cancel).await?
    };

    match failed {
        None => Ok(ExitCode::from(130)),
        Some(true) if args.strict => Ok(ExitCode::FAILURE),
        Some(_) => Ok(ExitCode::SUCCESS),
    }
}

/// Returns whether any link failed, or `None` when the run was cancelled.
async fn check_with<R: ReportRenderer>(
    verifier: &LinkVerifier,
    markdown: &str,
    renderer: &R,
    cancel: &CancellationToken,
) -> Result<Option<bool>> {
    match verifier.run(markdown, renderer, cancel).await {
        Ok(report) => {
            renderer.finish(&report);
            Ok(Some(report.summary().has_failures()))
        }
        Err(VerifierError::Cancelled) => {
            eprintln!("Cancelled.");
            Ok(None)
        }
        Err(e) => Err(e).context("Link check failed"),
    }
}
