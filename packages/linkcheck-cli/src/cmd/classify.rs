use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use link_verifier::{Link, VerifierConfig};
use std::io::{self, Write};

use super::CommonArgs;
use crate::input::read_document;

#[derive(Args, Debug, Clone)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Extract and classify links without fetching any of them.
pub async fn run(args: ClassifyArgs) -> Result<()> {
    let markdown = read_document(args.common.input.as_deref())?;
    let verifier = args.common.verifier(VerifierConfig::new())?;

    let links = verifier.classify(&markdown).await;

    let mut out = io::stdout().lock();
    if args.common.json {
        serde_json::to_writer_pretty(&mut out, &links).context("Failed to write JSON")?;
        writeln!(out)?;
    } else {
        print_links(&mut out, &links)?;
    }
    Ok(())
}

fn print_links(out: &mut impl Write, links: &[Link]) -> io::Result<()> {
    if links.is_empty() {
        return writeln!(out, "{}", "No links found.".yellow());
    }

    for (index, link) in links.iter().enumerate() {
        let kind = if link.is_citation {
            "citation".magenta()
        } else {
            "regular".normal()
        };
        writeln!(out, "{:>3}  {}  {}  {}", index + 1, kind, link.text, link.url.dimmed())?;
        writeln!(out, "     {}", link.context.dimmed())?;
        if !link.features.unlinked_numbers.is_empty() {
            writeln!(
                out,
                "     unlinked figures: {}",
                link.features.unlinked_numbers.join(", ")
            )?;
        }
    }
    Ok(())
}
