use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Read the document from `path`, or from stdin when it is absent or `-`.
pub fn read_document(path: Option<&Path>) -> Result<String> {
    let markdown = match path {
        Some(p) if p != Path::new("-") => {
            fs::read_to_string(p).with_context(|| format!("Failed to read {}", p.display()))?
        }
        _ => read_from(io::stdin().lock()).context("Failed to read stdin")?,
    };

    if markdown.trim().is_empty() {
        bail!("Input is empty");
    }
    Ok(markdown)
}

fn read_from(mut reader: impl Read) -> io::Result<String> {
    let mut buffer = String::new();
    reader.read_to_string(&mut buffer)?;
    Ok(buffer)
}
