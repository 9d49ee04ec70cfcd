use colored::{ColoredString, Colorize};
use link_verifier::{Link, LinkStatus, Renderer, RunReport, VerificationResult};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{lock, ReportRenderer};

const TEXT_WIDTH: usize = 40;

/// Prints the link table up front, then one line per finished link.
pub struct TerminalRenderer<W: Write + Send> {
    out: Mutex<W>,
    total: AtomicUsize,
    done: AtomicUsize,
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            total: AtomicUsize::new(0),
            done: AtomicUsize::new(0),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn render(&self, links: &[Link]) {
        self.total.store(links.len(), Ordering::SeqCst);
        let mut out = lock(&self.out);

        if links.is_empty() {
            let _ = writeln!(out, "{}", "No links found.".yellow());
            return;
        }

        let citations = links.iter().filter(|l| l.is_citation).count();
        let _ = writeln!(
            out,
            "{} {} links ({} citations, {} regular)",
            "Checking".bold(),
            links.len(),
            citations,
            links.len() - citations
        );
        let _ = writeln!(out);

        for (index, link) in links.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>3}  {}  {:<width$}  {}",
                index + 1,
                kind_label(link.is_citation),
                shorten(&link.text, TEXT_WIDTH),
                link.url.dimmed(),
                width = TEXT_WIDTH
            );
        }
        let _ = writeln!(out);
    }

    fn update(&self, index: usize, result: &VerificationResult) {
        if !result.status.is_terminal() {
            return;
        }

        let done = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        let total = self.total.load(Ordering::SeqCst);
        let mut out = lock(&self.out);

        let _ = writeln!(
            out,
            "[{}/{}] {:>3}  {}  {}  {}",
            done,
            total,
            index + 1,
            status_label(result.status),
            kind_label(result.is_citation),
            shorten(&result.link_text, TEXT_WIDTH)
        );
        if let Some(analysis) = &result.analysis {
            let _ = writeln!(out, "        {}", analysis);
        }
        if let Some(suggested) = &result.suggested_url {
            let _ = writeln!(out, "        {} {}", "Suggested:".cyan(), suggested);
        }
    }
}

impl<W: Write + Send> ReportRenderer for TerminalRenderer<W> {
    fn finish(&self, report: &RunReport) {
        let summary = report.summary();
        let line = summary.to_string();
        let line = if summary.has_failures() {
            line.red().bold()
        } else {
            line.green().bold()
        };

        let mut out = lock(&self.out);
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", line);
    }
}

fn status_label(status: LinkStatus) -> ColoredString {
    let label = format!("{:<10}", status.as_str());
    match status {
        LinkStatus::Verified => label.green(),
        LinkStatus::Invalid => label.red(),
        LinkStatus::Inaccurate => label.yellow(),
        _ => label.normal(),
    }
}

fn kind_label(is_citation: bool) -> ColoredString {
    if is_citation {
        "citation".magenta()
    } else {
        "regular ".normal()
    }
}

fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max.saturating_sub(3)).collect();
    short.push_str("...");
    short
}
