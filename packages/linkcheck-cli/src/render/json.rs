use link_verifier::{Link, Renderer, RunReport, RunSummary, VerificationResult};
use serde::Serialize;
use std::io::Write;
use std::sync::Mutex;

use super::{lock, ReportRenderer};

/// One JSON object per line: a `result` per finished link, then a `summary`.
pub struct JsonRenderer<W: Write + Send> {
    out: Mutex<W>,
}

#[derive(Serialize)]
struct ResultLine<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    index: usize,
    #[serde(flatten)]
    result: &'a VerificationResult,
}

#[derive(Serialize)]
struct SummaryLine {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    summary: RunSummary,
    duration_ms: i64,
}

impl<W: Write + Send> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, line: &impl Serialize) {
        match serde_json::to_string(line) {
            Ok(json) => {
                let mut out = lock(&self.out);
                let _ = writeln!(out, "{}", json);
                let _ = out.flush();
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize output line"),
        }
    }
}

impl<W: Write + Send> Renderer for JsonRenderer<W> {
    fn render(&self, _links: &[Link]) {}

    fn update(&self, index: usize, result: &VerificationResult) {
        if result.status.is_terminal() {
            self.emit(&ResultLine {
                kind: "result",
                index,
                result,
            });
        }
    }
}

impl<W: Write + Send> ReportRenderer for JsonRenderer<W> {
    fn finish(&self, report: &RunReport) {
        self.emit(&SummaryLine {
            kind: "summary",
            summary: report.summary(),
            duration_ms: (report.finished_at - report.started_at).num_milliseconds(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use link_verifier::LinkStatus;
    use serde_json::Value;

    #[test]
    fn test_result_lines() {
        let renderer = JsonRenderer::new(Vec::new());
        let link = Link::new("docs", "https://docs.example.com");

        renderer.update(0, &VerificationResult::progress(&link, LinkStatus::Checking));
        renderer.update(
            3,
            &VerificationResult::terminal(&link, LinkStatus::Verified, "Link is working."),
        );

        let text = String::from_utf8(renderer.into_inner()).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["type"], "result");
        assert_eq!(lines[0]["index"], 3);
        assert_eq!(lines[0]["status"], "verified");
        assert_eq!(lines[0]["originalUrl"], "https://docs.example.com");
        assert_eq!(lines[0]["analysis"], "Link is working.");
    }
}
