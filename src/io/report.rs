use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::write_atomic;
use crate::models::{DocumentationRecord, SessionId};

/// A laid-out report that has not been written yet
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub path: PathBuf,
    pub text: String,
}

/// Produces the human-readable artifact for a documentation record.
///
/// Layout and persistence are separate steps so callers can finish all
/// fallible computation before anything touches storage.
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    /// Lay out the report and decide where it goes. No I/O.
    fn format(&self, session_id: &SessionId, record: &DocumentationRecord) -> RenderedReport;

    /// Persist a report produced by [`format`](Self::format)
    async fn write(&self, report: &RenderedReport) -> Result<()>;
}

/// Configuration for the plain-text report
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Lines per page before a form feed
    pub lines_per_page: usize,
    /// Wrap width for body text
    pub wrap_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            lines_per_page: 60,
            wrap_width: 80,
        }
    }
}

/// Writes `interview_<Candidate_Name>_<id>.txt` next to the records
pub struct TextReportRenderer {
    root: PathBuf,
    config: ReportConfig,
}

impl TextReportRenderer {
    pub fn new(root: impl Into<PathBuf>, config: ReportConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn report_path(&self, session_id: &SessionId, candidate_name: &str) -> PathBuf {
        self.root.join(report_file_name(candidate_name, session_id))
    }
}

#[async_trait]
impl ReportRenderer for TextReportRenderer {
    fn format(&self, session_id: &SessionId, record: &DocumentationRecord) -> RenderedReport {
        RenderedReport {
            path: self.report_path(session_id, &record.candidate_name),
            text: format_report(record, &self.config),
        }
    }

    async fn write(&self, report: &RenderedReport) -> Result<()> {
        info!("Writing report to {:?}", report.path);
        write_atomic(&report.path, report.text.as_bytes()).await
    }
}

/// `interview_<name with whitespace runs as _>_<id>.txt`
pub fn report_file_name(candidate_name: &str, session_id: &SessionId) -> String {
    let name: Vec<String> = candidate_name
        .split_whitespace()
        .map(|part| part.replace(['/', '\\'], "-"))
        .collect();
    format!("interview_{}_{}.txt", name.join("_"), session_id)
}

/// Lay out the full report and split it into pages
pub fn format_report(record: &DocumentationRecord, config: &ReportConfig) -> String {
    let mut lines: Vec<String> = Vec::new();
    let summary = &record.summary;

    lines.push("EXIT INTERVIEW REPORT".to_string());
    lines.push(String::new());
    lines.push(format!("Employee: {}", record.candidate_name));
    lines.push(format!("Position: {}", record.position));
    lines.push(format!(
        "Interview Date: {}",
        record.interview_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines.push(String::new());

    lines.push("KNOWLEDGE TRANSFER SUMMARY".to_string());
    lines.push(String::new());
    lines.push(format!("Total Responses: {}", summary.total_responses));
    lines.push(String::new());

    push_section(&mut lines, "Key Points", &summary.key_points, config.wrap_width);
    if let Some(text) = &summary.insights.knowledge_transfer {
        push_section(&mut lines, "Knowledge Transfer", text, config.wrap_width);
    }
    if let Some(text) = &summary.insights.documentation_gaps {
        push_section(&mut lines, "Documentation Gaps", text, config.wrap_width);
    }
    push_section(
        &mut lines,
        "Successor Recommendations",
        &summary.recommendations,
        config.wrap_width,
    );
    push_section(
        &mut lines,
        "Organizational Value",
        &summary.organizational_value,
        config.wrap_width,
    );

    lines.push("INTERVIEW TRANSCRIPTION".to_string());
    lines.push(String::new());
    if record.transcript.trim().is_empty() {
        lines.push("No transcript available.".to_string());
    } else if record.full_responses.is_empty() {
        lines.push("No speaker turns recognized. Transcript as captured:".to_string());
        lines.push(String::new());
        for line in record.transcript.lines().filter(|l| !l.trim().is_empty()) {
            lines.extend(wrap_text(line, config.wrap_width, "  "));
        }
        lines.push(String::new());
    } else {
        for (index, turn) in record.full_responses.iter().enumerate() {
            let text = format!("{}. {}", index + 1, turn.to_line());
            lines.extend(wrap_text(&text, config.wrap_width, "   "));
            lines.push(String::new());
        }
    }

    paginate(&lines, config.lines_per_page)
}

/// Heading followed by one bullet per non-blank line of `text`.
/// Blank sections are skipped.
fn push_section(lines: &mut Vec<String>, heading: &str, text: &str, width: usize) {
    let items: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if items.is_empty() {
        return;
    }

    lines.push(format!("{}:", heading));
    for item in items {
        lines.extend(wrap_text(&format!("• {}", item), width, "  "));
    }
    lines.push(String::new());
}

fn paginate(lines: &[String], lines_per_page: usize) -> String {
    let pages: Vec<&[String]> = lines.chunks(lines_per_page.max(1)).collect();
    let total = pages.len();

    pages
        .iter()
        .enumerate()
        .map(|(i, page)| format!("{}\n\nPage {} of {}\n", page.join("\n"), i + 1, total))
        .collect::<Vec<_>>()
        .join("\x0c\n")
}

/// Wrap text at approximately the given width, indenting continuation lines
fn wrap_text(text: &str, width: usize, indent: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let len = line.chars().count();
        if len + word.chars().count() + 1 > width && !line.trim().is_empty() {
            result.push(std::mem::take(&mut line));
            line.push_str(indent);
        } else if !line.is_empty() && !line.ends_with(' ') {
            line.push(' ');
        }
        line.push_str(word);
    }

    if !line.trim().is_empty() {
        result.push(line);
    }
    result
}
