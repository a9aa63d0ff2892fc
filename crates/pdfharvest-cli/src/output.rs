use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use serde::Serialize;

use pdfharvest_core::{BatchReport, ExtractErrorKind, ExtractionOutcome};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the final batch summary: per-file failures, then counts.
pub fn print_report_summary(
    w: &mut dyn Write,
    report: &BatchReport,
    color: ColorMode,
) -> std::io::Result<()> {
    if report.failed > 0 {
        writeln!(w, "Failed files:")?;
        for outcome in report.outcomes.values() {
            if let ExtractionOutcome::Failure { path, error } = outcome {
                let line = format!("  {} — {}", path.display(), error);
                if color.enabled() {
                    writeln!(w, "{}", line.red())?;
                } else {
                    writeln!(w, "{}", line)?;
                }
            }
        }

        let breakdown = failure_breakdown(report);
        let parts: Vec<String> = breakdown
            .iter()
            .map(|(kind, count)| format!("{kind}: {count}"))
            .collect();
        if color.enabled() {
            writeln!(w, "{}", format!("({})", parts.join(", ")).dimmed())?;
        } else {
            writeln!(w, "({})", parts.join(", "))?;
        }
        writeln!(w)?;
    }

    let summary = format!(
        "{} files processed: {} extracted, {} failed",
        report.total, report.succeeded, report.failed
    );
    if !color.enabled() {
        writeln!(w, "{}", summary)?;
    } else if report.failed == 0 {
        writeln!(w, "{}", summary.green())?;
    } else {
        writeln!(w, "{}", summary.yellow())?;
    }

    let empty = report
        .outcomes
        .values()
        .filter(|o| matches!(o, ExtractionOutcome::Success { text, .. } if text.is_empty()))
        .count();
    if empty > 0 {
        let note = format!("({} file(s) contained no extractable text)", empty);
        if color.enabled() {
            writeln!(w, "{}", note.dimmed())?;
        } else {
            writeln!(w, "{}", note)?;
        }
    }

    Ok(())
}

fn failure_breakdown(report: &BatchReport) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for outcome in report.outcomes.values() {
        if let Some(kind) = outcome.error_kind() {
            *counts.entry(kind.to_string()).or_default() += 1;
        }
    }
    counts
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    extracted_at: String,
    #[serde(flatten)]
    report: &'a BatchReport,
}

/// Write the report as pretty-printed JSON under `output_dir`, creating the
/// directory if needed. Returns the path of the written file.
pub fn save_report(report: &BatchReport, output_dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let timestamp = chrono::Local::now();
    let file_name = format!("extracted_data_{}.json", timestamp.format("%Y%m%d_%H%M%S"));
    let path = output_dir.join(file_name);

    let document = ReportDocument {
        extracted_at: timestamp.to_rfc3339(),
        report,
    };
    let file = std::fs::File::create(&path)?;
    serde_json::to_writer_pretty(file, &document)?;

    Ok(path)
}

/// Count timed-out files, used to suggest a larger --timeout.
pub fn timeout_count(report: &BatchReport) -> usize {
    report
        .outcomes
        .values()
        .filter(|o| o.error_kind() == Some(ExtractErrorKind::Timeout))
        .count()
}
