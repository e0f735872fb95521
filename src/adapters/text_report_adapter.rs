//! Plain-text report adapter implementing ReportPort.
//!
//! Renders the parameter table, per-section summary statistics, and the tail
//! of each value curve. Output goes to a file, or to stdout when the path
//! is "-".

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::domain::error::SigbenchError;
use crate::domain::report::{ReportSection, RunReport};
use crate::ports::report_port::ReportPort;

const TAIL_ROWS: usize = 10;

pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn fmt_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.4}", v),
        None => "-".to_string(),
    }
}

fn fmt_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "-".to_string(),
    }
}

fn render_section(out: &mut String, section: &ReportSection) {
    let summary = &section.summary;
    out.push_str(&format!("--- {} ---\n", section.heading));
    out.push_str(&format!(
        "  total return    {}\n",
        fmt_percent(Some(summary.total_return))
    ));
    out.push_str(&format!(
        "  max drawdown    {}\n",
        fmt_percent(Some(summary.max_drawdown))
    ));
    let optimal = match summary.optimal_f {
        Some(f) => format!("{:.4}", f),
        None => "undefined".to_string(),
    };
    out.push_str(&format!("  optimal f       {}\n", optimal));

    if summary.curve.is_empty() {
        out.push('\n');
        return;
    }

    out.push_str(&format!(
        "\n  {:<12} {:>12} {:>12} {:>10}\n",
        "date", summary.curve.kind, "peak", "drawdown"
    ));
    let start = summary.curve.len().saturating_sub(TAIL_ROWS);
    for i in start..summary.curve.len() {
        out.push_str(&format!(
            "  {:<12} {:>12} {:>12} {:>10}\n",
            summary.curve.date(i),
            fmt_value(summary.curve.value(i)),
            fmt_value(summary.rolling_peak.value(i)),
            fmt_percent(summary.drawdown.value(i)),
        ));
    }
    out.push('\n');
}

fn render(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n\n", report.title));

    if !report.params.is_empty() {
        out.push_str("Parameters\n");
        let width = report
            .params
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0);
        for (name, value) in &report.params {
            out.push_str(&format!("  {:<width$}  {}\n", name, value, width = width));
        }
        out.push('\n');
    }

    for section in &report.sections {
        render_section(&mut out, section);
    }
    out
}

impl ReportPort for TextReportAdapter {
    fn write(&self, report: &RunReport, output_path: &str) -> Result<(), SigbenchError> {
        let text = render(report);
        if output_path == "-" {
            io::stdout().write_all(text.as_bytes())?;
            return Ok(());
        }
        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)?;
        Ok(())
    }
}
