//! Report model handed to the report port.

use std::fmt;

use crate::domain::metrics::PerformanceSummary;

/// One summarized strategy run within a report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub heading: String,
    pub summary: PerformanceSummary,
}

/// A titled report: run parameters plus one section per summarized run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub title: String,
    pub params: Vec<(String, String)>,
    pub sections: Vec<ReportSection>,
}

impl RunReport {
    pub fn new(title: &str) -> Self {
        RunReport {
            title: title.to_string(),
            params: Vec::new(),
            sections: Vec::new(),
        }
    }

    pub fn add_param<V: fmt::Display>(&mut self, name: &str, value: V) {
        self.params.push((name.to_string(), value.to_string()));
    }

    pub fn add_section(&mut self, heading: &str, summary: PerformanceSummary) {
        self.sections.push(ReportSection {
            heading: heading.to_string(),
            summary,
        });
    }
}
