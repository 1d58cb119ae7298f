//! Output channel: result tables plus user-facing diagnostics

use crate::pivot::{Axis, PivotTable};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A message for the user, reported alongside the tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub text: String,
}

impl Diagnostic {
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            text: text.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.text)
    }
}

/// Where tests send their results
///
/// Tests only ever write to the sink; they never read tables back.
pub trait OutputSink {
    fn submit_table(&mut self, table: PivotTable);

    fn message(&mut self, diagnostic: Diagnostic);
}

/// Sink that keeps everything in memory, in submission order
#[derive(Debug, Default, Clone)]
pub struct OutputCollector {
    tables: Vec<PivotTable>,
    messages: Vec<Diagnostic>,
}

impl OutputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> &[PivotTable] {
        &self.tables
    }

    pub fn messages(&self) -> &[Diagnostic] {
        &self.messages
    }

    /// First table with the given title
    pub fn table(&self, title: &str) -> Option<&PivotTable> {
        self.tables.iter().find(|t| t.title == title)
    }

    pub fn into_parts(self) -> (Vec<PivotTable>, Vec<Diagnostic>) {
        (self.tables, self.messages)
    }
}

impl OutputSink for OutputCollector {
    fn submit_table(&mut self, table: PivotTable) {
        self.tables.push(table);
    }

    fn message(&mut self, diagnostic: Diagnostic) {
        self.messages.push(diagnostic);
    }
}

/// Render a table as plain text, one line per filled cell
///
/// Row categories come first, then column categories, joined by ` | `.
pub fn render_text(table: &PivotTable) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", table.title));
    if let Some(ref weight) = table.weight_var {
        out.push_str(&format!("Weighted by {}\n", weight));
    }

    let order: Vec<usize> = [Axis::Row, Axis::Column]
        .iter()
        .flat_map(|axis| {
            table
                .dimensions
                .iter()
                .enumerate()
                .filter(move |(_, d)| d.axis == *axis)
                .map(|(i, _)| i)
        })
        .collect();

    for cell in &table.cells {
        let labels: Vec<&str> = order
            .iter()
            .map(|&d| table.dimensions[d].categories[cell.indexes[d]].label.as_str())
            .collect();
        out.push_str(&format!("{}: {}\n", labels.join(" | "), cell.formatted()));
    }
    out
}
