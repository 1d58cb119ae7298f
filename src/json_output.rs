//! JSON output format for test results
//!
//! Tables are flattened to one record per filled cell so consumers do not
//! need to understand the dimension layout.

use crate::output::Diagnostic;
use crate::pivot::{PivotCell, PivotTable};
use serde::{Deserialize, Serialize};

/// A single filled cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonCell {
    /// Category labels, one per dimension in creation order
    pub labels: Vec<String>,
    /// Raw value; non-finite values serialize as null
    pub value: f64,
    /// Value as it appears in text output
    pub formatted: String,
}

/// One result table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonTable {
    pub title: String,
    /// Dimension names, matching the order of `JsonCell::labels`
    pub dimensions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted_by: Option<String>,
    pub cells: Vec<JsonCell>,
}

impl JsonTable {
    fn cell(table: &PivotTable, cell: &PivotCell) -> JsonCell {
        JsonCell {
            labels: table
                .cell_labels(cell)
                .into_iter()
                .map(str::to_string)
                .collect(),
            value: cell.value,
            formatted: cell.formatted(),
        }
    }
}

impl From<&PivotTable> for JsonTable {
    fn from(table: &PivotTable) -> Self {
        Self {
            title: table.title.clone(),
            dimensions: table.dimensions.iter().map(|d| d.name.clone()).collect(),
            weighted_by: table.weight_var.clone(),
            cells: table
                .cells
                .iter()
                .map(|c| Self::cell(table, c))
                .collect(),
        }
    }
}

/// Complete JSON document for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// Format version
    pub format: String,
    pub tables: Vec<JsonTable>,
    pub diagnostics: Vec<Diagnostic>,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self {
            format: "npar-json-v1".to_string(),
            tables: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn add_table(&mut self, table: &PivotTable) {
        self.tables.push(JsonTable::from(table));
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivot::{Axis, ResultClass};

    fn sample() -> PivotTable {
        let mut table = PivotTable::new("Test Statistics");
        table.add_dimension(Axis::Column, "Value", &[("Value", None)]);
        table.add_dimension(
            Axis::Row,
            "Statistics",
            &[
                ("N", Some(ResultClass::Count)),
                ("Cochran's Q", Some(ResultClass::Significance)),
            ],
        );
        table.put(&[0, 0], 4.0);
        table.put(&[0, 1], f64::NAN);
        table
    }

    #[test]
    fn test_json_output_creation() {
        let output = JsonOutput::new();
        assert_eq!(output.format, "npar-json-v1");
        assert!(output.tables.is_empty());
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_table_flattened_to_cells() {
        let table = JsonTable::from(&sample());
        assert_eq!(table.dimensions, vec!["Value", "Statistics"]);
        assert_eq!(table.cells.len(), 2);
        assert_eq!(table.cells[0].labels, vec!["Value", "N"]);
        assert_eq!(table.cells[0].formatted, "4");
        assert_eq!(table.cells[1].formatted, ".");
        assert!(table.weighted_by.is_none());
    }

    #[test]
    fn test_serialization() {
        let mut output = JsonOutput::new();
        output.add_table(&sample());
        output.add_diagnostic(Diagnostic::warning("something odd"));

        let json = output.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["tables"][0]["title"], "Test Statistics");
        assert_eq!(value["tables"][0]["cells"][0]["value"], 4.0);
        assert!(value["tables"][0]["cells"][1]["value"].is_null());
        assert_eq!(value["diagnostics"][0]["severity"], "warning");
        assert!(value["tables"][0].get("weighted_by").is_none());
    }
}
