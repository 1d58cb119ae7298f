//! CSV output format for test results
//!
//! One row per filled cell: table title, category labels, formatted value.
//! Tables with different dimension counts share one file, so the label
//! columns are joined into a single `labels` field separated by ` | `.

use crate::pivot::PivotTable;

/// CSV output formatter
#[derive(Debug, Default)]
pub struct CsvOutput {
    rows: Vec<[String; 3]>,
}

impl CsvOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every filled cell of `table`
    pub fn add_table(&mut self, table: &PivotTable) {
        for cell in &table.cells {
            self.rows.push([
                table.title.clone(),
                table.cell_labels(cell).join(" | "),
                cell.formatted(),
            ]);
        }
    }

    fn header() -> &'static str {
        "table,labels,value"
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str(Self::header());
        output.push('\n');

        for row in &self.rows {
            let fields: Vec<String> = row.iter().map(|f| Self::escape_field(f)).collect();
            output.push_str(&fields.join(","));
            output.push('\n');
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivot::{Axis, ResultClass};

    #[test]
    fn test_escape_field() {
        assert_eq!(CsvOutput::escape_field("plain"), "plain");
        assert_eq!(CsvOutput::escape_field("a,b"), "\"a,b\"");
        assert_eq!(CsvOutput::escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(CsvOutput::escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_empty_output_is_header_only() {
        assert_eq!(CsvOutput::new().to_csv(), "table,labels,value\n");
    }

    #[test]
    fn test_rows_per_cell() {
        let mut table = PivotTable::new("Frequencies");
        table.add_dimension(Axis::Column, "N", &[("N", Some(ResultClass::Count))]);
        table.add_dimension(Axis::Row, "Differences", &[("Ties", None), ("Total", None)]);
        table.add_dimension(Axis::Row, "Pairs", &[("x - y", None)]);
        table.put(&[0, 0, 0], 1.0);
        table.put(&[0, 1, 0], 5.0);

        let mut csv = CsvOutput::new();
        csv.add_table(&table);
        let text = csv.to_csv();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "Frequencies,N | Ties | x - y,1");
        assert_eq!(lines[2], "Frequencies,N | Total | x - y,5");
    }

    #[test]
    fn test_labels_with_commas_are_quoted() {
        let mut table = PivotTable::new("Descriptive Statistics");
        table.add_dimension(Axis::Column, "Statistics", &[("Mean", None)]);
        table.add_dimension(Axis::Row, "Variable", &[("score, final", None)]);
        table.put(&[0, 0], 2.5);

        let mut csv = CsvOutput::new();
        csv.add_table(&table);
        assert!(csv
            .to_csv()
            .contains("Descriptive Statistics,\"Mean | score, final\",2.500"));
    }
}
