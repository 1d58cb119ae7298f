//! Pivot tables: the structured result format every test emits
//!
//! A table has a title, a list of dimensions (each on the row or column axis
//! with an ordered list of leaf categories) and sparse cells addressed by one
//! category index per dimension, in dimension creation order.

use crate::dictionary::Variable;
use serde::{Deserialize, Serialize};

/// Which axis a dimension is laid out on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Row,
    Column,
}

/// How a numeric cell is meant to be read (drives formatting only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultClass {
    /// Weighted frequency
    Count,
    /// Probability or test statistic
    Significance,
    /// Whole number such as degrees of freedom
    Integer,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<ResultClass>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub axis: Axis,
    pub categories: Vec<Category>,
    /// Whether the dimension name is shown as a heading
    pub show_label: bool,
}

impl Dimension {
    /// Append a leaf category and return its index
    pub fn add_leaf(&mut self, label: impl Into<String>, class: Option<ResultClass>) -> usize {
        self.categories.push(Category {
            label: label.into(),
            class,
        });
        self.categories.len() - 1
    }

    pub fn find(&self, label: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.label == label)
    }
}

/// A filled cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotCell {
    pub indexes: Vec<usize>,
    pub value: f64,
    pub class: ResultClass,
}

impl PivotCell {
    /// Display text; non-finite values show as `.` (system-missing)
    pub fn formatted(&self) -> String {
        format_value(self.value, self.class)
    }
}

/// Format a number according to its result class
pub fn format_value(value: f64, class: ResultClass) -> String {
    if !value.is_finite() {
        return ".".to_string();
    }
    match class {
        ResultClass::Count if value.fract() == 0.0 => format!("{:.0}", value),
        ResultClass::Count => format!("{:.2}", value),
        ResultClass::Integer => format!("{:.0}", value),
        ResultClass::Significance | ResultClass::Other => format!("{:.3}", value),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotTable {
    pub title: String,
    pub dimensions: Vec<Dimension>,
    pub cells: Vec<PivotCell>,
    /// Name of the weighting variable the counts are based on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_var: Option<String>,
}

impl PivotTable {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            dimensions: Vec::new(),
            cells: Vec::new(),
            weight_var: None,
        }
    }

    pub fn set_weight_var(&mut self, var: Option<&Variable>) {
        self.weight_var = var.map(|v| v.name().to_string());
    }

    /// Create a dimension with the given leaves; returns its index
    pub fn add_dimension(
        &mut self,
        axis: Axis,
        name: impl Into<String>,
        leaves: &[(&str, Option<ResultClass>)],
    ) -> usize {
        let mut dim = Dimension {
            name: name.into(),
            axis,
            categories: Vec::new(),
            show_label: false,
        };
        for (label, class) in leaves {
            dim.add_leaf(*label, *class);
        }
        self.dimensions.push(dim);
        self.dimensions.len() - 1
    }

    pub fn dimension_mut(&mut self, index: usize) -> &mut Dimension {
        &mut self.dimensions[index]
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    /// Set a cell. `indexes` holds one category index per dimension.
    ///
    /// The cell takes its result class from the first category along its
    /// coordinates that declares one.
    pub fn put(&mut self, indexes: &[usize], value: f64) {
        debug_assert_eq!(indexes.len(), self.dimensions.len());
        let class = self
            .dimensions
            .iter()
            .zip(indexes)
            .find_map(|(dim, &i)| dim.categories.get(i).and_then(|c| c.class))
            .unwrap_or_default();

        match self.cells.iter_mut().find(|c| c.indexes == indexes) {
            Some(cell) => {
                cell.value = value;
                cell.class = class;
            }
            None => self.cells.push(PivotCell {
                indexes: indexes.to_vec(),
                value,
                class,
            }),
        }
    }

    pub fn get(&self, indexes: &[usize]) -> Option<f64> {
        self.cells
            .iter()
            .find(|c| c.indexes == indexes)
            .map(|c| c.value)
    }

    /// Look a cell up by category labels, one per dimension in order
    pub fn get_by_labels(&self, labels: &[&str]) -> Option<f64> {
        if labels.len() != self.dimensions.len() {
            return None;
        }
        let indexes = self
            .dimensions
            .iter()
            .zip(labels)
            .map(|(dim, label)| dim.find(label))
            .collect::<Option<Vec<_>>>()?;
        self.get(&indexes)
    }

    /// Labels of a cell's categories, one per dimension
    pub fn cell_labels(&self, cell: &PivotCell) -> Vec<&str> {
        self.dimensions
            .iter()
            .zip(&cell.indexes)
            .map(|(dim, &i)| dim.categories[i].label.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PivotTable {
        let mut t = PivotTable::new("Test Statistics");
        t.add_dimension(Axis::Column, "Value", &[("Value", None)]);
        t.add_dimension(
            Axis::Row,
            "Statistics",
            &[
                ("N", Some(ResultClass::Count)),
                ("df", Some(ResultClass::Integer)),
            ],
        );
        t
    }

    #[test]
    fn test_put_and_lookup_by_labels() {
        let mut t = table();
        t.put(&[0, 0], 12.0);
        t.put(&[0, 1], 2.0);
        assert_eq!(t.get_by_labels(&["Value", "N"]), Some(12.0));
        assert_eq!(t.get_by_labels(&["Value", "df"]), Some(2.0));
        assert_eq!(t.get_by_labels(&["Value", "missing"]), None);
    }

    #[test]
    fn test_put_overwrites() {
        let mut t = table();
        t.put(&[0, 0], 1.0);
        t.put(&[0, 0], 5.0);
        assert_eq!(t.cells.len(), 1);
        assert_eq!(t.get(&[0, 0]), Some(5.0));
    }

    #[test]
    fn test_cell_class_from_category() {
        let mut t = table();
        t.put(&[0, 1], 2.0);
        assert_eq!(t.cells[0].class, ResultClass::Integer);
        assert_eq!(t.cells[0].formatted(), "2");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.31249, ResultClass::Significance), "0.312");
        assert_eq!(format_value(3.0, ResultClass::Count), "3");
        assert_eq!(format_value(2.5, ResultClass::Count), "2.50");
        assert_eq!(format_value(f64::NAN, ResultClass::Significance), ".");
    }

    #[test]
    fn test_cell_labels() {
        let mut t = table();
        t.put(&[0, 1], 2.0);
        assert_eq!(t.cell_labels(&t.cells[0]), vec!["Value", "df"]);
    }
}
