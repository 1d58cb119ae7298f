//! In-memory dataset: a dictionary plus its cases
//!
//! Each call to [`Dataset::reader`] opens an independent stream, so tests
//! running over the same data never share a cursor.

use crate::casereader::CaseReader;
use crate::dictionary::{Case, Dictionary};
use crate::error::{NparError, Result};

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    dict: Dictionary,
    cases: Vec<Case>,
}

impl Dataset {
    pub fn new(dict: Dictionary) -> Self {
        Self {
            dict,
            cases: Vec::new(),
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    pub fn dictionary_mut(&mut self) -> &mut Dictionary {
        &mut self.dict
    }

    /// Append a case; it must have one value per dictionary variable
    pub fn push_case(&mut self, values: Vec<Option<f64>>) -> Result<()> {
        if values.len() != self.dict.len() {
            return Err(NparError::Data {
                line: self.cases.len() + 1,
                reason: format!(
                    "expected {} values, found {}",
                    self.dict.len(),
                    values.len()
                ),
            });
        }
        self.cases.push(Case::new(values));
        Ok(())
    }

    pub fn n_cases(&self) -> usize {
        self.cases.len()
    }

    /// Open a fresh stream over every case
    pub fn reader(&self) -> CaseReader<'_> {
        CaseReader::new(self.cases.iter().cloned())
    }

    /// Parse comma-separated text: a header row of variable names followed by
    /// one row per case. Empty cells are system-missing.
    pub fn from_delimited(text: &str) -> Result<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let Some((_, header)) = lines.next() else {
            return Err(NparError::Data {
                line: 1,
                reason: "missing header row".to_string(),
            });
        };

        let mut dict = Dictionary::new();
        for name in header.split(',') {
            let name = name.trim();
            if name.is_empty() {
                return Err(NparError::Data {
                    line: 1,
                    reason: "empty variable name in header".to_string(),
                });
            }
            dict.add_variable(name)?;
        }

        let mut dataset = Dataset::new(dict);
        for (idx, line) in lines {
            let values = line
                .split(',')
                .map(|field| parse_field(field, idx + 1))
                .collect::<Result<Vec<_>>>()?;
            dataset.push_case(values).map_err(|e| match e {
                NparError::Data { reason, .. } => NparError::Data {
                    line: idx + 1,
                    reason,
                },
                other => other,
            })?;
        }

        tracing::debug!(
            variables = dataset.dict.len(),
            cases = dataset.n_cases(),
            "loaded delimited dataset"
        );
        Ok(dataset)
    }
}

fn parse_field(field: &str, line: usize) -> Result<Option<f64>> {
    let field = field.trim();
    if field.is_empty() || field == "." {
        return Ok(None);
    }
    match field.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        Ok(_) => Err(NparError::Data {
            line,
            reason: format!("non-finite value: {:?}", field),
        }),
        Err(_) => Err(NparError::Data {
            line,
            reason: format!("not a number: {:?}", field),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_delimited_basic() {
        let ds = Dataset::from_delimited("a,b\n1,2\n3,\n.,4\n").unwrap();
        assert_eq!(ds.dictionary().len(), 2);
        assert_eq!(ds.n_cases(), 3);

        let b = ds.dictionary().lookup("b").unwrap().clone();
        let values: Vec<Option<f64>> = ds.reader().map(|c| c.num(&b)).collect();
        assert_eq!(values, vec![Some(2.0), None, Some(4.0)]);
    }

    #[test]
    fn test_from_delimited_rejects_non_finite() {
        for (text, bad_line) in [
            ("x,y\nNaN,1\n2,1\n", 2),
            ("x,y\n2,1\ninf,inf\n", 3),
            ("x,y\n2,-inf\n", 2),
        ] {
            match Dataset::from_delimited(text).unwrap_err() {
                NparError::Data { line, reason } => {
                    assert_eq!(line, bad_line);
                    assert!(reason.starts_with("non-finite value"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_from_delimited_rejects_ragged_rows() {
        let err = Dataset::from_delimited("a,b\n1,2\n3\n").unwrap_err();
        match err {
            NparError::Data { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_delimited_rejects_text() {
        assert!(Dataset::from_delimited("a\nyes\n").is_err());
    }

    #[test]
    fn test_from_delimited_empty_input() {
        assert!(Dataset::from_delimited("").is_err());
    }

    #[test]
    fn test_readers_are_independent() {
        let ds = Dataset::from_delimited("a\n1\n2\n").unwrap();
        let mut first = ds.reader();
        first.read();
        let second = ds.reader();
        assert_eq!(second.count(), 2);
        assert_eq!(first.count(), 1);
    }
}
