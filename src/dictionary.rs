//! Variable catalogue: names, missing-value declarations and case weights

use crate::error::{NparError, Result};
use crate::missing::{ExclusionClass, MissingValues};
use serde::Serialize;

/// A numeric variable in the dictionary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    name: String,
    /// Position of this variable's value within a case
    index: usize,
    missing: MissingValues,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl Variable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn missing_values(&self) -> &MissingValues {
        &self.missing
    }

    /// Missing kind of `value` for this variable, or `None` if it is valid
    pub fn missing_class(&self, value: Option<f64>) -> Option<ExclusionClass> {
        self.missing.classify(value)
    }

    /// The numeric value of this variable in `case`, if usable under `exclude`
    ///
    /// System-missing values carry no number, so they are never usable even
    /// when `exclude` does not name them.
    pub fn usable_value(&self, case: &Case, exclude: ExclusionClass) -> Option<f64> {
        let value = case.num(self);
        if exclude.excludes(self.missing_class(value)) {
            return None;
        }
        value
    }

    /// Label if present, else the name
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// One row of observations
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Case {
    values: Vec<Option<f64>>,
}

impl Case {
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }

    /// Value of `var` in this case; `None` is system-missing
    pub fn num(&self, var: &Variable) -> Option<f64> {
        self.values.get(var.index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

const INVALID_WEIGHT_WARNING: &str = "At least one case in the data file had a weight value \
     that was user-missing, system-missing, zero, or negative.  These case(s) were ignored.";

/// Collection of variables plus the optional weighting variable
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dictionary {
    variables: Vec<Variable>,
    weight: Option<usize>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a variable; names must be unique
    pub fn add_variable(&mut self, name: &str) -> Result<&Variable> {
        if self.variables.iter().any(|v| v.name == name) {
            return Err(NparError::DuplicateVariable(name.to_string()));
        }
        let index = self.variables.len();
        self.variables.push(Variable {
            name: name.to_string(),
            index,
            missing: MissingValues::none(),
            label: None,
        });
        Ok(&self.variables[index])
    }

    pub fn set_missing_values(&mut self, name: &str, missing: MissingValues) -> Result<()> {
        self.lookup_mut(name)?.missing = missing;
        Ok(())
    }

    pub fn set_label(&mut self, name: &str, label: &str) -> Result<()> {
        self.lookup_mut(name)?.label = Some(label.to_string());
        Ok(())
    }

    /// Select the weighting variable, or turn weighting off with `None`
    pub fn set_weight(&mut self, name: Option<&str>) -> Result<()> {
        self.weight = match name {
            Some(name) => Some(self.lookup(name)?.index),
            None => None,
        };
        Ok(())
    }

    pub fn weight(&self) -> Option<&Variable> {
        self.weight.map(|i| &self.variables[i])
    }

    pub fn lookup(&self, name: &str) -> Result<&Variable> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| NparError::UnknownVariable(name.to_string()))
    }

    fn lookup_mut(&mut self, name: &str) -> Result<&mut Variable> {
        self.variables
            .iter_mut()
            .find(|v| v.name == name)
            .ok_or_else(|| NparError::UnknownVariable(name.to_string()))
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Weight of `case`, 1.0 when the dictionary is unweighted
    ///
    /// Missing, zero and negative weights are forced to 0. The first such
    /// weight clears `warn_on_invalid` and logs a warning; callers check the
    /// flag afterwards to report the condition once.
    pub fn case_weight(&self, case: &Case, warn_on_invalid: &mut bool) -> f64 {
        let Some(weight_var) = self.weight() else {
            return 1.0;
        };

        let value = case.num(weight_var);
        match value {
            Some(w) if w > 0.0 && weight_var.missing_class(value).is_none() => w,
            _ => {
                if *warn_on_invalid {
                    *warn_on_invalid = false;
                    tracing::warn!("{}", INVALID_WEIGHT_WARNING);
                }
                0.0
            }
        }
    }

    /// Text reported when `case_weight` forced a weight to zero
    pub fn invalid_weight_warning() -> &'static str {
        INVALID_WEIGHT_WARNING
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict_with_weight() -> Dictionary {
        let mut dict = Dictionary::new();
        dict.add_variable("x").unwrap();
        dict.add_variable("w").unwrap();
        dict.set_missing_values("w", MissingValues::discrete(&[99.0]))
            .unwrap();
        dict.set_weight(Some("w")).unwrap();
        dict
    }

    #[test]
    fn test_add_variable_assigns_indices() {
        let mut dict = Dictionary::new();
        assert_eq!(dict.add_variable("a").unwrap().index(), 0);
        assert_eq!(dict.add_variable("b").unwrap().index(), 1);
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_duplicate_variable_rejected() {
        let mut dict = Dictionary::new();
        dict.add_variable("a").unwrap();
        assert!(matches!(
            dict.add_variable("a"),
            Err(NparError::DuplicateVariable(_))
        ));
    }

    #[test]
    fn test_unknown_variable_lookup() {
        let dict = Dictionary::new();
        assert!(matches!(
            dict.lookup("nope"),
            Err(NparError::UnknownVariable(_))
        ));
    }

    #[test]
    fn test_unweighted_case_weight_is_one() {
        let mut dict = Dictionary::new();
        dict.add_variable("x").unwrap();
        let mut warn = true;
        let case = Case::new(vec![Some(3.0)]);
        assert_eq!(dict.case_weight(&case, &mut warn), 1.0);
        assert!(warn);
    }

    #[test]
    fn test_valid_weight_is_used() {
        let dict = dict_with_weight();
        let mut warn = true;
        let case = Case::new(vec![Some(1.0), Some(2.5)]);
        assert_eq!(dict.case_weight(&case, &mut warn), 2.5);
        assert!(warn);
    }

    #[test]
    fn test_invalid_weights_forced_to_zero_and_warn_once() {
        let dict = dict_with_weight();
        let mut warn = true;

        let negative = Case::new(vec![Some(1.0), Some(-1.0)]);
        assert_eq!(dict.case_weight(&negative, &mut warn), 0.0);
        assert!(!warn);

        let user_missing = Case::new(vec![Some(1.0), Some(99.0)]);
        assert_eq!(dict.case_weight(&user_missing, &mut warn), 0.0);

        let absent = Case::new(vec![Some(1.0), None]);
        assert_eq!(dict.case_weight(&absent, &mut warn), 0.0);

        let zero = Case::new(vec![Some(1.0), Some(0.0)]);
        assert_eq!(dict.case_weight(&zero, &mut warn), 0.0);
        assert!(!warn);
    }

    #[test]
    fn test_usable_value_respects_exclusion() {
        let mut dict = Dictionary::new();
        dict.add_variable("x").unwrap();
        dict.set_missing_values("x", MissingValues::discrete(&[9.0]))
            .unwrap();
        let x = dict.lookup("x").unwrap();

        let user = Case::new(vec![Some(9.0)]);
        assert_eq!(x.usable_value(&user, ExclusionClass::ANY), None);
        assert_eq!(x.usable_value(&user, ExclusionClass::SYSTEM), Some(9.0));

        let absent = Case::new(vec![None]);
        assert_eq!(x.usable_value(&absent, ExclusionClass::SYSTEM), None);
        assert_eq!(x.usable_value(&absent, ExclusionClass::empty()), None);
    }

    #[test]
    fn test_display_name_prefers_label() {
        let mut dict = Dictionary::new();
        dict.add_variable("q1").unwrap();
        assert_eq!(dict.lookup("q1").unwrap().display_name(), "q1");
        dict.set_label("q1", "Question one").unwrap();
        assert_eq!(dict.lookup("q1").unwrap().display_name(), "Question one");
    }
}
