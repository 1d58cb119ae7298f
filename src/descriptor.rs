//! Test descriptors: the two input shapes shared by every test
//!
//! A [`VariableGroup`] is an ordered list of variables measured on the same
//! cases (one-sample and k-related-sample tests). [`VariablePairs`] is an
//! ordered list of (left, right) pairs compared within each case (two related
//! sample tests). Order is significant in both: it fixes output row order.

use crate::dictionary::{Dictionary, Variable};
use crate::error::{NparError, Result};
use serde::Serialize;

/// Ordered list of variables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableGroup {
    vars: Vec<Variable>,
}

impl VariableGroup {
    pub fn new(vars: Vec<Variable>) -> Result<Self> {
        if vars.is_empty() {
            return Err(NparError::EmptyDescriptor("variable group"));
        }
        Ok(Self { vars })
    }

    /// Resolve variable names against `dict`, keeping their order
    pub fn from_names<S: AsRef<str>>(dict: &Dictionary, names: &[S]) -> Result<Self> {
        let vars = names
            .iter()
            .map(|n| dict.lookup(n.as_ref()).cloned())
            .collect::<Result<Vec<_>>>()?;
        Self::new(vars)
    }

    pub fn vars(&self) -> &[Variable] {
        &self.vars
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// One (left, right) comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariablePair {
    pub left: Variable,
    pub right: Variable,
}

impl VariablePair {
    pub fn new(left: Variable, right: Variable) -> Self {
        Self { left, right }
    }

    /// Row/column label, e.g. `"before - after"`
    pub fn label(&self) -> String {
        format!("{} - {}", self.left.display_name(), self.right.display_name())
    }

    /// The same pair with members exchanged
    pub fn swapped(&self) -> Self {
        Self {
            left: self.right.clone(),
            right: self.left.clone(),
        }
    }
}

/// Ordered list of variable pairs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariablePairs {
    pairs: Vec<VariablePair>,
}

impl VariablePairs {
    pub fn new(pairs: Vec<VariablePair>) -> Result<Self> {
        if pairs.is_empty() {
            return Err(NparError::EmptyDescriptor("variable pair list"));
        }
        Ok(Self { pairs })
    }

    /// Resolve `(left, right)` name pairs against `dict`
    pub fn from_names<S: AsRef<str>>(dict: &Dictionary, names: &[(S, S)]) -> Result<Self> {
        let pairs = names
            .iter()
            .map(|(l, r)| {
                Ok(VariablePair::new(
                    dict.lookup(l.as_ref())?.clone(),
                    dict.lookup(r.as_ref())?.clone(),
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(pairs)
    }

    /// Pair every variable in `with` against every variable in `vars`
    /// (`vars WITH with`); when `paired` is set, match them position by
    /// position instead.
    pub fn cross(vars: &[Variable], with: &[Variable], paired: bool) -> Result<Self> {
        let pairs = if paired {
            if vars.len() != with.len() {
                return Err(NparError::InvalidConfig(format!(
                    "PAIRED was specified but the number of variables preceding WITH ({}) \
                     does not match the number following ({})",
                    vars.len(),
                    with.len()
                )));
            }
            vars.iter()
                .zip(with)
                .map(|(l, r)| VariablePair::new(l.clone(), r.clone()))
                .collect()
        } else {
            vars.iter()
                .flat_map(|l| with.iter().map(move |r| VariablePair::new(l.clone(), r.clone())))
                .collect()
        };
        Self::new(pairs)
    }

    /// Every unordered pair of distinct variables in `vars`, in list order
    pub fn all_pairs(vars: &[Variable]) -> Result<Self> {
        let pairs = vars
            .iter()
            .enumerate()
            .flat_map(|(i, l)| {
                vars[i + 1..]
                    .iter()
                    .map(move |r| VariablePair::new(l.clone(), r.clone()))
            })
            .collect();
        Self::new(pairs)
    }

    pub fn pairs(&self) -> &[VariablePair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
