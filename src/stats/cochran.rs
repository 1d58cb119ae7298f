//! Cochran's Q test for k related dichotomous measurements
//!
//! The two codes are not declared up front. The first usable value seen
//! anywhere in the group is "success", the next different one "failure", and
//! any third value aborts the test.

use super::{CaseWeights, NparEngine};
use crate::casereader::CaseReader;
use crate::dataset::Dataset;
use crate::descriptor::VariableGroup;
use crate::distributions::chisq_upper_tail;
use crate::error::{NparError, Result};
use crate::missing::ExclusionClass;
use crate::output::{Diagnostic, OutputSink};
use crate::pivot::{Axis, PivotTable, ResultClass};

const TEST_NAME: &str = "Cochran Q test";

/// Codes discovered so far in the data
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CodedValues {
    #[default]
    Undetermined,
    Success(f64),
    SuccessFailure { success: f64, failure: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Code {
    Success,
    Failure,
}

impl CodedValues {
    /// Classify `value`, learning a new code if fewer than two are known
    fn code(&mut self, value: f64) -> Result<Code> {
        match *self {
            CodedValues::Undetermined => {
                *self = CodedValues::Success(value);
                Ok(Code::Success)
            }
            CodedValues::Success(success) if value == success => Ok(Code::Success),
            CodedValues::Success(success) => {
                *self = CodedValues::SuccessFailure {
                    success,
                    failure: value,
                };
                Ok(Code::Failure)
            }
            CodedValues::SuccessFailure { success, .. } if value == success => Ok(Code::Success),
            CodedValues::SuccessFailure { failure, .. } if value == failure => Ok(Code::Failure),
            CodedValues::SuccessFailure { .. } => Err(NparError::TooManyValues {
                test: TEST_NAME,
                value,
            }),
        }
    }

    pub fn success(&self) -> Option<f64> {
        match *self {
            CodedValues::Undetermined => None,
            CodedValues::Success(success) | CodedValues::SuccessFailure { success, .. } => {
                Some(success)
            }
        }
    }

    pub fn failure(&self) -> Option<f64> {
        match *self {
            CodedValues::SuccessFailure { failure, .. } => Some(failure),
            _ => None,
        }
    }
}

/// Weighted sufficient statistics from one pass
#[derive(Debug, Clone, PartialEq)]
pub struct CochranAccumulator {
    pub codes: CodedValues,
    /// Weighted success count per variable
    pub hits: Vec<f64>,
    /// Weighted failure count per variable
    pub misses: Vec<f64>,
    /// Weighted number of cases
    pub n: f64,
    /// Sum over cases of the squared weighted per-case success total
    pub row_sq: f64,
}

impl CochranAccumulator {
    fn new(k: usize) -> Self {
        Self {
            codes: CodedValues::Undetermined,
            hits: vec![0.0; k],
            misses: vec![0.0; k],
            n: 0.0,
            row_sq: 0.0,
        }
    }

    /// Sum of per-variable hit totals (L)
    pub fn hit_total(&self) -> f64 {
        self.hits.iter().sum()
    }

    /// Sum of squared per-variable hit totals (L2)
    pub fn hit_sq_total(&self) -> f64 {
        self.hits.iter().map(|h| h * h).sum()
    }

    /// The Q denominator k·L − R2; zero when every case is uniform
    pub fn denominator(&self) -> f64 {
        self.hits.len() as f64 * self.hit_total() - self.row_sq
    }

    /// Cochran's Q and its degrees of freedom
    pub fn q_statistic(&self) -> (f64, f64) {
        let k = self.hits.len() as f64;
        let l = self.hit_total();
        let q = (k - 1.0) * (k * self.hit_sq_total() - l * l) / self.denominator();
        (q, k - 1.0)
    }
}

/// Final statistics for one execution
#[derive(Debug, Clone, PartialEq)]
pub struct CochranResult {
    pub accumulator: CochranAccumulator,
    pub q: f64,
    pub df: f64,
    /// Asymptotic significance from the chi-square distribution
    pub sig: f64,
}

/// Cochran's Q engine
#[derive(Debug, Clone, Copy, Default)]
pub struct Cochran {
    /// Report an undefined Q (zero denominator) instead of printing it
    pub reject_degenerate: bool,
}

impl Cochran {
    /// Single pass over `input`; the reader is dropped on return, including
    /// when a third code aborts the pass
    pub fn accumulate(
        &self,
        mut input: CaseReader<'_>,
        exclude: ExclusionClass,
        group: &VariableGroup,
        weights: &mut CaseWeights<'_>,
    ) -> Result<CochranAccumulator> {
        let mut acc = CochranAccumulator::new(group.len());

        while let Some(case) = input.read() {
            let w = weights.weight(&case);
            let mut case_hits = 0.0;

            for (v, var) in group.vars().iter().enumerate() {
                let Some(value) = var.usable_value(&case, exclude) else {
                    continue;
                };
                match acc.codes.code(value)? {
                    Code::Success => {
                        acc.hits[v] += w;
                        case_hits += w;
                    }
                    Code::Failure => acc.misses[v] += w,
                }
            }

            acc.n += w;
            acc.row_sq += case_hits * case_hits;
        }

        tracing::debug!(cases = input.consumed(), n = acc.n, "cochran pass complete");
        Ok(acc)
    }

    pub fn finish(&self, accumulator: CochranAccumulator) -> Result<CochranResult> {
        let (q, df) = accumulator.q_statistic();
        if !q.is_finite() && self.reject_degenerate {
            return Err(NparError::DegenerateStatistic {
                test: TEST_NAME,
                reason: format!("k·L − R² = {}", accumulator.denominator()),
            });
        }
        if !q.is_finite() {
            tracing::debug!(q, "Cochran's Q is not finite");
        }

        Ok(CochranResult {
            sig: chisq_upper_tail(q, df),
            q,
            df,
            accumulator,
        })
    }

    pub fn run(
        &self,
        input: CaseReader<'_>,
        exclude: ExclusionClass,
        group: &VariableGroup,
        weights: &mut CaseWeights<'_>,
    ) -> Result<CochranResult> {
        let acc = self.accumulate(input, exclude, group, weights)?;
        self.finish(acc)
    }
}

impl NparEngine for Cochran {
    type Descriptor = VariableGroup;

    fn name(&self) -> &'static str {
        TEST_NAME
    }

    fn execute(
        &self,
        ds: &Dataset,
        input: CaseReader<'_>,
        exclude: ExclusionClass,
        group: &VariableGroup,
        _exact: bool,
        _timer: f64,
        out: &mut dyn OutputSink,
    ) {
        let mut weights = CaseWeights::new(ds.dictionary());
        let result = self.run(input, exclude, group, &mut weights);
        weights.report(out);

        match result {
            Ok(result) => {
                out.submit_table(frequencies_table(ds, group, &result));
                out.submit_table(statistics_table(ds, &result));
            }
            Err(e) => {
                tracing::warn!("{}", e);
                out.message(Diagnostic::warning(e.to_string()));
            }
        }
    }
}

fn code_label(kind: &str, value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{} ({})", kind, v),
        None => format!("{} (.)", kind),
    }
}

fn frequencies_table(ds: &Dataset, group: &VariableGroup, result: &CochranResult) -> PivotTable {
    let acc = &result.accumulator;
    let mut table = PivotTable::new("Frequencies");
    table.set_weight_var(ds.dictionary().weight());

    let success = code_label("Success", acc.codes.success());
    let failure = code_label("Failure", acc.codes.failure());
    let values = table.add_dimension(
        Axis::Column,
        "Value",
        &[
            (success.as_str(), Some(ResultClass::Count)),
            (failure.as_str(), Some(ResultClass::Count)),
        ],
    );
    table.dimension_mut(values).show_label = true;

    let variables = table.add_dimension(Axis::Row, "Variable", &[]);
    for (i, var) in group.vars().iter().enumerate() {
        let row = table
            .dimension_mut(variables)
            .add_leaf(var.display_name(), None);
        table.put(&[0, row], acc.hits[i]);
        table.put(&[1, row], acc.misses[i]);
    }

    table
}

fn statistics_table(ds: &Dataset, result: &CochranResult) -> PivotTable {
    let mut table = PivotTable::new("Test Statistics");
    table.set_weight_var(ds.dictionary().weight());

    table.add_dimension(Axis::Column, "Value", &[("Value", None)]);
    table.add_dimension(
        Axis::Row,
        "Statistics",
        &[
            ("N", Some(ResultClass::Count)),
            ("Cochran's Q", Some(ResultClass::Significance)),
            ("df", Some(ResultClass::Integer)),
            ("Asymp. Sig.", Some(ResultClass::Significance)),
        ],
    );

    let entries = [result.accumulator.n, result.q, result.df, result.sig];
    for (i, value) in entries.into_iter().enumerate() {
        table.put(&[0, i], value);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use crate::output::OutputCollector;

    #[test]
    fn test_codes_state_machine() {
        let mut codes = CodedValues::default();
        assert_eq!(codes.code(1.0).unwrap(), Code::Success);
        assert_eq!(codes, CodedValues::Success(1.0));
        assert_eq!(codes.code(1.0).unwrap(), Code::Success);
        assert_eq!(codes.code(0.0).unwrap(), Code::Failure);
        assert_eq!(
            codes,
            CodedValues::SuccessFailure {
                success: 1.0,
                failure: 0.0
            }
        );
        assert_eq!(codes.code(0.0).unwrap(), Code::Failure);
        assert!(matches!(
            codes.code(2.0),
            Err(NparError::TooManyValues { value, .. }) if value == 2.0
        ));
    }

    #[test]
    fn test_code_accessors() {
        let codes = CodedValues::default();
        assert_eq!(codes.success(), None);
        assert_eq!(codes.failure(), None);

        let codes = CodedValues::Success(5.0);
        assert_eq!(codes.success(), Some(5.0));
        assert_eq!(codes.failure(), None);
    }

    #[test]
    fn test_q_statistic_from_accumulator() {
        let acc = CochranAccumulator {
            codes: CodedValues::SuccessFailure {
                success: 1.0,
                failure: 0.0,
            },
            hits: vec![3.0, 2.0, 1.0],
            misses: vec![1.0, 2.0, 3.0],
            n: 4.0,
            row_sq: 14.0,
        };
        assert_eq!(acc.hit_total(), 6.0);
        assert_eq!(acc.hit_sq_total(), 14.0);
        assert_eq!(acc.denominator(), 4.0);
        let (q, df) = acc.q_statistic();
        assert!((q - 3.0).abs() < 1e-12);
        assert_eq!(df, 2.0);
    }

    #[test]
    fn test_code_label() {
        assert_eq!(code_label("Success", Some(1.0)), "Success (1)");
        assert_eq!(code_label("Failure", Some(0.5)), "Failure (0.5)");
        assert_eq!(code_label("Failure", None), "Failure (.)");
    }

    #[test]
    fn test_reject_degenerate_reports_and_emits_nothing() {
        let mut dict = Dictionary::new();
        dict.add_variable("a").unwrap();
        dict.add_variable("b").unwrap();
        let mut ds = Dataset::new(dict);
        ds.push_case(vec![Some(1.0), Some(1.0)]).unwrap();
        ds.push_case(vec![Some(1.0), Some(1.0)]).unwrap();
        let group = VariableGroup::from_names(ds.dictionary(), &["a", "b"]).unwrap();

        let mut out = OutputCollector::new();
        Cochran {
            reject_degenerate: true,
        }
        .execute(
            &ds,
            ds.reader(),
            ExclusionClass::ANY,
            &group,
            false,
            0.0,
            &mut out,
        );

        assert!(out.tables().is_empty());
        assert_eq!(out.messages().len(), 1);
        assert!(out.messages()[0].text.contains("undefined"));
    }
}
