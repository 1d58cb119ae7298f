//! Sign test for two related samples
//!
//! For each pair the weighted numbers of positive, negative and tied
//! differences are counted in a single shared pass. Significance comes from
//! the binomial distribution with p = 0.5 over the non-tied cases.

use super::{CaseWeights, NparEngine};
use crate::casereader::CaseReader;
use crate::dataset::Dataset;
use crate::descriptor::{VariablePair, VariablePairs};
use crate::distributions::{binomial_cdf, binomial_pmf};
use crate::missing::ExclusionClass;
use crate::output::OutputSink;
use crate::pivot::{Axis, PivotTable, ResultClass};

/// Weighted difference counts for one pair
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SignCounts {
    pub positive: f64,
    pub negative: f64,
    pub ties: f64,
}

impl SignCounts {
    /// Add one case with difference `diff` (left − right) and weight `w`
    pub fn record(&mut self, diff: f64, w: f64) {
        if diff > 0.0 {
            self.positive += w;
        } else if diff < 0.0 {
            self.negative += w;
        } else {
            self.ties += w;
        }
    }

    pub fn total(&self) -> f64 {
        self.positive + self.negative + self.ties
    }

    /// Smaller of the positive and negative counts, truncated to a whole
    /// number of cases
    ///
    /// Truncation happens after the weights have been summed, so fractional
    /// weights accumulate before any rounding.
    pub fn r(&self) -> u64 {
        self.positive.min(self.negative).trunc() as u64
    }

    /// Number of non-tied cases, truncated the same way as `r`
    pub fn trials(&self) -> u64 {
        (self.positive + self.negative).trunc() as u64
    }

    /// One-tailed significance P(X <= r) and point probability P(X = r)
    pub fn significance(&self) -> (f64, f64) {
        let r = self.r();
        let n = self.trials();
        (binomial_cdf(r, 0.5, n), binomial_pmf(r, 0.5, n))
    }
}

/// Final statistics for one pair
#[derive(Debug, Clone, PartialEq)]
pub struct SignTestResult {
    pub counts: SignCounts,
    pub one_tailed_sig: f64,
    pub point_prob: f64,
}

impl SignTestResult {
    /// Twice the one-tailed significance, unclamped
    pub fn two_tailed_sig(&self) -> f64 {
        self.one_tailed_sig * 2.0
    }
}

impl From<SignCounts> for SignTestResult {
    fn from(counts: SignCounts) -> Self {
        let (one_tailed_sig, point_prob) = counts.significance();
        Self {
            counts,
            one_tailed_sig,
            point_prob,
        }
    }
}

/// Sign test engine
#[derive(Debug, Clone, Copy, Default)]
pub struct SignTest;

impl SignTest {
    /// Single pass over `input` covering every pair
    pub fn accumulate(
        &self,
        mut input: CaseReader<'_>,
        exclude: ExclusionClass,
        pairs: &VariablePairs,
        weights: &mut CaseWeights<'_>,
    ) -> Vec<SignCounts> {
        let mut counts = vec![SignCounts::default(); pairs.len()];

        while let Some(case) = input.read() {
            let w = weights.weight(&case);

            for (pair, count) in pairs.pairs().iter().zip(counts.iter_mut()) {
                let Some(left) = pair.left.usable_value(&case, exclude) else {
                    continue;
                };
                let Some(right) = pair.right.usable_value(&case, exclude) else {
                    continue;
                };
                count.record(left - right, w);
            }
        }

        tracing::debug!(cases = input.consumed(), pairs = pairs.len(), "sign pass complete");
        counts
    }

    pub fn run(
        &self,
        input: CaseReader<'_>,
        exclude: ExclusionClass,
        pairs: &VariablePairs,
        weights: &mut CaseWeights<'_>,
    ) -> Vec<SignTestResult> {
        self.accumulate(input, exclude, pairs, weights)
            .into_iter()
            .map(SignTestResult::from)
            .collect()
    }
}

impl NparEngine for SignTest {
    type Descriptor = VariablePairs;

    fn name(&self) -> &'static str {
        "Sign test"
    }

    fn execute(
        &self,
        ds: &Dataset,
        input: CaseReader<'_>,
        exclude: ExclusionClass,
        pairs: &VariablePairs,
        _exact: bool,
        _timer: f64,
        out: &mut dyn OutputSink,
    ) {
        let mut weights = CaseWeights::new(ds.dictionary());
        let results = self.run(input, exclude, pairs, &mut weights);
        weights.report(out);

        out.submit_table(frequencies_table(ds, pairs.pairs(), &results));
        out.submit_table(statistics_table(pairs.pairs(), &results));
    }
}

fn frequencies_table(ds: &Dataset, pairs: &[VariablePair], results: &[SignTestResult]) -> PivotTable {
    let mut table = PivotTable::new("Frequencies");
    table.set_weight_var(ds.dictionary().weight());

    table.add_dimension(Axis::Column, "N", &[("N", Some(ResultClass::Count))]);
    table.add_dimension(
        Axis::Row,
        "Differences",
        &[
            ("Negative Differences", None),
            ("Positive Differences", None),
            ("Ties", None),
            ("Total", None),
        ],
    );
    let pair_dim = table.add_dimension(Axis::Row, "Pairs", &[]);

    for (pair, result) in pairs.iter().zip(results) {
        let idx = table.dimension_mut(pair_dim).add_leaf(pair.label(), None);
        let c = &result.counts;
        let values = [c.negative, c.positive, c.ties, c.total()];
        for (j, value) in values.into_iter().enumerate() {
            table.put(&[0, j, idx], value);
        }
    }

    table
}

fn statistics_table(pairs: &[VariablePair], results: &[SignTestResult]) -> PivotTable {
    let mut table = PivotTable::new("Test Statistics");

    table.add_dimension(
        Axis::Row,
        "Statistics",
        &[
            ("Exact Sig. (2-tailed)", Some(ResultClass::Significance)),
            ("Exact Sig. (1-tailed)", Some(ResultClass::Significance)),
            ("Point Probability", Some(ResultClass::Significance)),
        ],
    );
    let pair_dim = table.add_dimension(Axis::Column, "Pairs", &[]);

    for (pair, result) in pairs.iter().zip(results) {
        let idx = table.dimension_mut(pair_dim).add_leaf(pair.label(), None);
        let values = [
            result.two_tailed_sig(),
            result.one_tailed_sig,
            result.point_prob,
        ];
        for (j, value) in values.into_iter().enumerate() {
            table.put(&[j, idx], value);
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_record_buckets() {
        let mut c = SignCounts::default();
        c.record(2.0, 1.0);
        c.record(-0.5, 2.0);
        c.record(0.0, 3.0);
        assert_eq!(c.positive, 1.0);
        assert_eq!(c.negative, 2.0);
        assert_eq!(c.ties, 3.0);
        assert_eq!(c.total(), 6.0);
    }

    #[test]
    fn test_significance_three_one() {
        let c = SignCounts {
            positive: 3.0,
            negative: 1.0,
            ties: 1.0,
        };
        let result = SignTestResult::from(c);
        assert!((result.one_tailed_sig - 0.3125).abs() < EPS);
        assert!((result.two_tailed_sig() - 0.625).abs() < EPS);
        assert!((result.point_prob - 0.25).abs() < EPS);
    }

    #[test]
    fn test_truncation_after_summation() {
        // Four half-weight negatives sum to 2.0 before truncation; truncating
        // each weight first would give r = 0.
        let mut c = SignCounts::default();
        for _ in 0..4 {
            c.record(-1.0, 0.5);
        }
        for _ in 0..5 {
            c.record(1.0, 1.0);
        }
        assert_eq!(c.negative, 2.0);
        assert_eq!(c.r(), 2);
        assert_eq!(c.trials(), 7);

        let c = SignCounts {
            positive: 2.7,
            negative: 1.6,
            ties: 0.0,
        };
        assert_eq!(c.r(), 1);
        assert_eq!(c.trials(), 4);
    }

    #[test]
    fn test_all_ties() {
        let c = SignCounts {
            positive: 0.0,
            negative: 0.0,
            ties: 4.0,
        };
        let result = SignTestResult::from(c);
        assert!((result.one_tailed_sig - 1.0).abs() < EPS);
        assert!((result.point_prob - 1.0).abs() < EPS);
        assert!((result.two_tailed_sig() - 2.0).abs() < EPS);
    }
}
