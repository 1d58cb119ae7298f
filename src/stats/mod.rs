//! Nonparametric hypothesis tests over case streams
//!
//! Every test follows the same contract (`NparEngine::execute`): it takes
//! ownership of an open case stream, makes exactly one pass over it while
//! accumulating weighted sufficient statistics, drops the stream, derives its
//! statistic and submits result tables. Failures never cross `execute`; they
//! become diagnostics on the output channel and the test emits fewer tables.
//!
//! Tests differ only in descriptor shape and accumulator:
//! - Cochran's Q takes a variable group (k related binary measurements)
//! - The sign test takes variable pairs (two related samples)

mod cochran;
mod config;
mod sign;
mod suite;
mod summary;

pub use cochran::{Cochran, CochranAccumulator, CochranResult, CodedValues};
pub use config::{NparConfig, DEFAULT_TIMER_MINUTES};
pub use sign::{SignCounts, SignTest, SignTestResult};
pub use suite::NparSuite;
pub use summary::{Descriptives, Summary};

use crate::casereader::CaseReader;
use crate::dataset::Dataset;
use crate::descriptor::{VariableGroup, VariablePairs};
use crate::dictionary::{Case, Dictionary, Variable};
use crate::missing::ExclusionClass;
use crate::output::{Diagnostic, OutputSink};

/// Shared execution contract for every test
pub trait NparEngine {
    /// Input shape the test consumes
    type Descriptor;

    /// Human-readable test name used in diagnostics
    fn name(&self) -> &'static str;

    /// Run the test over `input` and submit its tables to `out`
    ///
    /// `exact` and `timer` (minutes) are advisory hints for tests with an
    /// expensive exact mode.
    #[allow(clippy::too_many_arguments)]
    fn execute(
        &self,
        ds: &Dataset,
        input: CaseReader<'_>,
        exclude: ExclusionClass,
        descriptor: &Self::Descriptor,
        exact: bool,
        timer: f64,
        out: &mut dyn OutputSink,
    );
}

/// A configured test: descriptor bound to its engine
#[derive(Debug, Clone, PartialEq)]
pub enum NparTest {
    Cochran(VariableGroup),
    Sign(VariablePairs),
}

impl NparTest {
    pub fn name(&self) -> &'static str {
        match self {
            NparTest::Cochran(_) => Cochran::default().name(),
            NparTest::Sign(_) => SignTest.name(),
        }
    }

    /// Every variable the test reads, in descriptor order (may repeat)
    pub fn variables(&self) -> Vec<&Variable> {
        match self {
            NparTest::Cochran(group) => group.vars().iter().collect(),
            NparTest::Sign(pairs) => pairs
                .pairs()
                .iter()
                .flat_map(|p| [&p.left, &p.right])
                .collect(),
        }
    }

    /// Dispatch to the engine for this descriptor
    pub fn execute(
        &self,
        ds: &Dataset,
        input: CaseReader<'_>,
        config: &NparConfig,
        out: &mut dyn OutputSink,
    ) {
        let exclude = config.exclusion_class();
        match self {
            NparTest::Cochran(group) => Cochran {
                reject_degenerate: config.reject_degenerate,
            }
            .execute(
                ds,
                input,
                exclude,
                group,
                config.exact,
                config.timer_minutes,
                out,
            ),
            NparTest::Sign(pairs) => SignTest.execute(
                ds,
                input,
                exclude,
                pairs,
                config.exact,
                config.timer_minutes,
                out,
            ),
        }
    }
}

/// Per-execution case weighting
///
/// Remembers whether an invalid weight was seen so the condition is reported
/// once per execution, on success and abort paths alike.
pub struct CaseWeights<'d> {
    dict: &'d Dictionary,
    warn_on_invalid: bool,
}

impl<'d> CaseWeights<'d> {
    pub fn new(dict: &'d Dictionary) -> Self {
        Self {
            dict,
            warn_on_invalid: true,
        }
    }

    pub fn weight(&mut self, case: &Case) -> f64 {
        self.dict.case_weight(case, &mut self.warn_on_invalid)
    }

    pub fn report(self, out: &mut dyn OutputSink) {
        if !self.warn_on_invalid {
            out.message(Diagnostic::warning(Dictionary::invalid_weight_warning()));
        }
    }
}
