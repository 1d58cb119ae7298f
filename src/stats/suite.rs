//! Running several tests over one dataset
//!
//! Every test gets its own stream from the dataset. With listwise deletion all
//! streams (and the summary) see only cases complete on every variable named
//! by any test.

use super::{NparConfig, NparTest, Summary};
use crate::casereader::CaseReader;
use crate::dataset::Dataset;
use crate::dictionary::Variable;
use crate::error::Result;
use crate::output::OutputSink;

/// A list of tests plus the options they share
#[derive(Debug, Clone, Default)]
pub struct NparSuite {
    tests: Vec<NparTest>,
    config: NparConfig,
}

impl NparSuite {
    pub fn new(config: NparConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tests: Vec::new(),
            config,
        })
    }

    pub fn add_test(&mut self, test: NparTest) -> &mut Self {
        self.tests.push(test);
        self
    }

    pub fn tests(&self) -> &[NparTest] {
        &self.tests
    }

    pub fn config(&self) -> &NparConfig {
        &self.config
    }

    /// Every variable named by any test, once each, sorted by name
    pub fn variables(&self) -> Vec<Variable> {
        let mut vars: Vec<Variable> = Vec::new();
        for var in self.tests.iter().flat_map(|t| t.variables()) {
            if !vars.iter().any(|v| v.index() == var.index()) {
                vars.push(var.clone());
            }
        }
        vars.sort_by(|a, b| a.name().cmp(b.name()));
        vars
    }

    fn open<'a>(&self, ds: &'a Dataset, vars: &[Variable]) -> CaseReader<'a> {
        let reader = ds.reader();
        if self.config.listwise {
            reader.filter_missing(vars.to_vec(), self.config.exclusion_class())
        } else {
            reader
        }
    }

    /// Execute every test in order, then the summary table if requested
    pub fn run(&self, ds: &Dataset, out: &mut dyn OutputSink) {
        let vars = self.variables();
        tracing::debug!(
            tests = self.tests.len(),
            variables = vars.len(),
            listwise = self.config.listwise,
            "running nonparametric tests"
        );

        for test in &self.tests {
            tracing::debug!("executing {}", test.name());
            test.execute(ds, self.open(ds, &vars), &self.config, out);
        }

        Summary {
            descriptives: self.config.descriptives,
            quartiles: self.config.quartiles,
        }
        .execute(
            ds,
            self.open(ds, &vars),
            self.config.exclusion_class(),
            &vars,
            out,
        );
    }
}
