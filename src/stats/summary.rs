//! Descriptive statistics and quartiles for the variables of a run
//!
//! Moments are weighted (West's incremental algorithm). Quartiles come from
//! aprender's DescriptiveStats over the usable values and ignore weights.

use super::CaseWeights;
use crate::casereader::CaseReader;
use crate::dataset::Dataset;
use crate::dictionary::Variable;
use crate::missing::ExclusionClass;
use crate::output::OutputSink;
use crate::pivot::{Axis, PivotTable, ResultClass};
use aprender::stats::DescriptiveStats;
use trueno::Vector;

/// Weighted moments and extremes of one variable
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptives {
    /// Sum of weights of usable values
    pub n: f64,
    pub mean: f64,
    m2: f64,
    pub min: f64,
    pub max: f64,
    values: Vec<f32>,
}

impl Default for Descriptives {
    fn default() -> Self {
        Self {
            n: 0.0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            values: Vec::new(),
        }
    }
}

impl Descriptives {
    pub fn add(&mut self, x: f64, w: f64) {
        self.min = self.min.min(x);
        self.max = self.max.max(x);
        self.values.push(x as f32);

        if w <= 0.0 {
            return;
        }
        self.n += w;
        let delta = x - self.mean;
        self.mean += delta * w / self.n;
        self.m2 += w * delta * (x - self.mean);
    }

    /// Sample standard deviation (n − 1 denominator); NaN below two cases
    pub fn std_dev(&self) -> f64 {
        if self.n <= 1.0 {
            return f64::NAN;
        }
        (self.m2 / (self.n - 1.0)).sqrt()
    }

    pub fn minimum(&self) -> f64 {
        if self.values.is_empty() {
            f64::NAN
        } else {
            self.min
        }
    }

    pub fn maximum(&self) -> f64 {
        if self.values.is_empty() {
            f64::NAN
        } else {
            self.max
        }
    }

    pub fn mean(&self) -> f64 {
        if self.n > 0.0 {
            self.mean
        } else {
            f64::NAN
        }
    }

    /// 25th, 50th and 75th percentiles of the usable values
    pub fn quartiles(&self) -> [f64; 3] {
        if self.values.is_empty() {
            return [f64::NAN; 3];
        }
        let vector = Vector::from_slice(&self.values);
        let stats = DescriptiveStats::new(&vector);
        [stats.quantile(0.25), stats.quantile(0.5), stats.quantile(0.75)].map(|q| match q {
            Ok(v) => f64::from(v),
            Err(e) => {
                tracing::warn!("Failed to compute quartile: {}", e);
                f64::NAN
            }
        })
    }
}

/// Summary statistics emitted after the tests of a run
#[derive(Debug, Clone, Copy, Default)]
pub struct Summary {
    pub descriptives: bool,
    pub quartiles: bool,
}

impl Summary {
    pub fn accumulate(
        &self,
        mut input: CaseReader<'_>,
        exclude: ExclusionClass,
        vars: &[Variable],
        weights: &mut CaseWeights<'_>,
    ) -> Vec<Descriptives> {
        let mut stats = vec![Descriptives::default(); vars.len()];
        while let Some(case) = input.read() {
            let w = weights.weight(&case);
            for (var, d) in vars.iter().zip(stats.iter_mut()) {
                if let Some(x) = var.usable_value(&case, exclude) {
                    d.add(x, w);
                }
            }
        }
        stats
    }

    pub fn execute(
        &self,
        ds: &Dataset,
        input: CaseReader<'_>,
        exclude: ExclusionClass,
        vars: &[Variable],
        out: &mut dyn OutputSink,
    ) {
        if !(self.descriptives || self.quartiles) || vars.is_empty() {
            return;
        }

        let mut weights = CaseWeights::new(ds.dictionary());
        let stats = self.accumulate(input, exclude, vars, &mut weights);
        weights.report(out);

        out.submit_table(self.table(ds, vars, &stats));
    }

    fn table(&self, ds: &Dataset, vars: &[Variable], stats: &[Descriptives]) -> PivotTable {
        let mut table = PivotTable::new("Descriptive Statistics");
        table.set_weight_var(ds.dictionary().weight());

        let mut columns: Vec<(&str, Option<ResultClass>)> = Vec::new();
        if self.descriptives {
            columns.extend([
                ("N", Some(ResultClass::Count)),
                ("Mean", None),
                ("Std. Deviation", None),
                ("Minimum", None),
                ("Maximum", None),
            ]);
        }
        if self.quartiles {
            columns.extend([("25th", None), ("50th (Median)", None), ("75th", None)]);
        }
        table.add_dimension(Axis::Column, "Statistics", &columns);
        let var_dim = table.add_dimension(Axis::Row, "Variable", &[]);

        for (var, d) in vars.iter().zip(stats) {
            let row = table.dimension_mut(var_dim).add_leaf(var.display_name(), None);
            let mut values = Vec::new();
            if self.descriptives {
                values.extend([d.n, d.mean(), d.std_dev(), d.minimum(), d.maximum()]);
            }
            if self.quartiles {
                values.extend(d.quartiles());
            }
            for (col, value) in values.into_iter().enumerate() {
                table.put(&[col, row], value);
            }
        }

        table
    }
}
