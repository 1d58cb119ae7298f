//! npar - Nonparametric hypothesis tests over case streams
//!
//! This library runs Cochran's Q and the sign test over a dataset of numeric
//! cases, honoring user-missing declarations and case weights, and reports
//! results as pivot tables plus diagnostics.

pub mod casereader;
pub mod cli;
pub mod csv_output;
pub mod dataset;
pub mod descriptor;
pub mod dictionary;
pub mod distributions;
pub mod error;
pub mod json_output;
pub mod missing;
pub mod output;
pub mod pivot;
pub mod stats;

pub use error::{NparError, Result};
