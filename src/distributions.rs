//! Distribution functions used to turn raw statistics into significance
//!
//! Thin wrappers over `statrs`. Invalid parameters and non-finite inputs
//! yield NaN instead of an error so that a degenerate statistic flows into
//! the output table unchanged.

use statrs::distribution::{Binomial, ChiSquared, ContinuousCDF, Discrete, DiscreteCDF};

/// Upper-tail probability P(X > x) for a chi-square distribution with `df`
/// degrees of freedom
pub fn chisq_upper_tail(x: f64, df: f64) -> f64 {
    if !x.is_finite() {
        return f64::NAN;
    }
    match ChiSquared::new(df) {
        Ok(dist) => dist.sf(x),
        Err(e) => {
            tracing::debug!("chi-square with df={} is undefined: {}", df, e);
            f64::NAN
        }
    }
}

/// Cumulative binomial probability P(X <= k) for `n` trials with success
/// probability `p`
pub fn binomial_cdf(k: u64, p: f64, n: u64) -> f64 {
    match Binomial::new(p, n) {
        Ok(dist) => dist.cdf(k),
        Err(_) => f64::NAN,
    }
}

/// Binomial probability mass P(X = k) for `n` trials with success
/// probability `p`
pub fn binomial_pmf(k: u64, p: f64, n: u64) -> f64 {
    match Binomial::new(p, n) {
        Ok(dist) => dist.pmf(k),
        Err(_) => f64::NAN,
    }
}
