//! Configuration for a run of nonparametric tests
//!
//! Everything a run depends on is carried in this value and threaded through
//! the call; there is no process-wide state, so two runs with different
//! settings never interfere.

use crate::error::{NparError, Result};
use crate::missing::{ExclusionClass, MissingMode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default time limit for exact computations, in minutes
pub const DEFAULT_TIMER_MINUTES: f64 = 5.0;

/// Options shared by every test in a run
///
/// # Example
/// ```
/// use npar::stats::NparConfig;
///
/// let config = NparConfig::default();
/// assert!(!config.listwise);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NparConfig {
    /// Whether user-missing values are excluded along with system-missing ones
    pub missing: MissingMode,

    /// Listwise deletion: drop a case from every test when any variable
    /// named by any test is missing
    ///
    /// Default: false (each test excludes missing values analysis by analysis)
    pub listwise: bool,

    /// Request exact significance where a test supports it
    ///
    /// Cochran's Q and the sign test accept the hint but always report the
    /// same statistics.
    pub exact: bool,

    /// Upper bound on time spent in exact computations (minutes, 0 = none)
    pub timer_minutes: f64,

    /// Emit N, mean, standard deviation, minimum and maximum per variable
    pub descriptives: bool,

    /// Emit 25th, 50th and 75th percentiles per variable
    pub quartiles: bool,

    /// Treat an undefined Cochran's Q (zero denominator) as a reported
    /// failure instead of printing the non-finite value
    ///
    /// Default: false
    pub reject_degenerate: bool,
}

impl Default for NparConfig {
    fn default() -> Self {
        Self {
            missing: MissingMode::Exclude,
            listwise: false,
            exact: false,
            timer_minutes: 0.0,
            descriptives: false,
            quartiles: false,
            reject_degenerate: false,
        }
    }
}

impl NparConfig {
    /// Exact computations with the default timer
    pub fn exact() -> Self {
        Self {
            exact: true,
            timer_minutes: DEFAULT_TIMER_MINUTES,
            ..Self::default()
        }
    }

    /// Listwise deletion of missing values
    pub fn listwise() -> Self {
        Self {
            listwise: true,
            ..Self::default()
        }
    }

    /// Exclusion class derived from `missing`
    pub fn exclusion_class(&self) -> ExclusionClass {
        self.missing.exclusion_class()
    }

    /// Parse a TOML document; absent keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| NparError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.timer_minutes.is_finite() || self.timer_minutes < 0.0 {
            return Err(NparError::InvalidConfig(format!(
                "timer_minutes must be a non-negative number, got {}",
                self.timer_minutes
            )));
        }

        if self.timer_minutes > 0.0 && !self.exact {
            return Err(NparError::InvalidConfig(
                "timer_minutes requires exact = true".to_string(),
            ));
        }

        Ok(())
    }
}
