//! Missing-value classification
//!
//! A value is either present, user-missing (declared missing in the
//! dictionary) or system-missing (absent). An [`ExclusionClass`] chooses
//! which of those designations make a value unusable for one execution.

use bitflags::bitflags;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Kinds of missing designation that cause a value to be skipped
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ExclusionClass: u8 {
        /// Values listed as user-missing for the variable
        const USER = 0b01;
        /// Absent values
        const SYSTEM = 0b10;
        /// Both kinds
        const ANY = Self::USER.bits() | Self::SYSTEM.bits();
    }
}

impl Default for ExclusionClass {
    fn default() -> Self {
        Self::ANY
    }
}

impl ExclusionClass {
    /// Whether a value classified as `class` must be skipped
    ///
    /// `None` (not missing at all) is never excluded.
    pub fn excludes(self, class: Option<ExclusionClass>) -> bool {
        class.is_some_and(|c| self.intersects(c))
    }
}

/// How user-missing values are treated (the MISSING subcommand keywords)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissingMode {
    /// User-missing and system-missing values are both excluded
    #[default]
    Exclude,
    /// User-missing values are treated as valid data
    Include,
}

impl MissingMode {
    /// Exclusion class applied to every value read
    pub fn exclusion_class(self) -> ExclusionClass {
        match self {
            MissingMode::Exclude => ExclusionClass::ANY,
            MissingMode::Include => ExclusionClass::SYSTEM,
        }
    }
}

/// User-missing declaration for one numeric variable
///
/// Up to a handful of discrete values plus an optional closed range, as a
/// dictionary would declare them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissingValues {
    values: Vec<f64>,
    range: Option<(f64, f64)>,
}

impl MissingValues {
    /// No user-missing values
    pub fn none() -> Self {
        Self::default()
    }

    /// Discrete user-missing values
    pub fn discrete(values: &[f64]) -> Self {
        Self {
            values: values.to_vec(),
            range: None,
        }
    }

    /// Add a closed range `[low, high]` of user-missing values
    pub fn with_range(mut self, low: f64, high: f64) -> Self {
        self.range = Some((low.min(high), low.max(high)));
        self
    }

    /// Whether nothing is declared
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.range.is_none()
    }

    /// Whether `value` is user-missing under this declaration
    pub fn contains(&self, value: f64) -> bool {
        self.values.contains(&value)
            || self
                .range
                .is_some_and(|(low, high)| (low..=high).contains(&value))
    }

    /// Classify a case value: `None` when usable, otherwise its missing kind
    pub fn classify(&self, value: Option<f64>) -> Option<ExclusionClass> {
        match value {
            None => Some(ExclusionClass::SYSTEM),
            Some(v) if self.contains(v) => Some(ExclusionClass::USER),
            Some(_) => None,
        }
    }
}
