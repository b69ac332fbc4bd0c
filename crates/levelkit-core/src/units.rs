//! Unit conversion utilities
//!
//! Handles conversion between Metric (mm) and Imperial (inch) lengths.
//! All height data is kept in millimeters; G-code lines may be in either.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Millimeters per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Length units selected by G20/G21
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Millimeters (G21)
    #[default]
    Millimeters,
    /// Inches (G20)
    Inches,
}

impl Units {
    /// Convert a value from one unit to another
    pub fn convert(value: f64, from: Units, to: Units) -> f64 {
        match (from, to) {
            (Units::Millimeters, Units::Inches) => value / MM_PER_INCH,
            (Units::Inches, Units::Millimeters) => value * MM_PER_INCH,
            _ => value,
        }
    }

    /// Convert a value in these units to millimeters
    pub fn to_mm(self, value: f64) -> f64 {
        Self::convert(value, self, Units::Millimeters)
    }

    /// Convert a millimeter value into these units
    pub fn from_mm(self, value_mm: f64) -> f64 {
        Self::convert(value_mm, Units::Millimeters, self)
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::Millimeters => write!(f, "mm"),
            Units::Inches => write!(f, "in"),
        }
    }
}
