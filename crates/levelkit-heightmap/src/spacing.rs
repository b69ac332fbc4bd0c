//! Grid-wide spacing check
//!
//! Stats infer spacing from one diagonal pair only. This walks every adjacent
//! pair and reports where the grid departs from that spacing.

use crate::grid::{GridIndex, HeightGrid};
use crate::stats::HeightStats;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpacingAxis {
    X,
    Y,
}

impl fmt::Display for SpacingAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::Y => write!(f, "Y"),
        }
    }
}

/// One adjacent pair whose gap differs from the inferred spacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpacingWarning {
    pub axis: SpacingAxis,
    /// The cell whose distance to its predecessor was measured
    pub index: GridIndex,
    pub expected: f64,
    pub found: f64,
}

impl fmt::Display for SpacingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} spacing at [{}][{}] is {:.3}, expected {:.3}",
            self.axis, self.index.row, self.index.column, self.found, self.expected
        )
    }
}

/// Compare every adjacent gap against `stats.delta_x`/`delta_y`
///
/// Gaps within `tolerance` (absolute, in mm) pass. Each mismatch is also
/// logged at warn level.
pub fn check_spacing(grid: &HeightGrid, stats: &HeightStats, tolerance: f64) -> Vec<SpacingWarning> {
    let mut warnings = Vec::new();
    let rows = grid.rows();

    for (r, row) in rows.iter().enumerate() {
        for c in 1..row.len() {
            let found = (row[c].x - row[c - 1].x).abs();
            if (found - stats.delta_x).abs() > tolerance {
                warnings.push(SpacingWarning {
                    axis: SpacingAxis::X,
                    index: GridIndex::new(r, c),
                    expected: stats.delta_x,
                    found,
                });
            }
        }
    }

    for r in 1..rows.len() {
        for c in 0..rows[r].len() {
            let found = (rows[r][c].y - rows[r - 1][c].y).abs();
            if (found - stats.delta_y).abs() > tolerance {
                warnings.push(SpacingWarning {
                    axis: SpacingAxis::Y,
                    index: GridIndex::new(r, c),
                    expected: stats.delta_y,
                    found,
                });
            }
        }
    }

    for warning in &warnings {
        tracing::warn!("Non-uniform grid: {}", warning);
    }
    warnings
}
