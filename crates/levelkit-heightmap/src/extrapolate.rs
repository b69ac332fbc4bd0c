//! Padding a probed grid out to the machine limits
//!
//! Each synthetic point continues the line through the two nearest points in
//! the direction being extended, so a row or column keeps its slope.

use crate::grid::{GridIndex, HeightGrid};
use crate::limits::MachineLimits;
use crate::sample::HeightPoint;
use crate::stats::HeightStats;
use levelkit_core::HeightMapError;
use serde::{Deserialize, Serialize};

/// How many rows and columns get added on each side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    pub columns_before: usize,
    pub columns_after: usize,
    pub rows_before: usize,
    pub rows_after: usize,
}

impl Extension {
    /// Work out the padding needed for the grid described by `stats` to reach `limits`
    pub fn plan(stats: &HeightStats, limits: &MachineLimits) -> Self {
        let count = |gap: f64, delta: f64| -> usize {
            if gap > 0.0 {
                (gap / delta).ceil() as usize
            } else {
                0
            }
        };

        Self {
            columns_before: count(stats.first_point.x - limits.xmin, stats.delta_x),
            columns_after: count(limits.xmax - stats.last_point.x, stats.delta_x),
            rows_before: count(stats.first_point.y - limits.ymin, stats.delta_y),
            rows_after: count(limits.ymax - stats.last_point.y, stats.delta_y),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns_before == 0
            && self.columns_after == 0
            && self.rows_before == 0
            && self.rows_after == 0
    }
}

/// A padded grid with stats recomputed over the padding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtrapolatedGrid {
    pub grid: HeightGrid,
    pub stats: HeightStats,
    pub extension: Extension,
}

/// Extend `grid` until it covers the XY limits
///
/// Returns `Ok(None)` when the grid already reaches the limits on all four sides.
pub fn extrapolate(
    grid: &HeightGrid,
    stats: &HeightStats,
    limits: &MachineLimits,
) -> Result<Option<ExtrapolatedGrid>, HeightMapError> {
    let needs_x = stats.first_point.x > limits.xmin || limits.xmax > stats.last_point.x;
    let needs_y = stats.first_point.y > limits.ymin || limits.ymax > stats.last_point.y;
    if !needs_x && !needs_y {
        return Ok(None);
    }

    if needs_x {
        check_extendable("X", stats.delta_x, grid.num_columns())?;
    }
    if needs_y {
        check_extendable("Y", stats.delta_y, grid.num_rows())?;
    }

    let extension = Extension::plan(stats, limits);
    if extension.is_empty() {
        return Ok(None);
    }

    let mut rows = grid.clone().into_rows();
    let (dx, dy) = (stats.delta_x, stats.delta_y);

    for row in rows.iter_mut() {
        for _ in 0..extension.columns_before {
            let (a, b) = (row[0], row[1]);
            let slope = (a.z - b.z) / (a.x - b.x);
            row.insert(0, HeightPoint::calculated(a.x - dx, a.y, a.z - slope * dx));
        }
        for _ in 0..extension.columns_after {
            let n = row.len();
            let (a, b) = (row[n - 1], row[n - 2]);
            let slope = (a.z - b.z) / (a.x - b.x);
            row.push(HeightPoint::calculated(a.x + dx, a.y, a.z + slope * dx));
        }
    }

    for _ in 0..extension.rows_before {
        let new_row = rows[0]
            .iter()
            .zip(rows[1].iter())
            .map(|(a, b)| {
                let slope = (a.z - b.z) / (a.y - b.y);
                HeightPoint::calculated(a.x, a.y - dy, a.z - slope * dy)
            })
            .collect();
        rows.insert(0, new_row);
    }
    for _ in 0..extension.rows_after {
        let n = rows.len();
        let new_row = rows[n - 1]
            .iter()
            .zip(rows[n - 2].iter())
            .map(|(a, b)| {
                let slope = (a.z - b.z) / (a.y - b.y);
                HeightPoint::calculated(a.x, a.y + dy, a.z + slope * dy)
            })
            .collect();
        rows.push(new_row);
    }

    let padded = HeightGrid::from_rows(rows)?;
    let reference = GridIndex::new(extension.rows_before, extension.columns_before);
    let padded_stats = HeightStats::compute_with(&padded, reference, dx, dy)?;

    tracing::debug!(
        "Extrapolated grid {}x{} -> {}x{} ({:?})",
        stats.number_of_rows,
        stats.number_of_columns,
        padded_stats.number_of_rows,
        padded_stats.number_of_columns,
        extension
    );

    Ok(Some(ExtrapolatedGrid {
        grid: padded,
        stats: padded_stats,
        extension,
    }))
}

fn check_extendable(axis: &str, delta: f64, lines: usize) -> Result<(), HeightMapError> {
    if lines < 2 {
        return Err(HeightMapError::InsufficientGrid {
            direction: axis.to_string(),
            required: 2,
            found: lines,
        });
    }
    if !(delta.is_finite() && delta > 0.0) {
        return Err(HeightMapError::InvalidSpacing {
            axis: axis.to_string(),
            value: delta,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sloped_grid() -> HeightGrid {
        HeightGrid::from_rows(vec![
            vec![HeightPoint::new(0.0, 0.0, 0.0), HeightPoint::new(10.0, 0.0, 1.0)],
            vec![HeightPoint::new(0.0, 10.0, 2.0), HeightPoint::new(10.0, 10.0, 3.0)],
        ])
        .unwrap()
    }

    #[test]
    fn test_no_padding_inside_limits() {
        let grid = sloped_grid();
        let stats = HeightStats::compute(&grid);
        let limits = MachineLimits::xy(2.0, 8.0, 0.0, 10.0);
        assert!(extrapolate(&grid, &stats, &limits).unwrap().is_none());
    }

    #[test]
    fn test_pads_right_by_ceil() {
        let grid = sloped_grid();
        let stats = HeightStats::compute(&grid);
        let limits = MachineLimits::xy(0.0, 25.0, 0.0, 10.0);
        let padded = extrapolate(&grid, &stats, &limits).unwrap().unwrap();

        assert_eq!(padded.extension.columns_after, 2);
        assert_eq!(padded.stats.number_of_columns, 4);
        let row0 = &padded.grid.rows()[0];
        assert_eq!(row0[2], HeightPoint::calculated(20.0, 0.0, 2.0));
        assert_eq!(row0[3], HeightPoint::calculated(30.0, 0.0, 3.0));
        assert_eq!(padded.stats.reference_index, GridIndex::new(0, 0));
    }

    #[test]
    fn test_pads_rows_after_columns() {
        let grid = sloped_grid();
        let stats = HeightStats::compute(&grid);
        let limits = MachineLimits::xy(-10.0, 10.0, -10.0, 10.0);
        let padded = extrapolate(&grid, &stats, &limits).unwrap().unwrap();

        assert_eq!(padded.stats.number_of_rows, 3);
        assert_eq!(padded.stats.number_of_columns, 3);
        // Corner comes from the synthetic column of the original rows.
        let corner = padded.grid.rows()[0][0];
        assert_eq!(corner, HeightPoint::calculated(-10.0, -10.0, -3.0));
        assert_eq!(padded.stats.reference_index, GridIndex::new(1, 1));
        assert_eq!(padded.stats.reference_point, HeightPoint::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_single_column_cannot_extend_x() {
        let grid = HeightGrid::from_rows(vec![
            vec![HeightPoint::new(0.0, 0.0, 0.0)],
            vec![HeightPoint::new(0.0, 10.0, 0.0)],
        ])
        .unwrap();
        let stats = HeightStats::compute(&grid);
        let err = extrapolate(&grid, &stats, &MachineLimits::xy(-5.0, 0.0, 0.0, 10.0)).unwrap_err();
        assert!(matches!(err, HeightMapError::InsufficientGrid { .. }));
    }
}
