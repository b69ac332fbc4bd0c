//! Descriptive statistics over a height grid

use crate::grid::{GridIndex, HeightGrid};
use crate::sample::HeightPoint;
use levelkit_core::HeightMapError;
use serde::{Deserialize, Serialize};

/// Extents, spacing and Z range of a grid
///
/// Serialized field names follow the machine-profile wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeightStats {
    pub number_of_rows: usize,
    pub number_of_columns: usize,
    pub first_point_index: GridIndex,
    pub first_point: HeightPoint,
    pub last_point_index: GridIndex,
    pub last_point: HeightPoint,
    pub reference_index: GridIndex,
    pub reference_point: HeightPoint,
    /// Spacing inferred from cell [0][0] and its diagonal neighbour [1][1]
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_z: f64,
    pub max_z: f64,
    pub min_z: f64,
    pub relative_max_z: f64,
    pub relative_min_z: f64,
    pub width: f64,
    pub height: f64,
}

impl HeightStats {
    /// Stats with the reference at [0][0] and the diagonal-inferred spacing
    pub fn compute(grid: &HeightGrid) -> Self {
        let (delta_x, delta_y) = diagonal_spacing(grid);
        Self::with_reference(grid, GridIndex::default(), grid.rows()[0][0], delta_x, delta_y)
    }

    /// Stats with an explicit reference cell and spacing
    pub fn compute_with(
        grid: &HeightGrid,
        reference: GridIndex,
        delta_x: f64,
        delta_y: f64,
    ) -> Result<Self, HeightMapError> {
        let reference_point = grid.get(reference).copied().ok_or(
            HeightMapError::ReferenceOutOfRange {
                row: reference.row,
                column: reference.column,
            },
        )?;
        Ok(Self::with_reference(
            grid,
            reference,
            reference_point,
            delta_x,
            delta_y,
        ))
    }

    fn with_reference(
        grid: &HeightGrid,
        reference: GridIndex,
        reference_point: HeightPoint,
        delta_x: f64,
        delta_y: f64,
    ) -> Self {
        let first_point_index = GridIndex::new(0, 0);
        let last_point_index = GridIndex::new(grid.num_rows() - 1, grid.num_columns() - 1);
        let first_point = grid.rows()[0][0];
        let last_point = grid.rows()[last_point_index.row][last_point_index.column];

        let (min_z, max_z) = grid.points().fold(
            (first_point.z, first_point.z),
            |(min, max), p| (min.min(p.z), max.max(p.z)),
        );

        Self {
            number_of_rows: grid.num_rows(),
            number_of_columns: grid.num_columns(),
            first_point_index,
            first_point,
            last_point_index,
            last_point,
            reference_index: reference,
            reference_point,
            delta_x,
            delta_y,
            delta_z: max_z - min_z,
            max_z,
            min_z,
            relative_max_z: max_z - reference_point.z,
            relative_min_z: min_z - reference_point.z,
            width: last_point.x - first_point.x,
            height: last_point.y - first_point.y,
        }
    }

    pub fn reference_z(&self) -> f64 {
        self.reference_point.z
    }
}

/// Spacing between [0][0] and [1][1]; zero when the grid has a single row or column
pub fn diagonal_spacing(grid: &HeightGrid) -> (f64, f64) {
    match (
        grid.get(GridIndex::new(0, 0)),
        grid.get(GridIndex::new(1, 1)),
    ) {
        (Some(origin), Some(diagonal)) => (
            (origin.x - diagonal.x).abs(),
            (origin.y - diagonal.y).abs(),
        ),
        _ => (0.0, 0.0),
    }
}
