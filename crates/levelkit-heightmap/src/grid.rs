//! Row/column height grid
//!
//! Rows follow Y, columns follow X. A flat sample list is split into rows
//! each time the X coordinate returns to the first sample's X.

use crate::sample::HeightPoint;
use levelkit_core::HeightMapError;
use serde::{Deserialize, Serialize};

/// Position of a cell in a [`HeightGrid`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridIndex {
    pub row: usize,
    pub column: usize,
}

impl GridIndex {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// A rectangular, row-major grid of height samples
///
/// Always holds at least one row and one column, and every row has the same
/// number of columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<HeightPoint>>", into = "Vec<Vec<HeightPoint>>")]
pub struct HeightGrid {
    rows: Vec<Vec<HeightPoint>>,
}

impl HeightGrid {
    /// Group ordered samples into rows
    pub fn build(samples: &[HeightPoint]) -> Result<Self, HeightMapError> {
        let first_x = samples.first().ok_or(HeightMapError::Empty)?.x;

        let mut rows: Vec<Vec<HeightPoint>> = Vec::new();
        for sample in samples {
            if sample.x == first_x {
                rows.push(Vec::new());
            }
            if let Some(row) = rows.last_mut() {
                row.push(*sample);
            }
        }

        Self::from_rows(rows)
    }

    /// Wrap pre-arranged rows, checking the grid is rectangular
    pub fn from_rows(rows: Vec<Vec<HeightPoint>>) -> Result<Self, HeightMapError> {
        let expected = rows.first().map(Vec::len).unwrap_or(0);
        if expected == 0 {
            return Err(HeightMapError::Empty);
        }
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != expected)
        {
            return Err(HeightMapError::NotRectangular {
                row,
                expected,
                found,
            });
        }
        Ok(Self { rows })
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.rows[0].len()
    }

    pub fn len(&self) -> usize {
        self.num_rows() * self.num_columns()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn rows(&self) -> &[Vec<HeightPoint>] {
        &self.rows
    }

    pub fn get(&self, index: GridIndex) -> Option<&HeightPoint> {
        self.rows.get(index.row)?.get(index.column)
    }

    /// All points in row-major order
    pub fn points(&self) -> impl Iterator<Item = &HeightPoint> {
        self.rows.iter().flatten()
    }

    /// A copy where every Z is offset by `-reference_z`
    pub fn relative_to(&self, reference_z: f64) -> HeightGrid {
        self.map_points(|p| HeightPoint {
            z: p.z - reference_z,
            ..*p
        })
    }

    /// A copy shifted in XY, used to move probe coordinates into program space
    pub fn translated(&self, dx: f64, dy: f64) -> HeightGrid {
        self.map_points(|p| HeightPoint {
            x: p.x + dx,
            y: p.y + dy,
            ..*p
        })
    }

    fn map_points(&self, f: impl Fn(&HeightPoint) -> HeightPoint) -> HeightGrid {
        HeightGrid {
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(&f).collect())
                .collect(),
        }
    }

    pub fn into_rows(self) -> Vec<Vec<HeightPoint>> {
        self.rows
    }
}

impl TryFrom<Vec<Vec<HeightPoint>>> for HeightGrid {
    type Error = HeightMapError;

    fn try_from(rows: Vec<Vec<HeightPoint>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<HeightGrid> for Vec<Vec<HeightPoint>> {
    fn from(grid: HeightGrid) -> Self {
        grid.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(cols: usize, rows: usize) -> Vec<HeightPoint> {
        let mut out = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                out.push(HeightPoint::new(c as f64 * 10.0, r as f64 * 10.0, r as f64));
            }
        }
        out
    }

    #[test]
    fn test_build_groups_rows_by_first_x() {
        let grid = HeightGrid::build(&samples(3, 2)).unwrap();
        assert_eq!(grid.num_rows(), 2);
        assert_eq!(grid.num_columns(), 3);
        assert_eq!(grid.get(GridIndex::new(1, 2)).unwrap().x, 20.0);
        assert_eq!(grid.get(GridIndex::new(1, 2)).unwrap().y, 10.0);
    }

    #[test]
    fn test_build_empty_fails() {
        assert!(matches!(
            HeightGrid::build(&[]),
            Err(HeightMapError::Empty)
        ));
    }

    #[test]
    fn test_build_ragged_fails() {
        let mut pts = samples(3, 2);
        pts.pop();
        let err = HeightGrid::build(&pts).unwrap_err();
        assert!(matches!(
            err,
            HeightMapError::NotRectangular {
                row: 1,
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn test_relative_and_translated() {
        let grid = HeightGrid::build(&samples(2, 2)).unwrap();
        let rel = grid.relative_to(1.0);
        assert_eq!(rel.get(GridIndex::new(0, 0)).unwrap().z, -1.0);
        assert_eq!(rel.get(GridIndex::new(1, 1)).unwrap().z, 0.0);

        let moved = grid.translated(5.0, -5.0);
        assert_eq!(moved.get(GridIndex::new(1, 1)).unwrap().x, 15.0);
        assert_eq!(moved.get(GridIndex::new(1, 1)).unwrap().y, 5.0);
    }

    #[test]
    fn test_deserialize_rejects_ragged_rows() {
        let json = r#"[[{"x":0,"y":0,"z":0},{"x":1,"y":0,"z":0}],[{"x":0,"y":1,"z":0}]]"#;
        assert!(serde_json::from_str::<HeightGrid>(json).is_err());
    }
}
