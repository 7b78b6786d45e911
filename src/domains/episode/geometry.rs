use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Planar pose: position in metres, heading in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.theta]
    }
}

impl From<[f64; 3]> for Pose {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.theta)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<[f64; 3]> for Point3D {
    fn from(v: [f64; 3]) -> Self {
        Self { x: v[0], y: v[1], z: v[2] }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum GridError {
    #[error("row {row} has {actual} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("cell ({row}, {col}) is {value}, expected 0 or 1")]
    InvalidCell { row: usize, col: usize, value: i64 },
}

/// Rectangular grid of navigable (1) and blocked (0) cells, indexed `[row][col]`
/// where rows run along y and columns along x.
///
/// Serializes as the wire form, a 2D array of 0/1, and deserializes through
/// [`TraversabilityGrid::from_rows`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<i64>>", into = "Vec<Vec<i64>>")]
pub struct TraversabilityGrid {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl TraversabilityGrid {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a grid from row-major flags, rejecting ragged rows and values
    /// other than 0 and 1.
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Result<Self, GridError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut cells = Vec::with_capacity(rows.len() * cols);

        for (r, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(GridError::Ragged {
                    row: r,
                    expected: cols,
                    actual: row.len(),
                });
            }
            for (c, &value) in row.iter().enumerate() {
                match value {
                    0 => cells.push(false),
                    1 => cells.push(true),
                    _ => return Err(GridError::InvalidCell { row: r, col: c, value }),
                }
            }
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col).copied()
    }

    /// Out-of-bounds cells are never traversable.
    pub fn is_traversable(&self, row: usize, col: usize) -> bool {
        self.get(row, col).unwrap_or(false)
    }
}

impl TryFrom<Vec<Vec<i64>>> for TraversabilityGrid {
    type Error = GridError;

    fn try_from(rows: Vec<Vec<i64>>) -> Result<Self, GridError> {
        Self::from_rows(rows)
    }
}

impl From<TraversabilityGrid> for Vec<Vec<i64>> {
    fn from(grid: TraversabilityGrid) -> Self {
        if grid.cols == 0 {
            return vec![Vec::new(); grid.rows];
        }
        grid.cells
            .chunks(grid.cols)
            .map(|row| row.iter().map(|&open| i64::from(open)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_validates_shape() {
        let grid: TraversabilityGrid = serde_json::from_str("[[1, 0], [0, 1]]").unwrap();
        assert_eq!(grid.shape(), (2, 2));
        assert_eq!(serde_json::to_string(&grid).unwrap(), "[[1,0],[0,1]]");

        assert!(serde_json::from_str::<TraversabilityGrid>("[[1, 0, 1], [1]]").is_err());
        assert!(serde_json::from_str::<TraversabilityGrid>("[[2]]").is_err());
        // the internal layout is not an accepted input
        assert!(serde_json::from_str::<TraversabilityGrid>(r#"{"rows":2,"cols":3,"cells":[true]}"#).is_err());
    }

    #[test]
    fn test_grid_from_rows() {
        let grid = TraversabilityGrid::from_rows(vec![vec![1, 0, 1], vec![0, 1, 1]]).unwrap();
        assert_eq!(grid.shape(), (2, 3));
        assert_eq!(grid.get(0, 1), Some(false));
        assert_eq!(grid.get(1, 2), Some(true));
        assert_eq!(grid.get(2, 0), None);
        assert!(!grid.is_traversable(5, 5));
    }

    #[test]
    fn test_ragged_grid_rejected() {
        let err = TraversabilityGrid::from_rows(vec![vec![1, 1], vec![1]]).unwrap_err();
        assert_eq!(
            err,
            GridError::Ragged {
                row: 1,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_non_binary_cell_rejected() {
        let err = TraversabilityGrid::from_rows(vec![vec![1, 2]]).unwrap_err();
        assert_eq!(err, GridError::InvalidCell { row: 0, col: 1, value: 2 });
    }

    #[test]
    fn test_empty_grid() {
        let grid = TraversabilityGrid::from_rows(vec![]).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid, TraversabilityGrid::empty());
    }
}
