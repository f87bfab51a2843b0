//! Grid dimensions and construction errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised when building a light map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LightMapError {
    /// One of the grid dimensions was zero.
    #[error("light grid must have at least one cell (got {cols}x{rows})")]
    EmptyGrid {
        /// Requested column count.
        cols: usize,
        /// Requested row count.
        rows: usize,
    },
    /// `cols * rows` does not fit in memory.
    #[error("light grid {cols}x{rows} is too large")]
    GridTooLarge {
        /// Requested column count.
        cols: usize,
        /// Requested row count.
        rows: usize,
    },
    /// The material table does not cover every cell of the grid.
    #[error("material table has {found} cells, grid needs {expected}")]
    MaterialSizeMismatch {
        /// Cells in the grid.
        expected: usize,
        /// Cells supplied by the material table.
        found: usize,
    },
}

/// Fixed rectangular grid size, addressed row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    /// Number of columns.
    pub cols: usize,
    /// Number of rows.
    pub rows: usize,
}

impl GridSize {
    /// Validate and build a grid size.
    pub fn new(cols: usize, rows: usize) -> Result<Self, LightMapError> {
        if cols == 0 || rows == 0 {
            return Err(LightMapError::EmptyGrid { cols, rows });
        }
        if cols.checked_mul(rows).is_none() {
            return Err(LightMapError::GridTooLarge { cols, rows });
        }
        Ok(Self { cols, rows })
    }

    /// Total cell count.
    #[inline]
    pub fn len(self) -> usize {
        self.cols * self.rows
    }

    /// Always false for a validated size.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Flat index of `(col, row)`.
    #[inline]
    pub fn index(self, col: usize, row: usize) -> usize {
        debug_assert!(col < self.cols);
        debug_assert!(row < self.rows);
        row * self.cols + col
    }

    /// `(col, row)` of a flat index.
    #[inline]
    pub fn coords(self, index: usize) -> (usize, usize) {
        (index % self.cols, index / self.cols)
    }

    /// Whether signed coordinates fall inside the grid.
    #[inline]
    pub fn contains(self, col: i64, row: i64) -> bool {
        col >= 0 && row >= 0 && (col as u64) < self.cols as u64 && (row as u64) < self.rows as u64
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_dimensions() {
        assert_eq!(
            GridSize::new(0, 4),
            Err(LightMapError::EmptyGrid { cols: 0, rows: 4 })
        );
        assert!(GridSize::new(3, 0).is_err());
    }

    #[test]
    fn rejects_overflowing_dimensions() {
        assert!(matches!(
            GridSize::new(usize::MAX, 2),
            Err(LightMapError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn index_and_coords_agree() {
        let size = GridSize::new(7, 3).expect("size");
        for row in 0..3 {
            for col in 0..7 {
                assert_eq!(size.coords(size.index(col, row)), (col, row));
            }
        }
        assert_eq!(size.len(), 21);
    }

    #[test]
    fn contains_handles_negative_coordinates() {
        let size = GridSize::new(2, 2).expect("size");
        assert!(size.contains(1, 1));
        assert!(!size.contains(-1, 0));
        assert!(!size.contains(0, 2));
    }
}
