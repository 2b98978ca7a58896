//! Grid coordinates for addressing plots.
//!
//! The garden is stored as a flat, fixed-size collection but addressed by
//! callers either way: a linear index or a (row, column) pair.

use serde::{Deserialize, Serialize};

/// Position of a plot within the garden grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlotCoord {
    /// Row within the grid (0-based, top to bottom)
    pub row: u16,
    /// Column within the grid (0-based, left to right)
    pub col: u16,
}

impl PlotCoord {
    /// Creates a new plot coordinate.
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }

    /// Converts to a linear index given the garden's column count.
    #[must_use]
    pub const fn to_index(self, columns: u16) -> usize {
        self.row as usize * columns as usize + self.col as usize
    }

    /// Creates a coordinate from a linear index given the column count.
    ///
    /// A zero column count is treated as a single-column grid.
    #[must_use]
    pub const fn from_index(index: usize, columns: u16) -> Self {
        let columns = if columns == 0 { 1 } else { columns as usize };
        Self {
            row: (index / columns) as u16,
            col: (index % columns) as u16,
        }
    }
}

impl std::fmt::Display for PlotCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        let coord = PlotCoord::new(2, 3);
        let index = coord.to_index(5);
        assert_eq!(index, 13);
        assert_eq!(PlotCoord::from_index(index, 5), coord);
    }

    #[test]
    fn test_single_row() {
        assert_eq!(PlotCoord::new(0, 7).to_index(10), 7);
        assert_eq!(PlotCoord::from_index(7, 10), PlotCoord::new(0, 7));
    }

    #[test]
    fn test_zero_columns_treated_as_one() {
        assert_eq!(PlotCoord::from_index(4, 0), PlotCoord::new(4, 0));
    }

    proptest::proptest! {
        #[test]
        fn prop_index_round_trip(row in 0u16..512, col in 0u16..512, extra in 0u16..512) {
            let columns = col + extra + 1;
            let coord = PlotCoord::new(row, col);
            proptest::prop_assert_eq!(PlotCoord::from_index(coord.to_index(columns), columns), coord);
        }
    }
}
