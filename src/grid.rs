use crate::error::{Error, Result};
use rayon::prelude::*;
use std::ops::Range;

/// The full `rows x cols` grid, held by the coordinator before scatter and
/// after gather.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// Make a grid of dead cells.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0; rows * cols],
        }
    }

    /// Make a grid with the listed `(row, col)` cells alive. The first
    /// error from the iterator, or the first cell outside the grid, is
    /// returned instead.
    pub fn from_cells<I>(rows: usize, cols: usize, cells: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<(usize, usize)>>,
    {
        let mut grid = Self::new(rows, cols);

        for cell in cells {
            let (row, col) = cell?;
            if row >= rows || col >= cols {
                return Err(Error::OutOfBounds {
                    row,
                    col,
                    rows,
                    cols,
                });
            }
            grid.set(row, col, true)
        }
        Ok(grid)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get a cell. Panics if out of bounds.
    pub fn get(&self, row: usize, col: usize) -> bool {
        assert!(col < self.cols, "column {} out of range", col);
        self.cells[row * self.cols + col] != 0
    }

    pub fn set(&mut self, row: usize, col: usize, alive: bool) {
        assert!(col < self.cols, "column {} out of range", col);
        self.cells[row * self.cols + col] = alive as u8
    }

    pub fn row(&self, row: usize) -> &[u8] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    /// A contiguous run of whole rows.
    pub fn rows_in(&self, range: Range<usize>) -> &[u8] {
        &self.cells[range.start * self.cols..range.end * self.cols]
    }

    pub fn rows_in_mut(&mut self, range: Range<usize>) -> &mut [u8] {
        &mut self.cells[range.start * self.cols..range.end * self.cols]
    }

    /// The live cells in row-major order.
    pub fn alive_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .par_chunks(self.cols.max(1))
            .enumerate()
            .flat_map_iter(|(i, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, c)| **c != 0)
                    .map(move |(j, _)| (i, j))
            })
            .collect()
    }

    pub fn alive_count(&self) -> usize {
        self.cells.par_iter().filter(|&&c| c != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alive_cells_are_row_major() {
        let cells = vec![Ok((2, 0)), Ok((0, 3)), Ok((0, 1)), Ok((1, 2))];
        let grid = Grid::from_cells(3, 4, cells).unwrap();
        assert_eq!(grid.alive_cells(), vec![(0, 1), (0, 3), (1, 2), (2, 0)]);
        assert_eq!(grid.alive_count(), 4);
        assert_eq!(grid.row(0), &[0, 1, 0, 1]);
        assert_eq!(grid.rows_in(1..3), &[0, 0, 1, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn cells_outside_the_grid_are_rejected() {
        let result = Grid::from_cells(3, 3, vec![Ok((1, 1)), Ok((3, 0))]);
        assert!(matches!(
            result,
            Err(Error::OutOfBounds { row: 3, col: 0, .. })
        ));
        assert!(Grid::from_cells(3, 3, vec![Ok((0, 3))]).is_err());
    }

    #[test]
    fn input_errors_pass_through() {
        let cells = vec![
            Ok((0, 0)),
            Err(Error::Parse {
                line: 2,
                message: "x".into(),
            }),
        ];
        assert!(matches!(
            Grid::from_cells(2, 2, cells),
            Err(Error::Parse { line: 2, .. })
        ));
    }
}
