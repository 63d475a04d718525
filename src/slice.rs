//! A worker's strip of the grid.
//!
//! The strip is stored in one contiguous buffer of `local_rows + 2` rows.
//! Rows `1..=local_rows` are the cells this worker owns. Row `0` and row
//! `local_rows + 1` are halo rows, copies of the neighboring workers'
//! boundary rows (or zeros at the edges of the grid). A second buffer, two
//! columns wider, is scratch space for counting neighbors.

use std::ops::Range;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalSlice {
    pub(crate) local_rows: usize,
    pub(crate) cols: usize,
    pub(crate) cells: Vec<u8>,
    pub(crate) scratch: Vec<u8>,
}

impl LocalSlice {
    /// Allocate a zeroed strip owning `local_rows` rows of `cols` cells.
    pub fn new(local_rows: usize, cols: usize) -> Self {
        Self {
            local_rows,
            cols,
            cells: vec![0; (local_rows + 2) * cols],
            scratch: vec![0; (local_rows + 2) * (cols + 2)],
        }
    }

    pub fn local_rows(&self) -> usize {
        self.local_rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn span(&self, i: usize) -> Range<usize> {
        i * self.cols..(i + 1) * self.cols
    }

    /// The cell at `(i, j)`, where `i` counts halo row `0`. Panics if out of
    /// range.
    pub fn get(&self, i: usize, j: usize) -> bool {
        assert!(j < self.cols, "column {} out of range", j);
        self.cells[i * self.cols + j] != 0
    }

    pub fn set(&mut self, i: usize, j: usize, alive: bool) {
        assert!(j < self.cols, "column {} out of range", j);
        self.cells[i * self.cols + j] = alive as u8
    }

    pub fn row(&self, i: usize) -> &[u8] {
        &self.cells[self.span(i)]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [u8] {
        let span = self.span(i);
        &mut self.cells[span]
    }

    pub fn clear_row(&mut self, i: usize) {
        for cell in self.row_mut(i) {
            *cell = 0
        }
    }

    /// The owned rows, without halos, as one contiguous slice.
    pub fn interior(&self) -> &[u8] {
        &self.cells[self.cols..(self.local_rows + 1) * self.cols]
    }

    pub fn interior_mut(&mut self) -> &mut [u8] {
        let end = (self.local_rows + 1) * self.cols;
        &mut self.cells[self.cols..end]
    }

    /// The owned rows, one mutable slice per row, top to bottom.
    pub fn interior_rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, u8> {
        let cols = self.cols;
        self.interior_mut().chunks_exact_mut(cols)
    }

    /// The top and bottom halo rows, borrowed together.
    pub fn halo_rows_mut(&mut self) -> (&mut [u8], &mut [u8]) {
        let cols = self.cols;
        let (top, rest) = self.cells.split_at_mut(cols);
        let bottom_start = rest.len() - cols;
        (top, &mut rest[bottom_start..])
    }
}
