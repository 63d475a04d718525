//! One generation of Conway's Game of Life over a worker's strip.

use crate::slice::LocalSlice;

/// A dead cell is born with exactly three live neighbors; a live cell
/// survives with two or three.
pub fn rule(alive: bool, neighbors: u8) -> bool {
    matches!((alive, neighbors), (true, 2) | (_, 3))
}

impl LocalSlice {
    /// Advance the owned rows by one generation. The halo rows must already
    /// hold the neighbors' current boundary rows; they are left untouched.
    pub fn step(&mut self) {
        let cols = self.cols;
        let width = cols + 2;

        // Shift every row one column right into scratch, with a dead column
        // on either side.
        for (row, padded) in self
            .cells
            .chunks_exact(cols)
            .zip(self.scratch.chunks_exact_mut(width))
        {
            padded[0] = 0;
            padded[width - 1] = 0;
            for (p, &c) in padded[1..=cols].iter_mut().zip(row) {
                *p = (c != 0) as u8
            }
        }

        let scratch = &self.scratch;
        let cells = &mut self.cells;

        for i in 1..=self.local_rows {
            let above = &scratch[(i - 1) * width..i * width];
            let here = &scratch[i * width..(i + 1) * width];
            let below = &scratch[(i + 1) * width..(i + 2) * width];

            for j in 1..=cols {
                let neighbors = above[j - 1]
                    + above[j]
                    + above[j + 1]
                    + here[j - 1]
                    + here[j + 1]
                    + below[j - 1]
                    + below[j]
                    + below[j + 1];
                cells[i * cols + j - 1] = rule(here[j] == 1, neighbors) as u8;
            }
        }
    }

    /// The number of live cells among the owned rows.
    pub fn alive_count(&self) -> usize {
        self.interior().iter().filter(|&&c| c != 0).count()
    }
}
