//! How the grid is split into strips of rows, one per worker.

use crate::error::{Error, Result};
use std::ops::Range;

/// A validated split of a `rows x cols` grid among `workers` workers.
///
/// The row count must divide evenly by the worker count. Remainder rows are
/// rejected rather than silently dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decomposition {
    rows: usize,
    cols: usize,
    workers: usize,
}

impl Decomposition {
    pub fn new(rows: usize, cols: usize, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::Config("at least one worker is required".into()));
        }
        if rows == 0 || cols == 0 {
            return Err(Error::Config(format!(
                "the grid must not be empty (got {} x {})",
                rows, cols
            )));
        }
        if rows % workers != 0 {
            return Err(Error::Config(format!(
                "{} workers do not evenly divide {} rows",
                workers, rows
            )));
        }
        Ok(Self {
            rows,
            cols,
            workers,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// The number of rows every worker owns.
    pub fn local_rows(&self) -> usize {
        self.rows / self.workers
    }

    /// The global rows owned by the given rank.
    pub fn rows_of(&self, rank: usize) -> Range<usize> {
        rank * self.local_rows()..(rank + 1) * self.local_rows()
    }

    /// The context of one worker. Panics if the rank is out of range.
    pub fn context(&self, rank: usize) -> WorkerContext {
        assert!(rank < self.workers, "rank {} out of range", rank);
        WorkerContext {
            rank,
            decomposition: *self,
        }
    }
}

/// Everything a worker needs to know about its place in the run. Built once
/// at startup and handed to every component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkerContext {
    rank: usize,
    decomposition: Decomposition,
}

impl WorkerContext {
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn workers(&self) -> usize {
        self.decomposition.workers
    }

    pub fn local_rows(&self) -> usize {
        self.decomposition.local_rows()
    }

    pub fn cols(&self) -> usize {
        self.decomposition.cols
    }

    pub fn decomposition(&self) -> &Decomposition {
        &self.decomposition
    }

    pub fn is_coordinator(&self) -> bool {
        self.rank == 0
    }

    /// The global rows this worker owns.
    pub fn row_range(&self) -> Range<usize> {
        self.decomposition.rows_of(self.rank)
    }

    /// The worker owning the rows just above this one's, if any.
    pub fn upper_neighbor(&self) -> Option<usize> {
        self.rank.checked_sub(1)
    }

    /// The worker owning the rows just below this one's, if any.
    pub fn lower_neighbor(&self) -> Option<usize> {
        Some(self.rank + 1).filter(|&rank| rank < self.workers())
    }
}
