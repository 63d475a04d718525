//! Distributing the initial grid to the workers, and collecting the final
//! grid back on the coordinator.

use crate::context::WorkerContext;
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::message::{Communicator, Mailbox, Requests, Tag};
use crate::slice::LocalSlice;

/// Build this worker's strip of the initial grid. The coordinator must pass
/// the full grid; it sends every other worker its rows, one message per row,
/// and copies its own. Every other worker receives its rows from the
/// coordinator.
pub fn scatter<C: Communicator>(
    ctx: &WorkerContext,
    mailbox: &mut Mailbox<C>,
    grid: Option<&Grid>,
) -> Result<LocalSlice> {
    let mut slice = LocalSlice::new(ctx.local_rows(), ctx.cols());
    let mut requests = Requests::new();

    if ctx.is_coordinator() {
        let grid = grid.ok_or_else(|| Error::Config("the coordinator has no initial grid".into()))?;
        let d = ctx.decomposition();

        if (grid.rows(), grid.cols()) != (d.rows(), d.cols()) {
            return Err(Error::Config(format!(
                "initial grid is {} x {}, expected {} x {}",
                grid.rows(),
                grid.cols(),
                d.rows(),
                d.cols()
            )));
        }
        for peer in 1..ctx.workers() {
            for row in d.rows_of(peer) {
                requests.isend(mailbox, peer, Tag::Scatter(row), grid.row(row))?;
            }
        }
        slice
            .interior_mut()
            .copy_from_slice(grid.rows_in(ctx.row_range()));
        log::debug!("scattered {} rows to {} workers", requests.len(), ctx.workers() - 1);
        requests.wait_all(mailbox)?;
    } else {
        let first = ctx.row_range().start;

        for (k, row) in slice.interior_rows_mut().enumerate() {
            requests.irecv(0, Tag::Scatter(first + k), row);
        }
        requests.wait_all(mailbox)?;
        log::debug!("rank {} received rows {:?}", ctx.rank(), ctx.row_range());
    }
    Ok(slice)
}

/// Reassemble the full grid from every worker's owned rows. Returns the grid
/// on the coordinator and `None` everywhere else.
pub fn gather<C: Communicator>(
    ctx: &WorkerContext,
    mailbox: &mut Mailbox<C>,
    slice: &LocalSlice,
) -> Result<Option<Grid>> {
    let mut requests = Requests::new();

    if ctx.is_coordinator() {
        let d = ctx.decomposition();
        let mut grid = Grid::new(d.rows(), d.cols());
        grid.rows_in_mut(ctx.row_range())
            .copy_from_slice(slice.interior());

        let others = ctx.local_rows()..d.rows();
        for (k, row) in grid
            .rows_in_mut(others.clone())
            .chunks_exact_mut(d.cols())
            .enumerate()
        {
            let global = others.start + k;
            requests.irecv(global / ctx.local_rows(), Tag::Gather(global), row);
        }
        requests.wait_all(mailbox)?;
        log::debug!("gathered {} rows", d.rows());
        Ok(Some(grid))
    } else {
        for (k, global) in ctx.row_range().enumerate() {
            requests.isend(mailbox, 0, Tag::Gather(global), slice.row(k + 1))?;
        }
        requests.wait_all(mailbox)?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Decomposition;
    use crate::message::{LocalCommunicator, NullCommunicator};
    use std::thread;

    fn checkerboard(rows: usize, cols: usize) -> Grid {
        let cells = (0..rows)
            .flat_map(|i| (0..cols).map(move |j| (i, j)))
            .filter(|(i, j)| (i * 7 + j * 3) % 4 == 0)
            .map(Ok);
        Grid::from_cells(rows, cols, cells).unwrap()
    }

    #[test]
    fn scatter_then_gather_restores_the_grid() {
        let grid = checkerboard(8, 5);
        let decomposition = Decomposition::new(8, 5, 4).unwrap();

        let handles: Vec<_> = LocalCommunicator::fleet(4)
            .into_iter()
            .map(|comm| {
                let initial = Some(grid.clone()).filter(|_| comm.rank() == 0);
                thread::spawn(move || {
                    let ctx = decomposition.context(comm.rank());
                    let mut mailbox = Mailbox::new(comm);
                    let slice = scatter(&ctx, &mut mailbox, initial.as_ref()).unwrap();
                    assert_eq!(slice.interior(), checkerboard(8, 5).rows_in(ctx.row_range()));
                    assert_eq!(slice.row(0), &[0; 5]);
                    gather(&ctx, &mut mailbox, &slice).unwrap()
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results[0].as_ref(), Some(&grid));
        assert!(results[1..].iter().all(Option::is_none));
    }

    #[test]
    fn coordinator_without_a_grid_is_a_config_error() {
        let ctx = Decomposition::new(2, 2, 1).unwrap().context(0);
        let mut mailbox = Mailbox::new(NullCommunicator::new());
        assert!(matches!(
            scatter(&ctx, &mut mailbox, None),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn mismatched_grid_is_a_config_error() {
        let ctx = Decomposition::new(2, 2, 1).unwrap().context(0);
        let mut mailbox = Mailbox::new(NullCommunicator::new());
        let grid = Grid::new(3, 2);
        assert!(matches!(
            scatter(&ctx, &mut mailbox, Some(&grid)),
            Err(Error::Config(_))
        ));
    }
}
