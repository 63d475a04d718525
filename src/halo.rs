//! Refreshing the halo rows before each generation.
//!
//! Every worker sends its top owned row to the worker above and its bottom
//! owned row to the worker below, and receives their facing rows into its
//! own halo rows. Workers at the top and bottom of the grid fill the halo
//! row on that side with zeros instead.

use crate::context::WorkerContext;
use crate::error::Result;
use crate::message::{Communicator, Mailbox, Requests, Tag};
use crate::slice::LocalSlice;

/// Run one exchange round. All sends and receives are issued first, then
/// awaited together, so the two directions may complete in either order.
pub fn exchange<C: Communicator>(
    ctx: &WorkerContext,
    mailbox: &mut Mailbox<C>,
    slice: &mut LocalSlice,
    generation: u64,
) -> Result<()> {
    let tag = Tag::Halo(generation);
    let last = ctx.local_rows();
    let mut requests = Requests::new();

    if let Some(upper) = ctx.upper_neighbor() {
        requests.isend(mailbox, upper, tag, slice.row(1))?;
    }
    if let Some(lower) = ctx.lower_neighbor() {
        requests.isend(mailbox, lower, tag, slice.row(last))?;
    }

    let (top, bottom) = slice.halo_rows_mut();

    match ctx.upper_neighbor() {
        Some(upper) => requests.irecv(upper, tag, top),
        None => top.iter_mut().for_each(|c| *c = 0),
    }
    match ctx.lower_neighbor() {
        Some(lower) => requests.irecv(lower, tag, bottom),
        None => bottom.iter_mut().for_each(|c| *c = 0),
    }

    log::trace!(
        "rank {} exchanging {} halo rows for generation {}",
        ctx.rank(),
        requests.len(),
        generation
    );
    requests.wait_all(mailbox)
}
