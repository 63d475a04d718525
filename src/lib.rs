//! Conway's Game of Life over a grid split into horizontal strips, one per
//! worker.
//!
//! Workers share nothing: each owns a [`slice::LocalSlice`] of the grid and
//! talks to its neighbors only through a [`message::Communicator`]. Before
//! every generation the neighbors swap boundary rows ([`halo::exchange`]).
//! The coordinator (rank 0) distributes the initial grid and collects the
//! final one ([`scatter`]). [`driver`] ties the phases together.
//!
//! A worker whose peer dies or stops sending waits forever, unless a receive
//! timeout is configured on its [`message::Mailbox`].

pub mod coder;
pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod grid;
pub mod halo;
pub mod io;
pub mod life;
pub mod message;
pub mod scatter;
pub mod slice;
pub mod thread_pool;

pub use context::{Decomposition, WorkerContext};
pub use driver::{run_fleet, run_worker, simulate, Outcome, Run, TimingReport, Transport};
pub use error::{Error, Result};
pub use grid::Grid;
pub use slice::LocalSlice;
