use serde::{Deserialize, Serialize};

/// Identifies which exchange a message belongs to. Together with the sender
/// rank, a tag uniquely names the receive a message is meant to complete.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// A row of the initial grid, by global row index.
    Scatter(usize),
    /// A boundary row for the given generation.
    Halo(u64),
    /// A row of the final grid, by global row index.
    Gather(usize),
    /// Arrival at, or release from, the numbered barrier.
    Barrier(u32),
    /// A worker's elapsed simulation time.
    Report,
}

/// What actually travels over a [`super::Communicator`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub source: usize,
    pub tag: Tag,
    pub payload: Vec<u8>,
}
