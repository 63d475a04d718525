use super::comm::Communicator;
use crate::error::{Error, Result};
use std::time::Duration;

/// The communicator of a run with a single worker. There is nobody to talk
/// to, so sends and receives are errors.
pub struct NullCommunicator {}

impl NullCommunicator {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for NullCommunicator {
    fn default() -> Self {
        Self::new()
    }
}

impl Communicator for NullCommunicator {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn send(&self, rank: usize, _message: Vec<u8>) -> Result<()> {
        Err(Error::Comm(format!(
            "cannot send to rank {} on a null communicator",
            rank
        )))
    }

    fn recv(&self, _timeout: Option<Duration>) -> Result<Option<Vec<u8>>> {
        Err(Error::Comm("cannot recv on a null communicator".into()))
    }
}
