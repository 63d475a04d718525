use crate::error::Result;
use std::time::Duration;

/// The transport a worker uses to talk to its peers.
///
/// Sends are non-blocking: the message is queued and the call returns
/// immediately. Receives block until a message from any peer arrives, or
/// until the optional timeout elapses, in which case `Ok(None)` is returned.
/// Matching messages to senders is the job of [`super::Mailbox`].
pub trait Communicator {
    /// The rank of this worker, in `0..size()`.
    fn rank(&self) -> usize;

    /// The number of workers taking part in the run.
    fn size(&self) -> usize;

    /// Queue a message for delivery to the given rank.
    fn send(&self, rank: usize, message: Vec<u8>) -> Result<()>;

    /// Receive the next message from any peer.
    fn recv(&self, timeout: Option<Duration>) -> Result<Option<Vec<u8>>>;
}
