//! Provides a message-passing communicator for workers that live in the
//! same process, one per thread.
//!
//! Every endpoint owns the receiving end of its own channel and a sending
//! end to every peer's channel. No memory is shared between endpoints beyond
//! the messages themselves, which are moved.

use super::comm::Communicator;
use crate::error::{Error, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

pub struct LocalCommunicator {
    rank: usize,
    peers: Vec<Sender<Vec<u8>>>,
    inbox: Receiver<Vec<u8>>,
}

impl LocalCommunicator {
    /// Create `size` connected endpoints, ordered by rank.
    pub fn fleet(size: usize) -> Vec<Self> {
        let (senders, receivers): (Vec<_>, Vec<_>) =
            (0..size).map(|_| crossbeam_channel::unbounded()).unzip();

        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| Self {
                rank,
                peers: senders.clone(),
                inbox,
            })
            .collect()
    }
}

impl Communicator for LocalCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    fn send(&self, rank: usize, message: Vec<u8>) -> Result<()> {
        let peer = self
            .peers
            .get(rank)
            .ok_or_else(|| Error::Comm(format!("no rank {} in a fleet of {}", rank, self.size())))?;
        peer.send(message)
            .map_err(|_| Error::Comm(format!("rank {} has hung up", rank)))
    }

    fn recv(&self, timeout: Option<Duration>) -> Result<Option<Vec<u8>>> {
        match timeout {
            None => self
                .inbox
                .recv()
                .map(Some)
                .map_err(|_| Error::Comm("all peers have hung up".into())),
            Some(timeout) => match self.inbox.recv_timeout(timeout) {
                Ok(message) => Ok(Some(message)),
                Err(RecvTimeoutError::Timeout) => Ok(None),
                Err(RecvTimeoutError::Disconnected) => {
                    Err(Error::Comm("all peers have hung up".into()))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn fleet_endpoints_know_their_rank() {
        let fleet = LocalCommunicator::fleet(3);
        let ranks: Vec<_> = fleet.iter().map(|c| (c.rank(), c.size())).collect();
        assert_eq!(ranks, vec![(0, 3), (1, 3), (2, 3)]);
    }

    #[test]
    fn messages_move_between_threads() {
        let mut fleet = LocalCommunicator::fleet(2);
        let b = fleet.pop().unwrap();
        let a = fleet.pop().unwrap();
        let echo = thread::spawn(move || {
            let message = b.recv(None).unwrap().unwrap();
            b.send(0, message.into_iter().rev().collect()).unwrap();
        });
        a.send(1, vec![1, 2, 3]).unwrap();
        assert_eq!(a.recv(None).unwrap(), Some(vec![3, 2, 1]));
        echo.join().unwrap();
    }

    #[test]
    fn recv_times_out_when_nobody_sends() {
        let fleet = LocalCommunicator::fleet(2);
        let timeout = Some(Duration::from_millis(10));
        assert_eq!(fleet[0].recv(timeout).unwrap(), None);
    }

    #[test]
    fn sending_to_a_missing_rank_fails() {
        let fleet = LocalCommunicator::fleet(2);
        assert!(matches!(fleet[0].send(5, vec![]), Err(Error::Comm(_))));
    }
}
