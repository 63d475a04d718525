use super::comm::Communicator;
use super::envelope::{Envelope, Tag};
use crate::coder::{CborCoder, Coder};
use crate::error::{Error, Result};
use std::convert::TryFrom;
use std::time::Duration;

/// Wraps a communicator to deliver messages by `(source, tag)`.
///
/// Messages that arrive before anyone asks for them are parked in an
/// undelivered queue, so receives may be completed in any order regardless
/// of the order messages arrive in. Messages with the same source and tag
/// are delivered first-in first-out.
pub struct Mailbox<C: Communicator> {
    comm: C,
    code: CborCoder<Envelope>,
    undelivered: Vec<Envelope>,
    timeout: Option<Duration>,
}

impl<C: Communicator> Mailbox<C> {
    pub fn new(comm: C) -> Self {
        Self {
            comm,
            code: CborCoder::new(),
            undelivered: Vec::new(),
            timeout: None,
        }
    }

    /// Bound every wait on a single message. Without a timeout, a peer that
    /// never sends blocks the receiver forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn rank(&self) -> usize {
        self.comm.rank()
    }

    pub fn size(&self) -> usize {
        self.comm.size()
    }

    /// Queue a message for the given rank. Never blocks.
    pub fn post(&self, dest: usize, tag: Tag, payload: Vec<u8>) -> Result<()> {
        let envelope = Envelope {
            source: self.rank(),
            tag,
            payload,
        };
        self.comm.send(dest, self.code.encode(envelope)?)
    }

    /// Block until the message from `source` with the given tag is here.
    pub fn receive(&mut self, source: usize, tag: Tag) -> Result<Vec<u8>> {
        if let Some(index) = self
            .undelivered
            .iter()
            .position(|e| e.source == source && e.tag == tag)
        {
            return Ok(self.undelivered.remove(index).payload);
        }
        loop {
            let message = self.comm.recv(self.timeout)?.ok_or_else(|| Error::Timeout {
                peer: source,
                tag: format!("{:?}", tag),
            })?;
            let envelope = self.code.decode(message)?;

            if envelope.source == source && envelope.tag == tag {
                return Ok(envelope.payload);
            }
            self.undelivered.push(envelope)
        }
    }

    /// Number of messages that arrived but have not been asked for yet.
    pub fn undelivered(&self) -> usize {
        self.undelivered.len()
    }

    /// Block until every rank has reached the barrier with this number.
    pub fn barrier(&mut self, phase: u32) -> Result<()> {
        let tag = Tag::Barrier(phase);

        if self.rank() == 0 {
            for peer in 1..self.size() {
                self.receive(peer, tag)?;
            }
            for peer in 1..self.size() {
                self.post(peer, tag, Vec::new())?;
            }
        } else {
            self.post(0, tag, Vec::new())?;
            self.receive(0, tag)?;
        }
        Ok(())
    }

    /// Collect one sample from every rank on the coordinator, ordered by
    /// rank. Returns `None` on every other rank.
    pub fn gather_samples(&mut self, sample: f64) -> Result<Option<Vec<f64>>> {
        if self.rank() != 0 {
            self.post(0, Tag::Report, sample.to_le_bytes().to_vec())?;
            return Ok(None);
        }
        let mut samples = vec![sample];

        for peer in 1..self.size() {
            let payload = self.receive(peer, Tag::Report)?;
            let bytes = <[u8; 8]>::try_from(payload.as_slice()).map_err(|_| {
                Error::Decode(format!(
                    "rank {} reported {} bytes instead of an f64",
                    peer,
                    payload.len()
                ))
            })?;
            samples.push(f64::from_le_bytes(bytes));
        }
        Ok(Some(samples))
    }
}
