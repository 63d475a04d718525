use super::comm::Communicator;
use super::envelope::Tag;
use super::mailbox::Mailbox;
use crate::error::{Error, Result};

struct PendingRecv<'a> {
    source: usize,
    tag: Tag,
    destination: &'a mut [u8],
}

/// A batch of non-blocking operations, completed together by
/// [`Requests::wait_all`].
///
/// Sends copy their data and are queued at once, so they are complete as
/// soon as they are issued. Receives hold on to the region of a buffer they
/// will fill, which stays borrowed until the batch is waited on.
#[derive(Default)]
pub struct Requests<'a> {
    sends: usize,
    recvs: Vec<PendingRecv<'a>>,
}

impl<'a> Requests<'a> {
    pub fn new() -> Self {
        Self {
            sends: 0,
            recvs: Vec::new(),
        }
    }

    pub fn isend<C: Communicator>(
        &mut self,
        mailbox: &Mailbox<C>,
        dest: usize,
        tag: Tag,
        data: &[u8],
    ) -> Result<()> {
        mailbox.post(dest, tag, data.to_vec())?;
        self.sends += 1;
        Ok(())
    }

    pub fn irecv(&mut self, source: usize, tag: Tag, destination: &'a mut [u8]) {
        self.recvs.push(PendingRecv {
            source,
            tag,
            destination,
        })
    }

    /// The number of operations issued in this batch.
    pub fn len(&self) -> usize {
        self.sends + self.recvs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Block until every receive in the batch has completed. A message whose
    /// length differs from its destination is an error: rows only ever move
    /// whole.
    pub fn wait_all<C: Communicator>(self, mailbox: &mut Mailbox<C>) -> Result<()> {
        for recv in self.recvs {
            let payload = mailbox.receive(recv.source, recv.tag)?;

            if payload.len() != recv.destination.len() {
                return Err(Error::Comm(format!(
                    "expected {} values for {:?} from rank {}, got {}",
                    recv.destination.len(),
                    recv.tag,
                    recv.source,
                    payload.len()
                )));
            }
            recv.destination.copy_from_slice(&payload);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::LocalCommunicator;

    #[test]
    fn wait_all_fills_every_destination() {
        let mut fleet = LocalCommunicator::fleet(2);
        let mut b = Mailbox::new(fleet.pop().unwrap());
        let mut a = Mailbox::new(fleet.pop().unwrap());

        let mut sends = Requests::new();
        sends.isend(&a, 1, Tag::Gather(1), &[1, 1, 0]).unwrap();
        sends.isend(&a, 1, Tag::Gather(0), &[0, 0, 1]).unwrap();
        assert_eq!(sends.len(), 2);
        sends.wait_all(&mut a).unwrap();

        let mut rows = vec![9; 6];
        let (first, second) = rows.split_at_mut(3);
        let mut recvs = Requests::new();
        recvs.irecv(0, Tag::Gather(0), first);
        recvs.irecv(0, Tag::Gather(1), second);
        recvs.wait_all(&mut b).unwrap();
        assert_eq!(rows, vec![0, 0, 1, 1, 1, 0]);
    }

    #[test]
    fn short_rows_are_rejected() {
        let mut fleet = LocalCommunicator::fleet(2);
        let mut b = Mailbox::new(fleet.pop().unwrap());
        let a = Mailbox::new(fleet.pop().unwrap());
        a.post(1, Tag::Halo(0), vec![1, 1]).unwrap();

        let mut row = vec![0; 3];
        let mut recvs = Requests::new();
        recvs.irecv(0, Tag::Halo(0), &mut row);
        assert!(matches!(recvs.wait_all(&mut b), Err(Error::Comm(_))));
    }
}
