//! A minimal distributed message-passing API.
//!
//! Transports implement the byte-oriented [`Communicator`] trait: an
//! in-process one over channels ([`LocalCommunicator`]), one over TCP
//! sockets ([`TcpCommunicator`]), and a null one for runs with a single
//! worker. On top of any transport, a [`Mailbox`] delivers tagged
//! [`Envelope`]s by sender, and [`Requests`] batches non-blocking sends and
//! receives into one joint wait.

mod comm;
mod envelope;
mod local;
mod mailbox;
mod null;
mod request;
mod tcp;
mod util;

pub use comm::Communicator;
pub use envelope::{Envelope, Tag};
pub use local::LocalCommunicator;
pub use mailbox::Mailbox;
pub use null::NullCommunicator;
pub use request::Requests;
pub use tcp::TcpCommunicator;
