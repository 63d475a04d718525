//! Provides a message-passing communicator based on TCP sockets.
//!
//! TCP is a connection-oriented protocol, which means that a connection must
//! be established between the sending and receiving ends of the socket in
//! order to read from or write to a stream. Messages from one peer to another
//! always travel over the same connection, so they arrive in the order they
//! were sent.

use super::comm::Communicator;
use super::util;
use crate::error::{Error, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

const ACCEPT_POLL: Duration = Duration::from_millis(1);
const CONNECT_RETRY: Duration = Duration::from_millis(100);
const CONNECT_ATTEMPTS: usize = 100;

type SendS = Sender<(SocketAddr, Vec<u8>)>;
type RecvS = Sender<Vec<u8>>;
type RecvR = Receiver<Vec<u8>>;

/// Maintains a cache of ingoing and outgoing TCP connections.
///
/// This object facilitates non-blocking sends and blocking receives from any
/// peer. Communicating with a remote peer only opens a new connection on the
/// first call; subsequent communications with that peer reuse the cached
/// connection. Each accepted connection gets its own reader thread, which
/// forwards complete frames into a single inbox.
pub struct ConnectionPool {
    alive: Arc<AtomicBool>,
    failure: Arc<Mutex<Option<String>>>,
    send_s: Option<SendS>,
    recv_r: RecvR,
    send_thread: Option<thread::JoinHandle<()>>,
    accept_thread: Option<thread::JoinHandle<()>>,
}

impl ConnectionPool {
    /// Creates a `ConnectionPool` from a `TcpListener`. The listener is
    /// placed in a non-blocking accept mode, so the pre-existing blocking
    /// mode is overwritten.
    pub fn from_listener(listener: TcpListener) -> std::io::Result<Self> {
        let (send_s, send_r) = crossbeam_channel::unbounded::<(SocketAddr, Vec<u8>)>();
        let (recv_s, recv_r): (RecvS, RecvR) = crossbeam_channel::unbounded();
        let alive = Arc::new(AtomicBool::new(true));
        let failure = Arc::new(Mutex::new(None));

        listener.set_nonblocking(true)?;

        // This thread takes the receiving end of the message sender channel.
        let send_failure = failure.clone();
        let send_thread = thread::spawn(move || {
            let mut streams = HashMap::new();
            for (address, message) in send_r {
                let written = match streams.entry(address) {
                    std::collections::hash_map::Entry::Occupied(entry) => {
                        util::write_frame(entry.into_mut(), &message)
                    }
                    std::collections::hash_map::Entry::Vacant(entry) => {
                        connect(address).and_then(|stream| {
                            util::write_frame(entry.insert(stream), &message)
                        })
                    }
                };
                if let Err(e) = written {
                    log::error!("failed to send {} bytes to {}: {}", message.len(), address, e);
                    record(&send_failure, format!("sending to {}: {}", address, e));
                    break;
                }
            }
        });

        // This thread accepts connections, and hands each one to a reader.
        let keep_accepting = alive.clone();
        let accept_failure = failure.clone();
        let accept_thread = thread::spawn(move || {
            while keep_accepting.load(Ordering::Relaxed) {
                match listener.accept() {
                    Ok((stream, address)) => {
                        let recv_s = recv_s.clone();
                        thread::spawn(move || read_stream(stream, address, recv_s));
                    }
                    Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
                    Err(e) => {
                        record(&accept_failure, format!("accepting connections: {}", e));
                        break;
                    }
                }
            }
        });

        Ok(Self {
            alive,
            failure,
            send_s: Some(send_s),
            recv_r,
            send_thread: Some(send_thread),
            accept_thread: Some(accept_thread),
        })
    }

    fn check(&self) -> Result<()> {
        match self.failure.lock().ok().and_then(|failure| failure.clone()) {
            Some(message) => Err(Error::Comm(message)),
            None => Ok(()),
        }
    }

    /// Initiates a receive from any peer, blocking at most `timeout`.
    pub fn recv(&self, timeout: Option<Duration>) -> Result<Option<Vec<u8>>> {
        self.check()?;
        let hung_up = || Error::Comm("connection pool has shut down".into());
        match timeout {
            None => self.recv_r.recv().map(Some).map_err(|_| hung_up()),
            Some(timeout) => match self.recv_r.recv_timeout(timeout) {
                Ok(message) => Ok(Some(message)),
                Err(RecvTimeoutError::Timeout) => self.check().map(|_| None),
                Err(RecvTimeoutError::Disconnected) => Err(hung_up()),
            },
        }
    }

    /// Initiates a non-blocking send to a particular peer.
    pub fn send(&self, peer: SocketAddr, message: Vec<u8>) -> Result<()> {
        self.check()?;
        self.send_s
            .as_ref()
            .ok_or_else(|| Error::Comm("connection pool has shut down".into()))?
            .send((peer, message))
            .map_err(|_| Error::Comm(format!("sender thread for {} has stopped", peer)))
    }
}

impl Drop for ConnectionPool {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Relaxed);
        self.send_s.take();
        if let Some(handle) = self.send_thread.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.accept_thread.take() {
            let _ = handle.join();
        }
    }
}

fn record(failure: &Mutex<Option<String>>, message: String) {
    if let Ok(mut failure) = failure.lock() {
        failure.get_or_insert(message);
    }
}

/// Peers in a multi-process run come up at different times, so the first
/// connection to each one is retried for a while.
fn connect(address: SocketAddr) -> std::io::Result<TcpStream> {
    let mut attempt = 0;
    loop {
        match TcpStream::connect(address) {
            Ok(stream) => {
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(e) if attempt + 1 < CONNECT_ATTEMPTS => {
                log::debug!("connecting to {} failed ({}), retrying", address, e);
                attempt += 1;
                thread::sleep(CONNECT_RETRY);
            }
            Err(e) => return Err(e),
        }
    }
}

fn read_stream(mut stream: TcpStream, address: SocketAddr, recv_s: RecvS) {
    if let Err(e) = stream.set_nonblocking(false) {
        log::error!("could not configure connection from {}: {}", address, e);
        return;
    }
    loop {
        match util::read_frame(&mut stream) {
            Ok(message) => {
                if recv_s.send(message).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                log::trace!("connection from {} closed", address);
                break;
            }
            Err(e) => {
                log::warn!("dropping connection from {}: {}", address, e);
                break;
            }
        }
    }
}

pub struct TcpCommunicator {
    rank: usize,
    peers: Vec<SocketAddr>,
    connections: ConnectionPool,
}

impl TcpCommunicator {
    /// Bind this rank's address from the peer list and start listening.
    pub fn new(rank: usize, peers: Vec<SocketAddr>) -> Result<Self> {
        let address = *peers.get(rank).ok_or_else(|| {
            Error::Config(format!("rank {} is not in a list of {} peers", rank, peers.len()))
        })?;
        let listener = TcpListener::bind(address).map_err(|e| Error::Comm(format!("binding {}: {}", address, e)))?;
        Self::from_listener(rank, listener, peers)
    }

    /// Wrap an already-bound listener. `peers[rank]` should be its address.
    pub fn from_listener(rank: usize, listener: TcpListener, peers: Vec<SocketAddr>) -> Result<Self> {
        let connections =
            ConnectionPool::from_listener(listener).map_err(|e| Error::Comm(e.to_string()))?;
        Ok(Self {
            rank,
            peers,
            connections,
        })
    }

    /// Create `size` communicators listening on ephemeral loopback ports,
    /// ordered by rank, for a fleet of workers in this process.
    pub fn loopback_fleet(size: usize) -> Result<Vec<Self>> {
        let listeners = (0..size)
            .map(|_| TcpListener::bind((Ipv4Addr::LOCALHOST, 0)))
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| Error::Comm(format!("binding loopback listener: {}", e)))?;
        let peers = listeners
            .iter()
            .map(TcpListener::local_addr)
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| Error::Comm(e.to_string()))?;

        listeners
            .into_iter()
            .enumerate()
            .map(|(rank, listener)| Self::from_listener(rank, listener, peers.clone()))
            .collect()
    }
}

impl Communicator for TcpCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    fn send(&self, rank: usize, message: Vec<u8>) -> Result<()> {
        let peer = *self
            .peers
            .get(rank)
            .ok_or_else(|| Error::Comm(format!("no rank {} in a fleet of {}", rank, self.size())))?;
        self.connections.send(peer, message)
    }

    fn recv(&self, timeout: Option<Duration>) -> Result<Option<Vec<u8>>> {
        self.connections.recv(timeout)
    }
}
