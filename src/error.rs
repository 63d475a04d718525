//! The crate-wide error type.
//!
//! Every failure is terminal for the run: there is no retry policy anywhere.
//! Configuration errors are raised once by the coordinator, I/O and parse
//! errors by the input and output collaborators, and communication errors by
//! the transport layer.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("cell ({row}, {col}) lies outside the {rows} x {cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("communication failure: {0}")]
    Comm(String),

    #[error("timed out waiting for {tag} from rank {peer}")]
    Timeout { peer: usize, tag: String },

    #[error("undecodable message: {0}")]
    Decode(String),

    #[error("worker failed: {0}")]
    Worker(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
