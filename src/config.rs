//! Command-line configuration.

use crate::context::Decomposition;
use crate::driver::{Run, Transport};
use crate::error::{Error, Result};
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TransportArg {
    /// Channels between threads of this process
    Local,
    /// TCP sockets on the loopback interface
    Tcp,
}

impl From<TransportArg> for Transport {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Local => Transport::Local,
            TransportArg::Tcp => Transport::Tcp,
        }
    }
}

/// Conway's Game of Life on a grid split into strips of rows among workers
#[derive(Debug, Clone, Parser)]
#[command(version)]
pub struct Opts {
    /// File of live cells, one `row,col` per line
    pub input: PathBuf,

    /// Number of generations to simulate
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub generations: u64,

    /// Number of rows in the grid
    pub rows: usize,

    /// Number of columns in the grid
    pub cols: usize,

    /// Number of workers in this process; must divide the number of rows
    #[arg(short = 'w', long, default_value_t = 1)]
    pub workers: usize,

    /// How in-process workers exchange messages
    #[arg(long, value_enum, default_value_t = TransportArg::Local)]
    pub transport: TransportArg,

    /// Run only this rank, talking TCP to the processes in --peers
    #[arg(long, requires = "peers")]
    pub rank: Option<usize>,

    /// Comma-separated addresses of every rank, in rank order
    #[arg(long, value_delimiter = ',', requires = "rank")]
    pub peers: Vec<SocketAddr>,

    /// Give up if a peer sends nothing for this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Where to write the live cells (default derives from the input name)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// How the workers of this run are laid out over processes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Every worker runs in this process.
    Fleet(Transport),
    /// This process runs one worker of a multi-process run.
    Process { rank: usize, peers: Vec<SocketAddr> },
}

/// A validated configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub run: Run,
    pub mode: Mode,
}

impl Config {
    pub fn from_opts(opts: Opts) -> Result<Self> {
        let (workers, mode) = match opts.rank {
            Some(rank) => {
                if rank >= opts.peers.len() {
                    return Err(Error::Config(format!(
                        "rank {} is not in a list of {} peers",
                        rank,
                        opts.peers.len()
                    )));
                }
                let peers = opts.peers;
                (peers.len(), Mode::Process { rank, peers })
            }
            None => (opts.workers, Mode::Fleet(opts.transport.into())),
        };
        let generations = opts.generations;
        let output = match opts.output {
            Some(output) => output,
            None => crate::io::output_path(&opts.input, generations),
        };

        Ok(Self {
            input: opts.input,
            output,
            run: Run {
                decomposition: Decomposition::new(opts.rows, opts.cols, workers)?,
                generations,
                timeout: opts.timeout_secs.map(Duration::from_secs),
            },
            mode,
        })
    }

    pub fn is_coordinator(&self) -> bool {
        match self.mode {
            Mode::Fleet(_) => true,
            Mode::Process { rank, .. } => rank == 0,
        }
    }
}
