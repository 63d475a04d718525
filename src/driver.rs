//! Running the simulation: scatter, then a timed loop of halo exchange and
//! generation step, then gather.

use crate::context::{Decomposition, WorkerContext};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::halo;
use crate::message::{Communicator, LocalCommunicator, Mailbox, NullCommunicator, TcpCommunicator};
use crate::scatter;
use crate::thread_pool::ThreadPool;
use std::fmt;
use std::time::{Duration, Instant};

/// Min, average and max of the workers' simulation wall-clock times.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingReport {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl TimingReport {
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = samples.iter().sum::<f64>() / samples.len() as f64;
        Some(Self { min, avg, max })
    }
}

impl fmt::Display for TimingReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Min: {:.6} s Avg: {:.6} s Max: {:.6} s",
            self.min, self.avg, self.max
        )
    }
}

/// What the coordinator has at the end of a run.
#[derive(Clone, Debug)]
pub struct Outcome {
    pub grid: Grid,
    pub timing: TimingReport,
}

/// How the workers of an in-process fleet talk to each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    Local,
    Tcp,
}

/// Everything about a run that every worker must agree on.
#[derive(Clone, Copy, Debug)]
pub struct Run {
    pub decomposition: Decomposition,
    pub generations: u64,
    pub timeout: Option<Duration>,
}

/// Run one worker to completion. Only the coordinator passes the initial
/// grid, and only the coordinator gets an `Outcome` back.
pub fn run_worker<C: Communicator>(comm: C, run: Run, initial: Option<Grid>) -> Result<Option<Outcome>> {
    if comm.size() != run.decomposition.workers() {
        return Err(Error::Config(format!(
            "communicator has {} ranks but the grid is split for {}",
            comm.size(),
            run.decomposition.workers()
        )));
    }
    let ctx: WorkerContext = run.decomposition.context(comm.rank());
    let mut mailbox = Mailbox::new(comm).with_timeout(run.timeout);
    let mut slice = scatter::scatter(&ctx, &mut mailbox, initial.as_ref())?;
    drop(initial);

    mailbox.barrier(0)?;
    let start = Instant::now();

    for generation in 0..run.generations {
        halo::exchange(&ctx, &mut mailbox, &mut slice, generation)?;
        slice.step();
    }
    mailbox.barrier(1)?;

    let elapsed = start.elapsed().as_secs_f64();
    log::debug!(
        "rank {} finished {} generations in {:.6} s with {} live cells",
        ctx.rank(),
        run.generations,
        elapsed,
        slice.alive_count()
    );
    let samples = mailbox.gather_samples(elapsed)?;
    let grid = scatter::gather(&ctx, &mut mailbox, &slice)?;

    match (grid, samples.as_deref().and_then(TimingReport::from_samples)) {
        (Some(grid), Some(timing)) => Ok(Some(Outcome { grid, timing })),
        _ => Ok(None),
    }
}

/// Run every worker of the decomposition in this process, one per thread,
/// and return the coordinator's outcome. A single worker runs without any
/// transport at all.
pub fn run_fleet(run: Run, transport: Transport, initial: Grid) -> Result<Outcome> {
    let workers = run.decomposition.workers();

    if workers == 1 {
        return launch(vec![NullCommunicator::new()], run, initial);
    }
    match transport {
        Transport::Local => launch(LocalCommunicator::fleet(workers), run, initial),
        Transport::Tcp => launch(TcpCommunicator::loopback_fleet(workers)?, run, initial),
    }
}

fn launch<C>(comms: Vec<C>, run: Run, initial: Grid) -> Result<Outcome>
where
    C: Communicator + Send + 'static,
{
    let pool = ThreadPool::new(comms.len()).map_err(|e| Error::Worker(e.to_string()))?;
    let (results_s, results_r) = crossbeam_channel::unbounded();
    let mut initial = Some(initial);

    log::info!(
        "launching {} workers with {} rows each",
        comms.len(),
        run.decomposition.local_rows()
    );

    for comm in comms {
        let rank = comm.rank();
        let grid = if rank == 0 { initial.take() } else { None };
        let results_s = results_s.clone();

        pool.spawn_on(rank, move || {
            let result = run_worker(comm, run, grid);
            if let Err(e) = &result {
                log::error!("rank {} failed: {}", rank, e);
            }
            let _ = results_s.send((rank, result));
        });
    }
    drop(results_s);

    let mut results: Vec<_> = results_r.iter().collect();
    drop(pool);

    if results.len() != run.decomposition.workers() {
        return Err(Error::Worker(format!(
            "only {} of {} workers reported back",
            results.len(),
            run.decomposition.workers()
        )));
    }
    results.sort_by_key(|(rank, _)| *rank);

    let mut outcome = None;
    for (_, result) in results {
        if let Some(o) = result? {
            outcome = Some(o)
        }
    }
    outcome.ok_or_else(|| Error::Worker("the coordinator returned no grid".into()))
}

/// Run `generations` generations of `grid` split among `workers` in-process
/// workers, and return the final grid.
pub fn simulate(grid: &Grid, generations: u64, workers: usize, transport: Transport) -> Result<Grid> {
    let run = Run {
        decomposition: Decomposition::new(grid.rows(), grid.cols(), workers)?,
        generations,
        timeout: None,
    };
    run_fleet(run, transport, grid.clone()).map(|outcome| outcome.grid)
}
