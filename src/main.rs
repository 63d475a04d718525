use clap::Parser;
use gridlife::config::{Config, Mode, Opts};
use gridlife::message::TcpCommunicator;
use gridlife::{driver, io, Grid, Outcome, Result};

fn load(config: &Config) -> Result<Grid> {
    let d = config.run.decomposition;
    let grid = Grid::from_cells(d.rows(), d.cols(), io::read_cells(&config.input)?)?;
    log::info!(
        "read {} live cells from {}",
        grid.alive_count(),
        config.input.display()
    );
    Ok(grid)
}

fn report(config: &Config, outcome: Outcome) -> Result<()> {
    println!("TIME: {}", outcome.timing);
    io::write_cells(&config.output, &outcome.grid)?;
    log::info!(
        "wrote {} live cells to {}",
        outcome.grid.alive_count(),
        config.output.display()
    );
    Ok(())
}

fn run(config: Config) -> Result<()> {
    let d = config.run.decomposition;

    if config.is_coordinator() {
        log::info!(
            "{} generations on a {} x {} grid with {} workers",
            config.run.generations,
            d.rows(),
            d.cols(),
            d.workers()
        );
    }
    match &config.mode {
        Mode::Fleet(transport) => {
            let outcome = driver::run_fleet(config.run, *transport, load(&config)?)?;
            report(&config, outcome)
        }
        Mode::Process { rank, peers } => {
            let comm = TcpCommunicator::new(*rank, peers.clone())?;
            let initial = if *rank == 0 { Some(load(&config)?) } else { None };

            match driver::run_worker(comm, config.run, initial)? {
                Some(outcome) => report(&config, outcome),
                None => Ok(()),
            }
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = Opts::parse();

    if let Err(e) = Config::from_opts(opts).and_then(run) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
