use std::{fmt::Display, sync::Arc};

use clap::Parser;
use petri_fire_lib::{
    config::{GeneralConfig, LoggerConfig, SimulationConfig},
    logger::{LogLevel, Logger},
    net::{Marking, PetriNet, Transition},
    threading::FiringPool,
};

/// Multiplies two numbers purely by token flow: side workers shuttle
/// tokens between the operand places and the product place until the
/// terminal transition becomes enabled, which the main thread is blocked
/// on.
#[derive(Parser, Debug)]
#[command(name = "multiplier")]
#[command(version = "0.1")]
#[command(about = "Multiply two numbers with a Petri net", long_about = None)]
struct Args {
    a: u64,
    b: u64,

    /// Number of side worker threads.
    #[arg(short, long, default_value_t = 4)]
    workers: usize,

    /// Hand the net's lock off FIFO between workers.
    #[arg(short, long)]
    fair: bool,

    #[arg(long, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// JSON config file; when given it replaces the other flags.
    #[arg(long)]
    config: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Place {
    ToAdd,
    B,
    Product,
    Mutex,
    A,
    End,
}

impl Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Place::ToAdd => write!(f, "ToAdd"),
            Place::B => write!(f, "B"),
            Place::Product => write!(f, "Product"),
            Place::Mutex => write!(f, "Mutex"),
            Place::A => write!(f, "A"),
            Place::End => write!(f, "End"),
        }
    }
}

/// Moves a chunk of staged tokens into the product and restores the same
/// amount to A. Only runs while the mutex place is empty.
fn adding_transition(value: u64) -> Transition<Place> {
    Transition::new(
        [(Place::ToAdd, value)],
        [],
        [Place::Mutex, Place::End],
        [(Place::Product, value), (Place::A, value)],
    )
}

/// Stages a chunk of A tokens for the next addition round. Only runs while
/// the mutex place holds the round token.
fn filling_transition(value: u64) -> Transition<Place> {
    Transition::new(
        [(Place::Mutex, 1), (Place::A, value)],
        [],
        [Place::End],
        [(Place::Mutex, 1), (Place::ToAdd, value)],
    )
}

/// Opens a new round by consuming one B token.
fn restart_transition() -> Transition<Place> {
    Transition::new(
        [(Place::B, 1)],
        [],
        [Place::Mutex, Place::ToAdd, Place::End],
        [(Place::Mutex, 1)],
    )
}

/// Closes the staging phase once A is drained.
fn end_filling_transition() -> Transition<Place> {
    Transition::new([(Place::Mutex, 1)], [], [Place::A, Place::End], [])
}

/// Enabled exactly when the computation is finished; everything else is
/// inhibited once End holds a token.
fn terminal_transition() -> Transition<Place> {
    Transition::new(
        [],
        [],
        [Place::ToAdd, Place::B, Place::Mutex],
        [(Place::End, 1), (Place::Mutex, 1)],
    )
}

// Doubling weights move the A tokens in binary chunks; weights above the
// operand can never be enabled, so the set stops there.
fn worker_transitions(operand: u64) -> Vec<Transition<Place>> {
    let mut transitions = vec![];

    let mut value = 1;
    while value <= operand.max(1) {
        transitions.push(adding_transition(value));
        transitions.push(filling_transition(value));
        value *= 2;
    }

    transitions.push(restart_transition());
    transitions.push(end_filling_transition());
    transitions
}

fn simulation_config(args: &Args) -> anyhow::Result<SimulationConfig> {
    match &args.config {
        Some(path) => SimulationConfig::from_file(path),
        None => Ok(SimulationConfig::default()
            .with_fair(args.fair)
            .with_workers(args.workers)
            .with_logger(LoggerConfig::default().with_log_level(args.log_level))),
    }
}

fn main() {
    let args = Args::parse();

    let config = match simulation_config(&args) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error:#}");
            std::process::exit(1);
        }
    };

    let logger = Logger::from_config(config.logger(), "multiplier")
        .unwrap_or_else(|| Logger::new(LogLevel::Error, "multiplier", None));

    match run(&logger, &config, args.a, args.b) {
        Ok(_) => logger.info("done"),
        Err(error) => logger.error(&format!("multiplication failed: {error:#}")),
    }
}

fn run(logger: &Logger, config: &SimulationConfig, a: u64, b: u64) -> anyhow::Result<()> {
    let net = Arc::new(PetriNet::new(
        Marking::from_iter([(Place::A, a), (Place::B, b)]),
        *config.get_fair(),
    ));

    let mut pool = FiringPool::spawn(
        Arc::clone(&net),
        worker_transitions(a),
        *config.get_workers(),
    );

    let finish = vec![terminal_transition()];
    let token = net.cancel_token();
    net.fire(&finish, &token)?;

    let product = net.marking().tokens(&Place::Product);
    println!("{a} * {b} = {product}");

    for (worker, fired) in pool.join().into_iter().enumerate() {
        logger.info(&format!("worker {worker} fired {fired} transitions"));
    }

    Ok(())
}
