use std::{
    fmt::Display,
    io::Write,
    sync::Arc,
    thread,
    time::Duration,
};

use clap::Parser;
use hashbrown::HashSet;
use petri_fire_lib::{
    config::{GeneralConfig, LoggerConfig, SimulationConfig},
    logger::{LogLevel, Logger},
    net::{Marking, PetriNet, Transition},
};

/// Mutual exclusion for three processes with one extra rule: the same
/// process never enters the critical section twice in a row. The whole
/// protocol is a Petri net; entering is firing a process's start
/// transition, leaving is firing its end transition.
#[derive(Parser, Debug)]
#[command(name = "alternator")]
#[command(version = "0.1")]
#[command(about = "Three-way alternation driven by a Petri net", long_about = None)]
struct Args {
    /// How long to run the simulation, in seconds.
    #[arg(short, long, default_value_t = 30)]
    seconds: u64,

    /// Hand the net's lock off FIFO between the three processes.
    #[arg(short, long)]
    fair: bool,

    #[arg(long, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// JSON config file; when given it replaces all other flags.
    #[arg(long)]
    config: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Place {
    A,
    B,
    C,
    PastA,
    PastB,
    PastC,
}

impl Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Place::A => write!(f, "A"),
            Place::B => write!(f, "B"),
            Place::C => write!(f, "C"),
            Place::PastA => write!(f, "PastA"),
            Place::PastB => write!(f, "PastB"),
            Place::PastC => write!(f, "PastC"),
        }
    }
}

fn past_of(slot: Place) -> Place {
    match slot {
        Place::A => Place::PastA,
        Place::B => Place::PastB,
        Place::C => Place::PastC,
        _ => unreachable!("only A, B and C have a past marker"),
    }
}

/// Entering is allowed while nobody is inside and this process was not the
/// previous occupant; it wipes the other past markers on the way in.
fn start_transition(slot: Place) -> Transition<Place> {
    let others: Vec<Place> = [Place::A, Place::B, Place::C]
        .into_iter()
        .filter(|other| *other != slot)
        .map(past_of)
        .collect();

    Transition::new(
        [],
        others,
        [Place::A, Place::B, Place::C, past_of(slot)],
        [(slot, 1)],
    )
}

/// Leaving marks the process as the previous occupant.
fn end_transition(slot: Place) -> Transition<Place> {
    Transition::new([(slot, 1)], [], [past_of(slot)], [(past_of(slot), 1)])
}

fn simulation_config(args: &Args) -> anyhow::Result<SimulationConfig> {
    match &args.config {
        Some(path) => SimulationConfig::from_file(path),
        None => Ok(SimulationConfig::default()
            .with_fair(args.fair)
            .with_run_for(Some(Duration::from_secs(args.seconds)))
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

    let logger = Logger::from_config(config.logger(), "alternator")
        .unwrap_or_else(|| Logger::new(LogLevel::Error, "alternator", None));

    match run(&logger, &config) {
        Ok(_) => logger.info("simulation finished"),
        Err(error) => logger.error(&format!("simulation failed: {error:#}")),
    }
}

fn run(logger: &Logger, config: &SimulationConfig) -> anyhow::Result<()> {
    let net = Arc::new(PetriNet::new(Marking::new(), *config.get_fair()));

    let all_transitions: Vec<Transition<Place>> = [Place::A, Place::B, Place::C]
        .into_iter()
        .flat_map(|slot| [start_transition(slot), end_transition(slot)])
        .collect();

    check_safety(logger, &net, &all_transitions);

    let token = net.cancel_token();
    let handles: Vec<_> = [(Place::A, "A"), (Place::B, "B"), (Place::C, "C")]
        .into_iter()
        .map(|(slot, name)| {
            let net = Arc::clone(&net);
            let token = token.clone();
            thread::spawn(move || {
                let enter = vec![start_transition(slot)];
                let leave = vec![end_transition(slot)];

                loop {
                    // entry protocol
                    if net.fire(&enter, &token).is_err() {
                        break;
                    }

                    // critical section
                    print!("{name}.");
                    std::io::stdout().flush().ok();

                    // exit protocol
                    if net.fire(&leave, &token).is_err() {
                        break;
                    }
                }
            })
        })
        .collect();

    let run_for = (*config.get_run_for()).unwrap_or(Duration::from_secs(30));
    thread::sleep(run_for);
    token.cancel();

    for handle in handles {
        handle
            .join()
            .map_err(|_| anyhow::anyhow!("a process thread panicked"))?;
    }
    println!();

    Ok(())
}

fn check_safety(logger: &Logger, net: &PetriNet<Place>, transitions: &[Transition<Place>]) {
    let reached = net.reachable(transitions);
    logger.info(&format!("number of reachable markings: {}", reached.len()));

    let safe: HashSet<Marking<Place>> = [
        Marking::new(),
        Marking::from_iter([(Place::A, 1)]),
        Marking::from_iter([(Place::B, 1)]),
        Marking::from_iter([(Place::C, 1)]),
        Marking::from_iter([(Place::PastA, 1)]),
        Marking::from_iter([(Place::PastB, 1)]),
        Marking::from_iter([(Place::PastC, 1)]),
    ]
    .into_iter()
    .collect();

    for marking in &reached {
        if !safe.contains(marking) {
            logger.error(&format!("unsafe marking: {marking}"));
        }
    }
}
