use blackjack_table::prelude::*;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Run computer only blackjack tables and report how every seat did.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Rounds to play at each table
    #[arg(short, long, default_value_t = 1000)]
    rounds: u32,
    /// Number of tables run in parallel
    #[arg(short, long, default_value_t = 1)]
    tables: usize,
    /// JSON table configuration. Human seats in it are left out.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Base seed, each table derives its own from it
    #[arg(short, long)]
    seed: Option<u64>,
    /// Write the summaries here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Print every round of a single table as it is played
    #[arg(long)]
    show_rounds: bool,
}

fn show_rounds(config: &TableConfig, rounds: u32) -> Result<(), SimulationError> {
    let mut simulator = TableSimulator::new(config, rounds)?;
    let mut out = BufWriter::new(io::stdout());
    for _ in 0..rounds {
        let report = simulator.run_round()?;
        writeln!(out, "{}", report)?;
    }
    for summary in simulator.summaries() {
        writeln!(out, "{}", summary)?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<(), SimulationError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => TableConfig::from_file(path)?,
        None => TableConfig::default(),
    }
    .computer_only();
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;

    if args.show_rounds {
        return show_rounds(&config, args.rounds);
    }

    let writer: Box<dyn Write + Send + 'static> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };
    MultiTableSimulator::new(config, args.rounds)
        .tables(args.tables)
        .build()?
        .run(writer)
}
