use blackjack_table::prelude::*;
use clap::Parser;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Play blackjack at a console table against the dealer, next to computer players.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON table configuration. Options given on the command line take precedence.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of decks in the shoe
    #[arg(short, long)]
    decks: Option<usize>,
    /// Minimum bet at the table
    #[arg(short, long)]
    min_bet: Option<i64>,
    /// Starting bankroll of every seat
    #[arg(short, long)]
    bankroll: Option<i64>,
    /// Seed for a reproducible game
    #[arg(short, long)]
    seed: Option<u64>,
    /// Name shown for your seat
    #[arg(short, long)]
    name: Option<String>,
}

fn config_from(args: &Args) -> Result<TableConfig, SimulationError> {
    let mut config = match &args.config {
        Some(path) => TableConfig::from_file(path)?,
        None => TableConfig::default(),
    };
    if let Some(decks) = args.decks {
        config.num_decks = decks;
    }
    if let Some(min_bet) = args.min_bet {
        config.min_bet = min_bet;
    }
    if let Some(bankroll) = args.bankroll {
        config.starting_bankroll = bankroll;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(name) = &args.name {
        for seat in config.seats.iter_mut().filter(|seat| seat.kind == SeatKind::Human) {
            seat.name = name.clone();
        }
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), SimulationError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = config_from(&args)?;
    let mut table = config.build_table()?;

    let stdin = io::stdin();
    let mut input = ConsoleInput::new(stdin.lock(), BufWriter::new(io::stdout()));
    input.say(format!(
        "Welcome to the table. Minimum bet ${}, dealer stands on 17.",
        config.min_bet
    ));
    let rounds = play_session(&mut table, &mut input)?;

    input.say(format!("You played {} rounds.", rounds));
    for seat in table.seats() {
        input.say(format!("{:<20}${}", seat.name(), seat.bankroll()));
    }
    Ok(())
}
