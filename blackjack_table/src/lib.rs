pub mod config;
pub mod game;
pub mod stats;
pub mod write;

use blackjack_engine::prelude::*;
use std::collections::HashSet;
use std::io::Write;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use thiserror::Error;
use tracing::{debug, error, info};

pub use config::{SeatConfig, TableConfig, TableConfigBuilder};
pub use stats::SimulationSummary;

pub mod prelude {
    pub use super::{
        config::default_seats, game::console::ConsoleInput, game::play_session, MultiTableSimulator,
        MultiTableSimulatorBuilder, SeatConfig, SimulationError, SimulationSummary, TableConfig,
        TableConfigBuilder, TableSimulator,
    };
    pub use blackjack_engine::prelude::*;
}

/// What is sent from a table's thread to the writer: a seat summary, or `None` once the table is done.
pub type SummaryMessage = (Option<SimulationSummary>, usize);

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("unable to send a summary to the writer: {0}")]
    Sending(String),
    #[error("a simulation thread panicked")]
    ThreadPanicked,
}

/// Plays rounds on a single computer only table, keeping a summary per seat.
pub struct TableSimulator {
    table: Table,
    rounds: u32,
    summaries: Vec<SimulationSummary>,
}

impl TableSimulator {
    /// Builds the table described by `config`. Human seats are not allowed, nobody would answer them.
    pub fn new(config: &TableConfig, rounds: u32) -> Result<TableSimulator, SimulationError> {
        if config.has_human() {
            return Err(SimulationError::Config(
                "simulated tables cannot seat a human".to_string(),
            ));
        }
        let table = config.build_table()?;
        let summaries = table
            .seats()
            .iter()
            .map(|seat| SimulationSummary::new(seat.name(), seat.kind(), seat.bankroll()))
            .collect();
        Ok(TableSimulator {
            table,
            rounds,
            summaries,
        })
    }

    /// Plays a single round and records it.
    pub fn run_round(&mut self) -> Result<RoundReport, SimulationError> {
        let report = self.table.play_round(&mut NoHumans)?;
        for result in report.seats.iter() {
            self.summaries[result.seat].record(result);
        }
        Ok(report)
    }

    /// Plays every configured round.
    pub fn run(&mut self) -> Result<(), SimulationError> {
        for _ in 0..self.rounds {
            self.run_round()?;
        }
        debug!(
            rounds = self.rounds,
            cards_remaining = self.table.shoe().cards_remaining(),
            "table finished"
        );
        Ok(())
    }

    pub fn summaries(&self) -> &[SimulationSummary] {
        &self.summaries
    }

    pub fn table(&self) -> &Table {
        &self.table
    }
}

/// Runs several independent tables in parallel, one thread each. Every table owns its shoe.
pub struct MultiTableSimulator {
    tables: Vec<TableSimulator>,
}

impl MultiTableSimulator {
    /// Method that returns a new `MultiTableSimulatorBuilder` object.
    pub fn new(config: TableConfig, rounds: u32) -> MultiTableSimulatorBuilder {
        MultiTableSimulatorBuilder {
            config,
            rounds,
            seeds: None,
        }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Runs every table and writes the formatted summaries to `writer` once all are done.
    pub fn run(&mut self, writer: Box<dyn Write + Send + 'static>) -> Result<(), SimulationError> {
        self.run_with(move |receiver, ids| {
            write::write_summaries(receiver, ids, writer).map_err(SimulationError::from)
        })
    }

    /// Runs every table, handing the stream of summaries to `collect` on its own thread and returning what it
    /// produces.
    pub fn run_with<F, T>(&mut self, collect: F) -> Result<T, SimulationError>
    where
        F: FnOnce(Receiver<SummaryMessage>, HashSet<usize>) -> Result<T, SimulationError>
            + Send
            + 'static,
        T: Send + 'static,
    {
        let (sender, receiver) = mpsc::channel::<SummaryMessage>();

        // ids start at 1 so they read as table numbers
        let ids: HashSet<usize> = (1..=self.tables.len()).collect();
        let collect_handle = thread::spawn(move || collect(receiver, ids));

        let mut handles = vec![];
        for (idx, mut simulator) in self.tables.drain(..).enumerate() {
            let sender = sender.clone();
            let id = idx + 1;
            let handle = thread::spawn(move || -> Result<(), SimulationError> {
                simulator.run()?;
                for summary in simulator.summaries() {
                    sender
                        .send((Some(summary.clone()), id))
                        .map_err(|e| SimulationError::Sending(e.to_string()))?;
                }
                // Tell the writer this table is finished
                sender
                    .send((None, id))
                    .map_err(|e| SimulationError::Sending(e.to_string()))?;
                Ok(())
            });
            handles.push(handle);
        }
        drop(sender);

        let mut outcome = Ok(());
        for (idx, handle) in handles.into_iter().enumerate() {
            let result = handle.join().unwrap_or(Err(SimulationError::ThreadPanicked));
            if let Err(e) = result {
                error!(table = idx + 1, error = %e, "simulation failed");
                if outcome.is_ok() {
                    outcome = Err(e);
                }
            }
        }

        let collected = collect_handle
            .join()
            .unwrap_or(Err(SimulationError::ThreadPanicked));
        outcome?;
        info!("all tables finished");
        collected
    }
}

/// Struct for building a `MultiTableSimulator`.
pub struct MultiTableSimulatorBuilder {
    config: TableConfig,
    rounds: u32,
    seeds: Option<Vec<Option<u64>>>,
}

impl MultiTableSimulatorBuilder {
    /// Adds a table. `seed` makes it reproducible, `None` deals from entropy.
    pub fn table(&mut self, seed: Option<u64>) -> &mut Self {
        if let Some(ref mut seeds) = self.seeds {
            seeds.push(seed);
        } else {
            self.seeds = Some(vec![seed]);
        }
        self
    }

    /// Adds `n` tables. With a configured seed each table gets its own seed derived from it.
    pub fn tables(&mut self, n: usize) -> &mut Self {
        let start = self.seeds.as_ref().map_or(0, |seeds| seeds.len() as u64);
        for i in 0..n as u64 {
            let seed = self.config.seed.map(|seed| seed.wrapping_add((start + i) * 1_000));
            self.table(seed);
        }
        self
    }

    pub fn build(&mut self) -> Result<MultiTableSimulator, SimulationError> {
        let seeds = self.seeds.take().unwrap_or_default();
        let mut tables = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let config = TableConfig {
                seed,
                ..self.config.clone()
            };
            tables.push(TableSimulator::new(&config, self.rounds)?);
        }
        Ok(MultiTableSimulator { tables })
    }
}
