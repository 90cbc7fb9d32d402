//! Table configuration, built in code with `TableConfig::new()` or loaded from JSON.

use crate::SimulationError;
use blackjack_engine::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One seat at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatConfig {
    pub name: String,
    pub kind: SeatKind,
}

impl SeatConfig {
    pub fn new<S: Into<String>>(name: S, kind: SeatKind) -> SeatConfig {
        SeatConfig {
            name: name.into(),
            kind,
        }
    }
}

/// The reference table: a human followed by one easy and two hard computers.
pub fn default_seats() -> Vec<SeatConfig> {
    vec![
        SeatConfig::new("You", SeatKind::Human),
        SeatConfig::new("Simple Computer", SeatKind::Computer(SkillTier::Easy)),
        SeatConfig::new("Smart Computer 1", SeatKind::Computer(SkillTier::Hard)),
        SeatConfig::new("Smart Computer 2", SeatKind::Computer(SkillTier::Hard)),
    ]
}

/// Struct for configuring a table. Missing fields in JSON take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub num_decks: usize,
    pub min_bet: i64,
    pub starting_bankroll: i64,
    /// Seeds the shoe and the computer decisions. Entropy is used when absent.
    pub seed: Option<u64>,
    pub seats: Vec<SeatConfig>,
}

impl TableConfig {
    /// Associated method for returning a new `TableConfigBuilder`.
    pub fn new() -> TableConfigBuilder {
        TableConfigBuilder {
            num_decks: None,
            min_bet: None,
            starting_bankroll: None,
            seed: None,
            seats: None,
        }
    }

    pub fn from_json(json: &str) -> Result<TableConfig, SimulationError> {
        let config: TableConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<TableConfig, SimulationError> {
        let json = std::fs::read_to_string(path)?;
        TableConfig::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.num_decks == 0 {
            return Err(SimulationError::Config(
                "the shoe needs at least one deck".to_string(),
            ));
        }
        if self.min_bet <= 0 {
            return Err(SimulationError::Config(
                "the minimum bet must be positive".to_string(),
            ));
        }
        if self.seats.is_empty() {
            return Err(SimulationError::Config(
                "the table needs at least one seat".to_string(),
            ));
        }
        Ok(())
    }

    pub fn has_human(&self) -> bool {
        self.seats.iter().any(|seat| seat.kind == SeatKind::Human)
    }

    /// The same table with every human seat removed.
    pub fn computer_only(&self) -> TableConfig {
        TableConfig {
            seats: self
                .seats
                .iter()
                .filter(|seat| seat.kind != SeatKind::Human)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    /// Builds a table in the betting-ready state described by this configuration.
    pub fn build_table(&self) -> Result<Table, SimulationError> {
        self.validate()?;
        let seats = self
            .seats
            .iter()
            .map(|seat| Seat::new(seat.name.clone(), seat.kind, self.starting_bankroll))
            .collect();
        let table = match self.seed {
            Some(seed) => Table::with_seed(
                Shoe::with_seed(self.num_decks, seed),
                seats,
                self.min_bet,
                seed.wrapping_add(1),
            ),
            None => Table::new(Shoe::new(self.num_decks), seats, self.min_bet),
        };
        Ok(table)
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig::new().build()
    }
}

/// Struct to implement builder pattern for `TableConfig`
#[derive(Debug, Clone)]
pub struct TableConfigBuilder {
    num_decks: Option<usize>,
    min_bet: Option<i64>,
    starting_bankroll: Option<i64>,
    seed: Option<u64>,
    seats: Option<Vec<SeatConfig>>,
}

impl TableConfigBuilder {
    pub fn num_decks(&mut self, decks: usize) -> &mut Self {
        self.num_decks = Some(decks);
        self
    }

    pub fn min_bet(&mut self, bet: i64) -> &mut Self {
        self.min_bet = Some(bet);
        self
    }

    /// Bankroll every seat starts with.
    pub fn starting_bankroll(&mut self, bankroll: i64) -> &mut Self {
        self.starting_bankroll = Some(bankroll);
        self
    }

    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    /// Adds a seat. Seats are dealt and played in the order they are added.
    pub fn seat<S: Into<String>>(&mut self, name: S, kind: SeatKind) -> &mut Self {
        let seat = SeatConfig::new(name, kind);
        if let Some(ref mut seats) = self.seats {
            seats.push(seat);
        } else {
            self.seats = Some(vec![seat]);
        }
        self
    }

    /// Method for building a `TableConfig`. Without any seats added, the default seating is used.
    pub fn build(&mut self) -> TableConfig {
        TableConfig {
            num_decks: self.num_decks.unwrap_or(blackjack_engine::shoe::DEFAULT_DECK_COUNT),
            min_bet: self.min_bet.unwrap_or(10),
            starting_bankroll: self.starting_bankroll.unwrap_or(1000),
            seed: self.seed,
            seats: self.seats.take().unwrap_or_else(default_seats),
        }
    }
}
