use blackjack_engine::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Simple struct for recording the interesting data points of one seat over a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub label: String,
    pub kind: SeatKind,
    pub rounds: u32,
    pub wins: u32,
    pub pushes: u32,
    pub losses: u32,
    pub surrenders: u32,
    pub blackjacks: u32,
    pub doubles: u32,
    pub insurance_taken: u32,
    pub winnings: i64,
    pub bankroll: i64,
}

impl SimulationSummary {
    pub fn new<S: Into<String>>(label: S, kind: SeatKind, bankroll: i64) -> SimulationSummary {
        SimulationSummary {
            label: label.into(),
            kind,
            rounds: 0,
            wins: 0,
            pushes: 0,
            losses: 0,
            surrenders: 0,
            blackjacks: 0,
            doubles: 0,
            insurance_taken: 0,
            winnings: 0,
            bankroll,
        }
    }

    /// Records one settled round.
    pub fn record(&mut self, result: &SeatResult) {
        self.rounds += 1;
        match result.resolution {
            Resolution::Blackjack | Resolution::DealerBust | Resolution::Win => self.wins += 1,
            Resolution::BlackjackPush | Resolution::Push => self.pushes += 1,
            Resolution::Surrendered => self.surrenders += 1,
            Resolution::DealerBlackjack | Resolution::Bust | Resolution::Loss => self.losses += 1,
        }
        if matches!(result.resolution, Resolution::Blackjack | Resolution::BlackjackPush) {
            self.blackjacks += 1;
        }
        if result.doubled {
            self.doubles += 1;
        }
        if result.insurance > 0 {
            self.insurance_taken += 1;
        }
        self.winnings += result.net();
        self.bankroll = result.bankroll;
    }

    fn rate(&self, count: u32) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            count as f64 / self.rounds as f64
        }
    }

    pub fn win_rate(&self) -> f64 {
        self.rate(self.wins)
    }

    pub fn push_rate(&self) -> f64 {
        self.rate(self.pushes)
    }

    pub fn loss_rate(&self) -> f64 {
        self.rate(self.losses)
    }

    pub fn winnings_per_round(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            self.winnings as f64 / self.rounds as f64
        }
    }
}

impl Display for SimulationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const WIDTH: usize = 80;
        const TEXT_WIDTH: usize = "average winnings per round".len() + 20;
        const NUM_WIDTH: usize = WIDTH - TEXT_WIDTH;
        let kind = match self.kind {
            SeatKind::Human => "human".to_string(),
            SeatKind::Computer(tier) => format!("{:?}", tier).to_lowercase(),
        };
        write!(
            f,
            "{}{} ({})\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.3}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.3}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.3}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n",
            "seat: ",
            self.label,
            kind,
            "rounds played",
            self.rounds,
            "hands won",
            self.wins,
            "hands pushed",
            self.pushes,
            "hands lost",
            self.losses,
            "hands surrendered",
            self.surrenders,
            "blackjacks",
            self.blackjacks,
            "double downs",
            self.doubles,
            "insurance bets",
            self.insurance_taken,
            "winnings",
            self.winnings,
            "final bankroll",
            self.bankroll,
            "win percentage",
            self.win_rate(),
            "push percentage",
            self.push_rate(),
            "loss percentage",
            self.loss_rate(),
            "average winnings per round",
            self.winnings_per_round(),
        )
    }
}
