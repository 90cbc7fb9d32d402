use crate::strategy::Action;
use crate::table::Phase;
use thiserror::Error;

/// Every way an engine operation can fail.
///
/// `InvalidWager`, `UnavailableAction` and `OutOfPhase` are answered by the controller asking again.
/// `EmptyShoe` aborts the round in progress and `LeftTable` ends the session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid wager of {amount}, must be between {min} and {max}")]
    InvalidWager { amount: i64, min: i64, max: i64 },
    #[error("the shoe has no cards left to draw")]
    EmptyShoe,
    #[error("{action} is not available for the current hand")]
    UnavailableAction { action: Action },
    #[error("cannot {operation} during the {phase} phase")]
    OutOfPhase { operation: &'static str, phase: Phase },
    #[error("there is no seat #{0} at this table")]
    UnknownSeat(usize),
    #[error("{0} left the table")]
    LeftTable(String),
}
