//! Game logic for a multi seat blackjack table: cards, a counted shoe, hand evaluation, computer play and betting,
//! settlement, and a table that walks a round through its phases.

pub mod betting;
pub mod card;
pub mod error;
pub mod hand;
pub mod seat;
pub mod settlement;
pub mod shoe;
pub mod strategy;
pub mod table;

pub use card::{Card, Rank, Suit};
pub use error::GameError;
pub use hand::Hand;
pub use seat::{Dealer, Seat, SeatKind};
pub use shoe::Shoe;
pub use table::{HumanInput, NoHumans, Phase, RoundReport, SeatResult, Table};

pub mod prelude {
    pub use super::betting::{BetMemory, Outcome};
    pub use super::settlement::Resolution;
    pub use super::strategy::{Action, DecisionStrategy, SkillTier};
    pub use super::{
        Card, Dealer, GameError, Hand, HumanInput, NoHumans, Phase, Rank, RoundReport, Seat,
        SeatKind, SeatResult, Shoe, Suit, Table,
    };
}
