//! Round settlement against the dealer's finished hand.

use crate::hand::Hand;
use serde::{Deserialize, Serialize};

/// The dealer draws until reaching this total, then stands on anything.
pub const DEALER_STANDS_ON: u32 = 17;

/// Insurance returns the stake plus 2:1.
const INSURANCE_MULTIPLIER: i64 = 3;

/// How a seat's hand fared against the dealer. Checked in declaration order, so a seat that busts loses even if the dealer busts too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// The seat gave up its hand before the showdown and was refunded then.
    Surrendered,
    /// Seat and dealer both have blackjack.
    BlackjackPush,
    Blackjack,
    DealerBlackjack,
    Bust,
    DealerBust,
    Win,
    Push,
    Loss,
}

impl Resolution {
    /// Money handed back to the seat for a bet of `bet`, the bet included.
    pub fn payout(&self, bet: i64) -> i64 {
        match self {
            Resolution::Surrendered => 0,
            Resolution::BlackjackPush | Resolution::Push => bet,
            Resolution::Blackjack => bet * 5 / 2,
            Resolution::DealerBust | Resolution::Win => bet * 2,
            Resolution::DealerBlackjack | Resolution::Bust | Resolution::Loss => 0,
        }
    }
}

/// Works out how a seat's hand resolves. `dealers_hand` must be complete.
pub fn classify(seats_hand: &Hand, dealers_hand: &Hand) -> Resolution {
    if seats_hand.is_empty() {
        return Resolution::Surrendered;
    }

    match (seats_hand.is_blackjack(), dealers_hand.is_blackjack()) {
        (true, true) => return Resolution::BlackjackPush,
        (true, false) => return Resolution::Blackjack,
        (false, true) => return Resolution::DealerBlackjack,
        (false, false) => {}
    }

    if seats_hand.is_busted() {
        return Resolution::Bust;
    }
    if dealers_hand.is_busted() {
        return Resolution::DealerBust;
    }

    let (seat, dealer) = (seats_hand.best_value(), dealers_hand.best_value());
    if seat > dealer {
        Resolution::Win
    } else if seat == dealer {
        Resolution::Push
    } else {
        Resolution::Loss
    }
}

/// Payout for a seat's hand and bet against the dealer's finished hand.
pub fn resolve(seats_hand: &Hand, dealers_hand: &Hand, bet: i64) -> i64 {
    classify(seats_hand, dealers_hand).payout(bet)
}

/// Payout of an insurance side bet. The stake was taken when the bet was placed, so a miss pays nothing.
pub fn insurance_payout(dealers_hand: &Hand, stake: i64) -> i64 {
    if dealers_hand.is_blackjack() {
        stake * INSURANCE_MULTIPLIER
    } else {
        0
    }
}

/// Whether the dealer has to draw another card.
pub fn dealer_must_hit(dealers_hand: &Hand) -> bool {
    dealers_hand.best_value() < DEALER_STANDS_ON
}
