//! Playing decisions for computer controlled seats.
//!
//! Each skill tier is a `DecisionStrategy`. The easy tier is a loose probabilistic heuristic meant to play like an
//! amateur, the hard tier is a small deterministic table that follows the dealer card groupings of basic strategy.
//! Neither tier ever surrenders and splitting is not supported at all.

use crate::card::Card;
use crate::hand::Hand;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Probability that the easy tier doubles down on a two card 10 or 11.
const EASY_DOUBLE_CHANCE: f64 = 4.0 / 13.0;

/// An option a seat may choose to play its hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Stand,
    Hit,
    Surrender,
    Double,
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Action::Stand => "stand",
            Action::Hit => "hit",
            Action::Surrender => "surrender",
            Action::Double => "double down",
        };
        write!(f, "{}", name)
    }
}

/// How well a computer seat plays and bets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillTier {
    Easy,
    Hard,
}

impl SkillTier {
    /// The decision strategy used by seats of this tier.
    pub fn decision_strategy(&self) -> &'static dyn DecisionStrategy {
        match self {
            SkillTier::Easy => &EasyStrategy,
            SkillTier::Hard => &HardStrategy,
        }
    }
}

/// Trait for a decision strategy. Takes the seat's own hand and the dealer's visible card and returns how to play.
/// Implementers only see hands that are still live, blackjacks and busted hands are answered before they are asked.
pub trait DecisionStrategy {
    fn decide_option(&self, hand: &Hand, dealers_up_card: &Card, rng: &mut dyn RngCore) -> Action;
}

/// Probabilistic heuristic. Hits more reluctantly the closer the total gets to 21.
#[derive(Debug, Clone, Copy, Default)]
pub struct EasyStrategy;

impl EasyStrategy {
    /// Chance of hitting on a total above 11.
    fn hit_chance(value: u32) -> f64 {
        let busting_chance = (value as f64 - 8.0) / 13.0;
        let success_chance = 1.0 - busting_chance;
        ((success_chance + 0.6).powi(2) - 0.6).clamp(0.0, 1.0)
    }
}

impl DecisionStrategy for EasyStrategy {
    fn decide_option(&self, hand: &Hand, _dealers_up_card: &Card, rng: &mut dyn RngCore) -> Action {
        let value = hand.best_value();
        if hand.len() == 2 && (value == 10 || value == 11) && rng.gen_bool(EASY_DOUBLE_CHANCE) {
            return Action::Double;
        }
        if value <= 11 {
            return Action::Hit;
        }
        if rng.gen_bool(EasyStrategy::hit_chance(value)) {
            Action::Hit
        } else {
            Action::Stand
        }
    }
}

/// Deterministic approximation of basic strategy keyed on the dealer's up card with the Ace counted high.
#[derive(Debug, Clone, Copy, Default)]
pub struct HardStrategy;

impl DecisionStrategy for HardStrategy {
    fn decide_option(&self, hand: &Hand, dealers_up_card: &Card, _rng: &mut dyn RngCore) -> Action {
        let value = hand.best_value();
        let dealer = dealers_up_card.high_value();
        if hand.len() == 2 && ((value == 10 && dealer <= 9) || (value == 11 && dealer <= 10)) {
            return Action::Double;
        }
        let stand_on = if dealer >= 7 { 17 } else { 12 };
        if value >= stand_on {
            Action::Stand
        } else {
            Action::Hit
        }
    }
}

/// Chooses the action of a computer seat. A blackjack or a busted hand always stands.
pub fn decide<R: RngCore>(hand: &Hand, dealers_up_card: &Card, tier: SkillTier, rng: &mut R) -> Action {
    if hand.is_blackjack() || hand.is_busted() {
        return Action::Stand;
    }
    tier.decision_strategy()
        .decide_option(hand, dealers_up_card, rng)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::card::{Rank, Suit};
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn card(rank: Rank) -> Card {
        Card::new(Suit::Clubs, rank)
    }

    fn hand(ranks: &[Rank]) -> Hand {
        let mut hand = Hand::new();
        for rank in ranks {
            hand.add_card(card(*rank));
        }
        hand
    }

    /// An rng whose every `gen_bool` comes out true.
    fn always() -> StepRng {
        StepRng::new(0, 0)
    }

    /// An rng whose every `gen_bool` with p < 1 comes out false.
    fn never() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    #[test]
    fn test_terminal_hands_stand() {
        let blackjack = hand(&[Rank::Ace, Rank::Queen]);
        let busted = hand(&[Rank::King, Rank::Queen, Rank::Two]);
        for tier in [SkillTier::Easy, SkillTier::Hard] {
            for up in [Rank::Two, Rank::Ace, Rank::Ten] {
                assert_eq!(decide(&blackjack, &card(up), tier, &mut always()), Action::Stand);
                assert_eq!(decide(&busted, &card(up), tier, &mut always()), Action::Stand);
            }
        }
    }

    #[test]
    fn test_easy_doubles_only_on_two_card_ten_or_eleven() {
        let up = card(Rank::Six);
        assert_eq!(
            decide(&hand(&[Rank::Five, Rank::Six]), &up, SkillTier::Easy, &mut always()),
            Action::Double
        );
        assert_eq!(
            decide(&hand(&[Rank::Four, Rank::Six]), &up, SkillTier::Easy, &mut never()),
            Action::Hit
        );
        // three card eleven hits instead
        assert_eq!(
            decide(&hand(&[Rank::Two, Rank::Three, Rank::Six]), &up, SkillTier::Easy, &mut always()),
            Action::Hit
        );
    }

    #[test]
    fn test_easy_always_hits_eleven_or_less() {
        let up = card(Rank::Ten);
        for ranks in [[Rank::Two, Rank::Three], [Rank::Four, Rank::Five], [Rank::Two, Rank::Seven]] {
            assert_eq!(decide(&hand(&ranks), &up, SkillTier::Easy, &mut never()), Action::Hit);
        }
    }

    #[test]
    fn test_easy_hit_chance_curve() {
        assert_eq!(EasyStrategy::hit_chance(12), 1.0);
        assert_eq!(EasyStrategy::hit_chance(21), 0.0);
        let mut previous = 1.0;
        for value in 12..=21 {
            let p = EasyStrategy::hit_chance(value);
            assert!((0.0..=1.0).contains(&p));
            assert!(p <= previous);
            previous = p;
        }
        // (1 - 8/13 + 0.6)^2 - 0.6
        let expected = (1.0 - 8.0 / 13.0 + 0.6f64).powi(2) - 0.6;
        assert!((EasyStrategy::hit_chance(16) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_easy_never_hits_twenty_one() {
        let h = hand(&[Rank::Seven, Rank::Seven, Rank::Seven]);
        assert_eq!(decide(&h, &card(Rank::Two), SkillTier::Easy, &mut always()), Action::Stand);
    }

    #[test]
    fn test_easy_double_rate_is_about_four_thirteenths() {
        let mut rng = StdRng::seed_from_u64(2011);
        let h = hand(&[Rank::Five, Rank::Five]);
        let trials = 20_000;
        let doubles = (0..trials)
            .filter(|_| decide(&h, &card(Rank::Nine), SkillTier::Easy, &mut rng) == Action::Double)
            .count();
        let rate = doubles as f64 / trials as f64;
        assert!((rate - 4.0 / 13.0).abs() < 0.02, "double rate {}", rate);
    }

    #[test]
    fn test_hard_doubles() {
        let ten = hand(&[Rank::Four, Rank::Six]);
        let eleven = hand(&[Rank::Five, Rank::Six]);
        let mut rng = never();
        assert_eq!(decide(&ten, &card(Rank::Nine), SkillTier::Hard, &mut rng), Action::Double);
        assert_eq!(decide(&ten, &card(Rank::King), SkillTier::Hard, &mut rng), Action::Hit);
        assert_eq!(decide(&ten, &card(Rank::Ace), SkillTier::Hard, &mut rng), Action::Hit);
        assert_eq!(decide(&eleven, &card(Rank::King), SkillTier::Hard, &mut rng), Action::Double);
        assert_eq!(decide(&eleven, &card(Rank::Ace), SkillTier::Hard, &mut rng), Action::Hit);
        // doubling is a first decision only
        let three_card_eleven = hand(&[Rank::Two, Rank::Three, Rank::Six]);
        assert_eq!(
            decide(&three_card_eleven, &card(Rank::Five), SkillTier::Hard, &mut rng),
            Action::Hit
        );
    }

    #[test]
    fn test_hard_against_strong_dealer_card() {
        let mut rng = never();
        for up in [Rank::Seven, Rank::Ten, Rank::Ace] {
            assert_eq!(decide(&hand(&[Rank::Ten, Rank::Six]), &card(up), SkillTier::Hard, &mut rng), Action::Hit);
            assert_eq!(decide(&hand(&[Rank::Ten, Rank::Seven]), &card(up), SkillTier::Hard, &mut rng), Action::Stand);
        }
    }

    #[test]
    fn test_hard_against_weak_dealer_card() {
        let mut rng = never();
        for up in [Rank::Two, Rank::Four, Rank::Six] {
            assert_eq!(decide(&hand(&[Rank::Ten, Rank::Two]), &card(up), SkillTier::Hard, &mut rng), Action::Stand);
            assert_eq!(
                decide(&hand(&[Rank::Two, Rank::Three, Rank::Six]), &card(up), SkillTier::Hard, &mut rng),
                Action::Hit
            );
        }
    }

    #[test]
    fn test_computers_never_surrender() {
        let mut rng = StdRng::seed_from_u64(1);
        let h = hand(&[Rank::Ten, Rank::Six]);
        for tier in [SkillTier::Easy, SkillTier::Hard] {
            for _ in 0..200 {
                assert_ne!(decide(&h, &card(Rank::Ace), tier, &mut rng), Action::Surrender);
            }
        }
    }
}
