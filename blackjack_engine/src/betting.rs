//! Wager sizing for computer seats and validation of the wagers humans ask for.

use crate::error::GameError;
use crate::strategy::SkillTier;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A computer seat never bets more than this fraction of its bankroll, unless the table minimum forces it to.
const BANKROLL_FRACTION: i64 = 20;

/// Hard tier seats take insurance from this true count upwards.
const INSURANCE_TRUE_COUNT: i32 = 3;

/// How the previous round went for a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Push,
    Loss,
}

impl Outcome {
    /// Classifies money received back against the bet that was at risk.
    pub fn from_payout(amount: i64, bet: i64) -> Outcome {
        if amount > bet {
            Outcome::Win
        } else if amount == bet {
            Outcome::Push
        } else {
            Outcome::Loss
        }
    }
}

/// What a computer seat remembers between rounds to size its next bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetMemory {
    pub previous_bet: i64,
    pub previous_outcome: Outcome,
}

impl Default for BetMemory {
    fn default() -> Self {
        BetMemory {
            previous_bet: 0,
            previous_outcome: Outcome::Push,
        }
    }
}

/// Caps a proposed bet at a twentieth of the bankroll, then raises it to the table minimum if needed.
/// The minimum wins when the two disagree, which is how a broke computer ends up betting on credit.
pub fn clamp_bet(proposed: i64, bankroll: i64, minimum: i64) -> i64 {
    proposed.min(bankroll / BANKROLL_FRACTION).max(minimum)
}

/// Bet size before clamping.
///
/// The easy tier walks its previous bet up after a win and down after a loss by a random 0, 1 or 2 table minimums.
/// The hard tier ignores history and spreads its bet with the true count.
pub fn proposed_bet<R: Rng + ?Sized>(
    tier: SkillTier,
    memory: &BetMemory,
    true_count: i32,
    minimum: i64,
    rng: &mut R,
) -> i64 {
    match tier {
        SkillTier::Easy => {
            let step = minimum * rng.gen_range(0..=2i64);
            match memory.previous_outcome {
                Outcome::Loss => memory.previous_bet - step,
                Outcome::Push => memory.previous_bet,
                Outcome::Win => memory.previous_bet + step,
            }
        }
        SkillTier::Hard => minimum * true_count as i64,
    }
}

/// Decides a computer seat's bet and remembers it for the next round.
pub fn computer_bet<R: Rng + ?Sized>(
    tier: SkillTier,
    memory: &mut BetMemory,
    true_count: i32,
    bankroll: i64,
    minimum: i64,
    rng: &mut R,
) -> i64 {
    let bet = clamp_bet(
        proposed_bet(tier, memory, true_count, minimum, rng),
        bankroll,
        minimum,
    );
    memory.previous_bet = bet;
    bet
}

/// Decides a computer seat's insurance stake, zero when it declines.
/// The easy tier insures one time in four, the hard tier only when the count says tens are plentiful.
pub fn computer_insurance<R: Rng + ?Sized>(
    tier: SkillTier,
    bet: i64,
    true_count: i32,
    rng: &mut R,
) -> i64 {
    let insure = match tier {
        SkillTier::Easy => rng.gen_range(0..4) == 0,
        SkillTier::Hard => true_count >= INSURANCE_TRUE_COUNT,
    };
    if insure {
        bet / 2
    } else {
        0
    }
}

/// Validates a human bet. Humans must meet the table minimum and cannot bet on credit.
pub fn validate_bet(amount: i64, minimum: i64, bankroll: i64) -> Result<i64, GameError> {
    if amount < minimum || amount > bankroll {
        return Err(GameError::InvalidWager {
            amount,
            min: minimum,
            max: bankroll,
        });
    }
    Ok(amount)
}

/// Validates a human insurance stake, at most half of the original bet and never more than the bankroll covers.
pub fn validate_insurance(amount: i64, bet: i64, bankroll: i64) -> Result<i64, GameError> {
    let max = (bet / 2).min(bankroll.max(0));
    if amount < 0 || amount > max {
        return Err(GameError::InvalidWager {
            amount,
            min: 0,
            max,
        });
    }
    Ok(amount)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_hard_bet_follows_true_count() {
        let mut rng = StdRng::seed_from_u64(0);
        let memory = BetMemory::default();
        assert_eq!(proposed_bet(SkillTier::Hard, &memory, 4, 25, &mut rng), 100);
        assert_eq!(proposed_bet(SkillTier::Hard, &memory, -2, 25, &mut rng), -50);
    }

    #[test]
    fn test_hard_bet_ignores_previous_outcome() {
        let mut rng = StdRng::seed_from_u64(0);
        for previous_outcome in [Outcome::Win, Outcome::Push, Outcome::Loss] {
            let mut memory = BetMemory {
                previous_bet: 70,
                previous_outcome,
            };
            assert_eq!(computer_bet(SkillTier::Hard, &mut memory, 2, 10_000, 10, &mut rng), 20);
            assert_eq!(memory.previous_bet, 20);
        }
    }

    #[test]
    fn test_clamp_bet() {
        // capped at bankroll / 20
        assert_eq!(clamp_bet(500, 1000, 10), 50);
        // raised to the minimum
        assert_eq!(clamp_bet(-50, 1000, 10), 10);
        // minimum beats the cap when the bankroll is thin or negative
        assert_eq!(clamp_bet(40, 100, 10), 10);
        assert_eq!(clamp_bet(40, -300, 10), 10);
        assert_eq!(clamp_bet(30, 1000, 10), 30);
    }

    #[test]
    fn test_easy_bet_random_walk() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            let win = BetMemory {
                previous_bet: 30,
                previous_outcome: Outcome::Win,
            };
            let up = proposed_bet(SkillTier::Easy, &win, 0, 10, &mut rng);
            assert!([30, 40, 50].contains(&up));

            let loss = BetMemory {
                previous_outcome: Outcome::Loss,
                ..win
            };
            let down = proposed_bet(SkillTier::Easy, &loss, 0, 10, &mut rng);
            assert!([10, 20, 30].contains(&down));

            let push = BetMemory {
                previous_outcome: Outcome::Push,
                ..win
            };
            assert_eq!(proposed_bet(SkillTier::Easy, &push, 0, 10, &mut rng), 30);
        }
    }

    #[test]
    fn test_first_easy_bet_is_the_minimum() {
        let mut memory = BetMemory::default();
        let bet = computer_bet(SkillTier::Easy, &mut memory, 5, 1000, 10, &mut StdRng::seed_from_u64(3));
        assert_eq!(bet, 10);
        assert_eq!(memory.previous_bet, 10);
    }

    #[test]
    fn test_computer_insurance() {
        // true count threshold for the hard tier
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(computer_insurance(SkillTier::Hard, 50, 3, &mut rng), 25);
        assert_eq!(computer_insurance(SkillTier::Hard, 50, 2, &mut rng), 0);
        // easy tier takes it when the draw comes up zero
        assert_eq!(computer_insurance(SkillTier::Easy, 50, -5, &mut StepRng::new(0, 0)), 25);
    }

    #[test]
    fn test_easy_insurance_rate_is_about_a_quarter() {
        let mut rng = StdRng::seed_from_u64(17);
        let trials = 20_000;
        let taken = (0..trials)
            .filter(|_| computer_insurance(SkillTier::Easy, 20, 0, &mut rng) > 0)
            .count();
        let rate = taken as f64 / trials as f64;
        assert!((rate - 0.25).abs() < 0.02, "insurance rate {}", rate);
    }

    #[test]
    fn test_validate_bet() {
        assert_eq!(validate_bet(10, 10, 1000), Ok(10));
        assert_eq!(validate_bet(1000, 10, 1000), Ok(1000));
        assert_eq!(
            validate_bet(5, 10, 1000),
            Err(GameError::InvalidWager {
                amount: 5,
                min: 10,
                max: 1000
            })
        );
        assert!(validate_bet(1001, 10, 1000).is_err());
        assert!(validate_bet(-10, 10, 1000).is_err());
    }

    #[test]
    fn test_validate_insurance() {
        assert_eq!(validate_insurance(0, 100, 500), Ok(0));
        assert_eq!(validate_insurance(50, 100, 500), Ok(50));
        assert!(validate_insurance(51, 100, 500).is_err());
        assert!(validate_insurance(-1, 100, 500).is_err());
        // bankroll limits the stake as well
        assert_eq!(
            validate_insurance(40, 100, 30),
            Err(GameError::InvalidWager {
                amount: 40,
                min: 0,
                max: 30
            })
        );
    }

    #[test]
    fn test_outcome_from_payout() {
        assert_eq!(Outcome::from_payout(200, 100), Outcome::Win);
        assert_eq!(Outcome::from_payout(100, 100), Outcome::Push);
        assert_eq!(Outcome::from_payout(50, 100), Outcome::Loss);
        assert_eq!(Outcome::from_payout(0, 100), Outcome::Loss);
    }
}
