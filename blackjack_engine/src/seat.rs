use crate::betting::{self, BetMemory, Outcome};
use crate::card::Card;
use crate::error::GameError;
use crate::hand::Hand;
use crate::strategy::{Action, SkillTier};
use crate::table::{HumanInput, Phase};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Who makes the decisions for a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatKind {
    Human,
    Computer(SkillTier),
}

/// One player's place at the table. The bankroll carries over between rounds, everything else is per round.
#[derive(Debug, Clone)]
pub struct Seat {
    name: String,
    kind: SeatKind,
    bankroll: i64,
    bet: i64,
    insurance: i64,
    insurance_won: i64,
    hand: Hand,
    memory: BetMemory,
    in_round: bool,
    insured: bool,
    doubled: bool,
    surrendered: bool,
}

impl Seat {
    pub fn new<S: Into<String>>(name: S, kind: SeatKind, bankroll: i64) -> Seat {
        Seat {
            name: name.into(),
            kind,
            bankroll,
            bet: 0,
            insurance: 0,
            insurance_won: 0,
            hand: Hand::new(),
            memory: BetMemory::default(),
            in_round: false,
            insured: false,
            doubled: false,
            surrendered: false,
        }
    }

    pub fn human<S: Into<String>>(name: S, bankroll: i64) -> Seat {
        Seat::new(name, SeatKind::Human, bankroll)
    }

    pub fn computer<S: Into<String>>(name: S, tier: SkillTier, bankroll: i64) -> Seat {
        Seat::new(name, SeatKind::Computer(tier), bankroll)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SeatKind {
        self.kind
    }

    pub fn is_human(&self) -> bool {
        self.kind == SeatKind::Human
    }

    /// Skill tier of a computer seat, `None` for a human.
    pub fn tier(&self) -> Option<SkillTier> {
        match self.kind {
            SeatKind::Human => None,
            SeatKind::Computer(tier) => Some(tier),
        }
    }

    pub fn bankroll(&self) -> i64 {
        self.bankroll
    }

    /// The bet currently at risk, doubled if the seat doubled down.
    pub fn bet(&self) -> i64 {
        self.bet
    }

    pub fn insurance(&self) -> i64 {
        self.insurance
    }

    /// What the insurance side bet paid this round.
    pub fn insurance_won(&self) -> i64 {
        self.insurance_won
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    pub fn memory(&self) -> &BetMemory {
        &self.memory
    }

    /// Whether the seat placed a bet this round.
    pub fn in_round(&self) -> bool {
        self.in_round
    }

    /// Whether the seat has answered the insurance question this round, declining included.
    pub fn insured(&self) -> bool {
        self.insured
    }

    pub fn doubled(&self) -> bool {
        self.doubled
    }

    pub fn surrendered(&self) -> bool {
        self.surrendered
    }

    /// Humans need the table minimum in hand to play a round, computers may play on credit.
    pub fn can_play(&self, minimum: i64) -> bool {
        match self.kind {
            SeatKind::Human => self.bankroll >= minimum,
            SeatKind::Computer(_) => true,
        }
    }

    fn stake(&mut self, amount: i64) {
        self.bankroll -= amount;
        self.bet = amount;
        self.in_round = true;
    }

    /// Places a bet, taking it out of the bankroll. Human bets are validated against the minimum and bankroll.
    pub fn place_bet(&mut self, amount: i64, minimum: i64) -> Result<i64, GameError> {
        let amount = match self.kind {
            SeatKind::Human => betting::validate_bet(amount, minimum, self.bankroll)?,
            SeatKind::Computer(_) if amount < minimum => {
                return Err(GameError::InvalidWager {
                    amount,
                    min: minimum,
                    max: i64::MAX,
                })
            }
            SeatKind::Computer(_) => amount,
        };
        self.stake(amount);
        Ok(amount)
    }

    /// Lets a computer seat size and place its own bet. Returns `None` for a human seat.
    pub fn computer_bet<R: Rng + ?Sized>(
        &mut self,
        true_count: i32,
        minimum: i64,
        rng: &mut R,
    ) -> Option<i64> {
        let tier = self.tier()?;
        let bet = betting::computer_bet(
            tier,
            &mut self.memory,
            true_count,
            self.bankroll,
            minimum,
            rng,
        );
        self.stake(bet);
        Some(bet)
    }

    /// Gets this round's bet, from the seat's own logic or from `input` for a human.
    pub fn request_bet<R: Rng + ?Sized>(
        &mut self,
        true_count: i32,
        minimum: i64,
        input: &mut dyn HumanInput,
        rng: &mut R,
    ) -> Result<i64, GameError> {
        if let Some(bet) = self.computer_bet(true_count, minimum, rng) {
            return Ok(bet);
        }
        let amount = input.bet(self, minimum)?;
        self.place_bet(amount, minimum)
    }

    /// Places an insurance side bet of at most half the original bet. Zero declines.
    /// A seat answers the insurance question once per round.
    pub fn place_insurance(&mut self, amount: i64) -> Result<i64, GameError> {
        if self.insured {
            return Err(GameError::OutOfPhase {
                operation: "insure twice",
                phase: Phase::Insurance,
            });
        }
        let amount = match self.kind {
            SeatKind::Human => betting::validate_insurance(amount, self.bet, self.bankroll)?,
            SeatKind::Computer(_) => betting::validate_insurance(amount, self.bet, i64::MAX)?,
        };
        self.bankroll -= amount;
        self.insurance = amount;
        self.insured = true;
        Ok(amount)
    }

    /// Gets this round's insurance stake, from the seat's own logic or from `input` for a human.
    pub fn request_insurance<R: Rng + ?Sized>(
        &mut self,
        true_count: i32,
        input: &mut dyn HumanInput,
        rng: &mut R,
    ) -> Result<i64, GameError> {
        let amount = match self.tier() {
            Some(tier) => betting::computer_insurance(tier, self.bet, true_count, rng),
            None => input.insurance(self)?,
        };
        self.place_insurance(amount)
    }

    pub fn start_hand(&mut self, first: Card, second: Card) {
        self.hand = Hand::with_cards(first, second);
    }

    /// Empties the hand so its cards can go back to the shoe.
    pub fn clear_hand(&mut self) -> Vec<Card> {
        self.hand.clear()
    }

    /// Pays `amount` into the bankroll and remembers whether it beat the bet at risk.
    pub fn add_winnings(&mut self, amount: i64) {
        self.bankroll += amount;
        self.memory.previous_outcome = Outcome::from_payout(amount, self.bet);
    }

    /// Pays an insurance return. It never affects the remembered outcome of the main bet.
    pub fn credit(&mut self, amount: i64) {
        self.bankroll += amount;
        self.insurance_won = amount;
    }

    pub fn can_double(&self) -> bool {
        self.hand.len() == 2
            && match self.kind {
                SeatKind::Human => self.bet <= self.bankroll,
                SeatKind::Computer(_) => true,
            }
    }

    pub fn can_surrender(&self) -> bool {
        self.hand.len() == 2
    }

    /// The options the seat may choose from right now.
    pub fn available_actions(&self) -> Vec<Action> {
        let mut options = vec![Action::Stand, Action::Hit];
        if self.can_double() {
            options.push(Action::Double);
        }
        if self.can_surrender() {
            options.push(Action::Surrender);
        }
        options
    }

    /// Doubles the bet. The extra stake comes out of the bankroll.
    pub fn double_down(&mut self) {
        self.bankroll -= self.bet;
        self.bet *= 2;
        self.doubled = true;
    }

    /// Gives up the hand for half the bet back. The cards are handed back to the caller.
    pub fn surrender(&mut self) -> Vec<Card> {
        let cards = self.clear_hand();
        self.surrendered = true;
        self.add_winnings(self.bet / 2);
        cards
    }

    /// Hands back everything still staked this round, used when a round is abandoned.
    /// A surrendered bet or an insurance stake that was already resolved is not refunded twice.
    pub fn refund(&mut self, insurance_resolved: bool) {
        let stake = if self.surrendered { 0 } else { self.bet };
        let insurance = if insurance_resolved { 0 } else { self.insurance };
        self.bankroll += stake + insurance;
        self.bet = 0;
        self.insurance = 0;
    }

    /// Forgets this round's wagers, keeping the bankroll and bet memory.
    pub fn end_round(&mut self) {
        self.bet = 0;
        self.insurance = 0;
        self.insurance_won = 0;
        self.in_round = false;
        self.insured = false;
        self.doubled = false;
        self.surrendered = false;
    }
}

impl Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let credit = if self.bankroll < 0 { " (credit)" } else { "" };
        write!(
            f,
            "{:<21}${}{}\n{:<21}${}\n{:<21}{}",
            format!("{}:", self.name),
            self.bankroll,
            credit,
            "bet:",
            self.bet,
            "hand:",
            self.hand,
        )
    }
}

/// The house. Its second card stays face down until its turn.
#[derive(Debug, Clone, Default)]
pub struct Dealer {
    hand: Hand,
}

impl Dealer {
    pub fn new() -> Dealer {
        Dealer { hand: Hand::new() }
    }

    /// Starts the dealer's hand with the hole card face down.
    pub fn start_hand(&mut self, up: Card, hole: Card) {
        self.hand = Hand::with_cards(up.turned_up(), hole.turned_up());
        self.hand.flip_second();
    }

    pub fn up_card(&self) -> Option<&Card> {
        self.hand.up_card()
    }

    /// Insurance is only offered against an Ace.
    pub fn shows_ace(&self) -> bool {
        self.up_card().map_or(false, |c| c.is_ace())
    }

    /// Turns the hole card face up if it is still down.
    pub fn reveal(&mut self) {
        if self.hand.get(1).map_or(false, |c| !c.face_up) {
            self.hand.flip_second();
        }
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    pub fn clear_hand(&mut self) -> Vec<Card> {
        self.hand.clear()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::card::{Rank, Suit};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn card(rank: Rank) -> Card {
        Card::new(Suit::Hearts, rank)
    }

    #[test]
    fn test_human_bet_is_validated_and_deducted() {
        let mut seat = Seat::human("you", 100);
        assert!(seat.place_bet(5, 10).is_err());
        assert!(seat.place_bet(150, 10).is_err());
        assert_eq!(seat.bankroll(), 100);
        assert!(!seat.in_round());
        assert_eq!(seat.place_bet(40, 10), Ok(40));
        assert_eq!(seat.bankroll(), 60);
        assert_eq!(seat.bet(), 40);
        assert!(seat.in_round());
    }

    #[test]
    fn test_computer_bet_updates_memory() {
        let mut seat = Seat::computer("smart", SkillTier::Hard, 10_000);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(seat.computer_bet(4, 25, &mut rng), Some(100));
        assert_eq!(seat.memory().previous_bet, 100);
        assert_eq!(seat.bankroll(), 9_900);
        assert_eq!(Seat::human("you", 10).computer_bet(4, 25, &mut rng), None);
    }

    #[test]
    fn test_broke_computer_bets_on_credit() {
        let mut seat = Seat::computer("simple", SkillTier::Easy, -40);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(seat.computer_bet(0, 10, &mut rng), Some(10));
        assert_eq!(seat.bankroll(), -50);
        assert!(seat.can_play(10));
        assert!(!Seat::human("you", 5).can_play(10));
    }

    #[test]
    fn test_add_winnings_records_outcome() {
        let mut seat = Seat::computer("simple", SkillTier::Easy, 1000);
        seat.place_bet(100, 10).unwrap();
        seat.add_winnings(200);
        assert_eq!(seat.memory().previous_outcome, Outcome::Win);
        assert_eq!(seat.bankroll(), 1100);
        seat.add_winnings(100);
        assert_eq!(seat.memory().previous_outcome, Outcome::Push);
        seat.add_winnings(0);
        assert_eq!(seat.memory().previous_outcome, Outcome::Loss);
    }

    #[test]
    fn test_insurance_bounds() {
        let mut seat = Seat::human("you", 1000);
        seat.place_bet(100, 10).unwrap();
        assert!(seat.place_insurance(51).is_err());
        assert_eq!(seat.place_insurance(50), Ok(50));
        assert_eq!(seat.bankroll(), 850);
        seat.credit(150);
        assert_eq!(seat.bankroll(), 1000);
        assert_eq!(seat.insurance_won(), 150);
        // the main bet memory is untouched by insurance
        assert_eq!(seat.memory().previous_outcome, Outcome::Push);
    }

    #[test]
    fn test_insurance_answered_once_per_round() {
        let mut seat = Seat::human("you", 1000);
        seat.place_bet(100, 10).unwrap();
        assert_eq!(seat.place_insurance(0), Ok(0));
        assert!(seat.insured());
        assert_eq!(
            seat.place_insurance(50),
            Err(GameError::OutOfPhase {
                operation: "insure twice",
                phase: Phase::Insurance
            })
        );
        assert_eq!(seat.bankroll(), 900);
        assert_eq!(seat.insurance(), 0);

        seat.end_round();
        assert!(!seat.insured());
        seat.place_bet(100, 10).unwrap();
        assert_eq!(seat.place_insurance(50), Ok(50));
        assert_eq!(seat.bankroll(), 750);
    }

    #[test]
    fn test_double_down() {
        let mut seat = Seat::human("you", 100);
        seat.place_bet(40, 10).unwrap();
        seat.start_hand(card(Rank::Five), card(Rank::Six));
        assert!(seat.can_double());
        seat.double_down();
        assert_eq!(seat.bet(), 80);
        assert_eq!(seat.bankroll(), 20);
        assert!(seat.doubled());

        let mut short = Seat::human("short", 100);
        short.place_bet(60, 10).unwrap();
        short.start_hand(card(Rank::Five), card(Rank::Six));
        assert!(!short.can_double());
        assert!(!short.available_actions().contains(&Action::Double));
    }

    #[test]
    fn test_surrender_refunds_half() {
        let mut seat = Seat::human("you", 100);
        seat.place_bet(30, 10).unwrap();
        seat.start_hand(card(Rank::Ten), card(Rank::Six));
        assert!(seat.available_actions().contains(&Action::Surrender));
        let cards = seat.surrender();
        assert_eq!(cards.len(), 2);
        assert!(seat.hand().is_empty());
        assert!(seat.surrendered());
        assert_eq!(seat.bankroll(), 85);
        assert_eq!(seat.memory().previous_outcome, Outcome::Loss);
    }

    #[test]
    fn test_first_decision_options() {
        let mut seat = Seat::human("you", 100);
        seat.place_bet(10, 10).unwrap();
        seat.start_hand(card(Rank::Two), card(Rank::Three));
        seat.hand_mut().add_card(card(Rank::Four));
        assert_eq!(seat.available_actions(), vec![Action::Stand, Action::Hit]);
    }

    #[test]
    fn test_end_round_keeps_bankroll() {
        let mut seat = Seat::computer("smart", SkillTier::Hard, 500);
        seat.place_bet(20, 10).unwrap();
        seat.end_round();
        assert_eq!(seat.bet(), 0);
        assert_eq!(seat.bankroll(), 480);
        assert!(!seat.in_round());
    }

    #[test]
    fn test_dealer_hole_card() {
        let mut dealer = Dealer::new();
        dealer.start_hand(card(Rank::Ace), card(Rank::King));
        assert!(dealer.shows_ace());
        assert!(dealer.up_card().unwrap().face_up);
        assert!(!dealer.hand().get(1).unwrap().face_up);
        // evaluation ignores the face flag
        assert!(dealer.hand().is_blackjack());
        dealer.reveal();
        assert!(dealer.hand().get(1).unwrap().face_up);
        dealer.reveal();
        assert!(dealer.hand().get(1).unwrap().face_up);
        assert_eq!(dealer.clear_hand().len(), 2);
    }
}
