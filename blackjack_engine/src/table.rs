//! The table drives a round through its phases.
//!
//! Every operation checks the phase it belongs to, so a controller can either walk the phases itself or hand the
//! whole round to `play_round` and answer the questions put to human seats through `HumanInput`.

use crate::betting;
use crate::card::Card;
use crate::error::GameError;
use crate::hand::{Hand, BLACKJACK};
use crate::seat::{Dealer, Seat};
use crate::settlement::{self, Resolution};
use crate::shoe::Shoe;
use crate::strategy::{self, Action};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{debug, info, warn};

/// Where a round is. `Reset` doubles as the idle state between rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Betting,
    Deal,
    Insurance,
    /// The seat at this index is playing its hand.
    Action(usize),
    Dealer,
    Settlement,
    Reset,
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Betting => write!(f, "betting"),
            Phase::Deal => write!(f, "deal"),
            Phase::Insurance => write!(f, "insurance"),
            Phase::Action(seat) => write!(f, "action (seat #{})", seat),
            Phase::Dealer => write!(f, "dealer"),
            Phase::Settlement => write!(f, "settlement"),
            Phase::Reset => write!(f, "reset"),
        }
    }
}

/// Answers the questions the table puts to human seats.
///
/// Whatever comes back is validated by the table. An `InvalidWager` or `UnavailableAction` is reported through
/// `rejected` and the question is asked again, any other error ends the round.
pub trait HumanInput {
    fn bet(&mut self, seat: &Seat, minimum: i64) -> Result<i64, GameError>;

    /// Insurance stake, zero to decline.
    fn insurance(&mut self, seat: &Seat) -> Result<i64, GameError>;

    fn action(
        &mut self,
        seat: &Seat,
        dealers_up_card: &Card,
        options: &[Action],
    ) -> Result<Action, GameError>;

    fn rejected(&mut self, _seat: &Seat, _error: &GameError) {}

    fn announce(&mut self, _report: &RoundReport) {}
}

/// Input for tables without human seats. Asking it anything means a human is seated after all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHumans;

impl HumanInput for NoHumans {
    fn bet(&mut self, seat: &Seat, _minimum: i64) -> Result<i64, GameError> {
        Err(GameError::LeftTable(seat.name().to_string()))
    }

    fn insurance(&mut self, seat: &Seat) -> Result<i64, GameError> {
        Err(GameError::LeftTable(seat.name().to_string()))
    }

    fn action(&mut self, seat: &Seat, _: &Card, _: &[Action]) -> Result<Action, GameError> {
        Err(GameError::LeftTable(seat.name().to_string()))
    }
}

/// How one seat did in a round. `payout` is what came back for the main bet, including the
/// half refunded on a surrender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatResult {
    pub seat: usize,
    pub name: String,
    pub hand: Hand,
    pub bet: i64,
    pub insurance: i64,
    pub insurance_payout: i64,
    pub doubled: bool,
    pub resolution: Resolution,
    pub payout: i64,
    pub bankroll: i64,
}

impl SeatResult {
    /// Money won or lost this round, side bet included.
    pub fn net(&self) -> i64 {
        self.payout + self.insurance_payout - self.bet - self.insurance
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    pub round: u64,
    /// True count when the bets were made.
    pub true_count: i32,
    pub dealer: Hand,
    pub dealer_total: u32,
    pub seats: Vec<SeatResult>,
}

impl Display for RoundReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const NAME_WIDTH: usize = 20;
        const HAND_WIDTH: usize = 28;
        writeln!(
            f,
            "round {} (true count {})\n{:<NAME_WIDTH$}{}",
            self.round, self.true_count, "dealer", self.dealer
        )?;
        for result in self.seats.iter() {
            writeln!(
                f,
                "{:<NAME_WIDTH$}{:<HAND_WIDTH$}{:<16}{:>+8}{:>10}",
                result.name,
                result.hand.to_string(),
                format!("{:?}", result.resolution),
                result.net(),
                result.bankroll,
            )?;
        }
        Ok(())
    }
}

/// Draws two cards, putting the first back if the second is not there.
fn draw_pair(shoe: &mut Shoe) -> Result<(Card, Card), GameError> {
    let first = shoe.draw()?;
    match shoe.draw() {
        Ok(second) => Ok((first, second)),
        Err(error) => {
            shoe.return_to_bottom(first);
            Err(error)
        }
    }
}

#[derive(Debug)]
pub struct Table {
    shoe: Shoe,
    dealer: Dealer,
    seats: Vec<Seat>,
    minimum: i64,
    phase: Phase,
    rng: StdRng,
    round: u64,
    round_true_count: i32,
    insurance_resolved: bool,
}

impl Table {
    /// Seats the players at a table dealing from `shoe`. Computer decisions draw from entropy.
    pub fn new(shoe: Shoe, seats: Vec<Seat>, minimum: i64) -> Table {
        Table::from_rng(shoe, seats, minimum, StdRng::from_entropy())
    }

    /// Like `new` but with reproducible computer decisions.
    pub fn with_seed(shoe: Shoe, seats: Vec<Seat>, minimum: i64, seed: u64) -> Table {
        Table::from_rng(shoe, seats, minimum, StdRng::seed_from_u64(seed))
    }

    fn from_rng(shoe: Shoe, seats: Vec<Seat>, minimum: i64, rng: StdRng) -> Table {
        Table {
            shoe,
            dealer: Dealer::new(),
            seats,
            minimum,
            phase: Phase::Reset,
            rng,
            round: 0,
            round_true_count: 0,
            insurance_resolved: false,
        }
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    pub fn dealer(&self) -> &Dealer {
        &self.dealer
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn seat(&self, idx: usize) -> Result<&Seat, GameError> {
        self.seats.get(idx).ok_or(GameError::UnknownSeat(idx))
    }

    pub fn minimum(&self) -> i64 {
        self.minimum
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rounds_played(&self) -> u64 {
        self.round
    }

    fn expect_phase(&self, expected: Phase, operation: &'static str) -> Result<(), GameError> {
        if self.phase != expected {
            return Err(GameError::OutOfPhase {
                operation,
                phase: self.phase,
            });
        }
        Ok(())
    }

    fn dealers_up_card(&self) -> Result<Card, GameError> {
        self.dealer
            .up_card()
            .copied()
            .ok_or(GameError::OutOfPhase {
                operation: "read the dealer's up card",
                phase: self.phase,
            })
    }

    /// The first seat after `after` that still has a decision to make, or the dealer's turn when none is left.
    fn next_turn(&self, after: Option<usize>) -> Phase {
        let start = after.map_or(0, |idx| idx + 1);
        (start..self.seats.len())
            .find(|idx| {
                let seat = &self.seats[*idx];
                seat.in_round() && !seat.hand().is_empty() && !seat.hand().is_blackjack()
            })
            .map_or(Phase::Dealer, Phase::Action)
    }

    /// Opens betting for a new round. Every card must be back in the shoe.
    pub fn begin_round(&mut self) -> Result<(), GameError> {
        self.expect_phase(Phase::Reset, "begin a round")?;
        if self.shoe.cards_in_play() != 0 {
            return Err(GameError::OutOfPhase {
                operation: "begin a round with cards still out",
                phase: self.phase,
            });
        }
        self.round += 1;
        self.round_true_count = self.shoe.true_count();
        self.insurance_resolved = false;
        self.phase = Phase::Betting;
        info!(
            round = self.round,
            true_count = self.round_true_count,
            cards_remaining = self.shoe.cards_remaining(),
            "round started"
        );
        Ok(())
    }

    /// Places a bet for one seat. A human's bet must be between the minimum and its bankroll.
    pub fn place_bet(&mut self, idx: usize, amount: i64) -> Result<i64, GameError> {
        self.expect_phase(Phase::Betting, "place a bet")?;
        let minimum = self.minimum;
        let seat = self.seats.get_mut(idx).ok_or(GameError::UnknownSeat(idx))?;
        if seat.in_round() {
            return Err(GameError::OutOfPhase {
                operation: "bet twice",
                phase: Phase::Betting,
            });
        }
        let bet = seat.place_bet(amount, minimum)?;
        debug!(seat = seat.name(), bet, "bet placed");
        Ok(bet)
    }

    /// Lets every computer seat that has not bet yet size its bet from the true count.
    pub fn computer_bets(&mut self) -> Result<Vec<(usize, i64)>, GameError> {
        self.expect_phase(Phase::Betting, "place computer bets")?;
        let mut bets = vec![];
        for (idx, seat) in self.seats.iter_mut().enumerate() {
            if seat.in_round() {
                continue;
            }
            if let Some(bet) = seat.computer_bet(self.round_true_count, self.minimum, &mut self.rng) {
                debug!(seat = seat.name(), bet, "bet placed");
                bets.push((idx, bet));
            }
        }
        Ok(bets)
    }

    fn request_bets(&mut self, input: &mut dyn HumanInput) -> Result<(), GameError> {
        self.expect_phase(Phase::Betting, "request bets")?;
        for idx in 0..self.seats.len() {
            let seat = &self.seats[idx];
            if seat.in_round() {
                continue;
            }
            if !seat.can_play(self.minimum) {
                debug!(seat = seat.name(), bankroll = seat.bankroll(), "sitting out");
                continue;
            }
            loop {
                let seat = &mut self.seats[idx];
                match seat.request_bet(self.round_true_count, self.minimum, input, &mut self.rng) {
                    Ok(bet) => {
                        debug!(seat = seat.name(), bet, "bet placed");
                        break;
                    }
                    Err(error @ GameError::InvalidWager { .. }) => input.rejected(seat, &error),
                    Err(error) => return Err(error),
                }
            }
        }
        Ok(())
    }

    /// Deals two cards to the dealer, hole card down, then two to every seat that bet.
    /// Returns the phase the round moved on to.
    pub fn deal(&mut self) -> Result<Phase, GameError> {
        self.expect_phase(Phase::Betting, "deal")?;
        self.phase = Phase::Deal;

        let (up, hole) = draw_pair(&mut self.shoe)?;
        self.dealer.start_hand(up, hole);
        for seat in self.seats.iter_mut().filter(|seat| seat.in_round()) {
            let (first, second) = draw_pair(&mut self.shoe)?;
            seat.start_hand(first, second);
        }

        self.phase = if self.dealer.shows_ace() {
            Phase::Insurance
        } else {
            self.next_turn(None)
        };
        debug!(dealer = %self.dealer.hand(), next = %self.phase, "cards dealt");
        Ok(self.phase)
    }

    fn insurable_seat(&mut self, idx: usize) -> Result<&mut Seat, GameError> {
        let seat = self.seats.get_mut(idx).ok_or(GameError::UnknownSeat(idx))?;
        if !seat.in_round() {
            return Err(GameError::OutOfPhase {
                operation: "insure a seat without a bet",
                phase: Phase::Insurance,
            });
        }
        Ok(seat)
    }

    /// Places an insurance stake for one seat, zero declines. Each seat answers once.
    pub fn place_insurance(&mut self, idx: usize, amount: i64) -> Result<i64, GameError> {
        self.expect_phase(Phase::Insurance, "place insurance")?;
        self.insurable_seat(idx)?.place_insurance(amount)
    }

    /// Lets every computer seat in the round that has not answered yet decide on insurance.
    pub fn computer_insurance(&mut self) -> Result<Vec<(usize, i64)>, GameError> {
        self.expect_phase(Phase::Insurance, "place computer insurance")?;
        let true_count = self.shoe.true_count();
        let mut stakes = vec![];
        for (idx, seat) in self.seats.iter_mut().enumerate() {
            let tier = match seat.tier() {
                Some(tier) if seat.in_round() && !seat.insured() => tier,
                _ => continue,
            };
            let amount = betting::computer_insurance(tier, seat.bet(), true_count, &mut self.rng);
            stakes.push((idx, seat.place_insurance(amount)?));
        }
        Ok(stakes)
    }

    fn request_insurance(&mut self, input: &mut dyn HumanInput) -> Result<(), GameError> {
        let true_count = self.shoe.true_count();
        for idx in 0..self.seats.len() {
            let seat = &self.seats[idx];
            if !seat.in_round() || seat.insured() {
                continue;
            }
            loop {
                let seat = &mut self.seats[idx];
                match seat.request_insurance(true_count, input, &mut self.rng) {
                    Ok(_) => break,
                    Err(error @ GameError::InvalidWager { .. }) => input.rejected(seat, &error),
                    Err(error) => return Err(error),
                }
            }
        }
        Ok(())
    }

    /// Pays insurance against the dealer's hole card. A dealer blackjack ends the round before anyone acts.
    pub fn resolve_insurance(&mut self) -> Result<Phase, GameError> {
        self.expect_phase(Phase::Insurance, "resolve insurance")?;
        let dealer_blackjack = self.dealer.hand().is_blackjack();
        for seat in self.seats.iter_mut().filter(|seat| seat.insurance() > 0) {
            let won = settlement::insurance_payout(self.dealer.hand(), seat.insurance());
            seat.credit(won);
            debug!(seat = seat.name(), stake = seat.insurance(), won, "insurance resolved");
        }
        self.insurance_resolved = true;

        self.phase = if dealer_blackjack {
            info!(round = self.round, "dealer has blackjack");
            Phase::Dealer
        } else {
            self.next_turn(None)
        };
        Ok(self.phase)
    }

    /// Plays one action for the seat whose turn it is. Returns whether the seat still has its turn afterwards.
    ///
    /// Standing, doubling and surrendering end the turn. Hitting ends it on a bust or on 21.
    pub fn apply_action(&mut self, idx: usize, action: Action) -> Result<bool, GameError> {
        self.expect_phase(Phase::Action(idx), "act")?;
        let seat = self.seats.get_mut(idx).ok_or(GameError::UnknownSeat(idx))?;
        if !seat.available_actions().contains(&action) {
            return Err(GameError::UnavailableAction { action });
        }

        let turn_over = match action {
            Action::Stand => true,
            Action::Hit => {
                seat.hand_mut().add_card(self.shoe.draw()?);
                seat.hand().best_value() >= BLACKJACK
            }
            Action::Double => {
                seat.double_down();
                seat.hand_mut().add_card(self.shoe.draw()?);
                true
            }
            Action::Surrender => {
                for card in seat.surrender() {
                    self.shoe.return_to_bottom(card);
                }
                true
            }
        };
        debug!(seat = seat.name(), %action, hand = %seat.hand(), "seat acted");

        if turn_over {
            self.phase = self.next_turn(Some(idx));
        }
        Ok(!turn_over)
    }

    /// Plays a computer seat's whole turn with its tier's strategy. Returns the actions taken.
    pub fn computer_turn(&mut self, idx: usize) -> Result<Vec<Action>, GameError> {
        self.expect_phase(Phase::Action(idx), "play a computer turn")?;
        let mut taken = vec![];
        while self.phase == Phase::Action(idx) {
            let up = self.dealers_up_card()?;
            let seat = &self.seats[idx];
            let tier = seat.tier().ok_or(GameError::OutOfPhase {
                operation: "play a human seat automatically",
                phase: self.phase,
            })?;
            let action = strategy::decide(seat.hand(), &up, tier, &mut self.rng);
            self.apply_action(idx, action)?;
            taken.push(action);
        }
        Ok(taken)
    }

    fn human_turn(&mut self, idx: usize, input: &mut dyn HumanInput) -> Result<(), GameError> {
        while self.phase == Phase::Action(idx) {
            let up = self.dealers_up_card()?;
            let seat = &self.seats[idx];
            let options = seat.available_actions();
            let action = input.action(seat, &up, &options)?;
            match self.apply_action(idx, action) {
                Ok(_) => {}
                Err(error @ GameError::UnavailableAction { .. }) => {
                    input.rejected(&self.seats[idx], &error)
                }
                Err(error) => return Err(error),
            }
        }
        Ok(())
    }

    /// Turns the hole card and draws to 17. Returns the dealer's final total.
    pub fn dealer_turn(&mut self) -> Result<u32, GameError> {
        self.expect_phase(Phase::Dealer, "play the dealer")?;
        self.dealer.reveal();
        while settlement::dealer_must_hit(self.dealer.hand()) {
            let card = self.shoe.draw()?;
            self.dealer.hand_mut().add_card(card);
        }
        debug!(hand = %self.dealer.hand(), "dealer stands");
        self.phase = Phase::Settlement;
        Ok(self.dealer.hand().best_value())
    }

    /// Pays every seat against the dealer's finished hand.
    pub fn settle(&mut self) -> Result<RoundReport, GameError> {
        self.expect_phase(Phase::Settlement, "settle")?;
        let dealers_hand = self.dealer.hand();
        let mut results = vec![];
        for (idx, seat) in self.seats.iter_mut().enumerate() {
            if !seat.in_round() {
                continue;
            }
            let resolution = settlement::classify(seat.hand(), dealers_hand);
            let payout = match resolution {
                Resolution::Surrendered => seat.bet() / 2,
                _ => {
                    let payout = resolution.payout(seat.bet());
                    seat.add_winnings(payout);
                    payout
                }
            };
            info!(
                seat = seat.name(),
                ?resolution,
                bet = seat.bet(),
                payout,
                bankroll = seat.bankroll(),
                "seat settled"
            );
            results.push(SeatResult {
                seat: idx,
                name: seat.name().to_string(),
                hand: seat.hand().clone(),
                bet: seat.bet(),
                insurance: seat.insurance(),
                insurance_payout: seat.insurance_won(),
                doubled: seat.doubled(),
                resolution,
                payout,
                bankroll: seat.bankroll(),
            });
        }

        let report = RoundReport {
            round: self.round,
            true_count: self.round_true_count,
            dealer: dealers_hand.clone(),
            dealer_total: dealers_hand.best_value(),
            seats: results,
        };
        self.phase = Phase::Reset;
        Ok(report)
    }

    /// Returns every card to the shoe and clears the round's wagers.
    ///
    /// Allowed from any phase. A round that was not settled is abandoned and whatever is still staked goes back
    /// to the seats.
    pub fn reset(&mut self) {
        let abandoned = self.phase != Phase::Reset;
        if abandoned {
            warn!(round = self.round, phase = %self.phase, "abandoning round");
        }
        for card in self.dealer.clear_hand() {
            self.shoe.return_to_bottom(card);
        }
        for seat in self.seats.iter_mut() {
            if abandoned && seat.in_round() {
                seat.refund(self.insurance_resolved);
            }
            for card in seat.clear_hand() {
                self.shoe.return_to_bottom(card);
            }
            seat.end_round();
        }
        self.phase = Phase::Reset;
    }

    /// Plays one full round, asking `input` whenever a human seat has to decide.
    ///
    /// On any error the round is abandoned and the table is left ready for the next one.
    pub fn play_round(&mut self, input: &mut dyn HumanInput) -> Result<RoundReport, GameError> {
        self.begin_round()?;
        match self.run_round(input) {
            Ok(report) => {
                self.reset();
                input.announce(&report);
                Ok(report)
            }
            Err(error) => {
                self.reset();
                Err(error)
            }
        }
    }

    fn run_round(&mut self, input: &mut dyn HumanInput) -> Result<RoundReport, GameError> {
        self.request_bets(input)?;
        self.deal()?;
        if self.phase == Phase::Insurance {
            self.request_insurance(input)?;
            self.resolve_insurance()?;
        }
        while let Phase::Action(idx) = self.phase {
            if self.seats[idx].is_human() {
                self.human_turn(idx, input)?;
            } else {
                self.computer_turn(idx)?;
            }
        }
        self.dealer_turn()?;
        self.settle()
    }
}
