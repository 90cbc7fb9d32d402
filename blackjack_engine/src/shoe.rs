use crate::card::{standard_deck, Card};
use crate::error::GameError;
use lazy_static::lazy_static;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

pub const CARDS_PER_DECK: usize = 52;
pub const DEFAULT_DECK_COUNT: usize = 8;

/// The shoe is reshuffled once fewer than this many decks are left undealt.
const RESHUFFLE_DECKS: usize = 2;

lazy_static! {
    /// Hi-Lo tags keyed by the card's point value (Ace = 1).
    static ref HI_LO: HashMap<u8, i32> = {
        let mut lookup_table = HashMap::new();
        for i in 2..=6 {
            lookup_table.insert(i, 1);
        }
        for i in 7..=9 {
            lookup_table.insert(i, 0);
        }
        lookup_table.insert(1, -1);
        lookup_table.insert(10, -1);
        lookup_table
    };
}

/// The working set of cards all hands are dealt from.
///
/// Undealt cards sit at the front of `cards`, returned cards are appended to the back.
/// `undealt` counts the cards drawable before the discards are reached, and is what the
/// running count is normalised by.
#[derive(Debug)]
pub struct Shoe {
    cards: VecDeque<Card>,
    deck_count: usize,
    undealt: usize,
    in_play: usize,
    running_count: i32,
    rng: StdRng,
}

impl Shoe {
    /// Builds a freshly shuffled shoe of `deck_count` decks seeded from entropy.
    pub fn new(deck_count: usize) -> Shoe {
        Shoe::from_rng(deck_count, StdRng::from_entropy())
    }

    /// Builds a freshly shuffled shoe whose every shuffle is determined by `seed`.
    pub fn with_seed(deck_count: usize, seed: u64) -> Shoe {
        Shoe::from_rng(deck_count, StdRng::seed_from_u64(seed))
    }

    fn from_rng(deck_count: usize, rng: StdRng) -> Shoe {
        let cards = (0..deck_count).flat_map(|_| standard_deck()).collect();
        let mut shoe = Shoe {
            cards,
            deck_count,
            undealt: 0,
            in_play: 0,
            running_count: 0,
            rng,
        };
        shoe.reshuffle();
        shoe
    }

    /// Builds a shoe that deals `top` first, in order, followed by the rest of `deck_count` decks in canonical order.
    /// Nothing is shuffled until the reshuffle threshold is hit. Intended for scripted rounds.
    pub fn stacked(deck_count: usize, top: &[Card], seed: u64) -> Shoe {
        let mut rest: Vec<Card> = (0..deck_count).flat_map(|_| standard_deck()).collect();
        for card in top {
            if let Some(pos) = rest
                .iter()
                .position(|c| c.suit == card.suit && c.rank == card.rank)
            {
                rest.remove(pos);
            }
        }
        let cards: VecDeque<Card> = top
            .iter()
            .map(|c| c.turned_up())
            .chain(rest.into_iter())
            .collect();
        let undealt = cards.len();
        Shoe {
            cards,
            deck_count,
            undealt,
            in_play: 0,
            running_count: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Puts every card into a uniformly random order and zeroes the count.
    ///
    /// Returns `false` and leaves the shoe untouched while cards are still out, since a shuffle
    /// must always hold every card of every deck.
    pub fn shuffle(&mut self) -> bool {
        if self.in_play > 0 {
            return false;
        }
        self.reshuffle();
        true
    }

    fn reshuffle(&mut self) {
        self.cards.make_contiguous().shuffle(&mut self.rng);
        self.undealt = self.cards.len();
        self.running_count = 0;
    }

    /// Removes the top card, updating the running count.
    pub fn draw(&mut self) -> Result<Card, GameError> {
        if self.undealt == 0 {
            return Err(GameError::EmptyShoe);
        }
        let card = self.cards.pop_front().ok_or(GameError::EmptyShoe)?;
        self.undealt -= 1;
        self.in_play += 1;
        self.running_count += HI_LO[&card.value()];
        Ok(card)
    }

    /// Places a card back at the bottom of the shoe. Once fewer than two decks remain undealt and
    /// every card has come back, the whole shoe is reshuffled.
    pub fn return_to_bottom(&mut self, card: Card) {
        self.cards.push_back(card.turned_up());
        self.in_play = self.in_play.saturating_sub(1);
        if self.undealt < RESHUFFLE_DECKS * CARDS_PER_DECK && self.in_play == 0 {
            debug!(
                discarded = self.discarded(),
                remaining = self.undealt,
                "reshuffling shoe"
            );
            self.reshuffle();
        }
    }

    /// Running count normalised by the number of decks left to deal, rounded to the nearest integer.
    pub fn true_count(&self) -> i32 {
        let decks_remaining = (self.undealt.max(1) as f64) / (CARDS_PER_DECK as f64);
        (self.running_count as f64 / decks_remaining).round() as i32
    }

    pub fn running_count(&self) -> i32 {
        self.running_count
    }

    /// Cards still to be dealt before the discards are reached.
    pub fn cards_remaining(&self) -> usize {
        self.undealt
    }

    /// Cards drawn and not yet returned.
    pub fn cards_in_play(&self) -> usize {
        self.in_play
    }

    /// Cards returned since the last shuffle.
    pub fn discarded(&self) -> usize {
        self.cards.len() - self.undealt
    }

    pub fn deck_count(&self) -> usize {
        self.deck_count
    }
}

impl Default for Shoe {
    fn default() -> Self {
        Shoe::new(DEFAULT_DECK_COUNT)
    }
}
