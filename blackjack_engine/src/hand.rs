use crate::card::Card;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub const BLACKJACK: u32 = 21;

/// The cards held by one seat or by the dealer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    /// Creates an empty hand.
    pub fn new() -> Hand {
        Hand { cards: vec![] }
    }

    /// Creates a hand holding the two starting cards.
    pub fn with_cards(first: Card, second: Card) -> Hand {
        Hand {
            cards: vec![first, second],
        }
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Empties the hand, handing its cards back to the caller so they can be returned to the shoe.
    pub fn clear(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.cards)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn get(&self, idx: usize) -> Option<&Card> {
        self.cards.get(idx)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The first card, the one the dealer shows.
    pub fn up_card(&self) -> Option<&Card> {
        self.cards.first()
    }

    /// Turns the second card over. Used for the dealer's hole card.
    pub fn flip_second(&mut self) {
        if let Some(card) = self.cards.get_mut(1) {
            *card = card.flipped();
        }
    }

    /// Best total and the number of aces promoted to 11 to reach it.
    ///
    /// Tries every count of promoted aces from the most to none and keeps the first total that does not bust.
    /// When all of them bust the all-hard total is returned.
    fn evaluate(&self) -> (u32, u32) {
        let base: u32 = self.cards.iter().map(|c| c.value() as u32).sum();
        let aces = self.cards.iter().filter(|c| c.is_ace()).count() as u32;
        (0..=aces)
            .rev()
            .map(|promoted| (base + 10 * promoted, promoted))
            .find(|(total, _)| *total <= BLACKJACK)
            .unwrap_or((base, 0))
    }

    pub fn best_value(&self) -> u32 {
        self.evaluate().0
    }

    /// True when the best total counts an ace as 11. A blackjack is reported as a blackjack, never as a soft 21.
    pub fn is_soft(&self) -> bool {
        self.evaluate().1 > 0 && !self.is_blackjack()
    }

    pub fn is_busted(&self) -> bool {
        self.best_value() > BLACKJACK
    }

    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.best_value() == BLACKJACK
    }
}

impl Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cards = self
            .cards
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<String>>()
            .join(" ");
        if self.cards.iter().all(|c| c.face_up) {
            write!(f, "{} ({})", cards, self.best_value())
        } else {
            write!(f, "{}", cards)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::card::{Rank, Suit};
    use proptest::prelude::*;

    fn card(rank: Rank) -> Card {
        Card::new(Suit::Spades, rank)
    }

    fn hand(ranks: &[Rank]) -> Hand {
        let mut hand = Hand::new();
        for rank in ranks {
            hand.add_card(card(*rank));
        }
        hand
    }

    #[test]
    fn test_two_tens() {
        let h = hand(&[Rank::Ten, Rank::King]);
        assert_eq!(h.best_value(), 20);
        assert!(!h.is_blackjack());
        assert!(!h.is_soft());
        assert!(!h.is_busted());
    }

    #[test]
    fn test_ace_king_is_blackjack_not_soft() {
        let h = Hand::with_cards(card(Rank::Ace), card(Rank::King));
        assert_eq!(h.best_value(), 21);
        assert!(h.is_blackjack());
        assert!(!h.is_soft());
    }

    #[test]
    fn test_soft_seventeen_hardens() {
        let mut h = hand(&[Rank::Ace, Rank::Six]);
        assert_eq!(h.best_value(), 17);
        assert!(h.is_soft());
        h.add_card(card(Rank::Ten));
        assert_eq!(h.best_value(), 17);
        assert!(!h.is_soft());
    }

    #[test]
    fn test_three_card_twenty_one_is_not_blackjack() {
        let h = hand(&[Rank::Seven, Rank::Seven, Rank::Seven]);
        assert_eq!(h.best_value(), 21);
        assert!(!h.is_blackjack());
        let h = hand(&[Rank::Ace, Rank::Five, Rank::Five]);
        assert_eq!(h.best_value(), 21);
        assert!(h.is_soft());
        assert!(!h.is_blackjack());
    }

    #[test]
    fn test_multiple_aces() {
        let h = hand(&[Rank::Ace, Rank::Ace]);
        assert_eq!(h.best_value(), 12);
        assert!(h.is_soft());
        let h = hand(&[Rank::Ace, Rank::Ace, Rank::Nine]);
        assert_eq!(h.best_value(), 21);
        let h = hand(&[Rank::Ace, Rank::Ace, Rank::Ten, Rank::King]);
        assert_eq!(h.best_value(), 22);
        assert!(h.is_busted());
        assert!(!h.is_soft());
    }

    #[test]
    fn test_bust_reports_hard_total() {
        let h = hand(&[Rank::King, Rank::Queen, Rank::Five]);
        assert_eq!(h.best_value(), 25);
        assert!(h.is_busted());
    }

    #[test]
    fn test_clear_returns_cards() {
        let mut h = hand(&[Rank::Two, Rank::Three, Rank::Four]);
        let cards = h.clear();
        assert_eq!(cards.len(), 3);
        assert!(h.is_empty());
        assert_eq!(h.best_value(), 0);
    }

    #[test]
    fn test_flip_second_hides_hole_card() {
        let mut h = Hand::with_cards(card(Rank::Ace), card(Rank::Nine));
        h.flip_second();
        assert!(h.up_card().unwrap().face_up);
        assert!(!h.get(1).unwrap().face_up);
        assert_eq!(h.to_string(), "A♠ ??");
        h.flip_second();
        assert_eq!(h.to_string(), "A♠ 9♠ (20)");
        // face state never changes the total
        assert_eq!(h.best_value(), 20);
    }

    fn arb_rank() -> impl Strategy<Value = Rank> {
        (0..13usize).prop_map(|i| Rank::ALL[i])
    }

    proptest! {
        #[test]
        fn prop_best_value_is_best_ace_assignment(ranks in proptest::collection::vec(arb_rank(), 0..12)) {
            let h = hand(&ranks);
            let hard: u32 = ranks.iter().map(|r| r.value() as u32).sum();
            let aces = ranks.iter().filter(|r| **r == Rank::Ace).count() as u32;
            let best_legal = (0..=aces).map(|i| hard + 10 * i).filter(|t| *t <= 21).max();
            match best_legal {
                Some(total) => {
                    prop_assert_eq!(h.best_value(), total);
                    prop_assert!(!h.is_busted());
                }
                None => {
                    prop_assert_eq!(h.best_value(), hard);
                    prop_assert!(h.is_busted());
                }
            }
            prop_assert_eq!(h.is_blackjack(), ranks.len() == 2 && h.best_value() == 21);
        }
    }
}
