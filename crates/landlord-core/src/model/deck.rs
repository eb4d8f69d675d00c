use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

pub const DECK_SIZE: usize = 54;
pub const HAND_SIZE: usize = 17;
pub const BOTTOM_SIZE: usize = 3;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// The canonical 54-card deck: 13 ranks in 4 suits plus both jokers.
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::SUITED.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        cards.push(Card::SMALL_JOKER);
        cards.push(Card::BIG_JOKER);
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    /// Fisher-Yates via `SliceRandom::shuffle`.
    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Splits the deck into three 17-card hands (dealt round-robin) and the
    /// three bottom cards.
    pub fn deal(&self) -> ([Vec<Card>; 3], Vec<Card>) {
        let mut hands: [Vec<Card>; 3] = std::array::from_fn(|_| Vec::with_capacity(HAND_SIZE));
        let dealt = HAND_SIZE * 3;
        for (index, card) in self.cards.iter().take(dealt).enumerate() {
            hands[index % 3].push(*card);
        }
        let bottom = self.cards.iter().skip(dealt).copied().collect();
        (hands, bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::{BOTTOM_SIZE, DECK_SIZE, Deck, HAND_SIZE};
    use std::collections::HashSet;

    #[test]
    fn standard_deck_has_54_unique_cards() {
        let deck = Deck::standard();
        assert_eq!(deck.cards().len(), DECK_SIZE);
        let unique: HashSet<_> = deck.cards().iter().collect();
        assert_eq!(unique.len(), DECK_SIZE);
        assert_eq!(deck.cards().iter().filter(|c| c.is_joker()).count(), 2);
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let deck_a = Deck::shuffled_with_seed(42);
        let deck_b = Deck::shuffled_with_seed(42);
        assert_eq!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn shuffle_with_different_seeds_differs() {
        let deck_a = Deck::shuffled_with_seed(1);
        let deck_b = Deck::shuffled_with_seed(2);
        assert_ne!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn deal_splits_into_three_hands_and_bottom() {
        let deck = Deck::shuffled_with_seed(7);
        let (hands, bottom) = deck.deal();
        for hand in &hands {
            assert_eq!(hand.len(), HAND_SIZE);
        }
        assert_eq!(bottom.len(), BOTTOM_SIZE);
        let mut all: Vec<_> = hands.iter().flatten().copied().collect();
        all.extend(bottom);
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), DECK_SIZE);
    }
}
