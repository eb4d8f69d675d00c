use crate::model::card::Card;
use crate::model::pattern::RankCounts;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::vec::Vec;

/// Cards held by one seat, kept sorted by ascending rank value (suit breaks
/// ties) so that downstream comparisons and views are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self { cards };
        hand.sort();
        hand
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
        self.sort();
    }

    pub fn extend<I: IntoIterator<Item = Card>>(&mut self, cards: I) {
        self.cards.extend(cards);
        self.sort();
    }

    pub fn remove(&mut self, card: Card) -> bool {
        if let Some(index) = self.cards.iter().position(|&c| c == card) {
            self.cards.remove(index);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    /// Multiset containment: every card of `cards` must be held at least as
    /// many times as it appears there.
    pub fn contains_all(&self, cards: &[Card]) -> bool {
        let mut needed: HashMap<Card, usize> = HashMap::new();
        for card in cards {
            *needed.entry(*card).or_insert(0) += 1;
        }
        needed
            .iter()
            .all(|(card, count)| self.cards.iter().filter(|c| *c == card).count() >= *count)
    }

    /// Removes `cards` only if the whole multiset is held; otherwise the hand
    /// is left untouched.
    pub fn remove_all(&mut self, cards: &[Card]) -> bool {
        if !self.contains_all(cards) {
            return false;
        }
        for card in cards {
            self.remove(*card);
        }
        true
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn rank_counts(&self) -> RankCounts {
        RankCounts::of(&self.cards)
    }

    fn sort(&mut self) {
        self.cards.sort();
    }
}
