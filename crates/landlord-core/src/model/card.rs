use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single card. Suited cards carry a suit; the two jokers carry none and
/// are told apart by rank alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    pub rank: Rank,
    pub suit: Option<Suit>,
}

impl Card {
    pub const SMALL_JOKER: Card = Card {
        rank: Rank::SmallJoker,
        suit: None,
    };

    pub const BIG_JOKER: Card = Card {
        rank: Rank::BigJoker,
        suit: None,
    };

    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self {
            rank,
            suit: Some(suit),
        }
    }

    pub const fn is_joker(self) -> bool {
        self.rank.is_joker()
    }

    pub const fn value(self) -> u8 {
        self.rank.value()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.suit {
            Some(suit) => write!(f, "{}{}", self.rank, suit),
            None => f.write_str(self.rank.symbol()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised card code '{0}'")]
pub struct CardParseError(pub String);

impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let trimmed = code.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "SJ" => return Ok(Card::SMALL_JOKER),
            "BJ" => return Ok(Card::BIG_JOKER),
            _ => {}
        }
        let mut chars = trimmed.chars();
        let suit = chars
            .next_back()
            .and_then(|c| Suit::from_char(c.to_ascii_uppercase()))
            .ok_or_else(|| CardParseError(code.to_string()))?;
        let rank_symbol = chars.as_str().to_ascii_uppercase();
        let rank = Rank::from_symbol(&rank_symbol).ok_or_else(|| CardParseError(code.to_string()))?;
        Ok(Card::new(rank, suit))
    }
}

impl TryFrom<String> for Card {
    type Error = CardParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}

/// Parses a whitespace or comma separated list such as `"3S 3H BJ"`.
pub fn parse_cards(list: &str) -> Result<Vec<Card>, CardParseError> {
    list.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(str::parse)
        .collect()
}

pub fn format_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(Card::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{Card, Rank, Suit, format_cards, parse_cards};

    #[test]
    fn suited_cards_display_rank_then_suit() {
        assert_eq!(Card::new(Rank::Ten, Suit::Hearts).to_string(), "10H");
        assert_eq!(Card::new(Rank::Two, Suit::Spades).to_string(), "2S");
        assert_eq!(Card::SMALL_JOKER.to_string(), "SJ");
        assert_eq!(Card::BIG_JOKER.to_string(), "BJ");
    }

    #[test]
    fn parse_accepts_both_ten_spellings() {
        let a: Card = "10D".parse().unwrap();
        let b: Card = "td".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Card::new(Rank::Ten, Suit::Diamonds));
    }

    #[test]
    fn parse_rejects_unknown_codes() {
        assert!("1S".parse::<Card>().is_err());
        assert!("QX".parse::<Card>().is_err());
        assert!("".parse::<Card>().is_err());
    }

    #[test]
    fn jokers_are_distinct_and_unsuited() {
        assert_ne!(Card::SMALL_JOKER, Card::BIG_JOKER);
        assert!(Card::BIG_JOKER.is_joker());
        assert!(Card::BIG_JOKER.suit.is_none());
        assert!(Card::BIG_JOKER > Card::SMALL_JOKER);
    }

    #[test]
    fn serde_uses_card_codes() {
        let cards = parse_cards("3S, QH BJ").unwrap();
        let json = serde_json::to_string(&cards).unwrap();
        assert_eq!(json, r#"["3S","QH","BJ"]"#);
        let back: Vec<Card> = serde_json::from_str(&json).unwrap();
        assert_eq!(format_cards(&back), "3S QH BJ");
    }
}
