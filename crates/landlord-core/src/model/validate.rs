use crate::model::card::Card;
use crate::model::compare::can_beat;
use crate::model::hand::Hand;
use crate::model::pattern::{Pattern, detect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a proposed move is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayError {
    #[error("cards do not form a legal pattern")]
    InvalidPattern,
    #[error("cards are not held by the acting seat")]
    CardsNotOwned,
    #[error("pattern cannot beat the one on the table")]
    IllegalBeat,
    #[error("the round leader must play, not pass")]
    MustPlayOnLead,
}

/// Checks a proposed play against the acting hand and the table.
///
/// Steps run in order: empty proposals, ownership, pattern detection, then
/// the beat check when following.
pub fn validate(
    hand: &Hand,
    proposed: &[Card],
    last_pattern: Option<&Pattern>,
    is_lead: bool,
) -> Result<Pattern, PlayError> {
    if proposed.is_empty() {
        return Err(PlayError::InvalidPattern);
    }
    if !hand.contains_all(proposed) {
        return Err(PlayError::CardsNotOwned);
    }
    let pattern = detect(proposed);
    if !pattern.is_valid() {
        return Err(PlayError::InvalidPattern);
    }
    if is_lead {
        return Ok(pattern);
    }
    match last_pattern {
        Some(reference) if can_beat(&pattern, reference) => Ok(pattern),
        _ => Err(PlayError::IllegalBeat),
    }
}

/// A pass is only legal when the seat is following.
pub fn validate_pass(is_lead: bool) -> Result<(), PlayError> {
    if is_lead {
        Err(PlayError::MustPlayOnLead)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{PlayError, validate, validate_pass};
    use crate::model::card::parse_cards;
    use crate::model::hand::Hand;
    use crate::model::pattern::{PatternKind, detect};

    fn hand(list: &str) -> Hand {
        Hand::with_cards(parse_cards(list).unwrap())
    }

    #[test]
    fn empty_proposal_is_rejected() {
        let h = hand("3S 4S");
        assert_eq!(validate(&h, &[], None, true), Err(PlayError::InvalidPattern));
    }

    #[test]
    fn ownership_is_checked_before_shape() {
        let h = hand("3S 4S");
        let cards = parse_cards("3S 5D").unwrap();
        assert_eq!(validate(&h, &cards, None, true), Err(PlayError::CardsNotOwned));
        let dupes = parse_cards("3S 3S").unwrap();
        assert_eq!(validate(&h, &dupes, None, true), Err(PlayError::CardsNotOwned));
    }

    #[test]
    fn leader_may_play_any_legal_pattern() {
        let h = hand("3S 4S 5S 6S 7S 9H");
        let cards = parse_cards("3S 4S 5S 6S 7S").unwrap();
        let pattern = validate(&h, &cards, None, true).unwrap();
        assert_eq!(pattern.kind(), PatternKind::Straight);
        let junk = parse_cards("3S 9H").unwrap();
        assert_eq!(validate(&h, &junk, None, true), Err(PlayError::InvalidPattern));
    }

    #[test]
    fn follower_must_beat_table() {
        let h = hand("9S 9H KD KC");
        let table = detect(&parse_cards("10S 10H").unwrap());
        let low = parse_cards("9S 9H").unwrap();
        let high = parse_cards("KD KC").unwrap();
        assert_eq!(
            validate(&h, &low, Some(&table), false),
            Err(PlayError::IllegalBeat)
        );
        assert!(validate(&h, &high, Some(&table), false).is_ok());
        assert_eq!(validate(&h, &high, None, false), Err(PlayError::IllegalBeat));
    }

    #[test]
    fn pass_requires_following() {
        assert_eq!(validate_pass(true), Err(PlayError::MustPlayOnLead));
        assert!(validate_pass(false).is_ok());
    }
}
