//! Settlement of a finished game.
//!
//! The multiplier starts at 1 and compounds: x3 per bomb, x8 per rocket, x16
//! for a spring and x16 for an anti-spring. The landlord moves twice the
//! stake, each farmer once. Balance clamping is the ledger's job.

use crate::model::pattern::PatternKind;
use crate::model::seat::{Role, Seat};
use crate::model::table::PlayRecord;
use serde::{Deserialize, Serialize};

pub const BOMB_FACTOR: u64 = 3;
pub const ROCKET_FACTOR: u64 = 8;
pub const SPRING_FACTOR: u64 = 16;
pub const ANTI_SPRING_FACTOR: u64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multiplier {
    pub bombs: u32,
    pub rockets: u32,
    pub spring: bool,
    pub anti_spring: bool,
    pub total: u64,
}

impl Multiplier {
    pub fn from_history(landlord: Seat, winner: Seat, history: &[PlayRecord]) -> Self {
        let mut bombs = 0u32;
        let mut rockets = 0u32;
        let mut landlord_played = false;
        let mut farmers_played = false;

        for record in history {
            let Some(pattern) = record.pattern.as_ref() else {
                continue;
            };
            match pattern.kind() {
                PatternKind::Bomb => bombs += 1,
                PatternKind::Rocket => rockets += 1,
                _ => {}
            }
            if record.seat == landlord {
                landlord_played = true;
            } else {
                farmers_played = true;
            }
        }

        let landlord_won = winner == landlord;
        let spring = landlord_won && !farmers_played;
        // Reachable only from restored tables; a live landlord always leads.
        let anti_spring = !landlord_won && !landlord_played;

        let mut total = 1u64;
        for _ in 0..bombs {
            total = total.saturating_mul(BOMB_FACTOR);
        }
        for _ in 0..rockets {
            total = total.saturating_mul(ROCKET_FACTOR);
        }
        if spring {
            total = total.saturating_mul(SPRING_FACTOR);
        }
        if anti_spring {
            total = total.saturating_mul(ANTI_SPRING_FACTOR);
        }

        Self {
            bombs,
            rockets,
            spring,
            anti_spring,
            total,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub landlord: Seat,
    pub winner: Seat,
    pub landlord_won: bool,
    pub base: u64,
    pub multiplier: Multiplier,
    /// Nominal delta per seat, indexed by [`Seat::index`].
    pub deltas: [i64; 3],
}

impl Settlement {
    pub fn delta(&self, seat: Seat) -> i64 {
        self.deltas[seat.index()]
    }

    /// Stake for one farmer share: `base x multiplier`.
    pub fn unit(&self) -> i64 {
        to_i64(self.base.saturating_mul(self.multiplier.total))
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Computes nominal deltas. Returns `None` unless exactly one seat holds
/// the landlord role.
pub fn settle(roles: &[Role; 3], winner: Seat, history: &[PlayRecord], base: u64) -> Option<Settlement> {
    let mut landlords = Seat::LOOP.iter().copied().filter(|s| roles[s.index()] == Role::Landlord);
    let landlord = landlords.next()?;
    if landlords.next().is_some() {
        return None;
    }

    let multiplier = Multiplier::from_history(landlord, winner, history);
    let landlord_won = winner == landlord;
    let unit = to_i64(base.saturating_mul(multiplier.total));
    let sign = if landlord_won { 1 } else { -1 };

    let mut deltas = [0i64; 3];
    for seat in Seat::LOOP {
        let share = if seat == landlord {
            unit.saturating_mul(2)
        } else {
            unit.saturating_neg()
        };
        deltas[seat.index()] = share.saturating_mul(sign);
    }

    Some(Settlement {
        landlord,
        winner,
        landlord_won,
        base,
        multiplier,
        deltas,
    })
}

#[cfg(test)]
mod tests {
    use super::{Multiplier, settle};
    use crate::model::card::parse_cards;
    use crate::model::pattern::detect;
    use crate::model::seat::{Role, Seat};
    use crate::model::table::PlayRecord;

    fn played(seat: Seat, cards: &str) -> PlayRecord {
        let cards = parse_cards(cards).unwrap();
        let pattern = detect(&cards);
        PlayRecord {
            seat,
            cards,
            pattern: Some(pattern),
            at_ms: 0,
        }
    }

    fn passed(seat: Seat) -> PlayRecord {
        PlayRecord {
            seat,
            cards: Vec::new(),
            pattern: None,
            at_ms: 0,
        }
    }

    const ROLES: [Role; 3] = [Role::Landlord, Role::Farmer, Role::Farmer];

    #[test]
    fn bomb_and_spring_compound() {
        let history = vec![
            played(Seat::First, "5S 5H 5D 5C"),
            passed(Seat::Second),
            passed(Seat::Third),
            played(Seat::First, "3S"),
        ];
        let settlement = settle(&ROLES, Seat::First, &history, 2).unwrap();
        assert_eq!(settlement.multiplier.bombs, 1);
        assert!(settlement.multiplier.spring);
        assert_eq!(settlement.multiplier.total, 48);
        assert_eq!(settlement.delta(Seat::First), 192);
        assert_eq!(settlement.delta(Seat::Second), -96);
        assert_eq!(settlement.delta(Seat::Third), -96);
    }

    #[test]
    fn farmers_win_without_bonuses() {
        let history = vec![
            played(Seat::First, "3S"),
            played(Seat::Second, "4S"),
            passed(Seat::Third),
            passed(Seat::First),
            played(Seat::Second, "9H"),
        ];
        let settlement = settle(&ROLES, Seat::Second, &history, 5).unwrap();
        assert!(!settlement.landlord_won);
        assert_eq!(settlement.multiplier.total, 1);
        assert_eq!(settlement.deltas, [-10, 5, 5]);
        assert_eq!(settlement.deltas.iter().sum::<i64>(), 0);
    }

    #[test]
    fn rockets_and_bombs_multiply() {
        let history = vec![
            played(Seat::First, "3S"),
            played(Seat::Second, "SJ BJ"),
            played(Seat::Third, "7S 7H 7D 7C"),
            played(Seat::First, "9S 9H 9D 9C"),
        ];
        let multiplier = Multiplier::from_history(Seat::First, Seat::First, &history);
        assert_eq!(multiplier.rockets, 1);
        assert_eq!(multiplier.bombs, 2);
        assert!(!multiplier.spring);
        assert_eq!(multiplier.total, 8 * 9);
    }

    #[test]
    fn anti_spring_applies_when_landlord_never_played() {
        let history = vec![played(Seat::Second, "3S")];
        let multiplier = Multiplier::from_history(Seat::First, Seat::Second, &history);
        assert!(multiplier.anti_spring);
        assert_eq!(multiplier.total, 16);
    }

    #[test]
    fn requires_exactly_one_landlord() {
        let roles = [Role::Farmer; 3];
        assert!(settle(&roles, Seat::First, &[], 1).is_none());
        let roles = [Role::Landlord, Role::Landlord, Role::Farmer];
        assert!(settle(&roles, Seat::First, &[], 1).is_none());
    }
}
