//! Serializable table state for reconnection and recovery.

use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::pattern::{Pattern, detect};
use crate::model::seat::{Role, Seat};
use crate::model::table::{BidRecord, Phase, PlayRecord, SeatState, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSnapshot {
    pub seat: Seat,
    pub hand: Vec<Card>,
    pub hand_count: usize,
    pub role: Option<Role>,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub is_bot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub phase: Phase,
    pub current_seat: Seat,
    pub last_pattern: Option<Pattern>,
    pub pass_streak: u8,
    pub is_new_round: bool,
    pub landlord_seat: Option<Seat>,
    pub bottom_cards: Vec<Card>,
    pub per_seat: Vec<SeatSnapshot>,
    pub saved_at: u64,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub first_bidder: Option<Seat>,
    #[serde(default)]
    pub bids: Vec<BidRecord>,
    #[serde(default)]
    pub play_history: Vec<PlayRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("expected one entry per seat, found {0}")]
    SeatCount(usize),
    #[error("{0} appears more than once")]
    DuplicateSeat(Seat),
    #[error("{seat} reports {reported} cards but holds {actual}")]
    HandCount {
        seat: Seat,
        reported: usize,
        actual: usize,
    },
    #[error("card {0} is held more than once")]
    DuplicateCard(Card),
    #[error("roles do not match the {0} phase")]
    Roles(Phase),
    #[error("pass streak {0} is out of range")]
    PassStreak(u8),
    #[error("last pattern must be empty exactly when a new round starts")]
    RoundFlag,
    #[error("stored pattern does not match its cards")]
    PatternMismatch,
    #[error("finished table has no empty hand")]
    NoWinner,
}

impl TableSnapshot {
    pub fn capture(table: &Table, saved_at: u64) -> Self {
        let per_seat = Seat::LOOP
            .iter()
            .map(|&seat| {
                let state = table.seat(seat);
                SeatSnapshot {
                    seat,
                    hand: state.hand().cards().to_vec(),
                    hand_count: state.hand().len(),
                    role: state.role(),
                    online: state.is_online(),
                    is_bot: state.is_bot(),
                }
            })
            .collect();

        TableSnapshot {
            phase: table.phase(),
            current_seat: table.current_seat(),
            last_pattern: table.last_pattern().cloned(),
            pass_streak: table.pass_streak(),
            is_new_round: table.is_new_round(),
            landlord_seat: table.landlord(),
            bottom_cards: table.bottom_cards().to_vec(),
            per_seat,
            saved_at,
            version: table.version(),
            first_bidder: table.first_bidder(),
            bids: table.bids().to_vec(),
            play_history: table.play_history().to_vec(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn seat(&self, seat: Seat) -> Option<&SeatSnapshot> {
        self.per_seat.iter().find(|entry| entry.seat == seat)
    }

    /// What `viewer` is allowed to see: its own hand, everyone's counts, and
    /// the bottom cards only once a landlord has taken them.
    pub fn for_seat(&self, viewer: Seat) -> SeatView {
        let own = self.seat(viewer);
        let seats = self
            .per_seat
            .iter()
            .map(|entry| SeatSummary {
                seat: entry.seat,
                hand_count: entry.hand_count,
                role: entry.role,
                online: entry.online,
                is_bot: entry.is_bot,
            })
            .collect();
        let bottom_cards = if self.landlord_seat.is_some() {
            self.bottom_cards.clone()
        } else {
            Vec::new()
        };

        SeatView {
            viewer,
            hand: own.map(|entry| entry.hand.clone()).unwrap_or_default(),
            role: own.and_then(|entry| entry.role),
            phase: self.phase,
            current_seat: self.current_seat,
            is_your_turn: self.phase.awaits_action() && self.current_seat == viewer,
            last_pattern: self.last_pattern.clone(),
            pass_streak: self.pass_streak,
            is_new_round: self.is_new_round,
            landlord_seat: self.landlord_seat,
            bottom_cards,
            seats,
            saved_at: self.saved_at,
        }
    }

    pub fn restore(&self) -> Result<Table, SnapshotError> {
        Table::from_snapshot(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSummary {
    pub seat: Seat,
    pub hand_count: usize,
    pub role: Option<Role>,
    pub online: bool,
    pub is_bot: bool,
}

/// Snapshot as seen from one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    pub viewer: Seat,
    pub hand: Vec<Card>,
    pub role: Option<Role>,
    pub phase: Phase,
    pub current_seat: Seat,
    pub is_your_turn: bool,
    pub last_pattern: Option<Pattern>,
    pub pass_streak: u8,
    pub is_new_round: bool,
    pub landlord_seat: Option<Seat>,
    pub bottom_cards: Vec<Card>,
    pub seats: Vec<SeatSummary>,
    pub saved_at: u64,
}

fn redetected(pattern: &Pattern) -> Result<Pattern, SnapshotError> {
    let fresh = detect(pattern.cards());
    if !fresh.is_valid() || &fresh != pattern {
        return Err(SnapshotError::PatternMismatch);
    }
    Ok(fresh)
}

impl Table {
    pub fn snapshot(&self, saved_at: u64) -> TableSnapshot {
        TableSnapshot::capture(self, saved_at)
    }

    /// Rebuilds a table, rejecting snapshots that break table invariants.
    pub fn from_snapshot(snapshot: &TableSnapshot) -> Result<Self, SnapshotError> {
        if snapshot.per_seat.len() != Seat::COUNT {
            return Err(SnapshotError::SeatCount(snapshot.per_seat.len()));
        }

        let mut seats: [Option<SeatState>; 3] = [None, None, None];
        for entry in &snapshot.per_seat {
            if entry.hand_count != entry.hand.len() {
                return Err(SnapshotError::HandCount {
                    seat: entry.seat,
                    reported: entry.hand_count,
                    actual: entry.hand.len(),
                });
            }
            let slot = &mut seats[entry.seat.index()];
            if slot.is_some() {
                return Err(SnapshotError::DuplicateSeat(entry.seat));
            }
            *slot = Some(SeatState {
                hand: Hand::with_cards(entry.hand.clone()),
                role: entry.role,
                online: entry.online,
                is_bot: entry.is_bot,
            });
        }
        let [Some(first), Some(second), Some(third)] = seats else {
            return Err(SnapshotError::SeatCount(snapshot.per_seat.len()));
        };
        let seats = [first, second, third];

        // Bottom cards live in the landlord's hand once bidding resolves.
        let mut seen = HashSet::new();
        let landlord_resolved = snapshot.landlord_seat.is_some();
        let in_play = seats
            .iter()
            .flat_map(|state| state.hand.iter().copied())
            .chain(
                snapshot
                    .play_history
                    .iter()
                    .flat_map(|record| record.cards.iter().copied()),
            );
        let bottom = snapshot
            .bottom_cards
            .iter()
            .copied()
            .filter(|_| !landlord_resolved);
        for card in in_play.chain(bottom) {
            if !seen.insert(card) {
                return Err(SnapshotError::DuplicateCard(card));
            }
        }

        match snapshot.phase {
            Phase::Playing | Phase::Finished => {
                let landlords: Vec<Seat> = Seat::LOOP
                    .iter()
                    .copied()
                    .filter(|seat| seats[seat.index()].role == Some(Role::Landlord))
                    .collect();
                let farmers = seats
                    .iter()
                    .filter(|state| state.role == Some(Role::Farmer))
                    .count();
                if landlords.len() != 1 || farmers != 2 || snapshot.landlord_seat != Some(landlords[0]) {
                    return Err(SnapshotError::Roles(snapshot.phase));
                }
            }
            phase => {
                if landlord_resolved || seats.iter().any(|state| state.role.is_some()) {
                    return Err(SnapshotError::Roles(phase));
                }
            }
        }

        if snapshot.pass_streak > 1 {
            return Err(SnapshotError::PassStreak(snapshot.pass_streak));
        }
        if snapshot.phase == Phase::Playing && snapshot.last_pattern.is_none() != snapshot.is_new_round {
            return Err(SnapshotError::RoundFlag);
        }
        if snapshot.phase == Phase::Finished && seats.iter().all(|state| !state.hand.is_empty()) {
            return Err(SnapshotError::NoWinner);
        }

        let last_pattern = snapshot.last_pattern.as_ref().map(redetected).transpose()?;
        let mut play_history = Vec::with_capacity(snapshot.play_history.len());
        for record in &snapshot.play_history {
            let pattern = record.pattern.as_ref().map(redetected).transpose()?;
            let consistent = match &pattern {
                Some(pattern) => pattern.cards() == record.cards.as_slice(),
                None => record.cards.is_empty(),
            };
            if !consistent {
                return Err(SnapshotError::PatternMismatch);
            }
            play_history.push(PlayRecord {
                seat: record.seat,
                cards: record.cards.clone(),
                pattern,
                at_ms: record.at_ms,
            });
        }

        let last_player = last_pattern.as_ref().map(|_| {
            play_history
                .iter()
                .rev()
                .find(|record| !record.is_pass())
                .map(|record| record.seat)
                .unwrap_or_else(|| {
                    (0..=snapshot.pass_streak).fold(snapshot.current_seat, |seat, _| seat.previous())
                })
        });

        Ok(Table {
            phase: snapshot.phase,
            seats,
            bottom_cards: snapshot.bottom_cards.clone(),
            first_bidder: snapshot.first_bidder,
            bids: snapshot.bids.clone(),
            landlord: snapshot.landlord_seat,
            current_seat: snapshot.current_seat,
            last_pattern,
            last_player,
            pass_streak: snapshot.pass_streak,
            play_history,
            is_new_round: snapshot.is_new_round,
            redeals: 0,
            version: snapshot.version,
        })
    }
}
