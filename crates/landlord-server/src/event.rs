use crate::action::RoomId;
use crate::error::{ActionError, ErrorKind};
use crate::ledger::{LedgerOutcome, Unlocked};
use landlord_core::model::card::Card;
use landlord_core::model::pattern::Pattern;
use landlord_core::model::score::Settlement;
use landlord_core::model::seat::Seat;
use landlord_core::model::table::BidChoice;
use serde::{Deserialize, Serialize};

/// Settlement as reported to the transport: nominal and ledger-applied
/// deltas side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub settlement: Settlement,
    pub applied: [i64; 3],
    pub balances: [i64; 3],
    pub unlocked: Vec<Unlocked>,
}

impl ScoreBreakdown {
    pub fn new(settlement: Settlement, outcome: &LedgerOutcome) -> Self {
        let mut applied = settlement.deltas;
        let mut balances = [0i64; 3];
        for entry in &outcome.balances {
            applied[entry.seat.index()] = entry.applied_delta;
            balances[entry.seat.index()] = entry.balance;
        }
        Self {
            settlement,
            applied,
            balances,
            unlocked: outcome.unlocked.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    GameStarted {
        game_id: String,
        first_bidder: Seat,
    },
    BidPlaced {
        seat: Seat,
        choice: BidChoice,
    },
    BidResolved {
        landlord_seat: Seat,
        bottom_cards: Vec<Card>,
    },
    Redealt {
        first_bidder: Seat,
        redeals: u32,
    },
    CardsPlayed {
        seat: Seat,
        pattern: Pattern,
        remaining_count: usize,
    },
    Passed {
        seat: Seat,
    },
    TurnChanged {
        next_seat: Seat,
        is_lead: bool,
        last_pattern: Option<Pattern>,
    },
    GameFinished {
        winner_seat: Seat,
        score_breakdown: ScoreBreakdown,
    },
    Hint {
        seat: Seat,
        cards: Vec<Card>,
    },
    Rejected {
        seat: Seat,
        kind: ErrorKind,
        message: String,
    },
}

impl GameEvent {
    pub fn rejected(seat: Seat, err: &ActionError) -> Self {
        GameEvent::Rejected {
            seat,
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            GameEvent::GameStarted { .. } => "game_started",
            GameEvent::BidPlaced { .. } => "bid_placed",
            GameEvent::BidResolved { .. } => "bid_resolved",
            GameEvent::Redealt { .. } => "redealt",
            GameEvent::CardsPlayed { .. } => "cards_played",
            GameEvent::Passed { .. } => "passed",
            GameEvent::TurnChanged { .. } => "turn_changed",
            GameEvent::GameFinished { .. } => "game_finished",
            GameEvent::Hint { .. } => "hint",
            GameEvent::Rejected { .. } => "rejected",
        }
    }
}

/// An event tagged with the room it belongs to, as produced by bot turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomEvent {
    pub room_id: RoomId,
    pub event: GameEvent,
}
