//! Advisory move suggestions from an outside source.
//!
//! A provider sees what the acting seat is allowed to see and answers with
//! a card list. An empty list means "pass". Suggestions are never trusted:
//! [`crate::policy::AdvisedPolicy`] re-validates them before use.

use landlord_core::model::card::Card;
use landlord_core::model::pattern::{Pattern, PatternKind};
use landlord_core::model::seat::{Role, Seat};
use landlord_core::model::table::{BidRecord, Table};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaySummary {
    pub seat: Seat,
    pub cards: Vec<Card>,
    pub kind: Option<PatternKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintRequest {
    pub seat: Seat,
    pub hand: Vec<Card>,
    pub role: Option<Role>,
    pub bidding_summary: Vec<BidRecord>,
    pub play_history_summary: Vec<PlaySummary>,
    pub bottom_cards: Vec<Card>,
    pub last_pattern: Option<Pattern>,
    pub is_lead: bool,
    pub hand_counts: [usize; 3],
}

impl HintRequest {
    pub fn from_table(table: &Table, seat: Seat) -> Self {
        let bottom_cards = if table.landlord().is_some() {
            table.bottom_cards().to_vec()
        } else {
            Vec::new()
        };
        Self {
            seat,
            hand: table.hand(seat).cards().to_vec(),
            role: table.role(seat),
            bidding_summary: table.bids().to_vec(),
            play_history_summary: table
                .play_history()
                .iter()
                .map(|record| PlaySummary {
                    seat: record.seat,
                    cards: record.cards.clone(),
                    kind: record.pattern.as_ref().map(|p| p.kind()),
                })
                .collect(),
            bottom_cards,
            last_pattern: table.last_pattern().cloned(),
            is_lead: table.is_new_round(),
            hand_counts: table.hand_counts(),
        }
    }
}

/// Wire form of a provider answer: `{"cards": [...]}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HintResponse {
    Cards { cards: Vec<Card> },
    Error { error: String },
}

impl HintResponse {
    pub fn into_result(self) -> Result<Vec<Card>, HintError> {
        match self {
            HintResponse::Cards { cards } => Ok(cards),
            HintResponse::Error { error } => Err(HintError::Provider(error)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HintError {
    #[error("no hint provider configured")]
    Unavailable,
    #[error("hint provider reported: {0}")]
    Provider(String),
    #[error("hint provider timed out after {0} ms")]
    Timeout(u64),
    #[error("hint provider I/O failed: {0}")]
    Io(String),
    #[error("malformed hint response: {0}")]
    Malformed(String),
}

pub trait HintProvider: Send {
    fn name(&self) -> &str;

    fn suggest(&mut self, request: &HintRequest) -> Result<Vec<Card>, HintError>;
}

/// Provider used when none is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHints;

impl HintProvider for NoHints {
    fn name(&self) -> &str {
        "none"
    }

    fn suggest(&mut self, _request: &HintRequest) -> Result<Vec<Card>, HintError> {
        Err(HintError::Unavailable)
    }
}
