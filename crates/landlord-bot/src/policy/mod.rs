mod advised;
mod heuristic;

pub use advised::AdvisedPolicy;
pub use heuristic::HeuristicPolicy;

use crate::bot::{BotContext, BotParams};
use landlord_core::model::card::Card;
use landlord_core::model::seat::Seat;
use landlord_core::model::table::{BidChoice, Table};

/// Context provided to policies for decision-making
pub struct PolicyContext<'a> {
    pub seat: Seat,
    pub table: &'a Table,
    pub params: &'a BotParams,
}

impl<'a> PolicyContext<'a> {
    pub fn new(seat: Seat, table: &'a Table, params: &'a BotParams) -> Self {
        Self {
            seat,
            table,
            params,
        }
    }

    pub fn bot(&self) -> BotContext<'a> {
        BotContext::new(self.seat, self.table, self.params)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayChoice {
    Play(Vec<Card>),
    Pass,
}

impl PlayChoice {
    pub fn is_pass(&self) -> bool {
        matches!(self, PlayChoice::Pass)
    }

    pub fn cards(&self) -> &[Card] {
        match self {
            PlayChoice::Play(cards) => cards,
            PlayChoice::Pass => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    Hint,
    Heuristic,
}

impl DecisionSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            DecisionSource::Hint => "hint",
            DecisionSource::Heuristic => "heuristic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub choice: PlayChoice,
    pub source: DecisionSource,
}

/// Decision interface shared by the plain heuristic bot and the
/// hint-advised chain.
pub trait Policy: Send {
    fn choose_bid(&mut self, ctx: &PolicyContext) -> BidChoice;

    /// Must return a legal move for `ctx.seat` on the current table.
    fn choose_play(&mut self, ctx: &PolicyContext) -> Decision;
}
