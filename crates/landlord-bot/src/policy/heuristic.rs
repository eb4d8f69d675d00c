use super::{Decision, DecisionSource, PlayChoice, Policy, PolicyContext};
use crate::bot::{BidPlanner, FollowPlanner, LeadPlanner};
use landlord_core::model::card::format_cards;
use landlord_core::model::table::BidChoice;
use tracing::{Level, event};

/// Deterministic planners behind the [`Policy`] trait.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicPolicy;

impl HeuristicPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl Policy for HeuristicPolicy {
    fn choose_bid(&mut self, ctx: &PolicyContext) -> BidChoice {
        let bot = ctx.bot();
        let choice = BidPlanner::choose(&bot);
        event!(
            target: "landlord_bot::bid",
            Level::DEBUG,
            seat = %ctx.seat,
            strength = BidPlanner::strength(bot.hand(), ctx.params),
            threshold = ctx.params.claim_threshold,
            choice = ?choice
        );
        choice
    }

    fn choose_play(&mut self, ctx: &PolicyContext) -> Decision {
        let bot = ctx.bot();
        let (choice, reason) = if bot.is_lead() {
            (PlayChoice::Play(LeadPlanner::choose(&bot)), "lead")
        } else {
            match FollowPlanner::choose(&bot) {
                Some(cards) => (PlayChoice::Play(cards), "beat"),
                None => (PlayChoice::Pass, "no_beat_or_partner"),
            }
        };
        log_play_decision(ctx, &choice, reason);
        Decision {
            choice,
            source: DecisionSource::Heuristic,
        }
    }
}

fn log_play_decision(ctx: &PolicyContext, choice: &PlayChoice, reason: &str) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    let role = ctx.table.role(ctx.seat).map(|r| r.as_str()).unwrap_or("none");
    event!(
        target: "landlord_bot::play",
        Level::DEBUG,
        seat = %ctx.seat,
        role,
        hand_size = ctx.table.hand(ctx.seat).len(),
        reason,
        cards = %format_cards(choice.cards())
    );
}
