use super::{Decision, DecisionSource, HeuristicPolicy, PlayChoice, Policy, PolicyContext};
use crate::hint::{HintError, HintProvider, HintRequest};
use landlord_core::model::card::{Card, format_cards};
use landlord_core::model::table::BidChoice;
use landlord_core::model::validate::{PlayError, validate, validate_pass};
use tracing::{Level, event};

/// Hint provider first, heuristics second. A suggestion is used only if it
/// passes the same validation a human move would.
pub struct AdvisedPolicy {
    provider: Box<dyn HintProvider>,
    fallback: HeuristicPolicy,
}

impl AdvisedPolicy {
    pub fn new(provider: Box<dyn HintProvider>) -> Self {
        Self {
            provider,
            fallback: HeuristicPolicy::new(),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    fn accept(ctx: &PolicyContext, cards: &[Card]) -> Result<PlayChoice, PlayError> {
        let table = ctx.table;
        let is_lead = table.is_new_round();
        if cards.is_empty() {
            validate_pass(is_lead)?;
            return Ok(PlayChoice::Pass);
        }
        let pattern = validate(table.hand(ctx.seat), cards, table.last_pattern(), is_lead)?;
        Ok(PlayChoice::Play(pattern.cards().to_vec()))
    }
}

impl Policy for AdvisedPolicy {
    fn choose_bid(&mut self, ctx: &PolicyContext) -> BidChoice {
        self.fallback.choose_bid(ctx)
    }

    fn choose_play(&mut self, ctx: &PolicyContext) -> Decision {
        let request = HintRequest::from_table(ctx.table, ctx.seat);
        match self.provider.suggest(&request) {
            Ok(cards) => match Self::accept(ctx, &cards) {
                Ok(choice) => {
                    event!(
                        target: "landlord_bot::hint",
                        Level::DEBUG,
                        seat = %ctx.seat,
                        provider = self.provider.name(),
                        cards = %format_cards(choice.cards())
                    );
                    return Decision {
                        choice,
                        source: DecisionSource::Hint,
                    };
                }
                Err(err) => {
                    event!(
                        target: "landlord_bot::hint",
                        Level::WARN,
                        seat = %ctx.seat,
                        provider = self.provider.name(),
                        suggestion = %format_cards(&cards),
                        error = %err,
                        "discarding hint suggestion"
                    );
                }
            },
            Err(HintError::Unavailable) => {}
            Err(err) => {
                event!(
                    target: "landlord_bot::hint",
                    Level::WARN,
                    seat = %ctx.seat,
                    provider = self.provider.name(),
                    error = %err,
                    "hint provider failed"
                );
            }
        }
        self.fallback.choose_play(ctx)
    }
}
