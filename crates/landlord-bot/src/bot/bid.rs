use super::{BotContext, BotParams};
use landlord_core::model::hand::Hand;
use landlord_core::model::rank::Rank;
use landlord_core::model::table::BidChoice;

pub struct BidPlanner;

impl BidPlanner {
    pub fn choose(ctx: &BotContext<'_>) -> BidChoice {
        if Self::strength(ctx.hand(), ctx.params) >= ctx.params.claim_threshold {
            BidChoice::Claim
        } else {
            BidChoice::Decline
        }
    }

    /// Rough hand strength from jokers, twos, aces and bombs.
    pub fn strength(hand: &Hand, params: &BotParams) -> i32 {
        let counts = hand.rank_counts();
        let small = counts.get(Rank::SmallJoker) as i32;
        let big = counts.get(Rank::BigJoker) as i32;

        let mut score = big * params.big_joker_weight + small * params.small_joker_weight;
        if small == 1 && big == 1 {
            score += params.rocket_bonus;
        }
        score += counts.get(Rank::Two) as i32 * params.two_weight;
        score += counts.get(Rank::Ace) as i32 * params.ace_weight;
        score += counts.ranks_with(4).len() as i32 * params.bomb_weight;
        score
    }
}
