use super::BotContext;
use super::combos::{Combo, enumerate};
use landlord_core::model::card::Card;
use landlord_core::model::hand::Hand;
use landlord_core::model::pattern::{PatternKind, detect};
use landlord_core::model::rank::Rank;
use std::cmp::Reverse;

/// Chain kinds tried first when opening a round, strongest shedding first.
const CHAIN_ORDER: [PatternKind; 4] = [
    PatternKind::AirplaneWings,
    PatternKind::Airplane,
    PatternKind::ConsecutivePairs,
    PatternKind::Straight,
];

pub struct LeadPlanner;

impl LeadPlanner {
    /// Opening move for a new round. Never empty while the hand holds cards.
    pub fn choose(ctx: &BotContext<'_>) -> Vec<Card> {
        Self::choose_for(ctx.hand())
    }

    pub fn choose_for(hand: &Hand) -> Vec<Card> {
        let whole = detect(hand.cards());
        if whole.is_valid() {
            return whole.cards().to_vec();
        }

        let combos = enumerate(hand);
        match Self::pick(hand, &combos) {
            Some(combo) => combo.cards().to_vec(),
            None => hand.cards().first().map(|&card| vec![card]).unwrap_or_default(),
        }
    }

    fn pick<'c>(hand: &Hand, combos: &'c [Combo]) -> Option<&'c Combo> {
        let safe: Vec<&Combo> = combos
            .iter()
            .filter(|c| !c.breaks_reserve && !c.kind().is_bomb_like())
            .collect();

        for kind in CHAIN_ORDER {
            let best = safe
                .iter()
                .copied()
                .filter(|c| c.kind() == kind)
                .max_by_key(|c| (c.card_count(), Reverse(c.primary())));
            if let Some(best) = best {
                return Some(best);
            }
        }

        if let Some(triple) = Self::pick_triple(hand, &safe) {
            return Some(triple);
        }

        let counts = hand.rank_counts();
        let smallest = |kind: PatternKind| {
            safe.iter()
                .filter(|c| c.kind() == kind)
                .min_by_key(|c| {
                    let split = Rank::from_value(c.primary())
                        .map(|rank| counts.get(rank) as usize > c.card_count())
                        .unwrap_or(false);
                    (split, c.primary())
                })
                .copied()
        };
        if let Some(pair) = smallest(PatternKind::Pair) {
            return Some(pair);
        }
        if let Some(single) = smallest(PatternKind::Single) {
            return Some(single);
        }

        // Only reserved cards remain.
        combos
            .iter()
            .filter(|c| c.kind().is_bomb_like())
            .min_by_key(|c| (c.kind() == PatternKind::Rocket, c.primary()))
            .or_else(|| combos.iter().min_by_key(|c| c.primary()))
    }

    /// Triple-based opener. The hand's largest triple is held back unless it
    /// is the only one or playing it leaves a single finishing pattern.
    fn pick_triple<'c>(hand: &Hand, safe: &[&'c Combo]) -> Option<&'c Combo> {
        let triples: Vec<&Combo> = safe
            .iter()
            .copied()
            .filter(|c| {
                matches!(
                    c.kind(),
                    PatternKind::Triple | PatternKind::TripleSingle | PatternKind::TriplePair
                )
            })
            .collect();
        let largest = triples.iter().map(|c| c.primary()).max()?;
        let smallest = triples.iter().map(|c| c.primary()).min()?;

        let counts = hand.rank_counts();
        let kicker_cost = |combo: &Combo| -> u32 {
            let kicker = combo
                .cards()
                .iter()
                .find(|card| card.value() != combo.primary());
            match (combo.kind(), kicker) {
                (PatternKind::Triple, _) | (_, None) => 60,
                (kind, Some(card)) => {
                    let held = counts.get(card.rank) as usize;
                    let width = if kind == PatternKind::TriplePair { 2 } else { 1 };
                    let mut cost = card.value() as u32;
                    if kind == PatternKind::TriplePair {
                        cost += 20;
                    }
                    if held > width {
                        cost += 40;
                    }
                    if card.rank >= Rank::Two {
                        cost += 100;
                    }
                    cost
                }
            }
        };

        triples
            .into_iter()
            .filter(|c| c.primary() != largest || largest == smallest || leaves_finisher(hand, *c))
            .min_by_key(|c| (c.primary(), kicker_cost(*c)))
    }
}

/// Whether the cards left after `combo` form one legal pattern.
fn leaves_finisher(hand: &Hand, combo: &Combo) -> bool {
    let mut rest = hand.clone();
    if !rest.remove_all(combo.cards()) {
        return false;
    }
    rest.is_empty() || detect(rest.cards()).is_valid()
}
