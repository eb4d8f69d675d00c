use landlord_core::model::card::Card;
use landlord_core::model::hand::Hand;
use landlord_core::model::pattern::{Pattern, PatternKind, RankCounts, detect};
use landlord_core::model::rank::Rank;
use std::collections::HashSet;

/// A pattern the hand can play right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combo {
    pub pattern: Pattern,
    /// Uses cards of a held bomb or the rocket without playing it whole.
    pub breaks_reserve: bool,
}

impl Combo {
    pub fn kind(&self) -> PatternKind {
        self.pattern.kind()
    }

    pub fn cards(&self) -> &[Card] {
        self.pattern.cards()
    }

    pub fn card_count(&self) -> usize {
        self.pattern.card_count()
    }

    pub fn primary(&self) -> u8 {
        self.pattern.primary_value()
    }
}

/// Ranks kept in reserve: every four-of-a-kind, plus both jokers when the
/// hand holds the rocket.
pub fn protected_ranks(counts: &RankCounts) -> Vec<Rank> {
    let mut ranks = counts.ranks_with(4);
    if counts.get(Rank::SmallJoker) == 1 && counts.get(Rank::BigJoker) == 1 {
        ranks.push(Rank::SmallJoker);
        ranks.push(Rank::BigJoker);
    }
    ranks
}

// (group width, minimum chain length)
const RUNS: [(u8, usize); 3] = [(1, 5), (2, 3), (3, 2)];

/// Every distinct playable pattern in `hand`, in no particular order.
///
/// Kicker-carrying kinds (triple+single, airplane wings, four+two) are
/// generated with their cheapest kickers only, except triples which pair
/// with every other rank.
pub fn enumerate(hand: &Hand) -> Vec<Combo> {
    let mut builder = Builder::new(hand);
    let counts = builder.counts;

    for (rank, count) in counts.present() {
        for width in 1..=count {
            builder.push(builder.take(&[(rank, width)]));
        }
    }
    if counts.get(Rank::SmallJoker) == 1 && counts.get(Rank::BigJoker) == 1 {
        builder.push(builder.take(&[(Rank::SmallJoker, 1), (Rank::BigJoker, 1)]));
    }

    let chainable: Vec<Rank> = Rank::SUITED.iter().copied().filter(|r| r.can_chain()).collect();
    let mut airplanes = Vec::new();
    for (width, min_len) in RUNS {
        for start in 0..chainable.len() {
            let mut end = start;
            while end < chainable.len() && counts.get(chainable[end]) >= width {
                end += 1;
                let body = &chainable[start..end];
                if body.len() < min_len {
                    continue;
                }
                let parts: Vec<(Rank, u8)> = body.iter().map(|&r| (r, width)).collect();
                builder.push(builder.take(&parts));
                if width == 3 {
                    airplanes.push(body.to_vec());
                }
            }
        }
    }

    for triple in counts.present().filter(|(_, c)| *c >= 3).map(|(r, _)| r) {
        for (kicker, count) in counts.present().filter(|(r, _)| *r != triple) {
            builder.push(builder.take(&[(triple, 3), (kicker, 1)]));
            if count >= 2 {
                builder.push(builder.take(&[(triple, 3), (kicker, 2)]));
            }
        }
    }

    for body in &airplanes {
        let mut parts: Vec<(Rank, u8)> = body.iter().map(|&r| (r, 3)).collect();
        if let Some(wings) = builder.single_kickers(body, body.len()) {
            let mut cards = builder.take(&parts);
            cards.extend(wings);
            builder.push(cards);
        }
        if let Some(pairs) = builder.pair_kickers(body, body.len()) {
            parts.extend(pairs.into_iter().map(|r| (r, 2)));
            builder.push(builder.take(&parts));
        }
    }

    for quad in counts.ranks_with(4) {
        if let Some(singles) = builder.single_kickers(&[quad], 2) {
            let mut cards = builder.take(&[(quad, 4)]);
            cards.extend(singles);
            builder.push(cards);
        }
        if let Some(pairs) = builder.pair_kickers(&[quad], 2) {
            let mut parts = vec![(quad, 4)];
            parts.extend(pairs.into_iter().map(|r| (r, 2)));
            builder.push(builder.take(&parts));
        }
    }

    builder.out
}

struct Builder<'a> {
    hand: &'a Hand,
    counts: RankCounts,
    reserved: Vec<Rank>,
    seen: HashSet<Vec<Card>>,
    out: Vec<Combo>,
}

impl<'a> Builder<'a> {
    fn new(hand: &'a Hand) -> Self {
        let counts = hand.rank_counts();
        Self {
            hand,
            counts,
            reserved: protected_ranks(&counts),
            seen: HashSet::new(),
            out: Vec::new(),
        }
    }

    fn take(&self, parts: &[(Rank, u8)]) -> Vec<Card> {
        parts
            .iter()
            .flat_map(|&(rank, n)| {
                self.hand
                    .iter()
                    .filter(move |card| card.rank == rank)
                    .take(n as usize)
                    .copied()
            })
            .collect()
    }

    fn push(&mut self, cards: Vec<Card>) {
        let pattern = detect(&cards);
        if !pattern.is_valid() || !self.seen.insert(pattern.cards().to_vec()) {
            return;
        }
        let breaks_reserve = !pattern.kind().is_bomb_like()
            && pattern
                .cards()
                .iter()
                .any(|card| self.reserved.contains(&card.rank));
        self.out.push(Combo {
            pattern,
            breaks_reserve,
        });
    }

    /// Cheapest `n` single kickers outside `body`, never taken from a
    /// reserved rank. Loose cards are preferred over splitting pairs.
    fn single_kickers(&self, body: &[Rank], n: usize) -> Option<Vec<Card>> {
        let mut pool: Vec<Card> = self
            .hand
            .iter()
            .copied()
            .filter(|card| !body.contains(&card.rank) && !self.reserved.contains(&card.rank))
            .collect();
        pool.sort_by_key(|card| (self.counts.get(card.rank) > 1, card.value()));
        if pool.len() < n {
            return None;
        }
        pool.truncate(n);
        Some(pool)
    }

    fn pair_kickers(&self, body: &[Rank], n: usize) -> Option<Vec<Rank>> {
        let ranks: Vec<Rank> = self
            .counts
            .present()
            .filter(|(rank, count)| {
                (2..=3).contains(count) && !body.contains(rank) && !self.reserved.contains(rank)
            })
            .map(|(rank, _)| rank)
            .take(n)
            .collect();
        (ranks.len() == n).then_some(ranks)
    }
}
