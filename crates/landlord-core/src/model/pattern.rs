//! Card combination detection.
//!
//! [`detect`] is total: every card multiset maps to exactly one [`Pattern`],
//! with [`PatternKind::Invalid`] standing in for "no rule matched". Rules are
//! tried in a fixed precedence order (rocket first, single last).

use crate::model::card::Card;
use crate::model::rank::Rank;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Single,
    Pair,
    Triple,
    TripleSingle,
    TriplePair,
    Straight,
    ConsecutivePairs,
    Airplane,
    AirplaneWings,
    FourTwo,
    Bomb,
    Rocket,
    Invalid,
}

impl PatternKind {
    pub const fn is_bomb_like(self) -> bool {
        matches!(self, PatternKind::Bomb | PatternKind::Rocket)
    }

    pub const fn is_run(self) -> bool {
        matches!(
            self,
            PatternKind::Straight
                | PatternKind::ConsecutivePairs
                | PatternKind::Airplane
                | PatternKind::AirplaneWings
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PatternKind::Single => "single",
            PatternKind::Pair => "pair",
            PatternKind::Triple => "triple",
            PatternKind::TripleSingle => "triple_single",
            PatternKind::TriplePair => "triple_pair",
            PatternKind::Straight => "straight",
            PatternKind::ConsecutivePairs => "consecutive_pairs",
            PatternKind::Airplane => "airplane",
            PatternKind::AirplaneWings => "airplane_wings",
            PatternKind::FourTwo => "four_two",
            PatternKind::Bomb => "bomb",
            PatternKind::Rocket => "rocket",
            PatternKind::Invalid => "invalid",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified card set. Derived data: built only by [`detect`] and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    kind: PatternKind,
    primary: u8,
    length: usize,
    cards: Vec<Card>,
}

impl Pattern {
    fn new(kind: PatternKind, primary: u8, length: usize, cards: &[Card]) -> Self {
        let mut cards = cards.to_vec();
        cards.sort();
        Self {
            kind,
            primary,
            length,
            cards,
        }
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Comparison rank: the triple's/quad's rank for grouped kinds, the top
    /// rank for runs, the card rank otherwise.
    pub fn primary_value(&self) -> u8 {
        self.primary
    }

    /// Run length for run kinds (ranks, pairs or triples in the chain);
    /// 1 for every other kind.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn is_valid(&self) -> bool {
        self.kind != PatternKind::Invalid
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Rank::from_value(self.primary) {
            Some(rank) if self.kind.is_run() => {
                write!(f, "{}(top {}, x{})", self.kind, rank, self.length)
            }
            Some(rank) => write!(f, "{}({})", self.kind, rank),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Per-rank card counts indexed by rank value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankCounts {
    counts: [u8; 18],
}

impl Default for RankCounts {
    fn default() -> Self {
        Self { counts: [0; 18] }
    }
}

impl RankCounts {
    pub fn of(cards: &[Card]) -> Self {
        let mut counts = Self::default();
        for card in cards {
            counts.counts[card.value() as usize] += 1;
        }
        counts
    }

    pub fn get(&self, rank: Rank) -> u8 {
        self.counts[rank.value() as usize]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|&c| c as usize).sum()
    }

    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Ranks present at least once, weakest first.
    pub fn present(&self) -> impl Iterator<Item = (Rank, u8)> + '_ {
        Rank::ORDERED
            .iter()
            .copied()
            .map(|rank| (rank, self.get(rank)))
            .filter(|(_, count)| *count > 0)
    }

    pub fn ranks_with(&self, count: u8) -> Vec<Rank> {
        self.present()
            .filter(|(_, c)| *c == count)
            .map(|(rank, _)| rank)
            .collect()
    }

    fn without(&self, ranks: &[Rank]) -> Self {
        let mut next = *self;
        for rank in ranks {
            next.counts[rank.value() as usize] = 0;
        }
        next
    }
}

type Shape = (PatternKind, u8, usize);
type Detector = fn(usize, &RankCounts) -> Option<Shape>;

const DETECTORS: [Detector; 12] = [
    rocket,
    bomb,
    straight,
    consecutive_pairs,
    airplane,
    airplane_wings,
    four_two,
    triple_pair,
    triple_single,
    triple,
    pair,
    single,
];

pub fn detect(cards: &[Card]) -> Pattern {
    let counts = RankCounts::of(cards);
    let n = cards.len();
    match DETECTORS.iter().find_map(|rule| rule(n, &counts)) {
        Some((kind, primary, length)) => Pattern::new(kind, primary, length, cards),
        None => Pattern::new(PatternKind::Invalid, 0, 0, cards),
    }
}

/// Top value of `ranks` when they form an ascending chain of chainable ranks
/// with no gaps.
fn chain_top(ranks: &[Rank]) -> Option<u8> {
    if ranks.iter().any(|rank| !rank.can_chain()) {
        return None;
    }
    let connected = ranks
        .windows(2)
        .all(|pair| pair[1].value() == pair[0].value() + 1);
    if connected { ranks.last().map(|r| r.value()) } else { None }
}

/// All present ranks share `width` copies and chain into a run of at least
/// `min_len` ranks.
fn uniform_run(n: usize, counts: &RankCounts, width: u8, min_len: usize) -> Option<(u8, usize)> {
    let width_usize = width as usize;
    if n < min_len * width_usize || n % width_usize != 0 {
        return None;
    }
    let ranks = counts.ranks_with(width);
    if ranks.len() * width_usize != n {
        return None;
    }
    chain_top(&ranks).map(|top| (top, ranks.len()))
}

fn rocket(n: usize, counts: &RankCounts) -> Option<Shape> {
    (n == 2 && counts.get(Rank::SmallJoker) == 1 && counts.get(Rank::BigJoker) == 1)
        .then_some((PatternKind::Rocket, Rank::BigJoker.value(), 1))
}

fn bomb(n: usize, counts: &RankCounts) -> Option<Shape> {
    if n != 4 {
        return None;
    }
    counts
        .ranks_with(4)
        .first()
        .map(|rank| (PatternKind::Bomb, rank.value(), 1))
}

fn straight(n: usize, counts: &RankCounts) -> Option<Shape> {
    uniform_run(n, counts, 1, 5).map(|(top, len)| (PatternKind::Straight, top, len))
}

fn consecutive_pairs(n: usize, counts: &RankCounts) -> Option<Shape> {
    uniform_run(n, counts, 2, 3).map(|(top, len)| (PatternKind::ConsecutivePairs, top, len))
}

fn airplane(n: usize, counts: &RankCounts) -> Option<Shape> {
    uniform_run(n, counts, 3, 2).map(|(top, len)| (PatternKind::Airplane, top, len))
}

fn airplane_wings(n: usize, counts: &RankCounts) -> Option<Shape> {
    let mut layouts = Vec::with_capacity(2);
    if n % 4 == 0 {
        layouts.push((n / 4, 1u8));
    }
    if n % 5 == 0 {
        layouts.push((n / 5, 2u8));
    }

    let triples: Vec<Rank> = counts
        .ranks_with(3)
        .into_iter()
        .filter(|rank| rank.can_chain())
        .collect();

    for (len, wing_width) in layouts {
        if len < 2 || triples.len() < len {
            continue;
        }
        // Highest qualifying body wins when several decompositions exist.
        for end in (len - 1..triples.len()).rev() {
            let body = &triples[end + 1 - len..=end];
            let Some(top) = chain_top(body) else {
                continue;
            };
            let wings = counts.without(body);
            if wings_fit(&wings, len, wing_width) {
                return Some((PatternKind::AirplaneWings, top, len));
            }
        }
    }
    None
}

/// Wings never come from a four-of-a-kind; single wings may not be the rocket
/// and pair wings must be exact pairs.
fn wings_fit(wings: &RankCounts, len: usize, width: u8) -> bool {
    if wings.total() != len * width as usize {
        return false;
    }
    if wings.present().any(|(_, count)| count == 4) {
        return false;
    }
    match width {
        1 => !(wings.get(Rank::SmallJoker) == 1 && wings.get(Rank::BigJoker) == 1),
        _ => wings.present().all(|(_, count)| count == 2),
    }
}

fn four_two(n: usize, counts: &RankCounts) -> Option<Shape> {
    if n != 6 && n != 8 {
        return None;
    }
    let quads = counts.ranks_with(4);
    let [quad] = quads.as_slice() else {
        return None;
    };
    let kickers = counts.without(&[*quad]);
    let fits = if n == 6 {
        !(kickers.get(Rank::SmallJoker) == 1 && kickers.get(Rank::BigJoker) == 1)
    } else {
        kickers.present().all(|(_, count)| count == 2) && kickers.distinct() == 2
    };
    fits.then_some((PatternKind::FourTwo, quad.value(), 1))
}

fn triple_with(n: usize, counts: &RankCounts, kicker: u8, kind: PatternKind) -> Option<Shape> {
    if n != 3 + kicker as usize || counts.distinct() != 2 {
        return None;
    }
    let triple = counts.ranks_with(3);
    let kick = counts.ranks_with(kicker);
    match (triple.as_slice(), kick.as_slice()) {
        ([rank], [_]) => Some((kind, rank.value(), 1)),
        _ => None,
    }
}

fn triple_pair(n: usize, counts: &RankCounts) -> Option<Shape> {
    triple_with(n, counts, 2, PatternKind::TriplePair)
}

fn triple_single(n: usize, counts: &RankCounts) -> Option<Shape> {
    triple_with(n, counts, 1, PatternKind::TripleSingle)
}

fn same_rank(n: usize, counts: &RankCounts, size: usize, kind: PatternKind) -> Option<Shape> {
    if n != size || counts.distinct() != 1 {
        return None;
    }
    counts.present().next().map(|(rank, _)| (kind, rank.value(), 1))
}

fn triple(n: usize, counts: &RankCounts) -> Option<Shape> {
    same_rank(n, counts, 3, PatternKind::Triple)
}

fn pair(n: usize, counts: &RankCounts) -> Option<Shape> {
    same_rank(n, counts, 2, PatternKind::Pair)
}

fn single(n: usize, counts: &RankCounts) -> Option<Shape> {
    same_rank(n, counts, 1, PatternKind::Single)
}

#[cfg(test)]
mod tests {
    use super::{PatternKind, RankCounts, detect};
    use crate::model::card::{Card, parse_cards};
    use crate::model::rank::Rank;

    fn kind_of(list: &str) -> PatternKind {
        detect(&parse_cards(list).unwrap()).kind()
    }

    #[test]
    fn empty_set_is_invalid() {
        assert_eq!(detect(&[]).kind(), PatternKind::Invalid);
    }

    #[test]
    fn singles_pairs_and_triples() {
        let single = detect(&parse_cards("BJ").unwrap());
        assert_eq!(single.kind(), PatternKind::Single);
        assert_eq!(single.primary_value(), 17);

        let pair = detect(&parse_cards("2S 2H").unwrap());
        assert_eq!(pair.kind(), PatternKind::Pair);
        assert_eq!(pair.primary_value(), 15);

        assert_eq!(kind_of("7S 7H 7D"), PatternKind::Triple);
        assert_eq!(kind_of("SJ BJ"), PatternKind::Rocket);
        assert_eq!(kind_of("7S 8H"), PatternKind::Invalid);
    }

    #[test]
    fn four_threes_form_a_bomb_of_value_three() {
        let bomb = detect(&parse_cards("3S 3H 3C 3D").unwrap());
        assert_eq!(bomb.kind(), PatternKind::Bomb);
        assert_eq!(bomb.primary_value(), 3);
        assert_eq!(bomb.length(), 1);
    }

    #[test]
    fn straight_of_five_reports_top_value_and_length() {
        let straight = detect(&parse_cards("5S 6S 7S 8S 9S").unwrap());
        assert_eq!(straight.kind(), PatternKind::Straight);
        assert_eq!(straight.primary_value(), 9);
        assert_eq!(straight.length(), 5);
    }

    #[test]
    fn straights_exclude_twos_and_jokers() {
        assert_eq!(kind_of("10S JH QD KC AS"), PatternKind::Straight);
        assert_eq!(kind_of("JH QD KC AS 2S"), PatternKind::Invalid);
        assert_eq!(kind_of("3S 4S 5S 6S"), PatternKind::Invalid);
        assert_eq!(kind_of("3S 4S 5S 6S 8S"), PatternKind::Invalid);
    }

    #[test]
    fn consecutive_pairs_need_three_pairs() {
        let run = detect(&parse_cards("3S 3H 4S 4H 5C 5D").unwrap());
        assert_eq!(run.kind(), PatternKind::ConsecutivePairs);
        assert_eq!(run.length(), 3);
        assert_eq!(run.primary_value(), 5);
        assert_eq!(kind_of("3S 3H 4S 4H"), PatternKind::Invalid);
        assert_eq!(kind_of("KS KH AS AH 2S 2H"), PatternKind::Invalid);
    }

    #[test]
    fn airplane_and_wings() {
        let plane = detect(&parse_cards("3S 3H 3C 4S 4H 4C").unwrap());
        assert_eq!(plane.kind(), PatternKind::Airplane);
        assert_eq!(plane.length(), 2);
        assert_eq!(plane.primary_value(), 4);

        let singles = detect(&parse_cards("3S 3H 3C 4S 4H 4C 9D KH").unwrap());
        assert_eq!(singles.kind(), PatternKind::AirplaneWings);
        assert_eq!(singles.length(), 2);
        assert_eq!(singles.primary_value(), 4);

        let pairs = detect(&parse_cards("3S 3H 3C 4S 4H 4C 9D 9H KH KS").unwrap());
        assert_eq!(pairs.kind(), PatternKind::AirplaneWings);
        assert_eq!(pairs.card_count(), 10);

        assert_eq!(kind_of("AS AH AC 2S 2H 2C 3D 4D"), PatternKind::Invalid);
    }

    #[test]
    fn wings_may_not_break_a_four_of_a_kind() {
        assert_eq!(
            kind_of("3S 3H 3C 4S 4H 4C 9D 9H 9S 9C"),
            PatternKind::Invalid
        );
        assert_eq!(kind_of("3S 3H 3C 4S 4H 4C SJ BJ"), PatternKind::Invalid);
    }

    #[test]
    fn airplane_wings_prefers_highest_body() {
        let plane = detect(&parse_cards("5S 5H 5C 6S 6H 6C 7S 7H 7C 9S 9H 9C").unwrap());
        assert_eq!(plane.kind(), PatternKind::AirplaneWings);
        assert_eq!(plane.primary_value(), 7);
        assert_eq!(plane.length(), 3);
    }

    #[test]
    fn four_with_two_singles_or_two_pairs() {
        let singles = detect(&parse_cards("9S 9H 9C 9D 3C 4C").unwrap());
        assert_eq!(singles.kind(), PatternKind::FourTwo);
        assert_eq!(singles.primary_value(), 9);

        let pairs = detect(&parse_cards("9S 9H 9C 9D 3C 3D 4C 4D").unwrap());
        assert_eq!(pairs.kind(), PatternKind::FourTwo);
        assert_eq!(pairs.card_count(), 8);

        assert_eq!(kind_of("9S 9H 9C 9D SJ BJ"), PatternKind::Invalid);
        assert_eq!(kind_of("9S 9H 9C 9D 3C 3D 3H 4D"), PatternKind::Invalid);
    }

    #[test]
    fn triple_with_kickers() {
        let ts = detect(&parse_cards("6S 6H 6C 9S").unwrap());
        assert_eq!(ts.kind(), PatternKind::TripleSingle);
        assert_eq!(ts.primary_value(), 6);
        let tp = detect(&parse_cards("7S 7H 7C 9S 9D").unwrap());
        assert_eq!(tp.kind(), PatternKind::TriplePair);
        assert_eq!(tp.primary_value(), 7);
        assert_eq!(kind_of("7S 7H 7C 9S 10D"), PatternKind::Invalid);
    }

    #[test]
    fn one_card_more_or_less_never_keeps_the_same_shape() {
        let fixtures = [
            "5S 6S 7S 8S 9S",
            "3S 3H 4S 4H 5C 5D",
            "3S 3H 3C 4S 4H 4C",
            "3S 3H 3C 4S 4H 4C 9D KH",
            "9S 9H 9C 9D 3C 4C",
            "7S 7H 7C 9S 9D",
            "6S 6H 6C 9S",
            "8S 8H 8C",
            "8S 8H",
            "8S 8H 8C 8D",
        ];
        let extras = parse_cards("JD QD 2D SJ").unwrap();
        for fixture in fixtures {
            let cards = parse_cards(fixture).unwrap();
            let base = detect(&cards);
            assert!(base.is_valid(), "{fixture} should be legal");

            for skip in 0..cards.len() {
                let fewer: Vec<Card> = cards
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != skip)
                    .map(|(_, c)| *c)
                    .collect();
                let shrunk = detect(&fewer);
                assert!(
                    !(shrunk.kind() == base.kind() && shrunk.length() == base.length()),
                    "{fixture} minus one card kept shape {shrunk}"
                );
            }

            for extra in &extras {
                if cards.iter().any(|c| c.rank == extra.rank) {
                    continue;
                }
                let mut more = cards.clone();
                more.push(*extra);
                let grown = detect(&more);
                assert!(
                    !(grown.kind() == base.kind() && grown.length() == base.length()),
                    "{fixture} plus {extra} kept shape {grown}"
                );
            }
        }
    }

    #[test]
    fn rank_counts_track_each_rank() {
        let counts = RankCounts::of(&parse_cards("3S 3H BJ").unwrap());
        assert_eq!(counts.get(Rank::Three), 2);
        assert_eq!(counts.get(Rank::BigJoker), 1);
        assert_eq!(counts.distinct(), 2);
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.ranks_with(2), vec![Rank::Three]);
    }
}
