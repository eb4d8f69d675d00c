use super::BotContext;
use super::combos::{Combo, enumerate};
use landlord_core::model::card::Card;
use landlord_core::model::compare::can_beat;
use landlord_core::model::hand::Hand;
use landlord_core::model::pattern::{Pattern, PatternKind, detect};

pub struct FollowPlanner;

impl FollowPlanner {
    /// Cheapest beat for the pattern on the table, or `None` to pass.
    pub fn choose(ctx: &BotContext<'_>) -> Option<Vec<Card>> {
        let last = ctx.last_pattern()?;
        let hand = ctx.hand();

        let whole = detect(hand.cards());
        if whole.is_valid() && can_beat(&whole, last) {
            return Some(whole.cards().to_vec());
        }

        // Leave a partner's winning pattern alone.
        if let Some(leader) = ctx.table.last_player() {
            if ctx.is_partner(leader) {
                return None;
            }
        }

        Self::cheapest_beat(hand, last).map(|combo| combo.cards().to_vec())
    }

    pub fn cheapest_beat(hand: &Hand, last: &Pattern) -> Option<Combo> {
        enumerate(hand)
            .into_iter()
            .filter(|combo| can_beat(&combo.pattern, last))
            .min_by_key(|combo| (tier(combo), combo.primary(), combo.card_count()))
    }
}

/// Spend order: plain beats, beats that split a reserve, bombs, rocket.
fn tier(combo: &Combo) -> u8 {
    match combo.kind() {
        PatternKind::Rocket => 3,
        PatternKind::Bomb => 2,
        _ if combo.breaks_reserve => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::FollowPlanner;
    use crate::bot::{BotContext, BotParams};
    use landlord_core::model::card::{format_cards, parse_cards};
    use landlord_core::model::hand::Hand;
    use landlord_core::model::pattern::detect;
    use landlord_core::model::seat::Seat;
    use landlord_core::model::table::Table;
    use landlord_core::game::snapshot::{SeatSnapshot, TableSnapshot};
    use landlord_core::model::seat::Role;
    use landlord_core::model::table::Phase;

    fn beat(hand: &str, last: &str) -> Option<String> {
        let hand = Hand::with_cards(parse_cards(hand).unwrap());
        let last = detect(&parse_cards(last).unwrap());
        FollowPlanner::cheapest_beat(&hand, &last).map(|c| format_cards(c.cards()))
    }

    /// Seat::First is landlord; `leader` just played `last` and the next
    /// seat is to act.
    fn table_after(hands: [&str; 3], leader: Seat, last: &str) -> Table {
        let last = detect(&parse_cards(last).unwrap());
        let per_seat = Seat::LOOP
            .iter()
            .map(|&seat| {
                let hand = parse_cards(hands[seat.index()]).unwrap();
                SeatSnapshot {
                    seat,
                    hand_count: hand.len(),
                    hand,
                    role: Some(if seat == Seat::First {
                        Role::Landlord
                    } else {
                        Role::Farmer
                    }),
                    online: true,
                    is_bot: true,
                }
            })
            .collect();
        TableSnapshot {
            phase: Phase::Playing,
            current_seat: leader.next(),
            last_pattern: Some(last),
            pass_streak: 0,
            is_new_round: false,
            landlord_seat: Some(Seat::First),
            bottom_cards: Vec::new(),
            per_seat,
            saved_at: 0,
            version: 0,
            first_bidder: None,
            bids: Vec::new(),
            play_history: Vec::new(),
        }
        .restore()
        .unwrap()
    }

    #[test]
    fn picks_smallest_same_shape_beat() {
        assert_eq!(beat("4S 9H 9D KC 2S", "8C").as_deref(), Some("9D"));
        assert_eq!(beat("4S 4H 9H 9D KC", "5S 5H").as_deref(), Some("9D 9H"));
    }

    #[test]
    fn keeps_bombs_until_nothing_else_works() {
        assert_eq!(beat("7S 7H 7D 7C AS", "KH").as_deref(), Some("AS"));
        assert_eq!(beat("7S 7H 7D 7C 3S", "KH").as_deref(), Some("7C 7D 7H 7S"));
        assert_eq!(beat("3S SJ BJ", "2H").as_deref(), Some("SJ"));
        assert_eq!(beat("3S SJ BJ", "AS AH").as_deref(), Some("SJ BJ"));
        assert_eq!(beat("3S 4D", "2H"), None);
    }

    #[test]
    fn farmer_does_not_beat_partner() {
        let table = table_after(["3S 4S 5S", "JD 10C", "AH KD QS"], Seat::Second, "9C");
        let params = BotParams::default();
        let ctx = BotContext::new(Seat::Third, &table, &params);
        assert_eq!(FollowPlanner::choose(&ctx), None);
    }

    #[test]
    fn farmer_beats_partner_when_it_empties_the_hand() {
        let table = table_after(["3S 4S 5S", "JD 10C", "AH"], Seat::Second, "9C");
        let params = BotParams::default();
        let ctx = BotContext::new(Seat::Third, &table, &params);
        assert_eq!(FollowPlanner::choose(&ctx), Some(parse_cards("AH").unwrap()));
    }

    #[test]
    fn farmer_beats_landlord() {
        let table = table_after(["3S 4S 6S", "9C JD", "AH KD QS"], Seat::First, "5S");
        let params = BotParams::default();
        let ctx = BotContext::new(Seat::Second, &table, &params);
        assert_eq!(FollowPlanner::choose(&ctx), Some(parse_cards("9C").unwrap()));
    }
}
