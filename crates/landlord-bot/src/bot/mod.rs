mod bid;
mod combos;
mod follow;
mod lead;
mod params;

pub use bid::BidPlanner;
pub use combos::{Combo, enumerate, protected_ranks};
pub use follow::FollowPlanner;
pub use lead::LeadPlanner;
pub use params::BotParams;

use landlord_core::model::hand::Hand;
use landlord_core::model::pattern::Pattern;
use landlord_core::model::seat::{Role, Seat};
use landlord_core::model::table::Table;

/// Read-only view of the table from one seat, shared by the planners.
pub struct BotContext<'a> {
    pub seat: Seat,
    pub table: &'a Table,
    pub params: &'a BotParams,
}

impl<'a> BotContext<'a> {
    pub fn new(seat: Seat, table: &'a Table, params: &'a BotParams) -> Self {
        Self {
            seat,
            table,
            params,
        }
    }

    pub fn hand(&self) -> &'a Hand {
        self.table.hand(self.seat)
    }

    pub fn role(&self) -> Option<Role> {
        self.table.role(self.seat)
    }

    pub fn is_lead(&self) -> bool {
        self.table.is_new_round()
    }

    pub fn last_pattern(&self) -> Option<&'a Pattern> {
        self.table.last_pattern()
    }

    /// True when `other` is on the same side as this seat.
    pub fn is_partner(&self, other: Seat) -> bool {
        other != self.seat
            && matches!(
                (self.role(), self.table.role(other)),
                (Some(Role::Farmer), Some(Role::Farmer))
            )
    }

    /// Fewest cards held by any opponent.
    pub fn min_opponent_cards(&self) -> usize {
        Seat::LOOP
            .iter()
            .copied()
            .filter(|&other| other != self.seat && !self.is_partner(other))
            .map(|other| self.table.hand(other).len())
            .min()
            .unwrap_or(0)
    }
}
