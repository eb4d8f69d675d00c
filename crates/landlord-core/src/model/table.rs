use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::pattern::Pattern;
use crate::model::score::{Settlement, settle};
use crate::model::seat::{Role, Seat};
use crate::model::validate::{PlayError, validate, validate_pass};
use core::fmt;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::array;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Waiting,
    Dealing,
    Bidding,
    Playing,
    Finished,
}

impl Phase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Waiting => "waiting",
            Phase::Dealing => "dealing",
            Phase::Bidding => "bidding",
            Phase::Playing => "playing",
            Phase::Finished => "finished",
        }
    }

    /// Phases in which some seat owes the table an action.
    pub const fn awaits_action(self) -> bool {
        matches!(self, Phase::Bidding | Phase::Playing)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidChoice {
    Claim,
    Decline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidRecord {
    pub seat: Seat,
    pub choice: BidChoice,
}

/// One entry of the play log. Passes carry no cards and no pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRecord {
    pub seat: Seat,
    pub cards: Vec<Card>,
    pub pattern: Option<Pattern>,
    pub at_ms: u64,
}

impl PlayRecord {
    pub fn is_pass(&self) -> bool {
        self.pattern.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatState {
    pub(crate) hand: Hand,
    pub(crate) role: Option<Role>,
    pub(crate) online: bool,
    pub(crate) is_bot: bool,
}

impl SeatState {
    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn is_bot(&self) -> bool {
        self.is_bot
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TableError {
    #[error(transparent)]
    Play(#[from] PlayError),
    #[error("expected {expected} to act but got {actual}")]
    OutOfTurn { expected: Seat, actual: Seat },
    #[error("bidding has already been resolved")]
    BiddingAlreadyResolved,
    #[error("no game is in progress")]
    GameNotInProgress,
    #[error("a game is already under way")]
    GameInProgress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidOutcome {
    /// Bidding continues with `next`.
    Next { next: Seat },
    /// The last claimant took the bottom cards and leads the first round.
    Resolved { landlord: Seat, bottom: Vec<Card> },
    /// Nobody claimed: a fresh deal was made and bidding restarts.
    Redealt { first_bidder: Seat },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Next { seat: Seat, is_lead: bool },
    Finished { winner: Seat },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOutcome {
    pub pattern: Pattern,
    pub remaining: usize,
    pub turn: Turn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassOutcome {
    pub next: Seat,
    /// Two passes in a row closed the round; `next` leads a new one.
    pub round_reset: bool,
}

/// One room's game state: phase, seats, bidding and the play log.
///
/// Every operation checks all of its preconditions before the first
/// mutation, so a rejected action leaves the table untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub(crate) phase: Phase,
    pub(crate) seats: [SeatState; 3],
    pub(crate) bottom_cards: Vec<Card>,
    pub(crate) first_bidder: Option<Seat>,
    pub(crate) bids: Vec<BidRecord>,
    pub(crate) landlord: Option<Seat>,
    pub(crate) current_seat: Seat,
    pub(crate) last_pattern: Option<Pattern>,
    pub(crate) last_player: Option<Seat>,
    pub(crate) pass_streak: u8,
    pub(crate) play_history: Vec<PlayRecord>,
    pub(crate) is_new_round: bool,
    pub(crate) redeals: u32,
    pub(crate) version: u64,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    pub fn new() -> Self {
        Self {
            phase: Phase::Waiting,
            seats: array::from_fn(|_| SeatState::default()),
            bottom_cards: Vec::new(),
            first_bidder: None,
            bids: Vec::new(),
            landlord: None,
            current_seat: Seat::First,
            last_pattern: None,
            last_player: None,
            pass_streak: 0,
            play_history: Vec::new(),
            is_new_round: true,
            redeals: 0,
            version: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn seat(&self, seat: Seat) -> &SeatState {
        &self.seats[seat.index()]
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.seats[seat.index()].hand
    }

    pub fn bottom_cards(&self) -> &[Card] {
        &self.bottom_cards
    }

    pub fn bids(&self) -> &[BidRecord] {
        &self.bids
    }

    pub fn first_bidder(&self) -> Option<Seat> {
        self.first_bidder
    }

    pub fn landlord(&self) -> Option<Seat> {
        self.landlord
    }

    pub fn role(&self, seat: Seat) -> Option<Role> {
        self.seats[seat.index()].role
    }

    pub fn current_seat(&self) -> Seat {
        self.current_seat
    }

    pub fn last_pattern(&self) -> Option<&Pattern> {
        self.last_pattern.as_ref()
    }

    pub fn last_player(&self) -> Option<Seat> {
        self.last_player
    }

    pub fn pass_streak(&self) -> u8 {
        self.pass_streak
    }

    pub fn play_history(&self) -> &[PlayRecord] {
        &self.play_history
    }

    pub fn is_new_round(&self) -> bool {
        self.is_new_round
    }

    pub fn redeals(&self) -> u32 {
        self.redeals
    }

    /// Monotonic counter bumped by every accepted state change.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn hand_counts(&self) -> [usize; 3] {
        array::from_fn(|i| self.seats[i].hand.len())
    }

    pub fn set_bot(&mut self, seat: Seat, is_bot: bool) {
        self.seats[seat.index()].is_bot = is_bot;
    }

    pub fn set_online(&mut self, seat: Seat, online: bool) {
        self.seats[seat.index()].online = online;
    }

    pub fn roles(&self) -> Option<[Role; 3]> {
        let roles = [
            self.seats[0].role?,
            self.seats[1].role?,
            self.seats[2].role?,
        ];
        Some(roles)
    }

    pub fn winner(&self) -> Option<Seat> {
        if self.phase != Phase::Finished {
            return None;
        }
        self.play_history
            .iter()
            .rev()
            .find(|record| !record.is_pass())
            .map(|record| record.seat)
    }

    /// Nominal score deltas for a finished game.
    pub fn settlement(&self, base: u64) -> Option<Settlement> {
        let winner = self.winner()?;
        let roles = self.roles()?;
        settle(&roles, winner, &self.play_history, base)
    }

    /// Deals a new game and opens bidding. Returns the first bidder.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Seat, TableError> {
        if self.phase != Phase::Waiting {
            return Err(TableError::GameInProgress);
        }
        self.redeals = 0;
        Ok(self.deal(rng))
    }

    /// Returns a finished table to WAITING. Seats (bot/online flags) persist.
    pub fn reset(&mut self) -> Result<(), TableError> {
        match self.phase {
            Phase::Finished | Phase::Waiting => {
                self.clear_game();
                self.phase = Phase::Waiting;
                self.version += 1;
                Ok(())
            }
            _ => Err(TableError::GameInProgress),
        }
    }

    pub fn bid<R: Rng + ?Sized>(
        &mut self,
        seat: Seat,
        choice: BidChoice,
        rng: &mut R,
    ) -> Result<BidOutcome, TableError> {
        match self.phase {
            Phase::Bidding => {}
            Phase::Playing | Phase::Finished => return Err(TableError::BiddingAlreadyResolved),
            Phase::Waiting | Phase::Dealing => return Err(TableError::GameNotInProgress),
        }
        self.ensure_current(seat)?;

        self.bids.push(BidRecord { seat, choice });
        self.version += 1;

        if self.bids.len() < Seat::COUNT {
            self.current_seat = seat.next();
            return Ok(BidOutcome::Next {
                next: self.current_seat,
            });
        }

        // Later claims override earlier ones.
        let claimant = self
            .bids
            .iter()
            .rev()
            .find(|bid| bid.choice == BidChoice::Claim)
            .map(|bid| bid.seat);

        match claimant {
            Some(landlord) => {
                let bottom = self.bottom_cards.clone();
                self.resolve_landlord(landlord);
                Ok(BidOutcome::Resolved { landlord, bottom })
            }
            None => {
                self.redeals += 1;
                let first_bidder = self.deal(rng);
                Ok(BidOutcome::Redealt { first_bidder })
            }
        }
    }

    pub fn play(&mut self, seat: Seat, cards: &[Card], at_ms: u64) -> Result<PlayOutcome, TableError> {
        self.ensure_playing_turn(seat)?;
        let pattern = validate(
            &self.seats[seat.index()].hand,
            cards,
            self.last_pattern.as_ref(),
            self.is_new_round,
        )?;

        let hand = &mut self.seats[seat.index()].hand;
        hand.remove_all(cards);
        let remaining = hand.len();

        self.play_history.push(PlayRecord {
            seat,
            cards: pattern.cards().to_vec(),
            pattern: Some(pattern.clone()),
            at_ms,
        });
        self.last_pattern = Some(pattern.clone());
        self.last_player = Some(seat);
        self.pass_streak = 0;
        self.is_new_round = false;
        self.version += 1;

        if remaining == 0 {
            self.phase = Phase::Finished;
            return Ok(PlayOutcome {
                pattern,
                remaining,
                turn: Turn::Finished { winner: seat },
            });
        }

        self.current_seat = seat.next();
        Ok(PlayOutcome {
            pattern,
            remaining,
            turn: Turn::Next {
                seat: self.current_seat,
                is_lead: false,
            },
        })
    }

    pub fn pass(&mut self, seat: Seat, at_ms: u64) -> Result<PassOutcome, TableError> {
        self.ensure_playing_turn(seat)?;
        validate_pass(self.is_new_round)?;

        self.play_history.push(PlayRecord {
            seat,
            cards: Vec::new(),
            pattern: None,
            at_ms,
        });
        self.pass_streak += 1;
        self.version += 1;

        if self.pass_streak >= 2 {
            self.current_seat = self.last_player.unwrap_or_else(|| seat.next());
            self.last_pattern = None;
            self.is_new_round = true;
            self.pass_streak = 0;
            return Ok(PassOutcome {
                next: self.current_seat,
                round_reset: true,
            });
        }

        self.current_seat = seat.next();
        Ok(PassOutcome {
            next: self.current_seat,
            round_reset: false,
        })
    }

    fn ensure_current(&self, seat: Seat) -> Result<(), TableError> {
        if seat != self.current_seat {
            return Err(TableError::OutOfTurn {
                expected: self.current_seat,
                actual: seat,
            });
        }
        Ok(())
    }

    fn ensure_playing_turn(&self, seat: Seat) -> Result<(), TableError> {
        if self.phase != Phase::Playing {
            return Err(TableError::GameNotInProgress);
        }
        self.ensure_current(seat)
    }

    fn clear_game(&mut self) {
        for seat in self.seats.iter_mut() {
            seat.hand.clear();
            seat.role = None;
        }
        self.bottom_cards.clear();
        self.first_bidder = None;
        self.bids.clear();
        self.landlord = None;
        self.last_pattern = None;
        self.last_player = None;
        self.pass_streak = 0;
        self.play_history.clear();
        self.is_new_round = true;
    }

    /// DEALING: fresh shuffle, 17 cards per seat, 3 to the bottom, then a
    /// uniformly random first bidder opens BIDDING.
    fn deal<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Seat {
        self.clear_game();
        self.phase = Phase::Dealing;

        let deck = Deck::shuffled(rng);
        let (hands, bottom) = deck.deal();
        for (seat, cards) in self.seats.iter_mut().zip(hands) {
            seat.hand = Hand::with_cards(cards);
        }
        self.bottom_cards = bottom;

        let first = Seat::from_index(rng.gen_range(0..Seat::COUNT)).unwrap_or(Seat::First);
        self.first_bidder = Some(first);
        self.current_seat = first;
        self.phase = Phase::Bidding;
        self.version += 1;
        first
    }

    fn resolve_landlord(&mut self, landlord: Seat) {
        let bottom = self.bottom_cards.clone();
        self.seats[landlord.index()].hand.extend(bottom);
        for seat in Seat::LOOP {
            self.seats[seat.index()].role = Some(if seat == landlord {
                Role::Landlord
            } else {
                Role::Farmer
            });
        }
        self.landlord = Some(landlord);
        self.phase = Phase::Playing;
        self.current_seat = landlord;
        self.is_new_round = true;
        self.last_pattern = None;
        self.last_player = None;
        self.pass_streak = 0;
    }
}
