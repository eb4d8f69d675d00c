//! Action kind to handler mapping, built once when the engine starts.

use crate::action::{Action, ActionKind, RoomId};
use crate::engine::Engine;
use crate::error::ActionError;
use crate::event::GameEvent;
use landlord_core::model::seat::Seat;
use std::collections::HashMap;

pub type Handler =
    fn(&mut Engine, &RoomId, Seat, &Action) -> Result<Vec<GameEvent>, ActionError>;

#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    handlers: HashMap<ActionKind, Handler>,
}

impl DispatchTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Handlers for every action a seat can send.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        table.register(ActionKind::Bid, handle_bid);
        table.register(ActionKind::Play, handle_play);
        table.register(ActionKind::Pass, handle_pass);
        table.register(ActionKind::RequestHint, handle_request_hint);
        table
    }

    /// Replaces any handler already registered for `kind`.
    pub fn register(&mut self, kind: ActionKind, handler: Handler) {
        self.handlers.insert(kind, handler);
    }

    pub fn get(&self, kind: ActionKind) -> Option<Handler> {
        self.handlers.get(&kind).copied()
    }

    pub fn contains(&self, kind: ActionKind) -> bool {
        self.handlers.contains_key(&kind)
    }
}

fn handle_bid(
    engine: &mut Engine,
    room_id: &RoomId,
    seat: Seat,
    action: &Action,
) -> Result<Vec<GameEvent>, ActionError> {
    match action {
        Action::Bid(choice) => engine.apply_bid(room_id, seat, *choice),
        other => Err(ActionError::Unsupported(other.kind())),
    }
}

fn handle_play(
    engine: &mut Engine,
    room_id: &RoomId,
    seat: Seat,
    action: &Action,
) -> Result<Vec<GameEvent>, ActionError> {
    match action {
        Action::Play(cards) => engine.apply_play(room_id, seat, cards),
        other => Err(ActionError::Unsupported(other.kind())),
    }
}

fn handle_pass(
    engine: &mut Engine,
    room_id: &RoomId,
    seat: Seat,
    action: &Action,
) -> Result<Vec<GameEvent>, ActionError> {
    match action {
        Action::Pass => engine.apply_pass(room_id, seat),
        other => Err(ActionError::Unsupported(other.kind())),
    }
}

fn handle_request_hint(
    engine: &mut Engine,
    room_id: &RoomId,
    seat: Seat,
    action: &Action,
) -> Result<Vec<GameEvent>, ActionError> {
    match action {
        Action::RequestHint => engine.suggest(room_id, seat),
        other => Err(ActionError::Unsupported(other.kind())),
    }
}
