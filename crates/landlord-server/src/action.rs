use core::fmt;
use landlord_core::model::card::Card;
use landlord_core::model::seat::Seat;
use landlord_core::model::table::BidChoice;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parsed request from the transport for one seat of one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    pub room_id: RoomId,
    pub seat: Seat,
    pub action: Action,
}

impl ActionEnvelope {
    pub fn new(room_id: impl Into<RoomId>, seat: Seat, action: Action) -> Self {
        Self {
            room_id: room_id.into(),
            seat,
            action,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Action {
    Bid(BidChoice),
    Play(Vec<Card>),
    Pass,
    RequestHint,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Bid(_) => ActionKind::Bid,
            Action::Play(_) => ActionKind::Play,
            Action::Pass => ActionKind::Pass,
            Action::RequestHint => ActionKind::RequestHint,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Bid,
    Play,
    Pass,
    RequestHint,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Bid,
        ActionKind::Play,
        ActionKind::Pass,
        ActionKind::RequestHint,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ActionKind::Bid => "bid",
            ActionKind::Play => "play",
            ActionKind::Pass => "pass",
            ActionKind::RequestHint => "request_hint",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, ActionEnvelope, ActionKind};
    use landlord_core::model::card::parse_cards;
    use landlord_core::model::seat::Seat;
    use landlord_core::model::table::BidChoice;

    #[test]
    fn envelopes_parse_from_transport_json() {
        let play: ActionEnvelope = serde_json::from_str(
            r#"{"room_id": "r1", "seat": 2, "action": {"kind": "play", "payload": ["3S", "3H"]}}"#,
        )
        .unwrap();
        assert_eq!(play.room_id.as_str(), "r1");
        assert_eq!(play.seat, Seat::Third);
        assert_eq!(play.action, Action::Play(parse_cards("3S 3H").unwrap()));

        let bid: ActionEnvelope = serde_json::from_str(
            r#"{"room_id": "r1", "seat": 0, "action": {"kind": "bid", "payload": "claim"}}"#,
        )
        .unwrap();
        assert_eq!(bid.action, Action::Bid(BidChoice::Claim));

        let pass: ActionEnvelope =
            serde_json::from_str(r#"{"room_id": "r1", "seat": 1, "action": {"kind": "pass"}}"#)
                .unwrap();
        assert_eq!(pass.action.kind(), ActionKind::Pass);
    }

    #[test]
    fn unknown_kinds_are_refused() {
        let parsed = serde_json::from_str::<ActionEnvelope>(
            r#"{"room_id": "r1", "seat": 1, "action": {"kind": "surrender"}}"#,
        );
        assert!(parsed.is_err());
    }
}
