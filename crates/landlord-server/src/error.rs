use crate::action::{ActionKind, RoomId};
use core::fmt;
use landlord_core::game::snapshot::SnapshotError;
use landlord_core::model::seat::Seat;
use landlord_core::model::table::TableError;
use landlord_core::model::validate::PlayError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a request was refused. A refused request never changes the room.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("room {0} not found")]
    RoomNotFound(RoomId),
    #[error("room {0} already exists")]
    RoomExists(RoomId),
    #[error("{0} has no player")]
    SeatEmpty(Seat),
    #[error("no handler registered for {0}")]
    Unsupported(ActionKind),
    #[error("snapshot rejected: {0}")]
    CorruptSnapshot(#[from] SnapshotError),
}

impl From<PlayError> for ActionError {
    fn from(err: PlayError) -> Self {
        ActionError::Table(TableError::Play(err))
    }
}

impl ActionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::Table(TableError::Play(play)) => match play {
                PlayError::InvalidPattern => ErrorKind::InvalidPattern,
                PlayError::CardsNotOwned => ErrorKind::CardsNotOwned,
                PlayError::IllegalBeat => ErrorKind::IllegalBeat,
                PlayError::MustPlayOnLead => ErrorKind::MustPlayOnLead,
            },
            ActionError::Table(TableError::OutOfTurn { .. }) => ErrorKind::OutOfTurn,
            ActionError::Table(TableError::BiddingAlreadyResolved) => {
                ErrorKind::BiddingAlreadyResolved
            }
            ActionError::Table(TableError::GameNotInProgress) => ErrorKind::GameNotInProgress,
            ActionError::Table(TableError::GameInProgress) => ErrorKind::GameInProgress,
            ActionError::RoomNotFound(_) => ErrorKind::RoomNotFound,
            ActionError::RoomExists(_) => ErrorKind::RoomExists,
            ActionError::SeatEmpty(_) => ErrorKind::SeatEmpty,
            ActionError::Unsupported(_) => ErrorKind::Unsupported,
            ActionError::CorruptSnapshot(_) => ErrorKind::CorruptSnapshot,
        }
    }
}

/// Wire-level error kind carried by rejection events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidPattern,
    CardsNotOwned,
    OutOfTurn,
    IllegalBeat,
    MustPlayOnLead,
    BiddingAlreadyResolved,
    RoomNotFound,
    GameNotInProgress,
    GameInProgress,
    RoomExists,
    SeatEmpty,
    Unsupported,
    CorruptSnapshot,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidPattern => "invalid_pattern",
            ErrorKind::CardsNotOwned => "cards_not_owned",
            ErrorKind::OutOfTurn => "out_of_turn",
            ErrorKind::IllegalBeat => "illegal_beat",
            ErrorKind::MustPlayOnLead => "must_play_on_lead",
            ErrorKind::BiddingAlreadyResolved => "bidding_already_resolved",
            ErrorKind::RoomNotFound => "room_not_found",
            ErrorKind::GameNotInProgress => "game_not_in_progress",
            ErrorKind::GameInProgress => "game_in_progress",
            ErrorKind::RoomExists => "room_exists",
            ErrorKind::SeatEmpty => "seat_empty",
            ErrorKind::Unsupported => "unsupported",
            ErrorKind::CorruptSnapshot => "corrupt_snapshot",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionError, ErrorKind};
    use landlord_core::model::seat::Seat;
    use landlord_core::model::table::TableError;
    use landlord_core::model::validate::PlayError;

    #[test]
    fn maps_table_errors_to_wire_kinds() {
        let err: ActionError = PlayError::IllegalBeat.into();
        assert_eq!(err.kind(), ErrorKind::IllegalBeat);
        let err: ActionError = TableError::OutOfTurn {
            expected: Seat::First,
            actual: Seat::Second,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::OutOfTurn);
        assert_eq!(
            serde_json::to_string(&ErrorKind::MustPlayOnLead).unwrap(),
            "\"must_play_on_lead\""
        );
    }
}
