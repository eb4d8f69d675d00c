use crate::action::RoomId;
use crate::ledger::GameRecord;
use landlord_core::model::seat::Seat;
use landlord_core::model::table::Table;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSlot {
    pub player_id: String,
    pub is_bot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMeta {
    pub game_id: String,
    pub started_at_ms: u64,
}

/// One room: its table, the seated players and the deal RNG.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    pub(crate) table: Table,
    pub(crate) rng: StdRng,
    players: [Option<PlayerSlot>; 3],
    game_seq: u64,
    current_game: Option<GameMeta>,
    last_record: Option<GameRecord>,
}

impl Room {
    pub fn new(id: RoomId, seed: u64) -> Self {
        Self {
            id,
            table: Table::new(),
            rng: StdRng::seed_from_u64(seed),
            players: [None, None, None],
            game_seq: 0,
            current_game: None,
            last_record: None,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn player(&self, seat: Seat) -> Option<&PlayerSlot> {
        self.players[seat.index()].as_ref()
    }

    pub fn first_empty_seat(&self) -> Option<Seat> {
        Seat::LOOP
            .iter()
            .copied()
            .find(|seat| self.players[seat.index()].is_none())
    }

    pub fn seat_player(&mut self, seat: Seat, player_id: impl Into<String>, is_bot: bool) {
        self.players[seat.index()] = Some(PlayerSlot {
            player_id: player_id.into(),
            is_bot,
        });
        self.table.set_bot(seat, is_bot);
        self.table.set_online(seat, true);
    }

    pub fn current_game(&self) -> Option<&GameMeta> {
        self.current_game.as_ref()
    }

    pub fn last_record(&self) -> Option<&GameRecord> {
        self.last_record.as_ref()
    }

    pub(crate) fn begin_game(&mut self, now_ms: u64) -> String {
        self.game_seq += 1;
        let game_id = format!("{}-{}", self.id, self.game_seq);
        self.current_game = Some(GameMeta {
            game_id: game_id.clone(),
            started_at_ms: now_ms,
        });
        game_id
    }

    pub(crate) fn finish_game(&mut self, record: GameRecord) {
        self.current_game = None;
        self.last_record = Some(record);
    }
}
