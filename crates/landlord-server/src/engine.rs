//! Room-level engine consumed by a transport.
//!
//! Every entry point runs to completion on one room before returning. Human
//! actions arrive through [`Engine::handle`]; bot turns are deferred tasks
//! that the transport drives with [`Engine::tick`].

use crate::action::{Action, ActionEnvelope, RoomId};
use crate::clock::Clock;
use crate::config::ServerConfig;
use crate::dispatch::DispatchTable;
use crate::error::ActionError;
use crate::event::{GameEvent, RoomEvent, ScoreBreakdown};
use crate::hint_process::ProcessHintProvider;
use crate::ledger::{GameRecord, MemoryLedger, ScoreLedger, SeatResult};
use crate::registry::RoomRegistry;
use crate::room::Room;
use crate::scheduler::{DeferredTask, Scheduler};
use crate::store::{MemoryStore, SnapshotStore};
use landlord_bot::bot::BotParams;
use landlord_bot::policy::{AdvisedPolicy, HeuristicPolicy, PlayChoice, Policy, PolicyContext};
use landlord_core::game::snapshot::{SeatView, TableSnapshot};
use landlord_core::model::card::{Card, format_cards};
use landlord_core::model::pattern::PatternKind;
use landlord_core::model::seat::Seat;
use landlord_core::model::table::{BidChoice, BidOutcome, Phase, Table, TableError, Turn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::mem;
use tracing::{Level, event};

pub struct Engine {
    config: ServerConfig,
    bot_params: BotParams,
    registry: RoomRegistry,
    store: Box<dyn SnapshotStore>,
    scheduler: Scheduler,
    policy: Box<dyn Policy>,
    ledger: Box<dyn ScoreLedger>,
    clock: Box<dyn Clock>,
    dispatch: DispatchTable,
    delay_rng: StdRng,
    finished: Vec<GameRecord>,
}

impl Engine {
    /// Engine with in-memory store and ledger. Bots consult the configured
    /// hint process when there is one.
    pub fn new(config: ServerConfig, clock: impl Clock + 'static) -> Self {
        let policy: Box<dyn Policy> = match config.hint.clone() {
            Some(hint) => Box::new(AdvisedPolicy::new(Box::new(ProcessHintProvider::new(hint)))),
            None => Box::new(HeuristicPolicy::new()),
        };
        let ledger = MemoryLedger::new(config.stakes.starting_balance, config.stakes.bot_refill);
        Self {
            bot_params: BotParams::default().with_claim_threshold(config.bots.claim_threshold),
            registry: RoomRegistry::new(),
            store: Box::new(MemoryStore::new()),
            scheduler: Scheduler::new(),
            policy,
            ledger: Box::new(ledger),
            clock: Box::new(clock),
            dispatch: DispatchTable::standard(),
            delay_rng: StdRng::from_entropy(),
            finished: Vec::new(),
            config,
        }
    }

    pub fn with_ledger(mut self, ledger: Box<dyn ScoreLedger>) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_store(mut self, store: Box<dyn SnapshotStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_policy(mut self, policy: Box<dyn Policy>) -> Self {
        self.policy = policy;
        self
    }

    /// Seeds the bot delay generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.delay_rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn create_room(&mut self, id: impl Into<RoomId>, seed: u64) -> Result<(), ActionError> {
        self.registry.create(id.into(), seed)?;
        Ok(())
    }

    pub fn evict_room(&mut self, id: &RoomId) -> Result<(), ActionError> {
        self.registry.evict(id)?;
        self.store.clear(id);
        self.scheduler.forget_room(id);
        Ok(())
    }

    pub fn room(&self, id: &RoomId) -> Result<&Room, ActionError> {
        self.registry.get(id)
    }

    pub fn table(&self, id: &RoomId) -> Result<&Table, ActionError> {
        Ok(self.registry.get(id)?.table())
    }

    pub fn snapshot(&self, id: &RoomId) -> Option<&TableSnapshot> {
        self.store.get(id)
    }

    pub fn ledger(&self) -> &dyn ScoreLedger {
        self.ledger.as_ref()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.scheduler.next_due()
    }

    /// Game records produced since the last call.
    pub fn take_finished(&mut self) -> Vec<GameRecord> {
        mem::take(&mut self.finished)
    }

    pub fn seat_player(
        &mut self,
        id: &RoomId,
        seat: Seat,
        player_id: impl Into<String>,
        is_bot: bool,
    ) -> Result<(), ActionError> {
        let now = self.clock.now_ms();
        let player_id = player_id.into();
        let room = self.registry.get_mut(id)?;
        room.seat_player(seat, player_id.clone(), is_bot);
        event!(
            target: "landlord_server::engine",
            Level::INFO,
            room = %id,
            seat = %seat,
            player = %player_id,
            is_bot,
            "player seated"
        );
        self.after_change(id, now);
        Ok(())
    }

    /// Marks a seat's connection state. An offline seat whose turn is up is
    /// handed to the bot when offline takeover is enabled.
    pub fn set_online(&mut self, id: &RoomId, seat: Seat, online: bool) -> Result<(), ActionError> {
        let now = self.clock.now_ms();
        let room = self.registry.get_mut(id)?;
        room.table.set_online(seat, online);
        event!(
            target: "landlord_server::engine",
            Level::INFO,
            room = %id,
            seat = %seat,
            online,
            "connection state changed"
        );
        self.save_snapshot(id, now);
        if !online {
            self.schedule_if_automated(id, now);
        }
        Ok(())
    }

    /// Marks `seat` online and returns what that seat is allowed to see.
    pub fn reconnect(&mut self, id: &RoomId, seat: Seat) -> Result<SeatView, ActionError> {
        let now = self.clock.now_ms();
        let room = self.registry.get_mut(id)?;
        room.table.set_online(seat, true);
        let live = room.table.snapshot(now);

        let view = match self.store.get(id).cloned() {
            Some(mut stored) => {
                if let Some(entry) = stored.per_seat.iter_mut().find(|entry| entry.seat == seat) {
                    entry.online = true;
                }
                let view = stored.for_seat(seat);
                self.store.save(id, stored);
                view
            }
            None => live.for_seat(seat),
        };
        event!(
            target: "landlord_server::engine",
            Level::INFO,
            room = %id,
            seat = %seat,
            phase = %view.phase,
            "seat reconnected"
        );
        Ok(view)
    }

    /// Deals a new game. Every seat must be filled.
    pub fn start_game(&mut self, id: &RoomId) -> Result<Vec<GameEvent>, ActionError> {
        let now = self.clock.now_ms();
        let room = self.registry.get_mut(id)?;
        if let Some(seat) = room.first_empty_seat() {
            return Err(ActionError::SeatEmpty(seat));
        }
        let first_bidder = room.table.start(&mut room.rng)?;
        let game_id = room.begin_game(now);
        event!(
            target: "landlord_server::engine",
            Level::INFO,
            room = %id,
            game_id = %game_id,
            first_bidder = %first_bidder,
            "game dealt"
        );
        let events = vec![
            GameEvent::GameStarted {
                game_id,
                first_bidder,
            },
            GameEvent::TurnChanged {
                next_seat: first_bidder,
                is_lead: false,
                last_pattern: None,
            },
        ];
        self.after_change(id, now);
        Ok(events)
    }

    /// FINISHED (or WAITING) back to WAITING with the same seats.
    pub fn reset_room(&mut self, id: &RoomId) -> Result<(), ActionError> {
        let room = self.registry.get_mut(id)?;
        room.table.reset()?;
        self.store.clear(id);
        event!(
            target: "landlord_server::engine",
            Level::INFO,
            room = %id,
            "room reset"
        );
        Ok(())
    }

    /// Replaces a room's table with one rebuilt from `snapshot`. A snapshot
    /// that fails validation leaves the current table in place.
    pub fn restore_room(&mut self, id: &RoomId, snapshot: &TableSnapshot) -> Result<(), ActionError> {
        let now = self.clock.now_ms();
        let room = self.registry.get_mut(id)?;
        match Table::from_snapshot(snapshot) {
            Ok(table) => {
                room.table = table;
                self.scheduler.forget_room(id);
                event!(
                    target: "landlord_server::engine",
                    Level::INFO,
                    room = %id,
                    phase = %snapshot.phase,
                    "room restored from snapshot"
                );
            }
            Err(err) => {
                event!(
                    target: "landlord_server::engine",
                    Level::ERROR,
                    room = %id,
                    error = %err,
                    "snapshot rejected; keeping last known good table"
                );
                return Err(err.into());
            }
        }
        self.after_change(id, now);
        Ok(())
    }

    /// Runs one envelope through the dispatch table.
    pub fn apply_action(&mut self, envelope: &ActionEnvelope) -> Result<Vec<GameEvent>, ActionError> {
        let kind = envelope.action.kind();
        let handler = self
            .dispatch
            .get(kind)
            .ok_or(ActionError::Unsupported(kind))?;
        handler(self, &envelope.room_id, envelope.seat, &envelope.action)
    }

    /// Like [`Engine::apply_action`], but a refusal becomes a `Rejected`
    /// event addressed to the acting seat.
    pub fn handle(&mut self, envelope: &ActionEnvelope) -> Vec<GameEvent> {
        match self.apply_action(envelope) {
            Ok(events) => events,
            Err(err) => {
                event!(
                    target: "landlord_server::engine",
                    Level::WARN,
                    room = %envelope.room_id,
                    seat = %envelope.seat,
                    action = %envelope.action.kind(),
                    kind = %err.kind(),
                    error = %err,
                    "action rejected"
                );
                vec![GameEvent::rejected(envelope.seat, &err)]
            }
        }
    }

    /// Fires every bot task that is due. Tasks whose turn has moved on are
    /// dropped without touching the table.
    pub fn tick(&mut self) -> Vec<RoomEvent> {
        let now = self.clock.now_ms();
        let mut out = Vec::new();
        for task in self.scheduler.pop_due(now) {
            out.extend(self.run_task(task));
        }
        out
    }

    fn run_task(&mut self, task: DeferredTask) -> Vec<RoomEvent> {
        let auto_offline = self.config.bots.auto_play_offline;
        let Ok(room) = self.registry.get(&task.room_id) else {
            event!(
                target: "landlord_server::engine",
                Level::DEBUG,
                room = %task.room_id,
                "bot task for a missing room dropped"
            );
            return Vec::new();
        };
        let table = &room.table;
        if !task.is_current(table) || !is_automated(table, task.seat, auto_offline) {
            event!(
                target: "landlord_server::engine",
                Level::DEBUG,
                room = %task.room_id,
                seat = %task.seat,
                scheduled_phase = %task.phase,
                scheduled_version = task.version,
                phase = %table.phase(),
                current_seat = %table.current_seat(),
                version = table.version(),
                "stale bot task discarded"
            );
            return Vec::new();
        }

        let ctx = PolicyContext::new(task.seat, table, &self.bot_params);
        let action = match table.phase() {
            Phase::Bidding => Action::Bid(self.policy.choose_bid(&ctx)),
            Phase::Playing => {
                let decision = self.policy.choose_play(&ctx);
                event!(
                    target: "landlord_server::engine",
                    Level::DEBUG,
                    room = %task.room_id,
                    seat = %task.seat,
                    source = decision.source.as_str(),
                    cards = %format_cards(decision.choice.cards()),
                    "bot decided"
                );
                match decision.choice {
                    PlayChoice::Play(cards) => Action::Play(cards),
                    PlayChoice::Pass => Action::Pass,
                }
            }
            _ => return Vec::new(),
        };

        let envelope = ActionEnvelope::new(task.room_id.clone(), task.seat, action);
        self.handle(&envelope)
            .into_iter()
            .map(|event| RoomEvent {
                room_id: task.room_id.clone(),
                event,
            })
            .collect()
    }

    pub(crate) fn apply_bid(
        &mut self,
        id: &RoomId,
        seat: Seat,
        choice: BidChoice,
    ) -> Result<Vec<GameEvent>, ActionError> {
        let now = self.clock.now_ms();
        let room = self.registry.get_mut(id)?;
        let outcome = room.table.bid(seat, choice, &mut room.rng)?;

        let mut events = vec![GameEvent::BidPlaced { seat, choice }];
        match outcome {
            BidOutcome::Next { next } => events.push(GameEvent::TurnChanged {
                next_seat: next,
                is_lead: false,
                last_pattern: None,
            }),
            BidOutcome::Resolved { landlord, bottom } => {
                event!(
                    target: "landlord_server::engine",
                    Level::INFO,
                    room = %id,
                    landlord = %landlord,
                    bottom = %format_cards(&bottom),
                    "bidding resolved"
                );
                events.push(GameEvent::BidResolved {
                    landlord_seat: landlord,
                    bottom_cards: bottom,
                });
                events.push(GameEvent::TurnChanged {
                    next_seat: landlord,
                    is_lead: true,
                    last_pattern: None,
                });
            }
            BidOutcome::Redealt { first_bidder } => {
                let redeals = room.table.redeals();
                event!(
                    target: "landlord_server::engine",
                    Level::INFO,
                    room = %id,
                    redeals,
                    first_bidder = %first_bidder,
                    "all seats declined; redealt"
                );
                events.push(GameEvent::Redealt {
                    first_bidder,
                    redeals,
                });
                events.push(GameEvent::TurnChanged {
                    next_seat: first_bidder,
                    is_lead: false,
                    last_pattern: None,
                });
            }
        }
        self.after_change(id, now);
        Ok(events)
    }

    pub(crate) fn apply_play(
        &mut self,
        id: &RoomId,
        seat: Seat,
        cards: &[Card],
    ) -> Result<Vec<GameEvent>, ActionError> {
        let now = self.clock.now_ms();
        let room = self.registry.get_mut(id)?;
        let outcome = room.table.play(seat, cards, now)?;
        let last_pattern = room.table.last_pattern().cloned();

        let mut events = vec![GameEvent::CardsPlayed {
            seat,
            pattern: outcome.pattern,
            remaining_count: outcome.remaining,
        }];
        match outcome.turn {
            Turn::Next { seat: next, is_lead } => events.push(GameEvent::TurnChanged {
                next_seat: next,
                is_lead,
                last_pattern,
            }),
            Turn::Finished { winner } => {
                if let Some(score_breakdown) = self.settle(id, winner, now) {
                    events.push(GameEvent::GameFinished {
                        winner_seat: winner,
                        score_breakdown,
                    });
                }
            }
        }
        self.after_change(id, now);
        Ok(events)
    }

    pub(crate) fn apply_pass(&mut self, id: &RoomId, seat: Seat) -> Result<Vec<GameEvent>, ActionError> {
        let now = self.clock.now_ms();
        let room = self.registry.get_mut(id)?;
        let outcome = room.table.pass(seat, now)?;
        let events = vec![
            GameEvent::Passed { seat },
            GameEvent::TurnChanged {
                next_seat: outcome.next,
                is_lead: outcome.round_reset,
                last_pattern: room.table.last_pattern().cloned(),
            },
        ];
        self.after_change(id, now);
        Ok(events)
    }

    /// Suggests a move for the seat to act without applying it.
    pub(crate) fn suggest(&mut self, id: &RoomId, seat: Seat) -> Result<Vec<GameEvent>, ActionError> {
        let room = self.registry.get(id)?;
        let table = &room.table;
        if table.phase() != Phase::Playing {
            return Err(TableError::GameNotInProgress.into());
        }
        if table.current_seat() != seat {
            return Err(TableError::OutOfTurn {
                expected: table.current_seat(),
                actual: seat,
            }
            .into());
        }
        let ctx = PolicyContext::new(seat, table, &self.bot_params);
        let decision = self.policy.choose_play(&ctx);
        Ok(vec![GameEvent::Hint {
            seat,
            cards: decision.choice.cards().to_vec(),
        }])
    }

    fn settle(&mut self, id: &RoomId, winner: Seat, now: u64) -> Option<ScoreBreakdown> {
        let base = self.config.stakes.base;
        let room = self.registry.get_mut(id).ok()?;
        let table = &room.table;
        let (Some(roles), Some(settlement)) = (table.roles(), table.settlement(base)) else {
            event!(
                target: "landlord_server::engine",
                Level::ERROR,
                room = %id,
                winner = %winner,
                "finished table has no settleable roles"
            );
            return None;
        };

        let seats = Seat::LOOP
            .iter()
            .map(|&seat| {
                let (player_id, is_bot) = match room.player(seat) {
                    Some(slot) => (slot.player_id.clone(), slot.is_bot),
                    None => (format!("{}#{}", id, seat.index()), table.seat(seat).is_bot()),
                };
                let (bombs_played, rockets_played) = table
                    .play_history()
                    .iter()
                    .filter(|record| record.seat == seat)
                    .filter_map(|record| record.pattern.as_ref())
                    .fold((0u32, 0u32), |(bombs, rockets), pattern| match pattern.kind() {
                        PatternKind::Bomb => (bombs + 1, rockets),
                        PatternKind::Rocket => (bombs, rockets + 1),
                        _ => (bombs, rockets),
                    });
                let nominal_delta = settlement.delta(seat);
                SeatResult {
                    seat,
                    player_id,
                    role: roles[seat.index()],
                    is_bot,
                    won: nominal_delta > 0,
                    nominal_delta,
                    bombs_played,
                    rockets_played,
                }
            })
            .collect();

        let (game_id, started_at_ms) = match room.current_game() {
            Some(meta) => (meta.game_id.clone(), meta.started_at_ms),
            None => (format!("{id}-restored"), now),
        };
        let record = GameRecord {
            game_id,
            room_id: id.clone(),
            landlord: settlement.landlord,
            winner,
            base,
            multiplier: settlement.multiplier,
            seats,
            redeals: table.redeals(),
            moves: table.play_history().len(),
            started_at_ms,
            finished_at_ms: now,
        };

        let outcome = self.ledger.apply(&record);
        event!(
            target: "landlord_server::engine",
            Level::INFO,
            room = %id,
            game_id = %record.game_id,
            winner = %winner,
            landlord_won = settlement.landlord_won,
            base,
            multiplier = settlement.multiplier.total,
            spring = settlement.multiplier.spring,
            bombs = settlement.multiplier.bombs,
            rockets = settlement.multiplier.rockets,
            "game settled"
        );
        room.finish_game(record.clone());
        self.finished.push(record);
        Some(ScoreBreakdown::new(settlement, &outcome))
    }

    fn save_snapshot(&mut self, id: &RoomId, now: u64) {
        if let Ok(room) = self.registry.get(id) {
            self.store.save(id, room.table.snapshot(now));
        }
    }

    /// Persists the room and queues the next automated turn, if any.
    fn after_change(&mut self, id: &RoomId, now: u64) {
        self.save_snapshot(id, now);
        self.schedule_if_automated(id, now);
    }

    fn schedule_if_automated(&mut self, id: &RoomId, now: u64) {
        let Ok(room) = self.registry.get(id) else {
            return;
        };
        let table = &room.table;
        if !table.phase().awaits_action()
            || !is_automated(table, table.current_seat(), self.config.bots.auto_play_offline)
        {
            return;
        }
        let bots = &self.config.bots;
        let delay = self.delay_rng.gen_range(bots.min_delay_ms..=bots.max_delay_ms);
        let task = DeferredTask::for_turn(id.clone(), table, now.saturating_add(delay));
        event!(
            target: "landlord_server::engine",
            Level::DEBUG,
            room = %id,
            seat = %task.seat,
            phase = %task.phase,
            due_at_ms = task.due_at_ms,
            "bot turn scheduled"
        );
        self.scheduler.schedule(task);
    }
}

fn is_automated(table: &Table, seat: Seat, auto_play_offline: bool) -> bool {
    let state = table.seat(seat);
    state.is_bot() || (auto_play_offline && !state.is_online())
}
