//! Bot-only games driven through the same engine API a transport uses.

use crate::action::RoomId;
use crate::clock::ManualClock;
use crate::config::ServerConfig;
use crate::engine::Engine;
use crate::error::ActionError;
use crate::event::{GameEvent, ScoreBreakdown};
use crate::ledger::GameRecord;
use landlord_core::model::seat::Seat;
use landlord_core::model::table::Phase;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{Level, event};

const SIM_ROOM: &str = "sim";
const MAX_TICKS_PER_GAME: usize = 10_000;

pub struct SimRunner {
    config: ServerConfig,
}

/// Totals reported after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimSummary {
    pub games: usize,
    pub landlord_wins: usize,
    pub farmer_wins: usize,
    pub redeals: u32,
    pub springs: usize,
    pub bombs: u32,
    pub rockets: u32,
    pub jsonl_path: PathBuf,
}

#[derive(Serialize)]
struct GameLine<'a> {
    game_index: usize,
    record: &'a GameRecord,
    score: &'a ScoreBreakdown,
}

impl SimRunner {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Plays `sim.games` games at one table of three bots, one JSONL line
    /// per finished game.
    pub fn run(&self) -> Result<SimSummary, SimError> {
        let jsonl_path = PathBuf::from(&self.config.sim.output);
        ensure_parent(jsonl_path.parent())?;
        let mut writer = BufWriter::new(File::create(&jsonl_path)?);

        let mut seeds = StdRng::seed_from_u64(self.config.sim.seed.unwrap_or(0));
        let clock = ManualClock::new(0);
        let mut engine = Engine::new(self.config.clone(), clock.clone()).with_seed(seeds.next_u64());
        let room = RoomId::new(SIM_ROOM);
        engine.create_room(room.clone(), seeds.next_u64())?;
        for seat in Seat::LOOP {
            engine.seat_player(&room, seat, format!("bot-{}", seat.index()), true)?;
        }

        let mut summary = SimSummary {
            games: 0,
            landlord_wins: 0,
            farmer_wins: 0,
            redeals: 0,
            springs: 0,
            bombs: 0,
            rockets: 0,
            jsonl_path: jsonl_path.clone(),
        };

        for game_index in 0..self.config.sim.games {
            engine.start_game(&room)?;
            let score = drive_to_finish(&mut engine, &clock, &room, game_index)?;
            for record in engine.take_finished() {
                let line = GameLine {
                    game_index,
                    record: &record,
                    score: &score,
                };
                serde_json::to_writer(&mut writer, &line)?;
                writer.write_all(b"\n")?;

                summary.games += 1;
                if score.settlement.landlord_won {
                    summary.landlord_wins += 1;
                } else {
                    summary.farmer_wins += 1;
                }
                summary.redeals += record.redeals;
                summary.bombs += record.multiplier.bombs;
                summary.rockets += record.multiplier.rockets;
                if record.multiplier.spring {
                    summary.springs += 1;
                }
            }
            engine.reset_room(&room)?;
        }

        writer.flush()?;
        event!(
            target: "landlord_server::sim",
            Level::INFO,
            games = summary.games,
            landlord_wins = summary.landlord_wins,
            farmer_wins = summary.farmer_wins,
            path = %jsonl_path.display(),
            "simulation complete"
        );
        Ok(summary)
    }
}

/// Advances the clock from one bot task to the next until the game ends.
fn drive_to_finish(
    engine: &mut Engine,
    clock: &ManualClock,
    room: &RoomId,
    game_index: usize,
) -> Result<ScoreBreakdown, SimError> {
    for _ in 0..MAX_TICKS_PER_GAME {
        let Some(due) = engine.next_due() else {
            break;
        };
        clock.set(due.max(engine.now_ms()));
        for room_event in engine.tick() {
            match room_event.event {
                GameEvent::GameFinished {
                    score_breakdown, ..
                } => return Ok(score_breakdown),
                GameEvent::Rejected { kind, message, .. } => {
                    return Err(SimError::Rejected {
                        game: game_index,
                        message: format!("{kind}: {message}"),
                    });
                }
                _ => {}
            }
        }
    }
    Err(SimError::Stalled {
        game: game_index,
        phase: engine.table(room)?.phase(),
    })
}

fn ensure_parent(path: Option<&Path>) -> Result<(), SimError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize game record: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error("game {game} stopped making progress in the {phase} phase")]
    Stalled { game: usize, phase: Phase },
    #[error("game {game}: bot move rejected ({message})")]
    Rejected { game: usize, message: String },
}
