//! Game records and the balance/achievement ledger that consumes them.

use crate::action::RoomId;
use core::fmt;
use landlord_core::model::score::Multiplier;
use landlord_core::model::seat::{Role, Seat};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{Level, event};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatResult {
    pub seat: Seat,
    pub player_id: String,
    pub role: Role,
    pub is_bot: bool,
    pub won: bool,
    pub nominal_delta: i64,
    pub bombs_played: u32,
    pub rockets_played: u32,
}

/// Emitted once per finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: String,
    pub room_id: RoomId,
    pub landlord: Seat,
    pub winner: Seat,
    pub base: u64,
    pub multiplier: Multiplier,
    pub seats: Vec<SeatResult>,
    pub redeals: u32,
    pub moves: usize,
    pub started_at_ms: u64,
    pub finished_at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    FirstWin,
    Spring,
    AntiSpring,
    RocketLauncher,
    BombSquad,
}

impl Achievement {
    pub const fn as_str(self) -> &'static str {
        match self {
            Achievement::FirstWin => "first_win",
            Achievement::Spring => "spring",
            Achievement::AntiSpring => "anti_spring",
            Achievement::RocketLauncher => "rocket_launcher",
            Achievement::BombSquad => "bomb_squad",
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatBalance {
    pub seat: Seat,
    pub player_id: String,
    pub applied_delta: i64,
    pub balance: i64,
    pub refilled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unlocked {
    pub player_id: String,
    pub achievement: Achievement,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerOutcome {
    pub balances: Vec<SeatBalance>,
    pub unlocked: Vec<Unlocked>,
}

impl LedgerOutcome {
    pub fn applied(&self, seat: Seat) -> Option<i64> {
        self.balances
            .iter()
            .find(|entry| entry.seat == seat)
            .map(|entry| entry.applied_delta)
    }
}

/// Persistence side of settlement: applies nominal deltas under the
/// balance floor policy and reports what changed.
pub trait ScoreLedger: Send {
    fn apply(&mut self, record: &GameRecord) -> LedgerOutcome;

    fn balance(&self, player_id: &str) -> Option<i64>;
}

#[derive(Debug, Clone)]
struct Account {
    balance: i64,
    wins: u32,
    games: u32,
    achievements: BTreeSet<Achievement>,
}

/// In-process ledger: humans never drop below zero, bots are topped up to
/// `bot_refill` once they reach zero.
#[derive(Debug, Clone)]
pub struct MemoryLedger {
    starting_balance: i64,
    bot_refill: i64,
    accounts: HashMap<String, Account>,
}

impl MemoryLedger {
    pub fn new(starting_balance: i64, bot_refill: i64) -> Self {
        Self {
            starting_balance,
            bot_refill,
            accounts: HashMap::new(),
        }
    }

    pub fn achievements(&self, player_id: &str) -> Vec<Achievement> {
        self.accounts
            .get(player_id)
            .map(|account| account.achievements.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn games_played(&self, player_id: &str) -> u32 {
        self.accounts.get(player_id).map(|a| a.games).unwrap_or(0)
    }
}

impl ScoreLedger for MemoryLedger {
    fn apply(&mut self, record: &GameRecord) -> LedgerOutcome {
        let mut outcome = LedgerOutcome::default();
        for result in &record.seats {
            let starting = self.starting_balance;
            let account = self
                .accounts
                .entry(result.player_id.clone())
                .or_insert_with(|| Account {
                    balance: starting,
                    wins: 0,
                    games: 0,
                    achievements: BTreeSet::new(),
                });

            let mut applied = result.nominal_delta;
            if !result.is_bot && account.balance.saturating_add(applied) < 0 {
                applied = -account.balance;
            }
            account.balance = account.balance.saturating_add(applied);
            let refilled = result.is_bot && account.balance <= 0;
            if refilled {
                account.balance = self.bot_refill;
            }
            account.games += 1;

            let mut earned = Vec::new();
            if result.won {
                if account.wins == 0 {
                    earned.push(Achievement::FirstWin);
                }
                account.wins += 1;
                if record.multiplier.spring && result.role == Role::Landlord {
                    earned.push(Achievement::Spring);
                }
                if record.multiplier.anti_spring && result.role == Role::Farmer {
                    earned.push(Achievement::AntiSpring);
                }
            }
            if result.rockets_played > 0 {
                earned.push(Achievement::RocketLauncher);
            }
            if result.bombs_played >= 2 {
                earned.push(Achievement::BombSquad);
            }
            for achievement in earned {
                if account.achievements.insert(achievement) {
                    event!(
                        target: "landlord_server::ledger",
                        Level::INFO,
                        player = %result.player_id,
                        achievement = achievement.as_str(),
                        "achievement unlocked"
                    );
                    outcome.unlocked.push(Unlocked {
                        player_id: result.player_id.clone(),
                        achievement,
                    });
                }
            }

            outcome.balances.push(SeatBalance {
                seat: result.seat,
                player_id: result.player_id.clone(),
                applied_delta: applied,
                balance: account.balance,
                refilled,
            });
        }
        outcome
    }

    fn balance(&self, player_id: &str) -> Option<i64> {
        self.accounts.get(player_id).map(|account| account.balance)
    }
}
