pub mod action;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod event;
pub mod hint_process;
pub mod ledger;
pub mod logging;
pub mod registry;
pub mod room;
pub mod scheduler;
pub mod sim;
pub mod store;

pub use action::{Action, ActionEnvelope, ActionKind, RoomId};
pub use engine::Engine;
pub use error::{ActionError, ErrorKind};
pub use event::{GameEvent, RoomEvent};
