use crate::action::RoomId;
use crate::error::ActionError;
use crate::room::Room;
use std::collections::HashMap;
use tracing::{Level, event};

/// Owns every room's table by id. Rooms are created and evicted only here.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, id: RoomId, seed: u64) -> Result<&mut Room, ActionError> {
        if self.rooms.contains_key(&id) {
            return Err(ActionError::RoomExists(id));
        }
        event!(
            target: "landlord_server::registry",
            Level::INFO,
            room = %id,
            seed,
            "room created"
        );
        Ok(self.rooms.entry(id.clone()).or_insert_with(|| Room::new(id, seed)))
    }

    pub fn get(&self, id: &RoomId) -> Result<&Room, ActionError> {
        self.rooms
            .get(id)
            .ok_or_else(|| ActionError::RoomNotFound(id.clone()))
    }

    pub fn get_mut(&mut self, id: &RoomId) -> Result<&mut Room, ActionError> {
        self.rooms
            .get_mut(id)
            .ok_or_else(|| ActionError::RoomNotFound(id.clone()))
    }

    pub fn evict(&mut self, id: &RoomId) -> Result<Room, ActionError> {
        let room = self
            .rooms
            .remove(id)
            .ok_or_else(|| ActionError::RoomNotFound(id.clone()))?;
        event!(
            target: "landlord_server::registry",
            Level::INFO,
            room = %id,
            "room evicted"
        );
        Ok(room)
    }

    pub fn contains(&self, id: &RoomId) -> bool {
        self.rooms.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &RoomId> {
        self.rooms.keys()
    }
}
