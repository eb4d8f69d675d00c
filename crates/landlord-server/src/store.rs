use crate::action::RoomId;
use landlord_core::game::snapshot::TableSnapshot;
use std::collections::HashMap;
use tracing::{Level, event};

/// Per-room snapshot persistence for reconnection.
pub trait SnapshotStore: Send {
    fn save(&mut self, room_id: &RoomId, snapshot: TableSnapshot);

    fn get(&self, room_id: &RoomId) -> Option<&TableSnapshot>;

    fn clear(&mut self, room_id: &RoomId) -> Option<TableSnapshot>;
}

/// Last writer wins; writes for a room are sequential.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: HashMap<RoomId, TableSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&mut self, room_id: &RoomId, snapshot: TableSnapshot) {
        event!(
            target: "landlord_server::store",
            Level::TRACE,
            room = %room_id,
            phase = %snapshot.phase,
            version = snapshot.version,
            "snapshot saved"
        );
        self.snapshots.insert(room_id.clone(), snapshot);
    }

    fn get(&self, room_id: &RoomId) -> Option<&TableSnapshot> {
        self.snapshots.get(room_id)
    }

    fn clear(&mut self, room_id: &RoomId) -> Option<TableSnapshot> {
        event!(
            target: "landlord_server::store",
            Level::TRACE,
            room = %room_id,
            "snapshot cleared"
        );
        self.snapshots.remove(room_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryStore, SnapshotStore};
    use crate::action::RoomId;
    use landlord_core::model::table::Table;

    #[test]
    fn last_writer_wins() {
        let mut store = MemoryStore::new();
        let room = RoomId::new("r1");
        let table = Table::new();
        store.save(&room, table.snapshot(1));
        store.save(&room, table.snapshot(2));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&room).map(|s| s.saved_at), Some(2));
        assert!(store.clear(&room).is_some());
        assert!(store.get(&room).is_none());
        assert!(store.is_empty());
    }
}
