//! Deferred bot turns.
//!
//! A task records the room, seat, phase and table version it was scheduled
//! for. Tasks are never cancelled: when one comes due the engine re-reads
//! the room and drops the task if any of those moved on.

use crate::action::RoomId;
use landlord_core::model::seat::Seat;
use landlord_core::model::table::{Phase, Table};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredTask {
    pub room_id: RoomId,
    pub seat: Seat,
    pub phase: Phase,
    pub version: u64,
    pub due_at_ms: u64,
}

impl DeferredTask {
    pub fn for_turn(room_id: RoomId, table: &Table, due_at_ms: u64) -> Self {
        Self {
            room_id,
            seat: table.current_seat(),
            phase: table.phase(),
            version: table.version(),
            due_at_ms,
        }
    }

    /// The table is still waiting on exactly the turn this task was made for.
    pub fn is_current(&self, table: &Table) -> bool {
        table.phase() == self.phase
            && table.current_seat() == self.seat
            && table.version() == self.version
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Queued {
    due_at_ms: u64,
    seq: u64,
    task: DeferredTask,
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due_at_ms, self.seq).cmp(&(other.due_at_ms, other.seq))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Due-time ordered queue; ties fire in scheduling order.
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<Queued>>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, task: DeferredTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Queued {
            due_at_ms: task.due_at_ms,
            seq,
            task,
        }));
    }

    /// Removes and returns every task due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Vec<DeferredTask> {
        let mut due = Vec::new();
        while let Some(Reverse(head)) = self.queue.peek() {
            if head.due_at_ms > now_ms {
                break;
            }
            if let Some(Reverse(queued)) = self.queue.pop() {
                due.push(queued.task);
            }
        }
        due
    }

    pub fn next_due(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse(head)| head.due_at_ms)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drops every task for `room_id`, used when a room is evicted.
    pub fn forget_room(&mut self, room_id: &RoomId) {
        self.queue.retain(|Reverse(queued)| &queued.task.room_id != room_id);
    }
}

#[cfg(test)]
mod tests {
    use super::{DeferredTask, Scheduler};
    use crate::action::RoomId;
    use landlord_core::model::seat::Seat;
    use landlord_core::model::table::{Phase, Table};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn task(room: &str, due: u64) -> DeferredTask {
        DeferredTask {
            room_id: RoomId::new(room),
            seat: Seat::First,
            phase: Phase::Bidding,
            version: 0,
            due_at_ms: due,
        }
    }

    #[test]
    fn pops_in_due_order_then_fifo() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(task("b", 20));
        scheduler.schedule(task("a", 10));
        scheduler.schedule(task("c", 10));
        assert_eq!(scheduler.next_due(), Some(10));
        assert!(scheduler.pop_due(5).is_empty());
        let due: Vec<String> = scheduler
            .pop_due(15)
            .into_iter()
            .map(|t| t.room_id.to_string())
            .collect();
        assert_eq!(due, vec!["a", "c"]);
        assert_eq!(scheduler.len(), 1);
        scheduler.forget_room(&RoomId::new("b"));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn task_goes_stale_when_table_moves() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut table = Table::new();
        table.start(&mut rng).unwrap();
        let pending = DeferredTask::for_turn(RoomId::new("r"), &table, 100);
        assert!(pending.is_current(&table));
        let seat = table.current_seat();
        table
            .bid(seat, landlord_core::model::table::BidChoice::Decline, &mut rng)
            .unwrap();
        assert!(!pending.is_current(&table));
    }
}
