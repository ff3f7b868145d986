//! Frame-tick task queue for delayed spawns, door transfers and exit checks.
//!
//! Each scheduled task is addressed by a versioned [`TimerId`]; cancelling a
//! task or clearing the queue invalidates its handle, so a stale handle held
//! by a destroyed room can never fire.

use slotmap::SlotMap;

use crate::types::{DoorId, RoomId, TimerId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    SpawnEnemies { room: RoomId },
    FinishTransition { door: DoorId },
    PollSpecialDoor,
    OpenSpecialDoor,
}

#[derive(Clone, Copy, Debug)]
struct Scheduled {
    due: u64,
    seq: u64,
    task: Task,
}

#[derive(Default)]
pub struct Scheduler {
    now: u64,
    next_seq: u64,
    timers: SlotMap<TimerId, Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Runs `task` on the tick `delay` ticks from now; a zero delay fires on the next tick.
    pub fn schedule(&mut self, delay: u64, task: Task) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let due = self.now + delay.max(1);
        self.timers.insert(Scheduled { due, seq, task })
    }

    pub fn cancel(&mut self, timer: TimerId) -> bool {
        self.timers.remove(timer).is_some()
    }

    pub fn is_pending(&self, timer: TimerId) -> bool {
        self.timers.contains_key(timer)
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Advances one tick and removes the tasks that became due, ordered by
    /// due tick and then by scheduling order.
    pub fn advance(&mut self) -> Vec<(TimerId, Task)> {
        self.now += 1;
        let now = self.now;

        let mut due: Vec<(TimerId, Scheduled)> = self
            .timers
            .iter()
            .filter(|(_, scheduled)| scheduled.due <= now)
            .map(|(id, scheduled)| (id, *scheduled))
            .collect();
        due.sort_by_key(|(_, scheduled)| (scheduled.due, scheduled.seq));

        for (id, _) in &due {
            self.timers.remove(*id);
        }
        due.into_iter().map(|(id, scheduled)| (id, scheduled.task)).collect()
    }
}
