//! The level exit: polls for a fully explored dungeon, then opens after a delay.

use tracing::{debug, info};

use super::*;
use crate::special_door::{SpecialDoorContact, SpecialDoorState};
use crate::types::TimerId;

impl Dungeon {
    pub(super) fn poll_special_door(&mut self, timer: TimerId) {
        if self.special_door.poll != Some(timer) {
            return;
        }
        self.special_door.poll = None;
        if self.special_door.state != SpecialDoorState::Locked {
            return;
        }

        if self.are_all_rooms_visited() {
            let open = self
                .scheduler
                .schedule(self.config.special_door.unlock_delay_ticks, Task::OpenSpecialDoor);
            self.special_door.state = SpecialDoorState::Unlocking { timer: open };
            info!("every room visited, exit unlocking");
            self.log.push(DungeonEvent::SpecialDoorUnlocked);
        } else {
            let next = self
                .scheduler
                .schedule(self.config.special_door.poll_interval_ticks, Task::PollSpecialDoor);
            self.special_door.poll = Some(next);
        }
    }

    pub(super) fn open_special_door(&mut self, timer: TimerId) {
        if self.special_door.state != (SpecialDoorState::Unlocking { timer }) {
            return;
        }
        self.special_door.state = SpecialDoorState::Open;
        debug!("exit open");
        self.log.push(DungeonEvent::SpecialDoorOpened);
    }

    /// Player touched the exit. Only an open exit completes the level.
    pub fn special_door_contact(&self) -> SpecialDoorContact {
        let contact = self.special_door.contact();
        if contact != SpecialDoorContact::LevelComplete {
            debug!(?contact, "exit not open yet");
        }
        contact
    }
}
