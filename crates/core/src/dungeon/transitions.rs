//! Door contact and the timed player transfer between adjacent rooms.

use std::mem;

use tracing::{debug, error};

use super::*;
use crate::door::{DoorContact, DoorController, DoorState, arrival_offset};
use crate::host::PlayerTransport;
use crate::types::TimerId;

impl Dungeon {
    /// Player touched `door`. Blocked doors refuse. While any transfer is
    /// running the touch is ignored, since there is only one player to move.
    /// Otherwise input is frozen and the transfer finishes after the
    /// configured transition delay.
    pub fn door_contact(
        &mut self,
        door: DoorId,
        transport: &mut impl PlayerTransport,
    ) -> Result<DoorContact> {
        let controller = self.doors.get(door).ok_or(DungeonError::UnknownDoor)?;
        let direction = controller.direction();
        let parent = self.rooms.get(controller.room()).ok_or(DungeonError::UnknownRoom)?;
        let from = parent.position();

        if parent.are_doors_blocked() {
            debug!(?from, ?direction, "door blocked");
            self.log.push(DungeonEvent::DoorBlocked { room: from, direction });
            return Ok(DoorContact::Blocked);
        }
        if self.doors.values().any(DoorController::is_transitioning) {
            return Ok(DoorContact::Ignored);
        }

        let target_pos = from.step(direction);
        let Some(target) = self.graph.get(target_pos) else {
            error!(?from, ?direction, "door leads nowhere");
            return Err(DungeonError::MissingNeighbour { from, direction, target: target_pos });
        };

        transport.set_input_enabled(false);
        let timer = self
            .scheduler
            .schedule(self.config.door.transition_ticks, Task::FinishTransition { door });
        if let Some(controller) = self.doors.get_mut(door) {
            controller.state = DoorState::Transitioning { target, timer };
        }
        debug!(?from, ?direction, "transition started");
        self.log.push(DungeonEvent::TransitionStarted { from, direction });
        Ok(DoorContact::Started)
    }

    /// Same as [`Self::door_contact`], addressing the door by room and side.
    pub fn door_contact_at(
        &mut self,
        room: GridPos,
        direction: Direction,
        transport: &mut impl PlayerTransport,
    ) -> Result<DoorContact> {
        let door = self.door_at(room, direction).ok_or(DungeonError::UnknownDoor)?;
        self.door_contact(door, transport)
    }

    /// Re-enables input frozen by a transfer that regeneration cancelled.
    /// Returns whether anything was released. Also runs at the start of every
    /// [`Self::tick`].
    pub fn release_suspended_input(&mut self, transport: &mut impl PlayerTransport) -> bool {
        if !mem::take(&mut self.input_release_pending) {
            return false;
        }
        transport.set_input_enabled(true);
        debug!("input released after cancelled transition");
        true
    }

    pub(super) fn finish_transition(
        &mut self,
        door: DoorId,
        timer: TimerId,
        transport: &mut impl PlayerTransport,
    ) -> Result<()> {
        let Some(controller) = self.doors.get_mut(door) else {
            return Ok(());
        };
        let DoorState::Transitioning { target, timer: active } = controller.state else {
            return Ok(());
        };
        if active != timer {
            return Ok(());
        }
        controller.state = DoorState::Idle;
        let entry_side = controller.entry_side();
        let direction = controller.direction();
        let parent = controller.room();

        let Some(next) = self.rooms.get(target) else {
            let from = self.rooms.get(parent).map(Room::position).unwrap_or_default();
            error!(?from, ?direction, "transition target vanished");
            transport.set_input_enabled(true);
            return Err(DungeonError::MissingNeighbour {
                from,
                direction,
                target: from.step(direction),
            });
        };

        let anchor =
            next.door_position(entry_side, self.config.room_size, self.config.room.door_inset);
        let arrival = anchor + arrival_offset(entry_side, self.config.door.player_offset);
        let to = next.position();
        transport.teleport_player(arrival);
        transport.set_input_enabled(true);
        debug!(?to, x = arrival.x, y = arrival.y, "transition finished");
        self.log.push(DungeonEvent::TransitionFinished { to });

        self.enter_room(target)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::DungeonConfig;
    use crate::host::SimulatedHost;
    use crate::layout::DungeonLayout;
    use crate::types::{GridPos, RoomType, WorldPos};

    use super::*;

    fn two_rooms(config: DungeonConfig) -> Dungeon {
        let layout = DungeonLayout::from_placements(
            1,
            &[(GridPos::new(0, 0), RoomType::Start), (GridPos::new(0, 1), RoomType::Shop)],
        );
        let mut dungeon = Dungeon::new(config).expect("config");
        dungeon.install(&layout).expect("install");
        dungeon
    }

    #[test]
    fn upward_transition_lands_below_the_arrival_door() {
        let mut dungeon = two_rooms(DungeonConfig::default());
        let mut host = SimulatedHost::new();
        let start = dungeon.start_room_id().expect("start");
        dungeon.enter_room(start).expect("enter");

        let contact = dungeon
            .door_contact_at(GridPos::ORIGIN, Direction::Up, &mut host)
            .expect("contact");
        assert_eq!(contact, DoorContact::Started);
        assert!(!host.input_enabled);

        for _ in 0..dungeon.config().door.transition_ticks {
            dungeon.tick(&mut host).expect("tick");
        }
        // Shop at (0, 1): center (0, 11), bottom door anchor (0, 6.5), offset (0, 1.5).
        assert_eq!(host.player_position, WorldPos::new(0.0, 8.0));
        assert!(host.input_enabled);
        let shop = dungeon.room_id_at(GridPos::new(0, 1)).expect("shop");
        assert_eq!(dungeon.current_room(), Some(shop));
        assert!(dungeon.room(shop).expect("room").is_visited());
    }

    #[test]
    fn second_touch_during_transition_is_ignored() {
        let mut dungeon = two_rooms(DungeonConfig::default());
        let mut host = SimulatedHost::new();
        let door = dungeon.door_at(GridPos::ORIGIN, Direction::Up).expect("door");

        assert_eq!(dungeon.door_contact(door, &mut host).expect("first"), DoorContact::Started);
        assert_eq!(dungeon.door_contact(door, &mut host).expect("second"), DoorContact::Ignored);
        assert_eq!(dungeon.pending_tasks(), 2);
    }

    #[test]
    fn unconnected_side_has_no_door() {
        let mut dungeon = two_rooms(DungeonConfig::default());
        let mut host = SimulatedHost::new();
        let err = dungeon
            .door_contact_at(GridPos::ORIGIN, Direction::Left, &mut host)
            .expect_err("no door on the left");
        assert!(matches!(err, DungeonError::UnknownDoor));
    }
}
