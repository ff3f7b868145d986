//! One door per (room, connected direction) and its transition state machine.

use crate::types::{Direction, RoomId, TimerId, WorldPos};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoorState {
    Idle,
    Transitioning { target: RoomId, timer: TimerId },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoorContact {
    /// Parent room still has enemies; nothing changed.
    Blocked,
    /// A transition through this door is already running.
    Ignored,
    Started,
}

#[derive(Clone, Debug)]
pub struct DoorController {
    room: RoomId,
    direction: Direction,
    pub(crate) state: DoorState,
}

impl DoorController {
    pub fn new(room: RoomId, direction: Direction) -> Self {
        Self { room, direction, state: DoorState::Idle }
    }

    pub fn room(&self) -> RoomId {
        self.room
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.state, DoorState::Transitioning { .. })
    }

    /// Side of the destination room the player comes through.
    pub fn entry_side(&self) -> Direction {
        self.direction.opposite()
    }
}

/// Mirrors the configured arrival offset for the side the player enters from:
/// entering from the top flips `y`, entering from the right flips `x`.
pub fn arrival_offset(entry_side: Direction, offset: WorldPos) -> WorldPos {
    match entry_side {
        Direction::Up => WorldPos::new(offset.x, -offset.y),
        Direction::Right => WorldPos::new(-offset.x, offset.y),
        Direction::Down | Direction::Left => offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrival_offset_mirrors_per_entry_side() {
        let offset = WorldPos::new(2.0, 1.5);
        assert_eq!(arrival_offset(Direction::Up, offset), WorldPos::new(2.0, -1.5));
        assert_eq!(arrival_offset(Direction::Right, offset), WorldPos::new(-2.0, 1.5));
        assert_eq!(arrival_offset(Direction::Down, offset), offset);
        assert_eq!(arrival_offset(Direction::Left, offset), offset);
    }

    #[test]
    fn entry_side_is_opposite_of_door_direction() {
        let door = DoorController::new(RoomId::default(), Direction::Right);
        assert_eq!(door.entry_side(), Direction::Left);
        assert!(!door.is_transitioning());
    }
}
