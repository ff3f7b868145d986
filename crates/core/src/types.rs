use std::ops::Add;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct RoomId;
    pub struct DoorId;
    pub struct TimerId;
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self { x: self.x + dx, y: self.y + dy }
    }

    /// Neighbours in direction-index order.
    pub fn neighbours(self) -> [Self; 4] {
        Direction::ALL.map(|direction| self.step(direction))
    }

    pub fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Cardinal door/neighbour direction. The discriminant is the index used by
/// connection tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

const DIRECTION_OFFSETS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
const OPPOSITE_INDEX: [usize; 4] = [2, 3, 0, 1];

impl Direction {
    pub const ALL: [Self; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub const fn offset(self) -> (i32, i32) {
        DIRECTION_OFFSETS[self.index()]
    }

    pub const fn opposite(self) -> Self {
        Self::ALL[OPPOSITE_INDEX[self.index()]]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for WorldPos {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoomType {
    Start,
    Normal,
    Shop,
    SpecialEvent,
}

impl RoomType {
    /// Start and shop rooms never receive enemies.
    pub fn hosts_enemies(self) -> bool {
        matches!(self, Self::Normal | Self::SpecialEvent)
    }
}

/// Host-assigned identity of a spawned enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnemyHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnemyTemplateId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DungeonEvent {
    Generated { seed: u64, rooms: usize },
    RoomEntered { room: GridPos },
    EnemiesSpawned { room: GridPos, count: usize },
    RoomCleared { room: GridPos },
    DoorBlocked { room: GridPos, direction: Direction },
    TransitionStarted { from: GridPos, direction: Direction },
    TransitionFinished { to: GridPos },
    FloorCompleted { room: GridPos },
    SpecialDoorUnlocked,
    SpecialDoorOpened,
}
