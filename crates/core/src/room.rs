//! Per-cell room state: connections, visit tracking, enemy bookkeeping and
//! door blocking. Side effects (spawning, timers) live in `Dungeon`.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use crate::config::RoomConfig;
use crate::error::{DungeonError, Result};
use crate::types::{Direction, EnemyHandle, GridPos, RoomType, TimerId, WorldPos};

#[derive(Clone, Debug)]
pub struct Room {
    position: GridPos,
    room_type: RoomType,
    connections: [bool; 4],
    connections_set: [bool; 4],
    visited: bool,
    enemies_cleared: bool,
    doors_blocked: bool,
    active_enemies: BTreeSet<EnemyHandle>,
    pub(crate) pending_spawn: Option<TimerId>,
}

/// What happened to a room when one of its enemies was defeated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyRelease {
    NotTracked,
    Remaining(usize),
    Cleared,
}

impl Room {
    pub fn new(position: GridPos, room_type: RoomType) -> Self {
        Self {
            position,
            room_type,
            connections: [false; 4],
            connections_set: [false; 4],
            visited: false,
            enemies_cleared: !room_type.hosts_enemies(),
            doors_blocked: false,
            active_enemies: BTreeSet::new(),
            pending_spawn: None,
        }
    }

    pub fn position(&self) -> GridPos {
        self.position
    }

    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub fn enemies_cleared(&self) -> bool {
        self.enemies_cleared
    }

    pub fn are_doors_blocked(&self) -> bool {
        self.doors_blocked
    }

    pub fn has_connection(&self, direction: Direction) -> bool {
        self.connections[direction.index()]
    }

    pub fn connections(&self) -> [bool; 4] {
        self.connections
    }

    pub fn active_enemies(&self) -> impl Iterator<Item = EnemyHandle> + '_ {
        self.active_enemies.iter().copied()
    }

    pub fn active_enemy_count(&self) -> usize {
        self.active_enemies.len()
    }

    pub fn has_pending_spawn(&self) -> bool {
        self.pending_spawn.is_some()
    }

    pub fn set_connection(&mut self, direction: Direction, connected: bool) -> Result<()> {
        let slot = direction.index();
        if self.connections_set[slot] {
            return Err(DungeonError::ConnectionAlreadySet { room: self.position, direction });
        }
        self.connections_set[slot] = true;
        self.connections[slot] = connected;
        Ok(())
    }

    /// Marks the first visit. Returns `true` only on that first call.
    pub(crate) fn mark_visited(&mut self) -> bool {
        if self.visited {
            return false;
        }
        self.visited = true;
        true
    }

    pub fn needs_enemies(&self) -> bool {
        self.room_type.hosts_enemies() && !self.enemies_cleared
    }

    pub fn enemy_spawn_range(&self, config: &RoomConfig) -> RangeInclusive<usize> {
        if self.room_type.hosts_enemies() {
            config.min_enemies..=config.max_enemies
        } else {
            0..=0
        }
    }

    pub(crate) fn track_enemy(&mut self, enemy: EnemyHandle) {
        self.active_enemies.insert(enemy);
    }

    pub(crate) fn block_doors(&mut self) {
        self.doors_blocked = true;
    }

    pub(crate) fn mark_cleared(&mut self) {
        self.enemies_cleared = true;
        self.doors_blocked = false;
    }

    pub(crate) fn release_enemy(&mut self, enemy: EnemyHandle) -> EnemyRelease {
        if !self.active_enemies.remove(&enemy) {
            return EnemyRelease::NotTracked;
        }
        if self.active_enemies.is_empty() {
            self.mark_cleared();
            EnemyRelease::Cleared
        } else {
            EnemyRelease::Remaining(self.active_enemies.len())
        }
    }

    pub fn world_center(&self, room_size: WorldPos) -> WorldPos {
        WorldPos::new(self.position.x as f32 * room_size.x, self.position.y as f32 * room_size.y)
    }

    /// World anchor of the door on `direction`'s wall.
    pub fn door_position(&self, direction: Direction, room_size: WorldPos, inset: f32) -> WorldPos {
        let (dx, dy) = direction.offset();
        let reach = WorldPos::new(room_size.x / 2.0 - inset, room_size.y / 2.0 - inset);
        self.world_center(room_size) + WorldPos::new(dx as f32 * reach.x, dy as f32 * reach.y)
    }
}
