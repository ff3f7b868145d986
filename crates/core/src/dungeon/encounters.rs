//! Room entry, delayed enemy spawning and clear detection.

use std::mem;

use tracing::{debug, info, warn};

use super::*;
use crate::host::EnemySpawner;
use crate::room::EnemyRelease;
use crate::types::TimerId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyDefeat {
    /// The handle does not belong to any live room.
    Untracked,
    Remaining(usize),
    RoomCleared {
        /// True when this clear finished the level.
        floor_completed: bool,
    },
}

impl Dungeon {
    /// Records the player entering `room`. Only the first entry has effects:
    /// the room is marked visited and, if it hosts enemies that are not yet
    /// cleared, a spawn is scheduled after the configured delay.
    ///
    /// Returns whether this was the first visit.
    pub fn enter_room(&mut self, room: RoomId) -> Result<bool> {
        let spawn_delay = self.config.room.spawn_delay_ticks;
        let Some(entry) = self.rooms.get_mut(room) else {
            return Err(DungeonError::UnknownRoom);
        };
        self.current_room = Some(room);
        if !entry.mark_visited() {
            return Ok(false);
        }

        let pos = entry.position();
        if entry.needs_enemies() {
            let timer = self.scheduler.schedule(spawn_delay, Task::SpawnEnemies { room });
            entry.pending_spawn = Some(timer);
        }
        debug!(?pos, room_type = ?entry.room_type(), "room entered");
        self.log.push(DungeonEvent::RoomEntered { room: pos });
        Ok(true)
    }

    pub(super) fn spawn_enemies(
        &mut self,
        room: RoomId,
        timer: TimerId,
        spawner: &mut impl EnemySpawner,
    ) {
        let Some(entry) = self.rooms.get_mut(room) else {
            return;
        };
        if entry.pending_spawn != Some(timer) {
            return;
        }
        entry.pending_spawn = None;

        let range = entry.enemy_spawn_range(&self.config.room);
        let count = self.rng.range_inclusive(*range.start(), *range.end());
        let center = entry.world_center(self.config.room_size);
        let pos = entry.position();

        for _ in 0..count {
            let Some(&template) = self.rng.choose(&self.config.room.enemy_templates) else {
                break;
            };
            let Some(&offset) = self.rng.choose(&self.config.room.spawn_points) else {
                break;
            };
            let handle = spawner.spawn_enemy(template, center + offset);
            entry.track_enemy(handle);
            self.enemy_rooms.insert(handle, room);
        }

        let spawned = entry.active_enemy_count();
        if spawned == 0 {
            entry.mark_cleared();
            debug!(?pos, "no enemies drawn, room cleared");
            self.on_room_cleared(room);
            return;
        }
        entry.block_doors();
        debug!(?pos, count = spawned, "enemies spawned, doors blocked");
        self.log.push(DungeonEvent::EnemiesSpawned { room: pos, count: spawned });
    }

    /// Removes a defeated enemy from its room. Clearing the last one unblocks
    /// the room's doors and may complete the level.
    pub fn defeat_enemy(&mut self, enemy: EnemyHandle) -> EnemyDefeat {
        let Some(room) = self.enemy_rooms.remove(&enemy) else {
            warn!(?enemy, "defeat reported for an untracked enemy");
            return EnemyDefeat::Untracked;
        };
        let Some(entry) = self.rooms.get_mut(room) else {
            return EnemyDefeat::Untracked;
        };
        match entry.release_enemy(enemy) {
            EnemyRelease::NotTracked => EnemyDefeat::Untracked,
            EnemyRelease::Remaining(left) => EnemyDefeat::Remaining(left),
            EnemyRelease::Cleared => {
                EnemyDefeat::RoomCleared { floor_completed: self.on_room_cleared(room) }
            }
        }
    }

    /// Defeats every enemy still tracked in `room`, in handle order.
    pub fn defeat_all_in_room(&mut self, room: RoomId) -> Result<Vec<EnemyDefeat>> {
        let Some(entry) = self.rooms.get(room) else {
            return Err(DungeonError::UnknownRoom);
        };
        let enemies: Vec<EnemyHandle> = entry.active_enemies().collect();
        Ok(enemies.into_iter().map(|enemy| self.defeat_enemy(enemy)).collect())
    }

    fn on_room_cleared(&mut self, room: RoomId) -> bool {
        let Some(entry) = self.rooms.get(room) else {
            return false;
        };
        let pos = entry.position();
        let room_type = entry.room_type();
        info!(?pos, "room cleared");
        self.log.push(DungeonEvent::RoomCleared { room: pos });

        if room_type == RoomType::SpecialEvent && self.are_all_rooms_visited() {
            return self.request_floor_advance(pos);
        }
        false
    }

    /// Raises the next-floor request at most once per level.
    fn request_floor_advance(&mut self, room: GridPos) -> bool {
        if self.floor_advanced {
            return false;
        }
        self.floor_advanced = true;
        self.floor_request_pending = true;
        info!(?room, "floor completed");
        self.log.push(DungeonEvent::FloorCompleted { room });
        true
    }

    /// Returns `true` once after the level has been completed.
    pub fn take_floor_request(&mut self) -> bool {
        mem::take(&mut self.floor_request_pending)
    }

    pub fn floor_advanced(&self) -> bool {
        self.floor_advanced
    }
}
