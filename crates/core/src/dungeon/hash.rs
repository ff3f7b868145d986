//! Stable snapshot hashing for deterministic verification.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::*;
use crate::door::DoorState;
use crate::special_door::SpecialDoorState;

impl Dungeon {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(self.scheduler.now());
        hasher.write_u64(self.rng.draws());
        hasher.write_u64(self.scheduler.pending() as u64);
        hasher.write_u8(u8::from(self.floor_advanced));
        hasher.write_u8(u8::from(self.input_release_pending));

        for (_, room) in self.rooms() {
            hasher.write_i32(room.position().x);
            hasher.write_i32(room.position().y);
            hasher.write_u8(room.room_type() as u8);
            hasher.write_u8(u8::from(room.is_visited()));
            hasher.write_u8(u8::from(room.enemies_cleared()));
            hasher.write_u8(u8::from(room.are_doors_blocked()));
            hasher.write_u8(u8::from(room.has_pending_spawn()));
            hasher.write_u32(room.active_enemy_count() as u32);
            for enemy in room.active_enemies() {
                hasher.write_u64(enemy.0);
            }
        }

        for (_, door) in self.doors() {
            hasher.write_u8(match door.state() {
                DoorState::Idle => 0,
                DoorState::Transitioning { .. } => 1,
            });
        }

        hasher.write_u8(match self.special_door.state() {
            SpecialDoorState::Locked => 0,
            SpecialDoorState::Unlocking { .. } => 1,
            SpecialDoorState::Open => 2,
        });
        if let Some(room) = self.current_room.and_then(|id| self.rooms.get(id)) {
            hasher.write_i32(room.position().x);
            hasher.write_i32(room.position().y);
        }
        hasher.finish()
    }
}
