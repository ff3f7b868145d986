//! Contracts with the embedding engine, plus a recording host used by replay,
//! fuzzing and tests.

use crate::types::{EnemyHandle, EnemyTemplateId, WorldPos};

pub trait EnemySpawner {
    fn spawn_enemy(&mut self, template: EnemyTemplateId, at: WorldPos) -> EnemyHandle;
}

pub trait PlayerTransport {
    fn teleport_player(&mut self, at: WorldPos);
    fn set_input_enabled(&mut self, enabled: bool);
}

pub trait DungeonHost: EnemySpawner + PlayerTransport {}

impl<T: EnemySpawner + PlayerTransport> DungeonHost for T {}

#[derive(Clone, Debug, PartialEq)]
pub struct SpawnedEnemy {
    pub handle: EnemyHandle,
    pub template: EnemyTemplateId,
    pub at: WorldPos,
}

/// Host that hands out sequential enemy handles and records every request.
#[derive(Clone, Debug)]
pub struct SimulatedHost {
    next_enemy: u64,
    pub spawned: Vec<SpawnedEnemy>,
    pub player_position: WorldPos,
    pub input_enabled: bool,
    pub teleports: usize,
    pub input_toggles: usize,
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self {
            next_enemy: 1,
            spawned: Vec::new(),
            player_position: WorldPos::default(),
            input_enabled: true,
            teleports: 0,
            input_toggles: 0,
        }
    }
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EnemySpawner for SimulatedHost {
    fn spawn_enemy(&mut self, template: EnemyTemplateId, at: WorldPos) -> EnemyHandle {
        let handle = EnemyHandle(self.next_enemy);
        self.next_enemy += 1;
        self.spawned.push(SpawnedEnemy { handle, template, at });
        handle
    }
}

impl PlayerTransport for SimulatedHost {
    fn teleport_player(&mut self, at: WorldPos) {
        self.player_position = at;
        self.teleports += 1;
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        self.input_toggles += 1;
    }
}
