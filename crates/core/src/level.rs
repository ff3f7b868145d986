//! Run-level flow: which level is being played, when the next one starts and
//! whether the run is over. Owns the [`Dungeon`] and drives it with host input.

use tracing::{debug, info};

use crate::config::DungeonConfig;
use crate::dungeon::{Dungeon, EnemyDefeat};
use crate::error::{DungeonError, Result};
use crate::host::DungeonHost;
use crate::journal::SessionInput;
use crate::seed::{derive_level_seed, resolve_seed};
use crate::special_door::SpecialDoorContact;

pub struct LevelFlow {
    run_seed: u64,
    current_level: u32,
    dungeon: Dungeon,
    game_over: bool,
    // Ticks left before the pending level starts.
    next_level_in: Option<u64>,
}

impl LevelFlow {
    /// Resolves the configured seed (0 picks a runtime seed) as the run seed.
    pub fn new(config: DungeonConfig) -> Result<Self> {
        let run_seed = resolve_seed(config.seed);
        Self::with_run_seed(config, run_seed)
    }

    pub fn with_run_seed(config: DungeonConfig, run_seed: u64) -> Result<Self> {
        Ok(Self {
            run_seed,
            current_level: 1,
            dungeon: Dungeon::new(config)?,
            game_over: false,
            next_level_in: None,
        })
    }

    pub fn run_seed(&self) -> u64 {
        self.run_seed
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_level_pending(&self) -> bool {
        self.next_level_in.is_some()
    }

    pub fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    pub fn dungeon_mut(&mut self) -> &mut Dungeon {
        &mut self.dungeon
    }

    /// Generates the current level, moves the player to the start room's
    /// center and enters it.
    pub fn start_new_level(&mut self, host: &mut impl DungeonHost) -> Result<()> {
        let seed = derive_level_seed(self.run_seed, self.current_level);
        self.dungeon.generate(seed)?;

        let start = self.dungeon.start_room_id().ok_or(DungeonError::UnknownRoom)?;
        let center = self.dungeon.room_center(start).ok_or(DungeonError::UnknownRoom)?;
        host.teleport_player(center);
        self.dungeon.release_suspended_input(&mut *host);
        self.dungeon.enter_room(start)?;
        info!(level = self.current_level, seed, rooms = self.dungeon.room_count(), "level started");
        Ok(())
    }

    /// Advances the level counter and queues the next level. Ignored while a
    /// level change is already pending or after game over.
    pub fn complete_level(&mut self) -> bool {
        if self.game_over || self.next_level_in.is_some() {
            return false;
        }
        self.current_level += 1;
        self.next_level_in = Some(self.dungeon.config().level.next_level_delay_ticks.max(1));
        info!(next_level = self.current_level, "level complete");
        true
    }

    pub fn player_died(&mut self) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        self.next_level_in = None;
        info!(level = self.current_level, "game over");
    }

    pub fn touch_special_door(&mut self) -> SpecialDoorContact {
        let contact = self.dungeon.special_door_contact();
        if contact == SpecialDoorContact::LevelComplete {
            self.complete_level();
        }
        contact
    }

    /// One frame: dungeon timers first, then the level countdown. Nothing runs
    /// after game over.
    pub fn tick(&mut self, host: &mut impl DungeonHost) -> Result<()> {
        if self.game_over {
            return Ok(());
        }
        let outcome = self.dungeon.tick(&mut *host);
        self.collect_floor_request();

        if let Some(left) = self.next_level_in {
            if left <= 1 {
                self.next_level_in = None;
                self.start_new_level(host)?;
            } else {
                self.next_level_in = Some(left - 1);
            }
        }
        outcome
    }

    fn collect_floor_request(&mut self) {
        if self.dungeon.take_floor_request() {
            self.complete_level();
        }
    }

    /// Applies one recorded session input.
    pub fn apply(&mut self, input: &SessionInput, host: &mut impl DungeonHost) -> Result<()> {
        match *input {
            SessionInput::Advance { frames } => {
                for _ in 0..frames {
                    self.tick(&mut *host)?;
                }
            }
            SessionInput::TouchDoor { room, direction } => {
                let contact = self.dungeon.door_contact_at(room, direction, &mut *host)?;
                debug!(?room, ?direction, ?contact, "door touched");
            }
            SessionInput::TouchSpecialDoor => {
                self.touch_special_door();
            }
            SessionInput::DefeatEnemy { enemy } => {
                if let EnemyDefeat::RoomCleared { .. } = self.dungeon.defeat_enemy(enemy) {
                    self.collect_floor_request();
                }
            }
            SessionInput::DefeatAllInRoom { room } => {
                let id = self.dungeon.room_id_at(room).ok_or(DungeonError::UnknownRoom)?;
                self.dungeon.defeat_all_in_room(id)?;
                self.collect_floor_request();
            }
            SessionInput::PlayerDied => self.player_died(),
        }
        Ok(())
    }
}
