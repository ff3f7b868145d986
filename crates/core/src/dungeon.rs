//! Live dungeon: the room graph of the current level plus every piece of
//! mutable state hanging off it (rooms, doors, pending timers, the exit door).
//!
//! Rooms and doors live in slot-map arenas. Regenerating clears both arenas,
//! so handles from a previous level stop resolving instead of aliasing rooms
//! of the new one.

use std::collections::BTreeMap;

use slotmap::SlotMap;
use tracing::{debug, info};

use crate::config::DungeonConfig;
use crate::door::DoorController;
use crate::error::{DungeonError, Result};
use crate::generator::DungeonGenerator;
use crate::graph::DungeonGraph;
use crate::grid::GridBounds;
use crate::host::DungeonHost;
use crate::layout::{DungeonLayout, LayoutRoom};
use crate::rng::RandomSource;
use crate::room::Room;
use crate::schedule::{Scheduler, Task};
use crate::seed::generate_runtime_seed;
use crate::special_door::SpecialDoor;
use crate::types::{
    Direction, DoorId, DungeonEvent, EnemyHandle, GridPos, RoomId, RoomType, WorldPos,
};

mod encounters;
mod exit;
mod hash;
mod transitions;

pub use encounters::EnemyDefeat;

pub struct Dungeon {
    config: DungeonConfig,
    seed: u64,
    rng: RandomSource,
    graph: DungeonGraph,
    rooms: SlotMap<RoomId, Room>,
    doors: SlotMap<DoorId, DoorController>,
    door_index: BTreeMap<(GridPos, Direction), DoorId>,
    enemy_rooms: BTreeMap<EnemyHandle, RoomId>,
    scheduler: Scheduler,
    special_door: SpecialDoor,
    current_room: Option<RoomId>,
    // Set once per level; guards against a second next-floor request.
    floor_advanced: bool,
    floor_request_pending: bool,
    // A door transfer was dropped by regeneration while input was frozen.
    input_release_pending: bool,
    log: Vec<DungeonEvent>,
}

impl Dungeon {
    /// Validates `config` and returns an empty dungeon. Call [`Self::generate`]
    /// (or one of its variants) before playing.
    pub fn new(config: DungeonConfig) -> Result<Self> {
        config.validate()?;
        let bounds = GridBounds::for_max_rooms(config.max_rooms);
        Ok(Self {
            seed: config.seed,
            rng: RandomSource::new(config.seed),
            graph: DungeonGraph::new(bounds),
            config,
            rooms: SlotMap::with_key(),
            doors: SlotMap::with_key(),
            door_index: BTreeMap::new(),
            enemy_rooms: BTreeMap::new(),
            scheduler: Scheduler::new(),
            special_door: SpecialDoor::default(),
            current_room: None,
            floor_advanced: false,
            floor_request_pending: false,
            input_release_pending: false,
            log: Vec::new(),
        })
    }

    /// Replaces the current level with a fresh layout grown from `seed`.
    /// The random stream keeps running afterwards and feeds enemy spawns.
    ///
    /// On error the previous level is left untouched.
    pub fn generate(&mut self, seed: u64) -> Result<()> {
        let generator = DungeonGenerator::new(&self.config)?;
        let mut rng = RandomSource::new(seed);
        let layout = generator.generate(&mut rng);
        self.commit(&layout, rng)
    }

    /// Regenerates with a runtime seed and returns the seed used.
    pub fn regenerate(&mut self) -> Result<u64> {
        let seed = generate_runtime_seed();
        self.generate(seed)?;
        Ok(seed)
    }

    pub fn regenerate_with_seed(&mut self, seed: u64) -> Result<()> {
        self.generate(seed)
    }

    /// Installs a prebuilt layout, for example one loaded from disk. Spawn
    /// draws come from a stream seeded with `layout.seed`.
    pub fn install(&mut self, layout: &DungeonLayout) -> Result<()> {
        layout.check().map_err(|reason| DungeonError::InvalidLayout { reason })?;
        self.commit(layout, RandomSource::new(layout.seed))
    }

    fn commit(&mut self, layout: &DungeonLayout, rng: RandomSource) -> Result<()> {
        self.teardown();
        self.seed = layout.seed;
        self.rng = rng;

        let reach = layout
            .rooms
            .iter()
            .map(|room| room.position.x.abs().max(room.position.y.abs()))
            .max()
            .unwrap_or(0);
        let radius = GridBounds::for_max_rooms(self.config.max_rooms).radius().max(reach);
        self.graph = DungeonGraph::new(GridBounds::with_radius(radius));

        for planned in &layout.rooms {
            let id = self.rooms.insert(Room::new(planned.position, planned.room_type));
            if !self.graph.insert(planned.position, id) {
                return Err(DungeonError::InvalidLayout {
                    reason: format!("room {:?} could not be placed", planned.position),
                });
            }
            match planned.room_type {
                RoomType::Start if self.graph.start.is_none() => {
                    self.graph.start = Some(planned.position);
                }
                RoomType::Shop if self.graph.shop.is_none() => {
                    self.graph.shop = Some(planned.position);
                }
                RoomType::SpecialEvent if self.graph.special_event.is_none() => {
                    self.graph.special_event = Some(planned.position);
                }
                _ => {}
            }
        }
        self.setup_room_connections()?;

        let poll = self
            .scheduler
            .schedule(self.config.special_door.poll_interval_ticks, Task::PollSpecialDoor);
        self.special_door.poll = Some(poll);

        info!(seed = self.seed, rooms = self.graph.len(), "dungeon ready");
        self.log.push(DungeonEvent::Generated { seed: self.seed, rooms: self.graph.len() });
        Ok(())
    }

    /// Drops every room, door and pending timer of the current level.
    ///
    /// A transfer cut short here never re-enables input itself; that is left
    /// to [`Self::release_suspended_input`].
    fn teardown(&mut self) {
        if self.doors.values().any(DoorController::is_transitioning) {
            debug!("transition cancelled by teardown");
            self.input_release_pending = true;
        }
        self.scheduler.clear();
        self.rooms.clear();
        self.doors.clear();
        self.door_index.clear();
        self.enemy_rooms.clear();
        self.special_door = SpecialDoor::default();
        self.current_room = None;
        self.floor_advanced = false;
        self.floor_request_pending = false;
    }

    /// Sets each room's four connection flags from grid occupancy and creates
    /// a door for every connected side.
    fn setup_room_connections(&mut self) -> Result<()> {
        for &id in self.graph.room_ids() {
            let Some(room) = self.rooms.get_mut(id) else {
                return Err(DungeonError::UnknownRoom);
            };
            let pos = room.position();
            for direction in Direction::ALL {
                let connected = self.graph.get(pos.step(direction)).is_some();
                room.set_connection(direction, connected)?;
                if connected {
                    let door = self.doors.insert(DoorController::new(id, direction));
                    self.door_index.insert((pos, direction), door);
                }
            }
        }
        debug!(doors = self.doors.len(), "room connections set");
        Ok(())
    }

    /// Advances the frame clock one tick and runs every task that fell due.
    /// All due tasks run even if one fails; the first failure is returned.
    pub fn tick(&mut self, host: &mut impl DungeonHost) -> Result<()> {
        self.release_suspended_input(&mut *host);
        let mut first_error = None;
        for (timer, task) in self.scheduler.advance() {
            let outcome = match task {
                Task::SpawnEnemies { room } => {
                    self.spawn_enemies(room, timer, &mut *host);
                    Ok(())
                }
                Task::FinishTransition { door } => self.finish_transition(door, timer, &mut *host),
                Task::PollSpecialDoor => {
                    self.poll_special_door(timer);
                    Ok(())
                }
                Task::OpenSpecialDoor => {
                    self.open_special_door(timer);
                    Ok(())
                }
            };
            if let Err(err) = outcome
                && first_error.is_none()
            {
                first_error = Some(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn config(&self) -> &DungeonConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Ticks elapsed since construction. Not reset by regeneration.
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn log(&self) -> &[DungeonEvent] {
        &self.log
    }

    pub fn graph(&self) -> &DungeonGraph {
        &self.graph
    }

    pub fn room_count(&self) -> usize {
        self.graph.len()
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn room_id_at(&self, pos: GridPos) -> Option<RoomId> {
        self.graph.get(pos)
    }

    pub fn room_at(&self, pos: GridPos) -> Option<&Room> {
        self.room_id_at(pos).and_then(|id| self.rooms.get(id))
    }

    /// Rooms in creation order.
    pub fn rooms(&self) -> impl Iterator<Item = (RoomId, &Room)> + '_ {
        self.graph.room_ids().iter().filter_map(|&id| self.rooms.get(id).map(|room| (id, room)))
    }

    pub fn start_room_id(&self) -> Option<RoomId> {
        self.graph.start().and_then(|pos| self.graph.get(pos))
    }

    pub fn start_room(&self) -> Option<&Room> {
        self.graph.start().and_then(|pos| self.room_at(pos))
    }

    pub fn shop_room(&self) -> Option<&Room> {
        self.graph.shop().and_then(|pos| self.room_at(pos))
    }

    pub fn special_event_room(&self) -> Option<&Room> {
        self.graph.special_event().and_then(|pos| self.room_at(pos))
    }

    /// Vacuously true before the first generation.
    pub fn are_all_rooms_visited(&self) -> bool {
        self.rooms.values().all(Room::is_visited)
    }

    pub fn current_room(&self) -> Option<RoomId> {
        self.current_room
    }

    pub fn door(&self, id: DoorId) -> Option<&DoorController> {
        self.doors.get(id)
    }

    pub fn door_at(&self, room: GridPos, direction: Direction) -> Option<DoorId> {
        self.door_index.get(&(room, direction)).copied()
    }

    /// Doors ordered by (room position, direction).
    pub fn doors(&self) -> impl Iterator<Item = (DoorId, &DoorController)> + '_ {
        self.door_index.values().filter_map(|&id| self.doors.get(id).map(|door| (id, door)))
    }

    pub fn special_door(&self) -> &SpecialDoor {
        &self.special_door
    }

    pub fn room_center(&self, id: RoomId) -> Option<WorldPos> {
        self.rooms.get(id).map(|room| room.world_center(self.config.room_size))
    }

    pub fn door_world_position(&self, id: DoorId) -> Option<WorldPos> {
        let door = self.doors.get(id)?;
        let room = self.rooms.get(door.room())?;
        Some(room.door_position(door.direction(), self.config.room_size, self.config.room.door_inset))
    }

    /// Plain-data copy of the current level's structure.
    pub fn layout(&self) -> DungeonLayout {
        let rooms = self
            .rooms()
            .map(|(_, room)| LayoutRoom {
                position: room.position(),
                room_type: room.room_type(),
                connections: room.connections(),
            })
            .collect();
        DungeonLayout {
            seed: self.seed,
            rooms,
            start: self.graph.start().unwrap_or(GridPos::ORIGIN),
            shop: self.graph.shop(),
            special_event: self.graph.special_event(),
        }
    }
}
