//! Grid-growth dungeon generation: frontier expansion from a start cell,
//! force-fill to the minimum size, then distance-constrained special rooms.

use tracing::debug;

use crate::config::DungeonConfig;
use crate::error::ConfigError;
use crate::grid::{CellGrid, GridBounds};
use crate::layout::DungeonLayout;
use crate::rng::RandomSource;
use crate::types::{GridPos, RoomType};

pub struct DungeonGenerator {
    min_rooms: usize,
    max_rooms: usize,
    min_distance_for_shop: u32,
    min_distance_for_special_event: u32,
}

impl DungeonGenerator {
    pub fn new(config: &DungeonConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            min_rooms: config.min_rooms,
            max_rooms: config.max_rooms,
            min_distance_for_shop: config.min_distance_for_shop,
            min_distance_for_special_event: config.min_distance_for_special_event,
        })
    }

    pub fn bounds(&self) -> GridBounds {
        GridBounds::for_max_rooms(self.max_rooms)
    }

    /// Draws, in order: target size, frontier picks, force-fill picks, shop,
    /// special event. The same stream state always yields the same layout.
    pub fn generate(&self, rng: &mut RandomSource) -> DungeonLayout {
        let mut placement = Placement::new(self.bounds());
        placement.place(GridPos::ORIGIN, RoomType::Start);

        let rooms_to_generate = rng.range_inclusive(self.min_rooms, self.max_rooms);
        grow(&mut placement, rng, rooms_to_generate);
        if placement.len() < self.min_rooms {
            force_fill(&mut placement, rng, self.min_rooms);
        }
        self.select_special_rooms(&mut placement, rng);

        let layout = DungeonLayout::from_placements(rng.seed(), &placement.rooms);
        debug!(
            seed = layout.seed,
            rooms = layout.rooms.len(),
            shop = ?layout.shop,
            special_event = ?layout.special_event,
            "generated dungeon"
        );
        layout
    }

    fn select_special_rooms(&self, placement: &mut Placement, rng: &mut RandomSource) {
        let mut shop_candidates = Vec::new();
        let mut event_candidates = Vec::new();
        for (index, &(pos, room_type)) in placement.rooms.iter().enumerate() {
            if room_type == RoomType::Start {
                continue;
            }
            let distance = pos.manhattan(GridPos::ORIGIN);
            if distance >= self.min_distance_for_shop {
                shop_candidates.push(index);
            }
            if distance >= self.min_distance_for_special_event {
                event_candidates.push(index);
            }
        }

        match rng.choose(&shop_candidates).copied() {
            Some(shop) => {
                placement.rooms[shop].1 = RoomType::Shop;
                event_candidates.retain(|&index| index != shop);
            }
            None => debug!(min_distance = self.min_distance_for_shop, "no shop candidate"),
        }

        match rng.choose(&event_candidates).copied() {
            Some(event) => placement.rooms[event].1 = RoomType::SpecialEvent,
            None => debug!(
                min_distance = self.min_distance_for_special_event,
                "no special event candidate"
            ),
        }
    }
}

struct Placement {
    grid: CellGrid<usize>,
    rooms: Vec<(GridPos, RoomType)>,
}

impl Placement {
    fn new(bounds: GridBounds) -> Self {
        Self { grid: CellGrid::new(bounds), rooms: Vec::new() }
    }

    fn len(&self) -> usize {
        self.rooms.len()
    }

    fn place(&mut self, pos: GridPos, room_type: RoomType) {
        if self.grid.insert(pos, self.rooms.len()) {
            self.rooms.push((pos, room_type));
        }
    }

    /// Empty in-bounds cells next to a placed room, in room then direction order.
    fn open_neighbours(&self) -> Vec<GridPos> {
        let mut open = Vec::new();
        for &(pos, _) in &self.rooms {
            for neighbour in pos.neighbours() {
                if self.grid.is_free(neighbour) && !open.contains(&neighbour) {
                    open.push(neighbour);
                }
            }
        }
        open
    }
}

fn grow(placement: &mut Placement, rng: &mut RandomSource, rooms_to_generate: usize) {
    let mut frontier: Vec<GridPos> = GridPos::ORIGIN.neighbours().to_vec();

    while placement.len() < rooms_to_generate && !frontier.is_empty() {
        let pos = frontier.remove(rng.index(frontier.len()));
        if !placement.grid.is_free(pos) || !placement.grid.has_occupied_neighbour(pos) {
            continue;
        }

        placement.place(pos, RoomType::Normal);
        for neighbour in pos.neighbours() {
            if placement.grid.is_free(neighbour) && !frontier.contains(&neighbour) {
                frontier.push(neighbour);
            }
        }
    }
}

/// Single pass: candidates are the open cells around the rooms placed so far.
/// Rooms added here do not extend the candidate list.
fn force_fill(placement: &mut Placement, rng: &mut RandomSource, min_rooms: usize) {
    let mut candidates = placement.open_neighbours();
    while placement.len() < min_rooms && !candidates.is_empty() {
        let pos = candidates.remove(rng.index(candidates.len()));
        placement.place(pos, RoomType::Normal);
    }
    if placement.len() < min_rooms {
        debug!(rooms = placement.len(), min_rooms, "force fill ran out of cells");
    }
}
