//! Plain-data description of a generated dungeon: room placement, types and
//! derived connections. Produced by the generator, installed by `Dungeon`.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::types::{Direction, GridPos, RoomType};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRoom {
    pub position: GridPos,
    pub room_type: RoomType,
    /// Indexed by [`Direction::index`].
    pub connections: [bool; 4],
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonLayout {
    pub seed: u64,
    /// Creation order.
    pub rooms: Vec<LayoutRoom>,
    pub start: GridPos,
    pub shop: Option<GridPos>,
    pub special_event: Option<GridPos>,
}

impl DungeonLayout {
    /// Builds a layout from placed rooms, deriving every connection flag from
    /// adjacency. The first `Start` room becomes the start position.
    pub fn from_placements(seed: u64, placements: &[(GridPos, RoomType)]) -> Self {
        let occupied: BTreeMap<GridPos, RoomType> = placements.iter().copied().collect();
        let rooms = placements
            .iter()
            .map(|&(position, room_type)| LayoutRoom {
                position,
                room_type,
                connections: Direction::ALL
                    .map(|direction| occupied.contains_key(&position.step(direction))),
            })
            .collect();

        let first_of = |wanted: RoomType| {
            placements.iter().find(|(_, room_type)| *room_type == wanted).map(|(pos, _)| *pos)
        };

        Self {
            seed,
            rooms,
            start: first_of(RoomType::Start).unwrap_or(GridPos::ORIGIN),
            shop: first_of(RoomType::Shop),
            special_event: first_of(RoomType::SpecialEvent),
        }
    }

    pub fn room_at(&self, pos: GridPos) -> Option<&LayoutRoom> {
        self.rooms.iter().find(|room| room.position == pos)
    }

    /// Checks the structural invariants every installed dungeon relies on.
    pub fn check(&self) -> Result<(), String> {
        let mut positions = BTreeMap::new();
        for room in &self.rooms {
            if positions.insert(room.position, room.room_type).is_some() {
                return Err(format!("two rooms share position {:?}", room.position));
            }
        }

        let count_of = |wanted: RoomType| {
            self.rooms.iter().filter(|room| room.room_type == wanted).count()
        };
        if count_of(RoomType::Start) != 1 {
            return Err("exactly one start room is required".to_string());
        }
        if count_of(RoomType::Shop) > 1 || count_of(RoomType::SpecialEvent) > 1 {
            return Err("at most one shop and one special event room are allowed".to_string());
        }
        if positions.get(&self.start) != Some(&RoomType::Start) {
            return Err(format!("start position {:?} is not the start room", self.start));
        }

        for room in &self.rooms {
            for direction in Direction::ALL {
                let neighbour = positions.contains_key(&room.position.step(direction));
                if room.connections[direction.index()] != neighbour {
                    return Err(format!(
                        "connection {direction:?} of {:?} disagrees with adjacency",
                        room.position
                    ));
                }
            }
        }

        let reachable = self.reachable_from_start();
        if reachable != self.rooms.len() {
            return Err(format!(
                "{} of {} rooms are reachable from start",
                reachable,
                self.rooms.len()
            ));
        }
        Ok(())
    }

    /// Number of rooms reachable from start through connection flags.
    pub fn reachable_from_start(&self) -> usize {
        let by_pos: BTreeMap<GridPos, &LayoutRoom> =
            self.rooms.iter().map(|room| (room.position, room)).collect();
        if !by_pos.contains_key(&self.start) {
            return 0;
        }

        let mut seen = vec![self.start];
        let mut open = vec![self.start];
        while let Some(pos) = open.pop() {
            let Some(room) = by_pos.get(&pos) else {
                continue;
            };
            for direction in Direction::ALL {
                let next = pos.step(direction);
                if room.connections[direction.index()]
                    && by_pos.contains_key(&next)
                    && !seen.contains(&next)
                {
                    seen.push(next);
                    open.push(next);
                }
            }
        }
        seen.len()
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(self.seed.to_le_bytes());
        bytes.extend((self.rooms.len() as u32).to_le_bytes());
        for room in &self.rooms {
            bytes.extend(room.position.x.to_le_bytes());
            bytes.extend(room.position.y.to_le_bytes());
            bytes.push(match room.room_type {
                RoomType::Start => 0,
                RoomType::Normal => 1,
                RoomType::Shop => 2,
                RoomType::SpecialEvent => 3,
            });
            let mask = room
                .connections
                .iter()
                .enumerate()
                .fold(0_u8, |mask, (index, &open)| mask | (u8::from(open) << index));
            bytes.push(mask);
        }
        for special in [Some(self.start), self.shop, self.special_event] {
            match special {
                Some(pos) => {
                    bytes.push(1);
                    bytes.extend(pos.x.to_le_bytes());
                    bytes.extend(pos.y.to_le_bytes());
                }
                None => bytes.push(0),
            }
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }

    /// Text map, north up: `S` start, `$` shop, `!` special event, `#` normal,
    /// `-`/`|` connections.
    pub fn render_ascii(&self) -> String {
        let Some(min_x) = self.rooms.iter().map(|room| room.position.x).min() else {
            return String::new();
        };
        let max_x = self.rooms.iter().map(|room| room.position.x).max().unwrap_or(min_x);
        let min_y = self.rooms.iter().map(|room| room.position.y).min().unwrap_or(0);
        let max_y = self.rooms.iter().map(|room| room.position.y).max().unwrap_or(min_y);

        let mut out = String::new();
        for y in (min_y..=max_y).rev() {
            let mut room_line = String::new();
            let mut link_line = String::new();
            for x in min_x..=max_x {
                let room = self.room_at(GridPos::new(x, y));
                room_line.push(match room.map(|room| room.room_type) {
                    Some(RoomType::Start) => 'S',
                    Some(RoomType::Shop) => '$',
                    Some(RoomType::SpecialEvent) => '!',
                    Some(RoomType::Normal) => '#',
                    None => ' ',
                });
                let right = room.is_some_and(|room| room.connections[Direction::Right.index()]);
                let down = room.is_some_and(|room| room.connections[Direction::Down.index()]);
                room_line.push(if right { '-' } else { ' ' });
                link_line.push(if down { '|' } else { ' ' });
                link_line.push(' ');
            }
            let _ = writeln!(out, "{}", room_line.trim_end());
            if y > min_y {
                let _ = writeln!(out, "{}", link_line.trim_end());
            }
        }
        out
    }
}
