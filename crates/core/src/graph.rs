//! Position index over the rooms of the current dungeon.

use crate::grid::{CellGrid, GridBounds};
use crate::types::{GridPos, RoomId};

#[derive(Clone, Debug)]
pub struct DungeonGraph {
    cells: CellGrid<RoomId>,
    order: Vec<RoomId>,
    pub(crate) start: Option<GridPos>,
    pub(crate) shop: Option<GridPos>,
    pub(crate) special_event: Option<GridPos>,
}

impl DungeonGraph {
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            cells: CellGrid::new(bounds),
            order: Vec::new(),
            start: None,
            shop: None,
            special_event: None,
        }
    }

    pub fn bounds(&self) -> GridBounds {
        self.cells.bounds()
    }

    pub fn get(&self, pos: GridPos) -> Option<RoomId> {
        self.cells.get(pos)
    }

    pub(crate) fn insert(&mut self, pos: GridPos, room: RoomId) -> bool {
        if !self.cells.is_free(pos) {
            return false;
        }
        self.cells.insert(pos, room);
        self.order.push(room);
        true
    }

    /// Room handles in creation order.
    pub fn room_ids(&self) -> &[RoomId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn start(&self) -> Option<GridPos> {
        self.start
    }

    pub fn shop(&self) -> Option<GridPos> {
        self.shop
    }

    pub fn special_event(&self) -> Option<GridPos> {
        self.special_event
    }
}
