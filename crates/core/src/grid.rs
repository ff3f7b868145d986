//! Bounded square cell grid centered on the origin.

use crate::types::GridPos;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridBounds {
    radius: i32,
}

impl GridBounds {
    /// A `2 * max_rooms - 1` square: growth from the center can never reach an edge.
    pub fn for_max_rooms(max_rooms: usize) -> Self {
        Self { radius: max_rooms.saturating_sub(1) as i32 }
    }

    pub fn with_radius(radius: i32) -> Self {
        Self { radius: radius.max(0) }
    }

    pub fn radius(self) -> i32 {
        self.radius
    }

    pub fn side(self) -> usize {
        (self.radius as usize) * 2 + 1
    }

    pub fn contains(self, pos: GridPos) -> bool {
        pos.x.abs() <= self.radius && pos.y.abs() <= self.radius
    }

    fn index(self, pos: GridPos) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        let column = (pos.x + self.radius) as usize;
        let row = (pos.y + self.radius) as usize;
        Some(row * self.side() + column)
    }
}

/// Sparse occupancy over a [`GridBounds`]; out-of-bounds reads are empty.
#[derive(Clone, Debug)]
pub struct CellGrid<T: Copy> {
    bounds: GridBounds,
    cells: Vec<Option<T>>,
}

impl<T: Copy> CellGrid<T> {
    pub fn new(bounds: GridBounds) -> Self {
        Self { bounds, cells: vec![None; bounds.side() * bounds.side()] }
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn get(&self, pos: GridPos) -> Option<T> {
        self.bounds.index(pos).and_then(|index| self.cells[index])
    }

    pub fn is_free(&self, pos: GridPos) -> bool {
        self.bounds.contains(pos) && self.get(pos).is_none()
    }

    /// Returns false when `pos` is outside the grid.
    pub fn insert(&mut self, pos: GridPos, value: T) -> bool {
        match self.bounds.index(pos) {
            Some(index) => {
                self.cells[index] = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn has_occupied_neighbour(&self, pos: GridPos) -> bool {
        pos.neighbours().into_iter().any(|neighbour| self.get(neighbour).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_span_twice_max_rooms_minus_one() {
        let bounds = GridBounds::for_max_rooms(5);
        assert_eq!(bounds.side(), 9);
        assert!(bounds.contains(GridPos::new(4, -4)));
        assert!(!bounds.contains(GridPos::new(5, 0)));
    }

    #[test]
    fn single_room_grid_only_holds_the_origin() {
        let bounds = GridBounds::for_max_rooms(1);
        assert_eq!(bounds.side(), 1);
        assert!(bounds.contains(GridPos::ORIGIN));
        assert!(!bounds.contains(GridPos::new(0, 1)));
    }

    #[test]
    fn out_of_bounds_cells_read_empty_and_reject_writes() {
        let mut grid = CellGrid::new(GridBounds::for_max_rooms(2));
        assert!(!grid.insert(GridPos::new(2, 0), 7_u8));
        assert_eq!(grid.get(GridPos::new(2, 0)), None);
        assert!(!grid.is_free(GridPos::new(2, 0)));
    }

    #[test]
    fn neighbour_detection_sees_adjacent_cells_only() {
        let mut grid = CellGrid::new(GridBounds::for_max_rooms(3));
        grid.insert(GridPos::ORIGIN, 1_u8);
        assert!(grid.has_occupied_neighbour(GridPos::new(0, 1)));
        assert!(!grid.has_occupied_neighbour(GridPos::new(1, 1)));
    }
}
