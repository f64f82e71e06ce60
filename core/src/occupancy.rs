use crate::grid::{Cell, GridSpec};
use crate::piece::PieceId;

/// Cell -> piece index. Only the session mutates it; it never owns pieces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occupancy {
    rows: usize,
    cols: usize,
    slots: Vec<Option<PieceId>>,
    count: usize,
}

impl Occupancy {
    pub fn new(grid: &GridSpec) -> Self {
        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            slots: vec![None; grid.total()],
            count: 0,
        }
    }

    fn slot(&self, cell: Cell) -> Option<usize> {
        if cell.row < self.rows && cell.col < self.cols {
            Some(cell.row * self.cols + cell.col)
        } else {
            None
        }
    }

    pub fn get(&self, cell: Cell) -> Option<PieceId> {
        self.slot(cell).and_then(|index| self.slots[index])
    }

    /// Out-of-range cells are never free.
    pub fn is_free(&self, cell: Cell) -> bool {
        self.slot(cell)
            .map(|index| self.slots[index].is_none())
            .unwrap_or(false)
    }

    /// Returns the previous occupant, which the caller must re-home.
    pub fn place(&mut self, cell: Cell, piece: PieceId) -> Option<PieceId> {
        let Some(index) = self.slot(cell) else {
            return None;
        };
        let previous = self.slots[index].replace(piece);
        if previous.is_none() {
            self.count += 1;
        }
        previous
    }

    pub fn vacate(&mut self, cell: Cell) -> Option<PieceId> {
        let index = self.slot(cell)?;
        let previous = self.slots[index].take();
        if previous.is_some() {
            self.count -= 1;
        }
        previous
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Cell, PieceId)> + '_ {
        let cols = self.cols;
        self.slots
            .iter()
            .enumerate()
            .filter_map(move |(index, slot)| {
                slot.map(|piece| (Cell::new(index / cols, index % cols), piece))
            })
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.count = 0;
    }

    pub fn is_injective(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.count);
        self.iter().all(|(_, piece)| seen.insert(piece))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_and_vacate_track_count() {
        let grid = GridSpec::new(2, 2, (1.0, 1.0), 0.0, (0.0, 0.0)).unwrap();
        let mut occupancy = Occupancy::new(&grid);
        assert!(occupancy.is_empty());
        assert_eq!(occupancy.place(Cell::new(0, 1), 3), None);
        assert_eq!(occupancy.place(Cell::new(0, 1), 2), Some(3));
        assert_eq!(occupancy.len(), 1);
        assert_eq!(occupancy.get(Cell::new(0, 1)), Some(2));
        assert!(!occupancy.is_free(Cell::new(5, 5)));
        assert_eq!(occupancy.place(Cell::new(5, 5), 1), None);
        assert_eq!(occupancy.len(), 1);
        assert_eq!(occupancy.vacate(Cell::new(0, 1)), Some(2));
        assert_eq!(occupancy.vacate(Cell::new(0, 1)), None);
        assert!(occupancy.is_empty());
    }
}
