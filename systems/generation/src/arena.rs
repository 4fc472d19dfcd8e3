//! Generation-time cell storage keyed by grid position.

use std::collections::HashSet;

use isleweave_catalog::Variant;
use isleweave_core::{CellPos, ConnectionMask, Direction, GridSpec, GroupId};

use crate::DropReason;

/// Lifecycle of a cell during one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CellPhase {
    /// Queued; forks not yet decided, mask may still grow.
    Pending,
    /// Forks decided. Later fallback forks may still add bits.
    Expanded,
    /// Bound to a tile variant of the cell's group.
    Resolved {
        /// Group the variant was drawn from.
        group: GroupId,
        /// Chosen tile and rotation.
        variant: Variant,
    },
    /// Excluded from the published layout.
    Dropped(DropReason),
}

/// A cell as the generator sees it while the run is in progress.
#[derive(Clone, Debug)]
pub(crate) struct GridCell {
    pub(crate) position: CellPos,
    pub(crate) level: u32,
    pub(crate) mask: ConnectionMask,
    pub(crate) group: Option<GroupId>,
    pub(crate) parent: Option<CellPos>,
    pub(crate) phase: CellPhase,
}

impl GridCell {
    pub(crate) fn pending(
        position: CellPos,
        level: u32,
        group: Option<GroupId>,
        parent: Option<CellPos>,
    ) -> Self {
        Self {
            position,
            level,
            mask: ConnectionMask::EMPTY,
            group,
            parent,
            phase: CellPhase::Pending,
        }
    }
}

/// Cells in creation order plus a sparse occupancy lookup.
///
/// Cell indices are creation order, so index 0 is always the origin and a
/// backward scan over indices visits the most recent cells first. Storage
/// grows with the cells placed, never with the grid side.
#[derive(Debug)]
pub(crate) struct CellArena {
    grid: GridSpec,
    cells: Vec<GridCell>,
    occupancy: HashSet<CellPos>,
}

impl CellArena {
    pub(crate) fn new(grid: GridSpec) -> Self {
        Self {
            grid,
            cells: Vec::new(),
            occupancy: HashSet::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn cell(&self, index: usize) -> &GridCell {
        &self.cells[index]
    }

    pub(crate) fn cell_mut(&mut self, index: usize) -> &mut GridCell {
        &mut self.cells[index]
    }

    pub(crate) fn into_cells(self) -> Vec<GridCell> {
        self.cells
    }

    /// In bounds and not yet claimed by any cell.
    pub(crate) fn is_free(&self, position: CellPos) -> bool {
        self.grid.is_valid_cell(position) && !self.occupancy.contains(&position)
    }

    /// Stores a new cell and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds or already occupied. Fork
    /// selection only ever offers free positions, so either case is a defect.
    pub(crate) fn place(&mut self, cell: GridCell) -> usize {
        assert!(
            self.is_free(cell.position),
            "cell placement at {:?} is out of bounds or occupied",
            cell.position
        );

        let index = self.cells.len();
        let _ = self.occupancy.insert(cell.position);
        self.cells.push(cell);
        index
    }

    /// Directions the cell could still fork toward, in clockwise order.
    pub(crate) fn available_forks(&self, index: usize) -> impl Iterator<Item = Direction> {
        let cell = self.cell(index);
        let mut candidates = [None; 4];
        let mut count = 0;

        for direction in Direction::ALL {
            if cell.mask.contains(direction) {
                continue;
            }
            if !self.is_free(cell.position.offset(direction)) {
                continue;
            }
            candidates[count] = Some(direction);
            count += 1;
        }

        candidates.into_iter().take(count).flatten()
    }

    /// Records the connection in both cells' masks.
    pub(crate) fn connect(&mut self, parent: usize, child: usize, direction: Direction) {
        self.cells[parent].mask.insert(direction);
        self.cells[child].mask.insert(direction.opposite());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_claims_the_position() {
        let mut arena = CellArena::new(GridSpec::with_radius(1));
        assert!(arena.is_free(CellPos::ORIGIN));
        let index = arena.place(GridCell::pending(CellPos::ORIGIN, 0, None, None));
        assert_eq!(index, 0);
        assert!(!arena.is_free(CellPos::ORIGIN));
        assert!(!arena.is_free(CellPos::new(2, 0)), "out of bounds is never free");
    }

    #[test]
    #[should_panic(expected = "occupied")]
    fn placing_twice_on_one_position_panics() {
        let mut arena = CellArena::new(GridSpec::with_radius(1));
        let _ = arena.place(GridCell::pending(CellPos::ORIGIN, 0, None, None));
        let _ = arena.place(GridCell::pending(CellPos::ORIGIN, 1, None, None));
    }

    #[test]
    fn available_forks_skip_edges_neighbours_and_connections() {
        let mut arena = CellArena::new(GridSpec::with_radius(1));
        let origin = arena.place(GridCell::pending(CellPos::ORIGIN, 0, None, None));
        let east = arena.place(GridCell::pending(
            CellPos::new(1, 0),
            1,
            None,
            Some(CellPos::ORIGIN),
        ));
        arena.connect(origin, east, Direction::East);

        let from_origin: Vec<_> = arena.available_forks(origin).collect();
        assert_eq!(
            from_origin,
            vec![Direction::North, Direction::South, Direction::West]
        );

        let from_east: Vec<_> = arena.available_forks(east).collect();
        assert_eq!(from_east, vec![Direction::North, Direction::South]);
        assert!(arena.cell(east).mask.contains(Direction::West));
    }

    #[test]
    fn storage_tracks_placed_cells_not_grid_size() {
        let mut arena = CellArena::new(GridSpec::with_radius(1_000_000));
        let origin = arena.place(GridCell::pending(CellPos::ORIGIN, 0, None, None));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.occupancy.len(), 1);
        assert_eq!(arena.available_forks(origin).count(), 4);
        assert!(arena.is_free(CellPos::new(1_000_000, -1_000_000)));
        assert!(!arena.is_free(CellPos::new(1_000_001, 0)));
    }
}
