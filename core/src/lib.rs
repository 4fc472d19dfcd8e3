#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Isleweave layout generator.
//!
//! This crate defines the vocabulary every other crate speaks: grid
//! coordinates and the [`GridSpec`] that bounds them, the four cardinal
//! [`Direction`] values with their 4-bit [`ConnectionMask`] encoding, and the
//! plain-data [`Layout`] records the generator publishes for hosts to build,
//! replicate, and render. Nothing in here draws random numbers or owns
//! generation state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Signed grid coordinate of a cell. The origin cell always sits at `(0, 0)`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellPos {
    x: i32,
    y: i32,
}

impl CellPos {
    /// The origin position every generation run grows from.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component, growing toward [`Direction::East`].
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component, growing toward [`Direction::North`].
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the neighbouring position one step toward `direction`.
    #[must_use]
    pub const fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Direction that leads from `self` to the adjacent position `to`.
    pub fn direction_to(self, to: CellPos) -> Result<Direction, DirectionError> {
        Direction::from_offset(to.x.wrapping_sub(self.x), to.y.wrapping_sub(self.y))
    }
}

/// Placement of a cell in world units, consumed by rendering hosts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldOffset {
    /// Offset along the east axis.
    pub x: f32,
    /// Offset along the north axis.
    pub y: f32,
}

/// Reasons a grid description is rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum GridError {
    /// A grid with no cells cannot hold the origin.
    #[error("grid side must be at least one cell")]
    EmptyGrid,
}

/// Fixed-size square grid centred on the origin.
///
/// The grid has `side` cells per axis. Positions are shifted by `side / 2`
/// before indexing, so a side of `2r + 1` covers `[-r, r]` on both axes. Even
/// sides reach one cell further toward the negative axes than the positive ones.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    side: u32,
    #[serde(default = "default_spacing")]
    spacing: f32,
}

fn default_spacing() -> f32 {
    GridSpec::DEFAULT_SPACING
}

impl GridSpec {
    /// Default distance between neighbouring cell centres in world units.
    pub const DEFAULT_SPACING: f32 = 100.0;

    /// Creates a grid with `side` cells per axis and the provided world spacing.
    pub fn new(side: u32, spacing: f32) -> Result<Self, GridError> {
        if side == 0 {
            return Err(GridError::EmptyGrid);
        }
        Ok(Self { side, spacing })
    }

    /// Creates a grid covering `[-radius, radius]` on each axis.
    #[must_use]
    pub fn with_radius(radius: u32) -> Self {
        let side = radius.saturating_mul(2).saturating_add(1);
        Self {
            side,
            spacing: Self::DEFAULT_SPACING,
        }
    }

    /// Number of cells along each axis.
    #[must_use]
    pub const fn side(&self) -> u32 {
        self.side
    }

    /// Distance between neighbouring cell centres in world units.
    #[must_use]
    pub const fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Shift applied to signed coordinates before indexing.
    #[must_use]
    pub const fn centre(&self) -> u32 {
        self.side / 2
    }

    /// Total number of cells the grid can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        let side = usize::try_from(self.side).unwrap_or(usize::MAX);
        side.saturating_mul(side)
    }

    /// Reports whether the position lies inside the grid bounds.
    #[must_use]
    pub fn is_valid_cell(&self, pos: CellPos) -> bool {
        self.shifted(pos).is_some()
    }

    /// Row-major index of the position, or `None` when out of bounds.
    #[must_use]
    pub fn cell_to_index(&self, pos: CellPos) -> Option<usize> {
        let (column, row) = self.shifted(pos)?;
        let side = usize::try_from(self.side).ok()?;
        let column = usize::try_from(column).ok()?;
        let row = usize::try_from(row).ok()?;
        row.checked_mul(side)?.checked_add(column)
    }

    /// Inverse of [`GridSpec::cell_to_index`].
    #[must_use]
    pub fn index_to_cell(&self, index: usize) -> Option<CellPos> {
        if index >= self.capacity() {
            return None;
        }
        let side = usize::try_from(self.side).ok()?;
        let column = i64::try_from(index % side).ok()?;
        let row = i64::try_from(index / side).ok()?;
        let centre = i64::from(self.centre());
        let x = i32::try_from(column - centre).ok()?;
        let y = i32::try_from(row - centre).ok()?;
        Some(CellPos::new(x, y))
    }

    /// Deterministic placement of the cell in world units.
    #[must_use]
    pub fn cell_to_world_offset(&self, pos: CellPos) -> WorldOffset {
        WorldOffset {
            x: pos.x() as f32 * self.spacing,
            y: pos.y() as f32 * self.spacing,
        }
    }

    fn shifted(&self, pos: CellPos) -> Option<(u32, u32)> {
        let centre = i64::from(self.centre());
        let side = i64::from(self.side);
        let column = i64::from(pos.x()) + centre;
        let row = i64::from(pos.y()) + centre;
        if (0..side).contains(&column) && (0..side).contains(&row) {
            Some((u32::try_from(column).ok()?, u32::try_from(row).ok()?))
        } else {
            None
        }
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::with_radius(10)
    }
}

/// Cardinal directions a cell may connect toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward increasing `y`.
    North,
    /// Toward increasing `x`.
    East,
    /// Toward decreasing `y`.
    South,
    /// Toward decreasing `x`.
    West,
}

/// Reasons a direction cannot be derived.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum DirectionError {
    /// The vector is not one of the four unit offsets.
    #[error("offset ({dx}, {dy}) is not a cardinal unit step")]
    InvalidOffset {
        /// Horizontal component of the rejected vector.
        dx: i32,
        /// Vertical component of the rejected vector.
        dy: i32,
    },
}

impl Direction {
    /// All directions in clockwise order starting at north, matching mask bit order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Bit position of the direction inside a [`ConnectionMask`].
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Direction stored at the provided bit position, taken mod 4.
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Self::North,
            1 => Self::East,
            2 => Self::South,
            _ => Self::West,
        }
    }

    /// Direction facing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Direction reached after `turns` clockwise quarter turns.
    #[must_use]
    pub const fn rotated(self, turns: i32) -> Self {
        let steps = turns.rem_euclid(4) as u8;
        Self::from_index(self.index() + steps)
    }

    /// Unit step taken when moving one cell in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::West => (-1, 0),
        }
    }

    /// Inverse of [`Direction::offset`].
    pub const fn from_offset(dx: i32, dy: i32) -> Result<Self, DirectionError> {
        match (dx, dy) {
            (0, 1) => Ok(Self::North),
            (1, 0) => Ok(Self::East),
            (0, -1) => Ok(Self::South),
            (-1, 0) => Ok(Self::West),
            _ => Err(DirectionError::InvalidOffset { dx, dy }),
        }
    }

    /// Mask with only this direction's bit set.
    #[must_use]
    pub const fn to_mask(self) -> ConnectionMask {
        ConnectionMask(1 << self.index())
    }
}

/// Four-bit set of connected directions.
///
/// Bit 0 is north, then east, south, and west, so a left rotation of the bits
/// models turning a tile clockwise.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ConnectionMask(u8);

impl ConnectionMask {
    /// No connections.
    pub const EMPTY: Self = Self(0);
    /// Connected on all four sides.
    pub const ALL: Self = Self(0b1111);

    /// Builds a mask from raw bits, discarding anything above the low nibble.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    /// Builds a mask from a set of directions.
    #[must_use]
    pub fn from_directions<I>(directions: I) -> Self
    where
        I: IntoIterator<Item = Direction>,
    {
        directions
            .into_iter()
            .fold(Self::EMPTY, |mask, direction| mask.with(direction))
    }

    /// Raw bit representation.
    #[must_use]
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Reports whether the direction is connected.
    #[must_use]
    pub const fn contains(&self, direction: Direction) -> bool {
        self.0 & direction.to_mask().0 != 0
    }

    /// Marks the direction as connected.
    pub fn insert(&mut self, direction: Direction) {
        self.0 |= direction.to_mask().0;
    }

    /// Copy of the mask with the direction connected.
    #[must_use]
    pub const fn with(self, direction: Direction) -> Self {
        Self(self.0 | direction.to_mask().0)
    }

    /// Number of connected directions.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Reports whether no direction is connected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Connected directions in clockwise order starting at north.
    pub fn directions(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.contains(*direction))
    }

    /// Mask after turning its tile `turns` quarter turns clockwise.
    #[must_use]
    pub const fn rotate(self, turns: i32) -> Self {
        let steps = turns.rem_euclid(4) as u32;
        let widened = (self.0 as u32) << steps;
        Self::from_bits((widened | (widened >> 4)) as u8)
    }
}

/// Free-function form of [`ConnectionMask::rotate`].
#[must_use]
pub const fn rotate_mask(mask: ConnectionMask, turns: i32) -> ConnectionMask {
    mask.rotate(turns)
}

/// Number of clockwise quarter turns applied to a tile, always in `0..=3`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Rotation(u8);

impl Rotation {
    /// Every distinct rotation in ascending order.
    pub const ALL: [Rotation; 4] = [Rotation(0), Rotation(1), Rotation(2), Rotation(3)];

    /// Creates a rotation, normalising `turns` mod 4.
    #[must_use]
    pub const fn new(turns: u8) -> Self {
        Self(turns % 4)
    }

    /// Quarter turns in `0..=3`.
    #[must_use]
    pub const fn turns(&self) -> u8 {
        self.0
    }

    /// Rotation expressed in degrees clockwise, for rendering hosts.
    #[must_use]
    pub const fn degrees(&self) -> u16 {
        self.0 as u16 * 90
    }
}

/// Identifier of a catalog group (a biome).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(u32);

impl GroupId {
    /// Creates a new group identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a tile inside the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    /// Creates a new tile identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// A generated cell bound to a concrete tile variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedCell {
    /// Grid position of the cell.
    pub position: CellPos,
    /// Number of forks separating the cell from the origin.
    pub level: u32,
    /// Catalog group the tile was drawn from.
    pub group: GroupId,
    /// Tile placed at the position.
    pub tile: TileId,
    /// Rotation applied to the tile so its connections match the neighbours.
    pub rotation: Rotation,
    /// Position of the cell this one was forked from, `None` for the origin.
    pub parent: Option<CellPos>,
}

/// Connection between a resolved cell and its parent, used to place bridges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bridge {
    /// Parent end of the bridge.
    pub from: CellPos,
    /// Child end of the bridge.
    pub to: CellPos,
    /// Direction travelled from `from` to reach `to`.
    pub direction: Direction,
}

/// Resolved cells produced by one generation run, in creation order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    cells: Vec<ResolvedCell>,
}

impl Layout {
    /// Creates a layout from resolved cells in creation order.
    #[must_use]
    pub fn new(cells: Vec<ResolvedCell>) -> Self {
        Self { cells }
    }

    /// Number of resolved cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the layout holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Resolved cells in creation order.
    #[must_use]
    pub fn cells(&self) -> &[ResolvedCell] {
        &self.cells
    }

    /// Iterator over the resolved cells in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedCell> {
        self.cells.iter()
    }

    /// The origin cell, if it survived resolution.
    #[must_use]
    pub fn origin(&self) -> Option<&ResolvedCell> {
        self.cells.iter().find(|cell| cell.parent.is_none())
    }

    /// Resolved cell at the provided position.
    #[must_use]
    pub fn get(&self, position: CellPos) -> Option<&ResolvedCell> {
        self.cells.iter().find(|cell| cell.position == position)
    }

    /// Parent links of every resolved non-origin cell.
    ///
    /// A bridge is listed even if the parent itself was dropped; hosts decide
    /// whether a dangling bridge is worth building.
    pub fn bridges(&self) -> impl Iterator<Item = Bridge> + '_ {
        self.cells.iter().filter_map(|cell| {
            let parent = cell.parent?;
            let direction = parent.direction_to(cell.position).ok()?;
            Some(Bridge {
                from: parent,
                to: cell.position,
                direction,
            })
        })
    }

    /// Consumes the layout, yielding the underlying cells.
    #[must_use]
    pub fn into_vec(self) -> Vec<ResolvedCell> {
        self.cells
    }
}
