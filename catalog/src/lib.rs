#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Read-only catalog of tile groups consumed by the layout generator.
//!
//! A [`Catalog`] is a validated list of [`Group`] values (biomes). Each group
//! declares the level range it may appear in, a selection weight, and the
//! tiles it can place. The [`TileVariantResolver`] answers the two questions
//! the generator asks of this data: which groups may host a cell at a given
//! level, and which tile/rotation pairs fit a cell's final connection mask.

use std::collections::HashSet;

use isleweave_core::{ConnectionMask, Direction, GroupId, TileId};
use isleweave_system_selection::{validate_weights, WeightError};
use thiserror::Error;

mod manifest;
mod resolver;

pub use manifest::{CatalogManifest, GroupEntry, TileEntry, SUPPORTED_MANIFEST_VERSION};
pub use resolver::{Resolution, TileVariantResolver, Variant};

/// A placeable tile with its unrotated connection mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    id: TileId,
    name: String,
    mask: ConnectionMask,
}

impl Tile {
    /// Creates a new tile description.
    #[must_use]
    pub fn new(id: TileId, name: impl Into<String>, mask: ConnectionMask) -> Self {
        Self {
            id,
            name: name.into(),
            mask,
        }
    }

    /// Identifier reported in resolved layouts.
    #[must_use]
    pub const fn id(&self) -> TileId {
        self.id
    }

    /// Human-readable label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connections of the tile at rotation zero.
    #[must_use]
    pub const fn mask(&self) -> ConnectionMask {
        self.mask
    }
}

/// A biome: tiles that may be placed over an inclusive range of levels.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    id: GroupId,
    name: String,
    min_level: u32,
    max_level: u32,
    weight: f64,
    tiles: Vec<Tile>,
}

impl Group {
    /// Creates a new group description. Validation happens in [`Catalog::new`].
    #[must_use]
    pub fn new(
        id: GroupId,
        name: impl Into<String>,
        levels: (u32, u32),
        weight: f64,
        tiles: Vec<Tile>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            min_level: levels.0,
            max_level: levels.1,
            weight,
            tiles,
        }
    }

    /// Identifier reported in resolved layouts.
    #[must_use]
    pub const fn id(&self) -> GroupId {
        self.id
    }

    /// Human-readable label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowest level the group may appear at.
    #[must_use]
    pub const fn min_level(&self) -> u32 {
        self.min_level
    }

    /// Highest level the group may appear at.
    #[must_use]
    pub const fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Relative likelihood of the group among the eligible ones.
    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// Tiles the group can place.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Reports whether `level` lies inside `[min_level, max_level]`.
    #[must_use]
    pub const fn accepts_level(&self, level: u32) -> bool {
        self.min_level <= level && level <= self.max_level
    }
}

/// Reasons a catalog is rejected.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The manifest file could not be read.
    #[error("failed to read catalog manifest from {path:?}: {source}")]
    Read {
        /// Location of the manifest.
        path: std::path::PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The manifest is not valid TOML for the expected schema.
    #[error("failed to parse catalog manifest: {0}")]
    Parse(#[from] toml::de::Error),
    /// The manifest declares a version this build does not understand.
    #[error("unsupported catalog manifest version {found}; expected {expected}")]
    UnsupportedVersion {
        /// Version found in the manifest.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },
    /// Two groups share an identifier.
    #[error("duplicate catalog group id {}", .0.get())]
    DuplicateGroup(GroupId),
    /// Two tiles inside one group share an identifier.
    #[error("duplicate tile id {} in group {}", .tile.get(), .group.get())]
    DuplicateTile {
        /// Group containing the duplicate.
        group: GroupId,
        /// Repeated tile identifier.
        tile: TileId,
    },
    /// A group's level range is empty.
    #[error("group {} has min_level {min} above max_level {max}", .group.get())]
    InvertedLevels {
        /// Offending group.
        group: GroupId,
        /// Declared lower bound.
        min: u32,
        /// Declared upper bound.
        max: u32,
    },
    /// A group's selection weight is negative or not finite.
    #[error("group {} has an invalid weight: {source}", .group.get())]
    InvalidWeight {
        /// Offending group.
        group: GroupId,
        /// Validation failure for the weight.
        #[source]
        source: WeightError,
    },
}

/// Validated, read-only collection of groups.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    groups: Vec<Group>,
}

impl Catalog {
    /// Validates and wraps the provided groups, preserving their order.
    pub fn new(groups: Vec<Group>) -> Result<Self, CatalogError> {
        let mut seen_groups = HashSet::new();
        for group in &groups {
            if !seen_groups.insert(group.id) {
                return Err(CatalogError::DuplicateGroup(group.id));
            }
            if group.min_level > group.max_level {
                return Err(CatalogError::InvertedLevels {
                    group: group.id,
                    min: group.min_level,
                    max: group.max_level,
                });
            }
            validate_weights(&[group.weight]).map_err(|source| CatalogError::InvalidWeight {
                group: group.id,
                source,
            })?;

            let mut seen_tiles = HashSet::new();
            for tile in &group.tiles {
                if !seen_tiles.insert(tile.id) {
                    return Err(CatalogError::DuplicateTile {
                        group: group.id,
                        tile: tile.id,
                    });
                }
            }
        }

        tracing::debug!(
            target: "isleweave::catalog",
            groups = groups.len(),
            tiles = groups.iter().map(|group| group.tiles.len()).sum::<usize>(),
            "catalog.validated"
        );
        Ok(Self { groups })
    }

    /// Groups in declaration order.
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Group with the provided identifier.
    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == id)
    }

    /// Resolver borrowing this catalog.
    #[must_use]
    pub fn resolver(&self) -> TileVariantResolver<'_> {
        TileVariantResolver::new(self)
    }

    /// Built-in three-biome catalog used by the CLI when no manifest is given.
    ///
    /// Shallows cover the first levels, reefs the middle band, and the deep
    /// band runs on from level six. The deep band has no crossroads, so four-way
    /// junctions past the reef band are dropped.
    #[must_use]
    pub fn standard() -> Self {
        let groups = vec![
            Group::new(
                GroupId::new(0),
                "shallows",
                (0, 3),
                1.0,
                shape_set(0, true),
            ),
            Group::new(GroupId::new(1), "reef", (2, 8), 2.0, shape_set(10, true)),
            Group::new(
                GroupId::new(2),
                "deep",
                (6, 1_000),
                1.0,
                shape_set(20, false),
            ),
        ];
        Self { groups }
    }
}

fn shape_set(first_id: u32, with_crossroads: bool) -> Vec<Tile> {
    use Direction::{East, North, South};

    let mut tiles = vec![
        Tile::new(TileId::new(first_id), "dead_end", North.to_mask()),
        Tile::new(
            TileId::new(first_id + 1),
            "straight",
            North.to_mask().with(South),
        ),
        Tile::new(
            TileId::new(first_id + 2),
            "corner",
            North.to_mask().with(East),
        ),
        Tile::new(
            TileId::new(first_id + 3),
            "tee",
            North.to_mask().with(East).with(South),
        ),
    ];
    if with_crossroads {
        tiles.push(Tile::new(
            TileId::new(first_id + 4),
            "crossroads",
            ConnectionMask::ALL,
        ));
    }
    tiles
}
