//! TOML catalog manifests.
//!
//! ```toml
//! version = 1
//!
//! [[groups]]
//! id = 0
//! name = "shallows"
//! min_level = 0
//! max_level = 3
//! weight = 1.0
//!
//! [[groups.tiles]]
//! id = 0
//! name = "corner"
//! connections = ["north", "east"]
//! ```

use std::{fs, path::Path};

use isleweave_core::{ConnectionMask, Direction, GroupId, TileId};
use serde::Deserialize;

use crate::{Catalog, CatalogError, Group, Tile};

/// Manifest version this build reads.
pub const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Raw manifest document before validation.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CatalogManifest {
    /// Schema version of the document.
    pub version: u32,
    /// Group declarations in selection order.
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

/// One `[[groups]]` table.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GroupEntry {
    /// Numeric identifier reported in layouts.
    pub id: u32,
    /// Label used in logs and reports.
    #[serde(default)]
    pub name: String,
    /// Lowest level the group may appear at.
    #[serde(default)]
    pub min_level: u32,
    /// Highest level the group may appear at.
    #[serde(default = "unbounded_level")]
    pub max_level: u32,
    /// Relative selection weight.
    #[serde(default = "unit_weight")]
    pub weight: f64,
    /// Tiles available to the group.
    #[serde(default)]
    pub tiles: Vec<TileEntry>,
}

/// One `[[groups.tiles]]` table.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TileEntry {
    /// Numeric identifier reported in layouts.
    pub id: u32,
    /// Label used in logs and reports.
    #[serde(default)]
    pub name: String,
    /// Sides the tile connects on at rotation zero.
    pub connections: Vec<Direction>,
}

fn unbounded_level() -> u32 {
    u32::MAX
}

fn unit_weight() -> f64 {
    1.0
}

impl CatalogManifest {
    /// Parses a manifest document without validating its contents.
    pub fn parse(contents: &str) -> Result<Self, CatalogError> {
        let manifest: Self = toml::from_str(contents)?;
        if manifest.version != SUPPORTED_MANIFEST_VERSION {
            return Err(CatalogError::UnsupportedVersion {
                found: manifest.version,
                expected: SUPPORTED_MANIFEST_VERSION,
            });
        }
        Ok(manifest)
    }

    /// Converts the manifest into a validated [`Catalog`].
    pub fn into_catalog(self) -> Result<Catalog, CatalogError> {
        let groups = self
            .groups
            .into_iter()
            .map(|entry| {
                let tiles = entry
                    .tiles
                    .into_iter()
                    .map(|tile| {
                        Tile::new(
                            TileId::new(tile.id),
                            tile.name,
                            ConnectionMask::from_directions(tile.connections),
                        )
                    })
                    .collect();
                Group::new(
                    GroupId::new(entry.id),
                    entry.name,
                    (entry.min_level, entry.max_level),
                    entry.weight,
                    tiles,
                )
            })
            .collect();
        Catalog::new(groups)
    }
}

impl Catalog {
    /// Parses and validates a manifest document.
    pub fn from_manifest_str(contents: &str) -> Result<Self, CatalogError> {
        CatalogManifest::parse(contents)?.into_catalog()
    }

    /// Reads, parses, and validates the manifest at `path`.
    pub fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_manifest_str(&contents)?;
        tracing::info!(
            target: "isleweave::catalog",
            path = %path.display(),
            groups = catalog.groups().len(),
            "catalog.loaded"
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        version = 1

        [[groups]]
        id = 3
        name = "lagoon"
        min_level = 1
        max_level = 4
        weight = 2.5

        [[groups.tiles]]
        id = 30
        name = "bend"
        connections = ["north", "east"]

        [[groups.tiles]]
        id = 31
        connections = ["west"]

        [[groups]]
        id = 4
    "#;

    #[test]
    fn manifest_builds_catalog_with_defaults() {
        let catalog = Catalog::from_manifest_str(SAMPLE).expect("manifest should parse");
        assert_eq!(catalog.groups().len(), 2);

        let lagoon = catalog.group(GroupId::new(3)).expect("lagoon group");
        assert_eq!(lagoon.name(), "lagoon");
        assert_eq!((lagoon.min_level(), lagoon.max_level()), (1, 4));
        assert!((lagoon.weight() - 2.5).abs() < f64::EPSILON);
        assert_eq!(
            lagoon.tiles()[0].mask(),
            Direction::North.to_mask().with(Direction::East)
        );
        assert_eq!(lagoon.tiles()[1].mask(), Direction::West.to_mask());

        let bare = catalog.group(GroupId::new(4)).expect("bare group");
        assert_eq!((bare.min_level(), bare.max_level()), (0, u32::MAX));
        assert!((bare.weight() - 1.0).abs() < f64::EPSILON);
        assert!(bare.tiles().is_empty());
    }

    #[test]
    fn manifest_rejects_unknown_versions() {
        let result = CatalogManifest::parse("version = 2");
        assert!(matches!(
            result,
            Err(CatalogError::UnsupportedVersion {
                found: 2,
                expected: 1
            })
        ));
    }

    #[test]
    fn manifest_rejects_unknown_directions() {
        let manifest = r#"
            version = 1

            [[groups]]
            id = 0

            [[groups.tiles]]
            id = 0
            connections = ["up"]
        "#;
        assert!(matches!(
            CatalogManifest::parse(manifest),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn manifest_validation_runs_after_parsing() {
        let manifest = r#"
            version = 1

            [[groups]]
            id = 0
            min_level = 4
            max_level = 1
        "#;
        assert!(matches!(
            Catalog::from_manifest_str(manifest),
            Err(CatalogError::InvertedLevels { .. })
        ));
    }

    #[test]
    fn missing_manifest_reports_path() {
        let error = Catalog::from_manifest_path("does/not/exist.toml")
            .expect_err("missing file must fail");
        assert!(matches!(error, CatalogError::Read { .. }));
        assert!(error.to_string().contains("exist.toml"));
    }
}
