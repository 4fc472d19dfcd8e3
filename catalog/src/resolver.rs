//! Group eligibility and tile/rotation matching.

use isleweave_core::{ConnectionMask, Rotation, TileId};
use isleweave_system_selection::{pick, pick_uniform};
use rand::Rng;

use crate::{Catalog, Group};

/// A tile paired with the rotation that makes it fit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Variant {
    /// Tile to place.
    pub tile: TileId,
    /// Clockwise quarter turns applied to the tile.
    pub rotation: Rotation,
}

/// Outcome of resolving a connection mask against a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// A fitting variant was chosen.
    Resolved(Variant),
    /// No tile in the group fits the mask at any rotation.
    Unresolved,
}

/// Answers eligibility and matching queries against a borrowed [`Catalog`].
#[derive(Clone, Copy, Debug)]
pub struct TileVariantResolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> TileVariantResolver<'a> {
    /// Creates a resolver over the provided catalog.
    #[must_use]
    pub const fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Groups whose level range contains `level`, in catalog order.
    #[must_use]
    pub fn eligible_groups(&self, level: u32) -> Vec<&'a Group> {
        self.catalog
            .groups()
            .iter()
            .filter(|group| group.accepts_level(level))
            .collect()
    }

    /// Draws one eligible group for `level`, weighted by group weight.
    ///
    /// Returns `None` when no group accepts the level.
    pub fn pick_group<R>(&self, level: u32, rng: &mut R) -> Option<&'a Group>
    where
        R: Rng + ?Sized,
    {
        let eligible = self.eligible_groups(level);
        pick(rng, &eligible, |group| group.weight()).copied()
    }

    /// Every tile/rotation pair in `group` whose rotated mask equals `required`.
    ///
    /// Symmetric tiles appear once per matching rotation. An empty mask never
    /// matches.
    #[must_use]
    pub fn matching_variants(&self, required: ConnectionMask, group: &Group) -> Vec<Variant> {
        if required.is_empty() {
            return Vec::new();
        }

        let mut variants = Vec::new();
        for tile in group.tiles() {
            for rotation in Rotation::ALL {
                if tile.mask().rotate(i32::from(rotation.turns())) == required {
                    variants.push(Variant {
                        tile: tile.id(),
                        rotation,
                    });
                }
            }
        }
        variants
    }

    /// Picks one matching variant uniformly, or reports [`Resolution::Unresolved`].
    pub fn resolve<R>(&self, required: ConnectionMask, group: &Group, rng: &mut R) -> Resolution
    where
        R: Rng + ?Sized,
    {
        let variants = self.matching_variants(required, group);
        if variants.is_empty() {
            return Resolution::Unresolved;
        }
        let index = pick_uniform(rng, variants.len());
        variants
            .get(index)
            .copied()
            .map_or(Resolution::Unresolved, Resolution::Resolved)
    }
}
