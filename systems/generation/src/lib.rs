#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic cell-graph layout generation.
//!
//! [`CellGraphGenerator`] grows a tree of cells outward from the origin on a
//! bounded grid, assigns each new cell a level and a catalog group, and once
//! every connection mask is final binds each cell to a tile variant whose
//! rotated connections match. All randomness flows through the caller's
//! [`rand::Rng`], so a fixed seed reproduces the same [`Generation`].
//!
//! Running out of forks, lacking an eligible group, and lacking a matching
//! tile are all ordinary outcomes recorded in the result. Only malformed
//! [`GenerationOptions`] are reported as errors, and they are rejected before
//! any randomness is consumed.

use std::collections::VecDeque;

use isleweave_catalog::{Catalog, Group, Resolution, TileVariantResolver};
use isleweave_core::{
    CellPos, ConnectionMask, Direction, GridError, GridSpec, GroupId, Layout, ResolvedCell,
    Rotation, TileId,
};
use isleweave_system_selection::{pick_index, pick_uniform, validate_weights, WeightError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod arena;
mod seed;

use arena::{CellArena, CellPhase, GridCell};
pub use seed::{derive_run_seed, seeded_rng, GenerationRng};

const ORIGIN_INDEX: usize = 0;

/// Tuning knobs for a generation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationOptions {
    /// Grid the layout must fit inside.
    pub grid: GridSpec,
    /// Number of cells the run tries to create, origin included.
    pub target_cells: u32,
    /// Forks taken from the origin instead of a weighted draw.
    pub starting_forks: u32,
    /// Relative weight of a cell spawning 0, 1, 2, or 3 forks.
    pub fork_weights: [f64; 4],
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            target_cells: 24,
            starting_forks: 2,
            fork_weights: [1.0, 4.0, 2.0, 0.5],
        }
    }
}

impl GenerationOptions {
    /// Rejects options no run could honour.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.grid.side() == 0 {
            return Err(GenerationError::Grid(GridError::EmptyGrid));
        }
        if self.target_cells == 0 {
            return Err(GenerationError::ZeroTarget);
        }
        if self.starting_forks > 4 {
            return Err(GenerationError::TooManyStartingForks(self.starting_forks));
        }
        validate_weights(&self.fork_weights)?;
        Ok(())
    }
}

/// Reasons a run is refused before it starts.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum GenerationError {
    /// At least the origin must be requested.
    #[error("target cell count must be positive")]
    ZeroTarget,
    /// The grid cannot hold the origin.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// The origin has only four neighbours.
    #[error("starting fork count {0} exceeds the four cardinal directions")]
    TooManyStartingForks(u32),
    /// The fork-count weight table contains a negative or non-finite entry.
    #[error("fork weight table is malformed: {0}")]
    InvalidForkWeight(#[from] WeightError),
}

/// Why a cell was left out of the published layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DropReason {
    /// The cell never gained a connection.
    Isolated,
    /// No catalog group accepts the cell's level.
    NoEligibleGroup,
    /// No tile in the cell's group fits its connection mask.
    NoMatchingVariant,
}

/// Final state of a generated cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellOutcome {
    /// The cell was bound to a tile variant.
    Resolved {
        /// Tile placed at the cell.
        tile: TileId,
        /// Clockwise quarter turns applied to the tile.
        rotation: Rotation,
    },
    /// The cell was excluded from the layout.
    Dropped(DropReason),
}

/// Every cell a run created, resolved or not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneratedCell {
    /// Grid position of the cell.
    pub position: CellPos,
    /// Forks separating the cell from the origin.
    pub level: u32,
    /// Final connection mask.
    pub mask: ConnectionMask,
    /// Group chosen at creation, if any was eligible.
    pub group: Option<GroupId>,
    /// Position of the cell this one was forked from.
    pub parent: Option<CellPos>,
    /// Resolution result.
    pub outcome: CellOutcome,
}

impl GeneratedCell {
    /// Reports whether the cell made it into the layout.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self.outcome, CellOutcome::Resolved { .. })
    }
}

/// Counters describing how a run went.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Requested cell count.
    pub requested: u32,
    /// Cells created, origin included.
    pub created: u32,
    /// Cells bound to a tile variant.
    pub resolved: u32,
    /// Cells excluded from the layout.
    pub dropped: u32,
    /// Forks forced by the dead-end recovery scan.
    pub fallback_forks: u32,
    /// Whether `created` reached `requested`.
    pub reached_target: bool,
}

/// Result of one generation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    layout: Layout,
    cells: Vec<GeneratedCell>,
    stats: GenerationStats,
}

impl Generation {
    /// Resolved cells for hosts to build.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Every created cell in creation order, including dropped ones.
    #[must_use]
    pub fn cells(&self) -> &[GeneratedCell] {
        &self.cells
    }

    /// Run counters.
    #[must_use]
    pub const fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    /// Consumes the result, keeping only the published layout.
    #[must_use]
    pub fn into_layout(self) -> Layout {
        self.layout
    }
}

/// Grows and resolves cell graphs against a borrowed catalog.
#[derive(Clone, Debug)]
pub struct CellGraphGenerator<'a> {
    catalog: &'a Catalog,
    options: GenerationOptions,
}

impl<'a> CellGraphGenerator<'a> {
    /// Creates a generator. Options are validated on every [`generate`](Self::generate) call.
    #[must_use]
    pub fn new(catalog: &'a Catalog, options: GenerationOptions) -> Self {
        Self { catalog, options }
    }

    /// Options the generator was built with.
    #[must_use]
    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Runs one complete generation using the provided random source.
    ///
    /// Each call starts from empty storage; nothing carries over between runs.
    pub fn generate<R>(&self, rng: &mut R) -> Result<Generation, GenerationError>
    where
        R: Rng + ?Sized,
    {
        self.options.validate()?;

        let mut run = Run {
            catalog: self.catalog,
            resolver: self.catalog.resolver(),
            options: &self.options,
            arena: CellArena::new(self.options.grid),
            queue: VecDeque::new(),
            target: usize::try_from(self.options.target_cells).unwrap_or(usize::MAX),
            fallback_forks: 0,
        };
        run.grow(rng);
        run.resolve(rng);
        Ok(run.finish())
    }
}

struct Run<'a> {
    catalog: &'a Catalog,
    resolver: TileVariantResolver<'a>,
    options: &'a GenerationOptions,
    arena: CellArena,
    queue: VecDeque<usize>,
    target: usize,
    fallback_forks: u32,
}

impl Run<'_> {
    fn needs_more(&self) -> bool {
        self.arena.len() < self.target
    }

    fn grow<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let group = self.pick_group(0, CellPos::ORIGIN, rng);
        let origin = self
            .arena
            .place(GridCell::pending(CellPos::ORIGIN, 0, group, None));
        self.queue.push_back(origin);

        while self.needs_more() {
            while self.needs_more() {
                let Some(index) = self.queue.pop_front() else {
                    break;
                };
                self.expand(index, rng);
            }

            if !self.needs_more() {
                break;
            }

            if !self.force_fallback_fork(rng) {
                tracing::debug!(
                    target: "isleweave::generation",
                    created = self.arena.len(),
                    requested = self.target,
                    "generation.exhausted"
                );
                break;
            }
        }
    }

    fn expand<R>(&mut self, index: usize, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.arena.cell_mut(index).phase = CellPhase::Expanded;

        let mut available: Vec<Direction> = self.arena.available_forks(index).collect();
        if available.is_empty() {
            return;
        }

        let mut forks = if index == ORIGIN_INDEX {
            usize::try_from(self.options.starting_forks).unwrap_or(usize::MAX)
        } else {
            let choices = available.len().min(self.options.fork_weights.len() - 1);
            pick_index(rng, &self.options.fork_weights[..=choices])
        };
        forks = forks.min(available.len());
        if self.queue.is_empty() {
            forks = forks.max(1);
        }
        forks = forks.min(self.target.saturating_sub(self.arena.len()));

        for _ in 0..forks {
            let direction = available.remove(pick_uniform(rng, available.len()));
            self.fork(index, direction, rng);
        }
    }

    fn force_fallback_fork<R>(&mut self, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        for index in (0..self.arena.len()).rev() {
            let available: Vec<Direction> = self.arena.available_forks(index).collect();
            if available.is_empty() {
                continue;
            }

            let direction = available[pick_uniform(rng, available.len())];
            self.fork(index, direction, rng);
            self.fallback_forks += 1;
            tracing::debug!(
                target: "isleweave::generation",
                from = ?self.arena.cell(index).position,
                ?direction,
                "generation.fallback_fork"
            );
            return true;
        }
        false
    }

    fn fork<R>(&mut self, parent: usize, direction: Direction, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let from = self.arena.cell(parent);
        let parent_position = from.position;
        let position = parent_position.offset(direction);
        let level = from.level + 1;
        debug_assert_eq!(parent_position.direction_to(position), Ok(direction));

        let group = self.pick_group(level, position, rng);
        let child = self.arena.place(GridCell::pending(
            position,
            level,
            group,
            Some(parent_position),
        ));
        self.arena.connect(parent, child, direction);
        self.queue.push_back(child);
    }

    fn pick_group<R>(&self, level: u32, position: CellPos, rng: &mut R) -> Option<GroupId>
    where
        R: Rng + ?Sized,
    {
        let group = self.resolver.pick_group(level, rng).map(Group::id);
        if group.is_none() {
            tracing::warn!(
                target: "isleweave::generation",
                level,
                ?position,
                "generation.no_eligible_group"
            );
        }
        group
    }

    fn resolve<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for index in 0..self.arena.len() {
            let cell = self.arena.cell(index);
            let phase = if cell.mask.is_empty() {
                CellPhase::Dropped(DropReason::Isolated)
            } else {
                match cell.group.and_then(|id| self.catalog.group(id)) {
                    None => CellPhase::Dropped(DropReason::NoEligibleGroup),
                    Some(group) => match self.resolver.resolve(cell.mask, group, rng) {
                        Resolution::Resolved(variant) => CellPhase::Resolved {
                            group: group.id(),
                            variant,
                        },
                        Resolution::Unresolved => {
                            CellPhase::Dropped(DropReason::NoMatchingVariant)
                        }
                    },
                }
            };

            if let CellPhase::Dropped(reason) = phase {
                tracing::debug!(
                    target: "isleweave::generation",
                    position = ?cell.position,
                    mask = cell.mask.bits(),
                    ?reason,
                    "generation.cell_dropped"
                );
            }
            self.arena.cell_mut(index).phase = phase;
        }
    }

    fn finish(self) -> Generation {
        let mut resolved = Vec::new();
        let mut cells = Vec::with_capacity(self.arena.len());

        for cell in self.arena.into_cells() {
            let outcome = match cell.phase {
                CellPhase::Resolved { group, variant } => {
                    resolved.push(ResolvedCell {
                        position: cell.position,
                        level: cell.level,
                        group,
                        tile: variant.tile,
                        rotation: variant.rotation,
                        parent: cell.parent,
                    });
                    CellOutcome::Resolved {
                        tile: variant.tile,
                        rotation: variant.rotation,
                    }
                }
                CellPhase::Dropped(reason) => CellOutcome::Dropped(reason),
                CellPhase::Pending | CellPhase::Expanded => {
                    unreachable!("resolution visits every cell")
                }
            };
            cells.push(GeneratedCell {
                position: cell.position,
                level: cell.level,
                mask: cell.mask,
                group: cell.group,
                parent: cell.parent,
                outcome,
            });
        }

        let created = saturating_u32(cells.len());
        let stats = GenerationStats {
            requested: self.options.target_cells,
            created,
            resolved: saturating_u32(resolved.len()),
            dropped: saturating_u32(cells.len() - resolved.len()),
            fallback_forks: self.fallback_forks,
            reached_target: created >= self.options.target_cells,
        };

        tracing::info!(
            target: "isleweave::generation",
            requested = stats.requested,
            created = stats.created,
            resolved = stats.resolved,
            dropped = stats.dropped,
            fallback_forks = stats.fallback_forks,
            "generation.complete"
        );

        Generation {
            layout: Layout::new(resolved),
            cells,
            stats,
        }
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn options(target_cells: u32) -> GenerationOptions {
        GenerationOptions {
            target_cells,
            ..GenerationOptions::default()
        }
    }

    #[test]
    fn invalid_options_are_rejected_up_front() {
        let catalog = Catalog::standard();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let zero = CellGraphGenerator::new(&catalog, options(0));
        assert_eq!(zero.generate(&mut rng), Err(GenerationError::ZeroTarget));

        let forks = CellGraphGenerator::new(
            &catalog,
            GenerationOptions {
                starting_forks: 5,
                ..options(4)
            },
        );
        assert_eq!(
            forks.generate(&mut rng),
            Err(GenerationError::TooManyStartingForks(5))
        );

        let weights = CellGraphGenerator::new(
            &catalog,
            GenerationOptions {
                fork_weights: [1.0, -2.0, 0.0, 0.0],
                ..options(4)
            },
        );
        assert!(matches!(
            weights.generate(&mut rng),
            Err(GenerationError::InvalidForkWeight(WeightError::Negative { index: 1, .. }))
        ));
    }

    #[test]
    fn rejected_options_consume_no_randomness() {
        let catalog = Catalog::standard();
        let mut used = ChaCha8Rng::seed_from_u64(9);
        let mut fresh = ChaCha8Rng::seed_from_u64(9);
        let _ = CellGraphGenerator::new(&catalog, options(0)).generate(&mut used);
        assert_eq!(used.gen::<u64>(), fresh.gen::<u64>());
    }

    #[test]
    fn empty_grid_from_options_file_is_rejected_before_drawing() {
        let catalog = Catalog::standard();
        let options: GenerationOptions =
            toml::from_str("[grid]\nside = 0\n").expect("options parse");
        let mut used = ChaCha8Rng::seed_from_u64(21);
        let mut fresh = ChaCha8Rng::seed_from_u64(21);

        assert_eq!(
            CellGraphGenerator::new(&catalog, options).generate(&mut used),
            Err(GenerationError::Grid(GridError::EmptyGrid))
        );
        assert_eq!(used.gen::<u64>(), fresh.gen::<u64>());
    }

    #[test]
    fn single_cell_target_drops_the_isolated_origin() {
        let catalog = Catalog::standard();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let generation = CellGraphGenerator::new(&catalog, options(1))
            .generate(&mut rng)
            .expect("valid options");

        assert_eq!(generation.cells().len(), 1);
        assert_eq!(
            generation.cells()[0].outcome,
            CellOutcome::Dropped(DropReason::Isolated)
        );
        assert!(generation.layout().is_empty());
        assert!(generation.stats().reached_target);
    }

    #[test]
    fn origin_takes_the_starting_fork_count() {
        let catalog = Catalog::standard();
        for starting_forks in 1..=4 {
            let mut rng = ChaCha8Rng::seed_from_u64(u64::from(starting_forks));
            let generation = CellGraphGenerator::new(
                &catalog,
                GenerationOptions {
                    starting_forks,
                    ..options(30)
                },
            )
            .generate(&mut rng)
            .expect("valid options");

            let children = generation
                .cells()
                .iter()
                .filter(|cell| cell.parent == Some(CellPos::ORIGIN))
                .count();
            assert_eq!(children, starting_forks as usize);
        }
    }

    #[test]
    fn missing_groups_drop_cells_without_failing() {
        let catalog = Catalog::new(vec![Group::new(
            GroupId::new(0),
            "near",
            (0, 1),
            1.0,
            Catalog::standard().groups()[0].tiles().to_vec(),
        )])
        .expect("catalog");
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let generation = CellGraphGenerator::new(&catalog, options(12))
            .generate(&mut rng)
            .expect("valid options");

        for cell in generation.cells() {
            if cell.level > 1 {
                assert_eq!(cell.group, None);
                assert_eq!(cell.outcome, CellOutcome::Dropped(DropReason::NoEligibleGroup));
            }
        }
        assert!(generation.layout().iter().all(|cell| cell.level <= 1));
    }
}
