#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure summaries of finished generation runs.

use std::collections::BTreeMap;

use isleweave_core::GroupId;
use isleweave_system_generation::{CellOutcome, DropReason, Generation};
use serde::{Deserialize, Serialize};

mod metrics;

/// Dropped cells broken down by reason.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DropCounts {
    /// Cells that never gained a connection.
    pub isolated: u32,
    /// Cells whose level no catalog group accepts.
    pub no_eligible_group: u32,
    /// Cells whose mask no tile in their group fits.
    pub no_matching_variant: u32,
}

impl DropCounts {
    fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::Isolated => self.isolated += 1,
            DropReason::NoEligibleGroup => self.no_eligible_group += 1,
            DropReason::NoMatchingVariant => self.no_matching_variant += 1,
        }
    }

    /// Sum over every reason.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.isolated + self.no_eligible_group + self.no_matching_variant
    }
}

/// Shape statistics of one generation run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutReport {
    /// Requested cell count.
    pub requested: u32,
    /// Cells created, origin included.
    pub created: u32,
    /// Cells bound to a tile variant.
    pub resolved: u32,
    /// Cells left out of the layout.
    pub dropped: u32,
    /// Dropped cells by reason.
    pub drops: DropCounts,
    /// Highest level among created cells.
    pub deepest_level: u32,
    /// Resolved non-origin cells with a single connection.
    pub dead_ends: u32,
    /// Resolved cells with three or more connections.
    pub branch_points: u32,
    /// Resolved cells per catalog group.
    pub cells_per_group: BTreeMap<GroupId, u32>,
    /// Forks forced by dead-end recovery.
    pub fallback_forks: u32,
    /// Whether the run created every requested cell.
    pub reached_target: bool,
    /// Resolved cells a host can walk to from the resolved origin.
    pub reachable_from_origin: u32,
    /// Bridges whose parent end was dropped.
    pub dangling_bridges: u32,
}

impl LayoutReport {
    /// Summarises a finished run.
    #[must_use]
    pub fn from_generation(generation: &Generation) -> Self {
        let stats = generation.stats();
        let mut report = Self {
            requested: stats.requested,
            created: stats.created,
            resolved: stats.resolved,
            dropped: stats.dropped,
            fallback_forks: stats.fallback_forks,
            reached_target: stats.reached_target,
            ..Self::default()
        };

        for cell in generation.cells() {
            report.deepest_level = report.deepest_level.max(cell.level);

            match cell.outcome {
                CellOutcome::Dropped(reason) => report.drops.record(reason),
                CellOutcome::Resolved { .. } => {
                    let connections = cell.mask.count();
                    if connections == 1 && cell.parent.is_some() {
                        report.dead_ends += 1;
                    }
                    if connections >= 3 {
                        report.branch_points += 1;
                    }
                    if let Some(group) = cell.group {
                        *report.cells_per_group.entry(group).or_default() += 1;
                    }
                }
            }
        }

        let connectivity = metrics::connectivity(generation.layout());
        report.reachable_from_origin = saturating_u32(connectivity.reachable);
        report.dangling_bridges = saturating_u32(connectivity.dangling_bridges);
        report
    }

    /// Share of created cells that made it into the layout, in `[0, 1]`.
    #[must_use]
    pub fn resolution_rate(&self) -> f64 {
        if self.created == 0 {
            return 0.0;
        }
        f64::from(self.resolved) / f64::from(self.created)
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
