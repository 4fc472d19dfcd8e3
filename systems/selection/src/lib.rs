#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Weighted random selection over finite sets.
//!
//! Every randomized decision the generator makes funnels through
//! [`pick_index`], so a seeded [`rand::Rng`] reproduces the same choices run
//! after run. Degenerate inputs never fail: an empty or all-zero weight table
//! deterministically selects index 0 without consuming randomness.

use rand::Rng;
use thiserror::Error;

/// Reasons a weight table is rejected before generation starts.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum WeightError {
    /// A weight was below zero.
    #[error("weight {value} at index {index} is negative")]
    Negative {
        /// Position of the rejected weight.
        index: usize,
        /// The rejected value.
        value: f64,
    },
    /// A weight was NaN or infinite.
    #[error("weight at index {index} is not a finite number")]
    NotFinite {
        /// Position of the rejected weight.
        index: usize,
    },
}

/// Checks that every weight is finite and non-negative.
pub fn validate_weights(weights: &[f64]) -> Result<(), WeightError> {
    for (index, &value) in weights.iter().enumerate() {
        if !value.is_finite() {
            return Err(WeightError::NotFinite { index });
        }
        if value < 0.0 {
            return Err(WeightError::Negative { index, value });
        }
    }
    Ok(())
}

/// Draws an index with probability proportional to its weight.
///
/// The draw is uniform in `[0, total)` and the first index whose cumulative
/// weight is strictly greater than the draw wins, so a draw landing exactly on
/// a boundary belongs to the following bucket. Weights are expected to have
/// passed [`validate_weights`]; negative entries are treated as zero.
pub fn pick_index<R>(rng: &mut R, weights: &[f64]) -> usize
where
    R: Rng + ?Sized,
{
    let total: f64 = weights.iter().map(|weight| weight.max(0.0)).sum();
    if !(total > 0.0) || !total.is_finite() {
        return 0;
    }

    let draw = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    let mut last_weighted = 0;
    for (index, weight) in weights.iter().enumerate() {
        let weight = weight.max(0.0);
        if weight > 0.0 {
            last_weighted = index;
        }
        cumulative += weight;
        if cumulative > draw {
            return index;
        }
    }

    // Rounding in the running sum can leave the draw just past the final bucket.
    last_weighted
}

/// Draws an index uniformly from `0..len`, returning 0 for an empty range.
pub fn pick_uniform<R>(rng: &mut R, len: usize) -> usize
where
    R: Rng + ?Sized,
{
    match len {
        0 | 1 => 0,
        _ => {
            let weights = vec![1.0; len];
            pick_index(rng, &weights)
        }
    }
}

/// Draws an item with probability proportional to `weight_of(item)`.
///
/// Returns `None` only for an empty slice; if every weight is zero the first
/// item is returned.
pub fn pick<'a, T, R, F>(rng: &mut R, items: &'a [T], mut weight_of: F) -> Option<&'a T>
where
    R: Rng + ?Sized,
    F: FnMut(&T) -> f64,
{
    if items.is_empty() {
        return None;
    }
    let weights: Vec<f64> = items.iter().map(&mut weight_of).collect();
    items.get(pick_index(rng, &weights))
}
