//! Seed derivation so every participant in a session regenerates the same layout.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

const RNG_STREAM_LAYOUT: &str = "isleweave.layout";

/// Random source used by hosts and tests.
pub type GenerationRng = ChaCha8Rng;

/// Derives the seed for one generation run of a session.
///
/// Hosts share `session_seed` with their clients once; every later
/// regeneration bumps `run` and all participants derive the same value.
#[must_use]
pub fn derive_run_seed(session_seed: u64, run: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(session_seed.to_le_bytes());
    hasher.update(run.to_le_bytes());
    hasher.update(RNG_STREAM_LAYOUT.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Creates the workspace-standard random source from a seed.
#[must_use]
pub fn seeded_rng(seed: u64) -> GenerationRng {
    ChaCha8Rng::seed_from_u64(seed)
}
