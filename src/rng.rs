//! Seedable random source for sampling.
//!
//! Every sampler owns its own [`SequenceRng`]; there is no process-wide
//! generator, so two models never share random state.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// ChaCha20-backed random source.
#[derive(Clone, Debug)]
pub struct SequenceRng {
    rng: ChaCha20Rng,
    draws: u64,
}

impl SequenceRng {
    /// Create a new RNG with entropy from the OS.
    pub fn new() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
            draws: 0,
        }
    }

    /// Create an RNG with a specific seed for reproducibility.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            draws: 0,
        }
    }

    /// Seeded when `seed` is given, OS entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::with_seed)
    }

    /// Generate a random f64 in [0, 1).
    pub fn f64(&mut self) -> f64 {
        self.draws += 1;
        self.rng.gen::<f64>()
    }

    /// Generate a random usize in the given range.
    pub fn usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.draws += 1;
        self.rng.gen_range(range)
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl Default for SequenceRng {
    fn default() -> Self {
        Self::new()
    }
}
