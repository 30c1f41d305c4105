// Randomness abstraction: production RNG plus a seeded variant for tests.
//
// Everything in the crate that involves chance (winner selection, group
// shuffling, spin frames) goes through `RandomSource`, so tests can inject
// a deterministic source and replay exact outcomes. Shuffling delegates to
// `rand`'s Fisher-Yates; a comparator-sort shuffle is biased and is not
// used anywhere.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Source of randomness for draws and grouping.
pub trait RandomSource {
    /// Uniformly shuffle a slice in place.
    fn shuffle<T>(&mut self, slice: &mut [T]);

    /// Pick a uniform index in `[0, len)`. `len` must be nonzero.
    fn pick_index(&mut self, len: usize) -> usize;
}

/// Thread-local system RNG used in production.
#[derive(Clone, Debug, Default)]
pub struct SystemRng;

impl RandomSource for SystemRng {
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut rand::thread_rng());
    }

    fn pick_index(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Deterministic RNG for tests: same seed, same draws and groupings.
#[derive(Clone, Debug)]
pub struct SeededRng {
    inner: StdRng,
}

impl SeededRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRng {
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }

    fn pick_index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }
}
