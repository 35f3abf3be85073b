use serde::{Deserialize, Serialize};

/// Deterministic random source shared by every replica of a session.
///
/// Only the seed and the number of values drawn so far are replicated;
/// the n-th value is a pure function of both, so any replica (including
/// one restored from a snapshot) draws the same sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRandom {
    seed: u64,
    index: u64,
}

impl SessionRandom {
    pub fn new(seed: u64) -> Self {
        Self { seed, index: 0 }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Count of values drawn so far
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Next value in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        let stream_seed = self
            .seed
            .wrapping_add(self.index.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        self.index += 1;
        fastrand::Rng::with_seed(stream_seed).f64()
    }
}
