//! Deterministic utilities for reproducible training
//!
//! Provides an LCG-based RNG for shuffling and the tie-breaking key used by
//! split selection, so a fixed seed and table always yield the same model.

use std::num::Wrapping;

/// Linear Congruential Generator for deterministic pseudo-randomness
/// Uses constants from Numerical Recipes (glibc)
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: Wrapping<u64>,
}

impl LcgRng {
    // LCG constants (compatible with glibc)
    const MULTIPLIER: u64 = 1103515245;
    const INCREMENT: u64 = 12345;
    const MODULUS_BITS: u32 = 31;
    const MASK: u64 = (1 << Self::MODULUS_BITS) - 1;

    pub fn new(seed: u64) -> Self {
        Self {
            state: Wrapping(seed & Self::MASK),
        }
    }

    /// Generate next random value in range [0, 2^31)
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state * Wrapping(Self::MULTIPLIER) + Wrapping(Self::INCREMENT);
        self.state.0 & Self::MASK
    }

    /// Generate random value in range [0, max)
    ///
    /// Scales by the high bits; the low bits of this LCG have short periods.
    pub fn next_range(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        ((self.next_u64() as u128 * max as u128) >> Self::MODULUS_BITS) as usize
    }

    /// In-place Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_range(i + 1);
            items.swap(i, j);
        }
    }
}

/// Deterministic tie-breaker for split selection
/// Returns consistent ordering based on (feature_idx, candidate_idx, node_id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SplitTieBreaker {
    pub feature_idx: usize,
    pub candidate_idx: usize,
    pub node_id: usize,
}

impl SplitTieBreaker {
    pub fn new(feature_idx: usize, candidate_idx: usize, node_id: usize) -> Self {
        Self {
            feature_idx,
            candidate_idx,
            node_id,
        }
    }
}
