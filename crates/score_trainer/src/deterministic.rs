//! Deterministic utilities for reproducible training
//!
//! Provides an LCG-based RNG and the tie-breaking key for split selection,
//! so a given seed yields the same partition, bootstrap weights and trees
//! on every platform.

use std::num::Wrapping;

/// Linear Congruential Generator for deterministic pseudo-randomness
/// Uses constants from Numerical Recipes (glibc)
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: Wrapping<i64>,
}

impl LcgRng {
    // LCG constants (compatible with glibc)
    const MULTIPLIER: i64 = 1103515245;
    const INCREMENT: i64 = 12345;
    const MODULUS: i64 = 1 << 31;

    pub fn new(seed: u64) -> Self {
        Self {
            state: Wrapping((seed % Self::MODULUS as u64) as i64),
        }
    }

    /// Generate next value in range [0, MODULUS)
    pub fn next_u31(&mut self) -> u64 {
        self.state = self.state * Wrapping(Self::MULTIPLIER) + Wrapping(Self::INCREMENT);
        (self.state.0 & (Self::MODULUS - 1)) as u64
    }

    /// Generate value in range [0, max)
    pub fn next_range(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        (self.next_u31() % max as u64) as usize
    }

    /// Uniform value in the open interval (0, 1)
    pub fn next_unit_open(&mut self) -> f64 {
        (self.next_u31() as f64 + 0.5) / Self::MODULUS as f64
    }

    /// Fisher-Yates shuffle in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_range(i + 1);
            items.swap(i, j);
        }
    }

    /// Bayesian bootstrap weight `(-ln U)^temperature`; 0 disables bagging
    pub fn bayesian_weight(&mut self, temperature: f64) -> f64 {
        if temperature == 0.0 {
            return 1.0;
        }
        (-self.next_unit_open().ln()).powf(temperature)
    }
}

/// Deterministic tie-breaker for split selection
/// Equal scores resolve to the lowest (feature_idx, border_idx)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SplitTieBreaker {
    pub feature_idx: usize,
    pub border_idx: usize,
}

impl SplitTieBreaker {
    pub fn new(feature_idx: usize, border_idx: usize) -> Self {
        Self {
            feature_idx,
            border_idx,
        }
    }
}
