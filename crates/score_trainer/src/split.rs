//! Deterministic train/test partition

use anyhow::{bail, Result};

use crate::deterministic::LcgRng;

/// Disjoint, exhaustive row partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Rows assigned to training: `round((1 - test_fraction) * n)`
pub fn train_size(n_samples: usize, test_fraction: f64) -> usize {
    ((1.0 - test_fraction) * n_samples as f64).round() as usize
}

/// Shuffle row indices with `seed` and cut off the test partition first
///
/// Both partitions must be non-empty.
pub fn train_test_split(n_samples: usize, test_fraction: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        bail!("Test fraction must be in (0, 1), got {}", test_fraction);
    }

    let n_train = train_size(n_samples, test_fraction);
    let n_test = n_samples - n_train;
    if n_train == 0 || n_test == 0 {
        bail!(
            "Splitting {} rows with test fraction {} leaves an empty partition",
            n_samples,
            test_fraction
        );
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    LcgRng::new(seed).shuffle(&mut indices);

    let train = indices.split_off(n_test);
    Ok(TrainTestSplit {
        train,
        test: indices,
    })
}
