//! Feature quantization
//!
//! Each feature is cut by a sorted list of borders chosen once from the
//! training data. A value's bin is the number of borders strictly below
//! it, so "bin > b" is the same test as "value > borders[b]". NaN lands
//! in bin 0, below every border, matching how the trees route NaN.

/// Candidate borders for one feature, at most `border_count` of them
///
/// With few distinct values every midpoint is a border; otherwise borders
/// sit at equal-frequency cut points. Non-finite values never produce a
/// border.
pub fn select_borders(values: &[f64], border_count: usize) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);

    let mut unique = sorted.clone();
    unique.dedup();
    if unique.len() < 2 || border_count == 0 {
        return Vec::new();
    }

    if unique.len() - 1 <= border_count {
        return unique.windows(2).map(|w| midpoint(w[0], w[1])).collect();
    }

    let n = sorted.len();
    let mut borders: Vec<f64> = (1..=border_count)
        .filter_map(|k| {
            let idx = k * n / (border_count + 1);
            let (lo, hi) = (sorted[idx.saturating_sub(1)], sorted[idx.min(n - 1)]);
            (lo < hi).then(|| midpoint(lo, hi))
        })
        .collect();
    borders.dedup();
    borders
}

fn midpoint(lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) / 2.0
}

/// Bin index of `value` against sorted `borders`
#[inline]
pub fn bin_of(borders: &[f64], value: f64) -> u16 {
    borders.partition_point(|&b| b < value) as u16
}

/// Borders and per-sample bins for every feature (column-major)
#[derive(Debug, Clone)]
pub struct FeatureBins {
    borders: Vec<Vec<f64>>,
    bins: Vec<Vec<u16>>,
}

impl FeatureBins {
    pub fn build(columns: &[Vec<f64>], border_count: usize) -> Self {
        let borders: Vec<Vec<f64>> = columns
            .iter()
            .map(|col| select_borders(col, border_count))
            .collect();

        let bins = columns
            .iter()
            .zip(&borders)
            .map(|(col, b)| col.iter().map(|&v| bin_of(b, v)).collect())
            .collect();

        Self { borders, bins }
    }

    pub fn feature_count(&self) -> usize {
        self.borders.len()
    }

    pub fn borders(&self, feature_idx: usize) -> &[f64] {
        &self.borders[feature_idx]
    }

    pub fn bins(&self, feature_idx: usize) -> &[u16] {
        &self.bins[feature_idx]
    }
}
