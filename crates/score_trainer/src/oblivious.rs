//! Symmetric (oblivious) tree builder
//!
//! Grows one level at a time. Every level picks the single
//! `(feature, border)` pair whose summed split score over all current
//! leaves is highest, then splits every leaf on it. Scores and leaf
//! values use L2-regularised second-order statistics:
//! score = G_L²/(H_L+λ) + G_R²/(H_R+λ), leaf = -G/(H+λ).

use healthscore_core::gbdt::{Split, Tree};

use crate::binning::FeatureBins;
use crate::deterministic::SplitTieBreaker;

/// Parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub depth: usize,
    pub l2_leaf_reg: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            depth: 6,
            l2_leaf_reg: 3.0,
        }
    }
}

/// Split candidate with score and tie-breaker
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    score: f64,
    tie_breaker: SplitTieBreaker,
}

impl SplitCandidate {
    fn beats(&self, other: &SplitCandidate) -> bool {
        self.score > other.score
            || (self.score == other.score && self.tie_breaker < other.tie_breaker)
    }
}

/// G²/(H+λ), zero for an empty side
#[inline]
fn side_score(g: f64, h: f64, lambda: f64) -> f64 {
    let denom = h + lambda;
    if denom > 0.0 {
        g * g / denom
    } else {
        0.0
    }
}

/// A built tree plus the leaf every training sample fell into
#[derive(Debug, Clone)]
pub struct BuiltTree {
    pub tree: Tree,
    pub leaf_of: Vec<usize>,
}

/// Builds a symmetric tree from pre-binned features and weighted gradients
pub struct ObliviousBuilder<'a> {
    config: TreeConfig,
    bins: &'a FeatureBins,
    gradients: &'a [f64],
    hessians: &'a [f64],
}

impl<'a> ObliviousBuilder<'a> {
    pub fn new(
        bins: &'a FeatureBins,
        gradients: &'a [f64],
        hessians: &'a [f64],
        config: TreeConfig,
    ) -> Self {
        debug_assert_eq!(gradients.len(), hessians.len());
        Self {
            config,
            bins,
            gradients,
            hessians,
        }
    }

    /// Build the tree; `weight` becomes the tree weight (learning rate)
    pub fn build(&self, weight: f64) -> BuiltTree {
        let n = self.gradients.len();
        let mut leaf_of = vec![0usize; n];
        let mut splits = Vec::with_capacity(self.config.depth);

        for level in 0..self.config.depth {
            let n_leaves = 1usize << level;
            let (feature_idx, border_idx) = match self.find_best_split(&leaf_of, n_leaves) {
                Some(best) => (best.tie_breaker.feature_idx, best.tie_breaker.border_idx),
                None => break,
            };

            let bins = self.bins.bins(feature_idx);
            for (leaf, &bin) in leaf_of.iter_mut().zip(bins) {
                *leaf = (*leaf << 1) | (bin as usize > border_idx) as usize;
            }
            splits.push(Split::new(
                feature_idx,
                self.bins.borders(feature_idx)[border_idx],
            ));
        }

        let leaves = self.calculate_leaf_values(&leaf_of, 1usize << splits.len());

        BuiltTree {
            tree: Tree::new(splits, leaves, weight),
            leaf_of,
        }
    }

    /// Best level-wide split across all features and borders
    fn find_best_split(&self, leaf_of: &[usize], n_leaves: usize) -> Option<SplitCandidate> {
        let lambda = self.config.l2_leaf_reg;
        let mut best: Option<SplitCandidate> = None;

        for feature_idx in 0..self.bins.feature_count() {
            let n_borders = self.bins.borders(feature_idx).len();
            if n_borders == 0 {
                continue;
            }
            let n_bins = n_borders + 1;

            // (leaf, bin) histograms of gradient and hessian sums
            let mut hist_g = vec![0.0; n_leaves * n_bins];
            let mut hist_h = vec![0.0; n_leaves * n_bins];
            for (i, &bin) in self.bins.bins(feature_idx).iter().enumerate() {
                let slot = leaf_of[i] * n_bins + bin as usize;
                hist_g[slot] += self.gradients[i];
                hist_h[slot] += self.hessians[i];
            }

            let mut scores = vec![0.0; n_borders];
            for leaf in 0..n_leaves {
                let row_g = &hist_g[leaf * n_bins..(leaf + 1) * n_bins];
                let row_h = &hist_h[leaf * n_bins..(leaf + 1) * n_bins];
                let total_g: f64 = row_g.iter().sum();
                let total_h: f64 = row_h.iter().sum();

                let (mut left_g, mut left_h) = (0.0, 0.0);
                for (b, score) in scores.iter_mut().enumerate() {
                    left_g += row_g[b];
                    left_h += row_h[b];
                    let right_g = total_g - left_g;
                    let right_h = total_h - left_h;
                    *score += side_score(left_g, left_h, lambda)
                        + side_score(right_g, right_h, lambda);
                }
            }

            for (border_idx, &score) in scores.iter().enumerate() {
                let candidate = SplitCandidate {
                    score,
                    tie_breaker: SplitTieBreaker::new(feature_idx, border_idx),
                };
                best = match best {
                    Some(current) if !candidate.beats(&current) => Some(current),
                    _ => Some(candidate),
                };
            }
        }

        best
    }

    /// Optimal leaf values: -G/(H+λ); empty leaves get 0
    fn calculate_leaf_values(&self, leaf_of: &[usize], n_leaves: usize) -> Vec<f64> {
        let mut sum_g = vec![0.0; n_leaves];
        let mut sum_h = vec![0.0; n_leaves];
        for (i, &leaf) in leaf_of.iter().enumerate() {
            sum_g[leaf] += self.gradients[i];
            sum_h[leaf] += self.hessians[i];
        }

        sum_g
            .iter()
            .zip(&sum_h)
            .map(|(&g, &h)| {
                if h == 0.0 {
                    0.0
                } else {
                    -g / (h + self.config.l2_leaf_reg)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_level_separates_gradients() {
        let columns = vec![vec![1.0, 2.0, 3.0, 4.0]];
        let bins = FeatureBins::build(&columns, 254);
        let gradients = vec![-10.0, -10.0, 10.0, 10.0];
        let hessians = vec![1.0; 4];

        let config = TreeConfig {
            depth: 1,
            l2_leaf_reg: 0.0,
        };
        let built = ObliviousBuilder::new(&bins, &gradients, &hessians, config).build(1.0);

        assert_eq!(built.tree.splits, vec![Split::new(0, 2.5)]);
        assert_eq!(built.tree.leaves, vec![10.0, -10.0]);
        assert_eq!(built.leaf_of, vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_leaf_of_matches_tree_routing() {
        let columns = vec![
            vec![0.1, 0.9, 0.4, 0.7, 0.2, 0.8],
            vec![5.0, 1.0, 3.0, 2.0, 6.0, 4.0],
        ];
        let bins = FeatureBins::build(&columns, 254);
        let gradients = vec![-3.0, 2.0, -1.0, 4.0, -2.0, 1.0];
        let hessians = vec![1.0; 6];

        let built = ObliviousBuilder::new(&bins, &gradients, &hessians, TreeConfig::default()).build(0.1);
        assert!(built.tree.depth() <= 6);
        assert_eq!(built.tree.leaves.len(), 1 << built.tree.depth());

        for i in 0..6 {
            let row = [columns[0][i], columns[1][i]];
            assert_eq!(built.tree.leaf_index(&row), built.leaf_of[i]);
        }
    }

    #[test]
    fn test_constant_features_give_single_leaf() {
        let columns = vec![vec![1.0; 5]];
        let bins = FeatureBins::build(&columns, 254);
        let gradients = vec![2.0; 5];
        let hessians = vec![1.0; 5];

        let built = ObliviousBuilder::new(&bins, &gradients, &hessians, TreeConfig::default()).build(1.0);
        assert_eq!(built.tree.depth(), 0);
        assert_eq!(built.tree.leaves, vec![-10.0 / 8.0]);
    }

    #[test]
    fn test_ties_resolve_to_lowest_feature() {
        // two identical features: the first must win
        let columns = vec![vec![1.0, 2.0, 3.0, 4.0], vec![1.0, 2.0, 3.0, 4.0]];
        let bins = FeatureBins::build(&columns, 254);
        let gradients = vec![-1.0, -1.0, 1.0, 1.0];
        let hessians = vec![1.0; 4];

        let config = TreeConfig {
            depth: 1,
            l2_leaf_reg: 1.0,
        };
        let built = ObliviousBuilder::new(&bins, &gradients, &hessians, config).build(1.0);
        assert_eq!(built.tree.splits[0].feature_idx, 0);
    }
}
