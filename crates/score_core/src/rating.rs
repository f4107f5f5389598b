//! Health rating bands for a 0-100 score

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthRating {
    Excellent,
    Good,
    Moderate,
    Poor,
}

impl HealthRating {
    /// Band for a raw model output; the score is clamped to 0-100 and rounded first
    pub fn from_score(score: f64) -> Self {
        let score = clamp_score(score);
        if score >= 80.0 {
            HealthRating::Excellent
        } else if score >= 60.0 {
            HealthRating::Good
        } else if score >= 40.0 {
            HealthRating::Moderate
        } else {
            HealthRating::Poor
        }
    }
}

impl fmt::Display for HealthRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthRating::Excellent => "excellent",
            HealthRating::Good => "good",
            HealthRating::Moderate => "moderate",
            HealthRating::Poor => "poor",
        };
        f.write_str(label)
    }
}

/// Clamp to 0-100 and round to the nearest integer; NaN maps to 0
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges() {
        assert_eq!(HealthRating::from_score(80.0), HealthRating::Excellent);
        assert_eq!(HealthRating::from_score(79.4), HealthRating::Good);
        assert_eq!(HealthRating::from_score(79.5), HealthRating::Excellent);
        assert_eq!(HealthRating::from_score(60.0), HealthRating::Good);
        assert_eq!(HealthRating::from_score(40.0), HealthRating::Moderate);
        assert_eq!(HealthRating::from_score(39.2), HealthRating::Poor);
    }

    #[test]
    fn test_out_of_range_scores_clamped() {
        assert_eq!(HealthRating::from_score(140.0), HealthRating::Excellent);
        assert_eq!(HealthRating::from_score(-3.0), HealthRating::Poor);
        assert_eq!(clamp_score(f64::NAN), 0.0);
        assert_eq!(HealthRating::Moderate.to_string(), "moderate");
    }
}
