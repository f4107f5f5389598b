//! Nutrition feature engineering
//!
//! Derives six ratio features from the five per-100g base columns.
//! The `+ 1.0` denominators are a fixed epsilon and must not change:
//! trained models depend on the exact values. Inputs are not bounds
//! checked, so calories of exactly -1 divide by zero and yield a
//! non-finite ratio, which is logged rather than corrected.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::Result;
use crate::table::Table;

pub const PROTEIN: &str = "Protein_g_per_100g";
pub const CALORIES: &str = "Calories_kcal_per_100g";
pub const FAT: &str = "Fat_g_per_100g";
pub const CARBS: &str = "Carbs_g_per_100g";
pub const SUGAR: &str = "Sugar_g_per_100g";

/// Target column of the training dataset
pub const TARGET: &str = "HealthScore_0_100";

/// Denominator epsilon used by every ratio feature
pub const RATIO_EPSILON: f64 = 1.0;

/// Derived column names, in the order they are appended
pub const DERIVED_COLUMNS: [&str; 6] = [
    "protein_to_calorie_ratio",
    "fat_to_calorie_ratio",
    "sugar_to_carb_ratio",
    "macronutrient_balance",
    "calorie_density",
    "total_macros",
];

/// Base nutrition facts for a single product (per 100g)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub sugar: f64,
}

impl NutritionFacts {
    /// Compute the derived features in `DERIVED_COLUMNS` order
    pub fn derive(&self) -> [f64; 6] {
        [
            self.protein / (self.calories + RATIO_EPSILON),
            self.fat / (self.calories + RATIO_EPSILON),
            self.sugar / (self.carbs + RATIO_EPSILON),
            self.protein / (self.fat + self.carbs + RATIO_EPSILON),
            self.calories / 100.0,
            self.protein + self.fat + self.carbs,
        ]
    }
}

/// Table with derived columns and the number of rows they made non-finite
#[derive(Debug, Clone)]
pub struct EngineeredFeatures {
    pub table: Table,
    pub non_finite_rows: usize,
}

/// Append the derived columns to a copy of `table`
///
/// Fails if any base column is missing. Existing columns are kept in place.
/// Non-finite derived rows are counted and logged once, never rejected.
pub fn engineer_features(table: &Table) -> Result<EngineeredFeatures> {
    let protein = table.column(PROTEIN)?;
    let calories = table.column(CALORIES)?;
    let fat = table.column(FAT)?;
    let carbs = table.column(CARBS)?;
    let sugar = table.column(SUGAR)?;

    let n = table.n_rows();
    let mut derived: Vec<Vec<f64>> = vec![Vec::with_capacity(n); DERIVED_COLUMNS.len()];

    for i in 0..n {
        let facts = NutritionFacts {
            calories: calories[i],
            protein: protein[i],
            fat: fat[i],
            carbs: carbs[i],
            sugar: sugar[i],
        };
        for (column, value) in derived.iter_mut().zip(facts.derive()) {
            column.push(value);
        }
    }

    let mut out = table.clone();
    for (name, values) in DERIVED_COLUMNS.iter().zip(derived) {
        out.push_column(*name, values)?;
    }

    let flagged = non_finite_rows(&out, &DERIVED_COLUMNS)?;
    if flagged > 0 {
        warn!(
            "{} rows have non-finite derived features (null inputs or a zero denominator)",
            flagged
        );
    }

    Ok(EngineeredFeatures {
        table: out,
        non_finite_rows: flagged,
    })
}

/// Count rows where any of `columns` holds NaN or an infinity
pub fn non_finite_rows(table: &Table, columns: &[&str]) -> Result<usize> {
    let cols = columns
        .iter()
        .map(|name| table.column(name))
        .collect::<Result<Vec<_>>>()?;

    Ok((0..table.n_rows())
        .filter(|&i| cols.iter().any(|col| !col[i].is_finite()))
        .count())
}
