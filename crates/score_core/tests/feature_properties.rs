//! Property tests for derived nutrition features and robust scaling

use healthscore_core::features::{CALORIES, CARBS, FAT, PROTEIN, SUGAR};
use healthscore_core::{engineer_features, NutritionFacts, RobustScaler, Table, DERIVED_COLUMNS};
use proptest::prelude::*;

fn nutrition() -> impl Strategy<Value = NutritionFacts> {
    (0.0f64..900.0, 0.0f64..100.0, 0.0f64..100.0, 0.0f64..100.0, 0.0f64..100.0).prop_map(
        |(calories, protein, fat, carbs, sugar)| NutritionFacts {
            calories,
            protein,
            fat,
            carbs,
            sugar,
        },
    )
}

fn table_of(rows: &[NutritionFacts]) -> Table {
    let names = vec![
        PROTEIN.to_string(),
        CALORIES.to_string(),
        FAT.to_string(),
        CARBS.to_string(),
        SUGAR.to_string(),
    ];
    let columns = vec![
        rows.iter().map(|r| r.protein).collect(),
        rows.iter().map(|r| r.calories).collect(),
        rows.iter().map(|r| r.fat).collect(),
        rows.iter().map(|r| r.carbs).collect(),
        rows.iter().map(|r| r.sugar).collect(),
    ];
    Table::from_columns(names, columns).unwrap()
}

proptest! {
    #[test]
    fn derived_columns_follow_formulas(rows in prop::collection::vec(nutrition(), 1..40)) {
        let out = engineer_features(&table_of(&rows)).unwrap().table;

        for (i, r) in rows.iter().enumerate() {
            let expected = [
                r.protein / (r.calories + 1.0),
                r.fat / (r.calories + 1.0),
                r.sugar / (r.carbs + 1.0),
                r.protein / (r.fat + r.carbs + 1.0),
                r.calories / 100.0,
                r.protein + r.fat + r.carbs,
            ];
            for (name, want) in DERIVED_COLUMNS.iter().zip(expected) {
                let got = out.column(name).unwrap()[i];
                prop_assert!((got - want).abs() <= 1e-12 * want.abs().max(1.0));
            }
        }
    }

    #[test]
    fn scaled_training_median_is_zero(values in prop::collection::vec(-1e3f64..1e3, 1..60)) {
        let scaler = RobustScaler::fit(&[values.clone()]).unwrap();
        let center = scaler.params()[0].center;
        let scaled = scaler.transform_row(&[center]).unwrap();
        prop_assert_eq!(scaled[0], 0.0);
    }
}
