//! CSV dataset loading
//!
//! Reads a headed CSV where every cell is numeric. Empty cells and the
//! usual missing markers load as NaN; anything else that fails to parse
//! aborts the load with the offending line and column.

use anyhow::{bail, Context, Result};
use healthscore_core::Table;
use std::path::Path;

/// Cell values treated as missing
const MISSING_MARKERS: [&str; 6] = ["", "NA", "N/A", "NaN", "nan", "null"];

/// Load a headed numeric CSV file into a table
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file {}", path.display()))?;

    let names: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(str::to_string)
        .collect();
    if names.is_empty() {
        bail!("CSV header has no columns");
    }

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    for (row_idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV record {}", row_idx + 1))?;
        let line = record.position().map_or(row_idx + 2, |p| p.line() as usize);

        for ((field, name), column) in record.iter().zip(&names).zip(columns.iter_mut()) {
            column.push(parse_cell(field).with_context(|| {
                format!("Line {}, column {}: invalid number {:?}", line, name, field)
            })?);
        }
    }

    if columns[0].is_empty() {
        bail!("Dataset is empty");
    }

    Ok(Table::from_columns(names, columns)?)
}

fn parse_cell(field: &str) -> Result<f64> {
    if MISSING_MARKERS.contains(&field) {
        return Ok(f64::NAN);
    }
    Ok(field.parse::<f64>()?)
}

/// Features and target of a dataset split on the target column
#[derive(Clone, Debug)]
pub struct Dataset {
    pub features: Table,
    pub targets: Vec<f64>,
}

impl Dataset {
    /// Separate `target` from the remaining feature columns
    ///
    /// Features may be missing (NaN); every target must be a finite number.
    pub fn from_table(table: &Table, target: &str) -> Result<Self> {
        let (features, targets) = table
            .split_off_column(target)
            .with_context(|| format!("Target column {target} missing"))?;
        if features.n_cols() == 0 {
            bail!("No feature columns besides the target {}", target);
        }
        if let Some(row) = targets.iter().position(|t| !t.is_finite()) {
            bail!(
                "Target {} is missing or non-finite in data row {} (CSV line {})",
                target,
                row + 1,
                row + 2
            );
        }
        Ok(Self { features, targets })
    }

    /// Get number of samples
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Check if dataset is empty
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn feature_names(&self) -> &[String] {
        self.features.column_names()
    }

    /// Rows at `indices`, in that order
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            features: self.features.take_rows(indices),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
        }
    }

    /// Per-feature (min, max) over non-NaN values; NaN for an all-missing column
    pub fn feature_stats(&self) -> Vec<(f64, f64)> {
        self.features
            .columns()
            .iter()
            .map(|col| {
                col.iter()
                    .filter(|v| !v.is_nan())
                    .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
                        None => Some((v, v)),
                        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                    })
                    .unwrap_or((f64::NAN, f64::NAN))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(body: &str) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        write!(file, "{}", body)?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_csv() -> Result<()> {
        let file = create_test_csv("a,b,target\n1,2.5,10\n3, 4 ,20\n5,,30\n")?;
        let table = load_csv(file.path())?;

        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.column_names(), &["a", "b", "target"]);
        assert_eq!(table.column("b")?[1], 4.0);
        assert!(table.column("b")?[2].is_nan());
        Ok(())
    }

    #[test]
    fn test_non_numeric_cell_is_fatal() -> Result<()> {
        let file = create_test_csv("a,b\n1,2\n3,oops\n")?;
        let err = load_csv(file.path()).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Line 3"), "{message}");
        assert!(message.contains("column b"), "{message}");
        Ok(())
    }

    #[test]
    fn test_ragged_rows_and_empty_file_rejected() -> Result<()> {
        let ragged = create_test_csv("a,b\n1,2\n3\n")?;
        assert!(load_csv(ragged.path()).is_err());

        let empty = create_test_csv("a,b\n")?;
        assert!(load_csv(empty.path()).is_err());

        assert!(load_csv("/nonexistent/food.csv").is_err());
        Ok(())
    }

    #[test]
    fn test_dataset_split_and_stats() -> Result<()> {
        let file = create_test_csv("a,target,b\n1,10,5\n3,20,\n2,30,7\n")?;
        let dataset = Dataset::from_table(&load_csv(file.path())?, "target")?;

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.feature_names(), &["a", "b"]);
        assert_eq!(dataset.targets, vec![10.0, 20.0, 30.0]);

        let stats = dataset.feature_stats();
        assert_eq!(stats[0], (1.0, 3.0));
        assert_eq!(stats[1], (5.0, 7.0));

        let sub = dataset.subset(&[2, 0]);
        assert_eq!(sub.targets, vec![30.0, 10.0]);
        assert_eq!(sub.features.row(0), vec![2.0, 7.0]);

        assert!(Dataset::from_table(&load_csv(file.path())?, "missing").is_err());
        Ok(())
    }

    #[test]
    fn test_missing_target_rejected_with_row() -> Result<()> {
        let file = create_test_csv("a,target\n1,10\n2,20\n3,\n4,NA\n")?;
        let table = load_csv(file.path())?;
        assert!(table.column("target")?[2].is_nan());

        let err = Dataset::from_table(&table, "target").unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("data row 3"), "{message}");
        assert!(message.contains("CSV line 4"), "{message}");
        Ok(())
    }

    #[test]
    fn test_missing_feature_kept_as_nan() -> Result<()> {
        let file = create_test_csv("a,b,target\n1,,10\nNA,2,20\n")?;
        let dataset = Dataset::from_table(&load_csv(file.path())?, "target")?;

        assert!(dataset.features.column("b")?[0].is_nan());
        assert!(dataset.features.column("a")?[1].is_nan());
        assert_eq!(dataset.targets, vec![10.0, 20.0]);
        Ok(())
    }
}
