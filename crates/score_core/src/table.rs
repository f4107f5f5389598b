//! Column-major numeric table
//!
//! Holds named `f64` columns of equal length. Missing values are NaN.

use crate::errors::{CoreError, Result};

/// In-memory table of named numeric columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl Table {
    /// Build a table from parallel name and column vectors
    pub fn from_columns(names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(CoreError::ShapeMismatch(format!(
                "{} names for {} columns",
                names.len(),
                columns.len()
            )));
        }

        let mut table = Self::default();
        for (name, values) in names.into_iter().zip(columns) {
            if table.position(&name).is_some() {
                return Err(CoreError::ShapeMismatch(format!("duplicate column: {name}")));
            }
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Number of rows (0 for a table without columns)
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// Column names in table order
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Column data in table order
    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Borrow a column by name
    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.position(name)
            .map(|idx| self.columns[idx].as_slice())
            .ok_or_else(|| CoreError::ColumnNotFound(name.to_string()))
    }

    /// Append a column, replacing any existing column with the same name in place
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if !self.columns.is_empty() && values.len() != self.n_rows() {
            return Err(CoreError::ShapeMismatch(format!(
                "column {name} has {} rows, table has {}",
                values.len(),
                self.n_rows()
            )));
        }

        match self.position(&name) {
            Some(idx) => self.columns[idx] = values,
            None => {
                self.names.push(name);
                self.columns.push(values);
            }
        }
        Ok(())
    }

    /// Remove a column, returning the remaining table and the removed values
    pub fn split_off_column(&self, name: &str) -> Result<(Table, Vec<f64>)> {
        let idx = self
            .position(name)
            .ok_or_else(|| CoreError::ColumnNotFound(name.to_string()))?;

        let mut rest = self.clone();
        rest.names.remove(idx);
        let removed = rest.columns.remove(idx);
        Ok((rest, removed))
    }

    /// New table holding the given rows, in the given order
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|col| indices.iter().map(|&i| col[i]).collect())
            .collect();

        Table {
            names: self.names.clone(),
            columns,
        }
    }

    /// Copy of one row in column order
    pub fn row(&self, idx: usize) -> Vec<f64> {
        self.columns.iter().map(|col| col[idx]).collect()
    }

    /// All rows in column order
    pub fn rows(&self) -> Vec<Vec<f64>> {
        (0..self.n_rows()).map(|i| self.row(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_columns(
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_shape_and_lookup() {
        let table = sample();
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.n_cols(), 2);
        assert_eq!(table.column("b").unwrap(), &[10.0, 20.0, 30.0]);
        assert!(matches!(table.column("c"), Err(CoreError::ColumnNotFound(_))));
    }

    #[test]
    fn test_push_rejects_wrong_length() {
        let mut table = sample();
        assert!(table.push_column("c", vec![1.0]).is_err());
        table.push_column("c", vec![0.0; 3]).unwrap();
        assert_eq!(table.column_names(), &["a", "b", "c"]);
    }

    #[test]
    fn test_push_replaces_existing() {
        let mut table = sample();
        table.push_column("a", vec![7.0, 8.0, 9.0]).unwrap();
        assert_eq!(table.n_cols(), 2);
        assert_eq!(table.column("a").unwrap(), &[7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_split_off_and_take_rows() {
        let table = sample();
        let (rest, removed) = table.split_off_column("a").unwrap();
        assert_eq!(removed, vec![1.0, 2.0, 3.0]);
        assert_eq!(rest.column_names(), &["b"]);

        let picked = table.take_rows(&[2, 0]);
        assert_eq!(picked.row(0), vec![3.0, 30.0]);
        assert_eq!(picked.row(1), vec![1.0, 10.0]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = Table::from_columns(vec!["a".into(), "a".into()], vec![vec![1.0], vec![2.0]]);
        assert!(result.is_err());
    }
}
