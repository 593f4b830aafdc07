//! `DataFrame` module for named column containers.
//!
//! A minimal column store for the `fit(df, target)` / `predict(df, target)`
//! contract: named f32 columns, target/feature extraction and a small CSV
//! reader for numeric tables.

use std::path::Path;

use crate::error::{NngaError, Result};
use crate::primitives::{Matrix, Vector};

/// A minimal `DataFrame` with named columns.
///
/// # Examples
///
/// ```
/// use nnga::data::DataFrame;
/// use nnga::primitives::Vector;
///
/// let columns = vec![
///     ("x".to_string(), Vector::from_slice(&[1.0, 2.0, 3.0])),
///     ("y".to_string(), Vector::from_slice(&[4.0, 5.0, 6.0])),
/// ];
/// let df = DataFrame::new(columns).expect("valid columns");
/// assert_eq!(df.shape(), (3, 2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    columns: Vec<(String, Vector<f32>)>,
    n_rows: usize,
}

impl DataFrame {
    /// Creates a new `DataFrame` from named columns.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no columns, columns have different
    /// lengths, a name is empty or a name is repeated.
    pub fn new(columns: Vec<(String, Vector<f32>)>) -> Result<Self> {
        if columns.is_empty() {
            return Err(NngaError::EmptyData(
                "DataFrame must have at least one column".to_string(),
            ));
        }

        let n_rows = columns[0].1.len();

        for (name, col) in &columns {
            if col.len() != n_rows {
                return Err(NngaError::DimensionMismatch {
                    expected: format!("{n_rows} rows"),
                    actual: format!("{} rows in column '{name}'", col.len()),
                });
            }
            if name.is_empty() {
                return Err("Column names cannot be empty".into());
            }
        }

        let mut names: Vec<&str> = columns.iter().map(|(n, _)| n.as_str()).collect();
        names.sort_unstable();
        if let Some(dup) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(format!("Duplicate column name '{}'", dup[0]).into());
        }

        Ok(Self { columns, n_rows })
    }

    /// Parses a comma-separated table with a header row.
    ///
    /// Fields may be quoted and surrounding whitespace is trimmed. Every
    /// cell must parse as a number; blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error for a missing header, ragged rows or non-numeric cells.
    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_csv_reader(csv_builder().from_reader(content.as_bytes()))
    }

    /// Reads a CSV file (see [`DataFrame::from_csv_str`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = csv_builder().from_path(path).map_err(csv_error)?;
        Self::from_csv_reader(reader)
    }

    fn from_csv_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let names: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(str::to_string)
            .collect();
        if names.is_empty() || names.iter().all(String::is_empty) {
            return Err(NngaError::EmptyData("CSV has no header row".to_string()));
        }

        let mut values: Vec<Vec<f32>> = vec![Vec::new(); names.len()];
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            let line = record.position().map_or(0, csv::Position::line);
            for (col, cell) in values.iter_mut().zip(record.iter()) {
                let v: f32 = cell.parse().map_err(|_| {
                    NngaError::Serialization(format!("non-numeric cell '{cell}' on line {line}"))
                })?;
                col.push(v);
            }
        }

        Self::new(
            names
                .into_iter()
                .zip(values)
                .map(|(n, v)| (n, Vector::from_vec(v)))
                .collect(),
        )
    }

    /// Returns the shape as (`n_rows`, `n_cols`).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Returns the column names.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// True if a column called `name` exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// Returns a reference to a column by name.
    ///
    /// # Errors
    ///
    /// Returns [`NngaError::ColumnNotFound`] if the column doesn't exist.
    pub fn column(&self, name: &str) -> Result<&Vector<f32>> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| NngaError::ColumnNotFound(name.to_string()))
    }

    /// Selects multiple columns by name, returning a new `DataFrame`.
    ///
    /// # Errors
    ///
    /// Returns an error if any column doesn't exist.
    pub fn select(&self, names: &[&str]) -> Result<Self> {
        if names.is_empty() {
            return Err("Must select at least one column".into());
        }

        let mut selected = Vec::with_capacity(names.len());
        for &name in names {
            selected.push((name.to_string(), self.column(name)?.clone()));
        }

        Self::new(selected)
    }

    /// Returns a copy without column `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the column doesn't exist or is the only column.
    pub fn drop(&self, name: &str) -> Result<Self> {
        if !self.has_column(name) {
            return Err(NngaError::ColumnNotFound(name.to_string()));
        }
        if self.columns.len() == 1 {
            return Err("Cannot drop the last column".into());
        }
        let kept = self
            .columns
            .iter()
            .filter(|(n, _)| n != name)
            .cloned()
            .collect();
        Self::new(kept)
    }

    /// Adds a new column to the `DataFrame`.
    ///
    /// # Errors
    ///
    /// Returns an error if column length doesn't match or name already exists.
    pub fn add_column(&mut self, name: String, data: Vector<f32>) -> Result<()> {
        if data.len() != self.n_rows {
            return Err(NngaError::DimensionMismatch {
                expected: format!("{} rows", self.n_rows),
                actual: format!("{} rows", data.len()),
            });
        }
        if name.is_empty() {
            return Err("Column name cannot be empty".into());
        }
        if self.has_column(&name) {
            return Err(format!("Column name '{name}' already exists").into());
        }

        self.columns.push((name, data));
        Ok(())
    }

    /// Converts the `DataFrame` to a row-major Matrix of shape
    /// (`n_rows`, `n_cols`).
    ///
    /// # Errors
    ///
    /// Never fails for a well-formed frame; the `Result` mirrors
    /// [`Matrix::from_vec`].
    pub fn to_matrix(&self) -> Result<Matrix<f32>> {
        let mut data = Vec::with_capacity(self.n_rows * self.columns.len());
        for row_idx in 0..self.n_rows {
            for (_, col) in &self.columns {
                data.push(col[row_idx]);
            }
        }
        Matrix::from_vec(self.n_rows, self.columns.len(), data)
    }

    /// Splits the frame into features and target.
    ///
    /// Returns `(x, y, feature_names)`, with feature columns in frame order.
    ///
    /// # Errors
    ///
    /// Returns an error if `target` is missing or is the only column.
    pub fn split_target(&self, target: &str) -> Result<(Matrix<f32>, Vector<f32>, Vec<String>)> {
        let y = self.column(target)?.clone();
        let features = self.drop(target)?;
        let names = features
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        Ok((features.to_matrix()?, y, names))
    }

    /// Returns an iterator over columns as (name, vector) pairs.
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &Vector<f32>)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }
}

fn csv_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).trim(csv::Trim::All);
    builder
}

fn csv_error(err: csv::Error) -> NngaError {
    if let Some(line) = err.position().map(csv::Position::line) {
        return NngaError::Serialization(format!("CSV error on line {line}: {err}"));
    }
    match err.into_kind() {
        csv::ErrorKind::Io(io) => NngaError::Io(io),
        other => NngaError::Serialization(format!("CSV error: {other:?}")),
    }
}

#[cfg(test)]
#[path = "data_tests.rs"]
mod tests;
