//! Continuous data sets: a named column matrix plus its covariance.
//!
//! Columns are stored contiguously (one `Vec<f64>` per variable) since every
//! consumer reads whole columns. Delimited text parsing accepts a header row
//! of names followed by numeric rows separated by commas, tabs or spaces.

use causal_kernel::proof::canon::{canonical_json_bytes, f64_bits_hex, CanonError};
use causal_kernel::proof::hash::{canonical_hash, ContentHash};
use causal_kernel::proof::hash_domain::HashDomain;
use causal_kernel::variable::{VariableError, VariableSetV1};
use thiserror::Error;

/// Failure building or parsing a data set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("data set has no rows")]
    Empty,
    #[error("row {row} has {found} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row}, column {column}: {detail}")]
    BadValue {
        row: usize,
        column: usize,
        detail: String,
    },
    #[error(transparent)]
    Variables(#[from] VariableError),
}

/// A rectangular continuous data set.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSetV1 {
    variables: VariableSetV1,
    columns: Vec<Vec<f64>>,
}

impl DataSetV1 {
    /// Build from row-major values.
    ///
    /// # Errors
    ///
    /// Returns [`DataError`] for an empty matrix, a ragged row, a non-finite
    /// value, or invalid names.
    pub fn from_rows<S: AsRef<str>>(names: &[S], rows: &[Vec<f64>]) -> Result<Self, DataError> {
        let variables = VariableSetV1::from_names(names.iter().map(|n| n.as_ref().to_string()))?;
        if rows.is_empty() {
            return Err(DataError::Empty);
        }
        let p = variables.len();
        let mut columns = vec![Vec::with_capacity(rows.len()); p];
        for (r, row) in rows.iter().enumerate() {
            if row.len() != p {
                return Err(DataError::RaggedRow {
                    row: r,
                    expected: p,
                    found: row.len(),
                });
            }
            for (c, &x) in row.iter().enumerate() {
                if !x.is_finite() {
                    return Err(DataError::BadValue {
                        row: r,
                        column: c,
                        detail: format!("non-finite value {x}"),
                    });
                }
                columns[c].push(x);
            }
        }
        Ok(Self { variables, columns })
    }

    /// Parse delimited text with a header row.
    ///
    /// # Errors
    ///
    /// Returns [`DataError`] for unparsable numbers or a malformed matrix.
    pub fn parse_delimited(text: &str) -> Result<Self, DataError> {
        let mut lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'));
        let header: Vec<&str> = lines.next().map(split_fields).ok_or(DataError::Empty)?;
        let mut rows = Vec::new();
        for (r, line) in lines.enumerate() {
            let row = split_fields(line)
                .into_iter()
                .enumerate()
                .map(|(c, field)| {
                    field.parse::<f64>().map_err(|e| DataError::BadValue {
                        row: r,
                        column: c,
                        detail: format!("{field:?}: {e}"),
                    })
                })
                .collect::<Result<Vec<f64>, DataError>>()?;
            rows.push(row);
        }
        Self::from_rows(&header, &rows)
    }

    #[must_use]
    pub fn variables(&self) -> &VariableSetV1 {
        &self.variables
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn column(&self, index: usize) -> &[f64] {
        &self.columns[index]
    }

    /// Sample covariance matrix (denominator `n − 1`).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn covariance(&self) -> Vec<Vec<f64>> {
        let n = self.num_rows();
        let p = self.num_columns();
        let means: Vec<f64> = self
            .columns
            .iter()
            .map(|c| c.iter().sum::<f64>() / n as f64)
            .collect();
        let denom = n.saturating_sub(1).max(1) as f64;
        let mut cov = vec![vec![0.0; p]; p];
        for (i, ci) in self.columns.iter().enumerate() {
            for (j, cj) in self.columns.iter().enumerate().skip(i) {
                let s: f64 = ci
                    .iter()
                    .zip(cj)
                    .map(|(a, b)| (a - means[i]) * (b - means[j]))
                    .sum();
                cov[i][j] = s / denom;
                cov[j][i] = s / denom;
            }
        }
        cov
    }

    /// Content digest over names and the exact bits of every value.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if canonicalization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let value = serde_json::json!({
            "columns": self
                .columns
                .iter()
                .map(|c| c.iter().map(|&x| f64_bits_hex(x)).collect::<Vec<_>>())
                .collect::<Vec<_>>(),
            "variables": self.variables.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
        });
        let bytes = canonical_json_bytes(&value)?;
        Ok(canonical_hash(HashDomain::Dataset, &bytes))
    }
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(|c: char| c == ',' || c == '\t' || c == ' ')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect()
}
