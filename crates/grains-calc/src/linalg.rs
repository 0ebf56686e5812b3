use grains_core::errors::{ErrorInfo, GrainsError};
use grains_core::Grain;
use log::debug;
use serde::{Deserialize, Serialize};

fn dimension_mismatch(rows: usize, detail: &str) -> GrainsError {
    GrainsError::Linalg(
        ErrorInfo::new("dimension-mismatch", "system is not square or b has the wrong length")
            .with_context("rows", rows.to_string())
            .with_context("detail", detail),
    )
}

/// Dense square matrix of grains, stored by rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix {
    rows: Vec<Vec<Grain>>,
}

impl Matrix {
    /// Wraps row data, requiring every row to have the same length.
    pub fn from_rows(rows: Vec<Vec<Grain>>) -> Result<Self, GrainsError> {
        if let Some(first) = rows.first() {
            let width = first.len();
            if let Some(bad) = rows.iter().position(|row| row.len() != width) {
                return Err(dimension_mismatch(rows.len(), &format!("row {bad} is ragged")));
            }
        }
        Ok(Self { rows })
    }

    /// `n × n` identity.
    pub fn identity(n: usize) -> Self {
        let rows = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| if i == j { Grain::one() } else { Grain::zero() })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Row access.
    pub fn rows(&self) -> &[Vec<Grain>] {
        &self.rows
    }

    /// Exact product `A·x`.
    pub fn mul_vec(&self, x: &[Grain]) -> Result<Vec<Grain>, GrainsError> {
        self.rows
            .iter()
            .map(|row| {
                if row.len() != x.len() {
                    return Err(dimension_mismatch(self.rows.len(), "vector length"));
                }
                Ok(row.iter().zip(x).map(|(a, b)| a * b).sum())
            })
            .collect()
    }
}

/// Solves `A·x = b` exactly by Gauss-Jordan elimination with row swaps.
pub fn solve(a: &[Vec<Grain>], b: &[Grain]) -> Result<Vec<Grain>, GrainsError> {
    let n = a.len();
    if b.len() != n {
        return Err(dimension_mismatch(n, "b length"));
    }
    if a.iter().any(|row| row.len() != n) {
        return Err(dimension_mismatch(n, "matrix is not square"));
    }

    let mut aug: Vec<Vec<Grain>> = a
        .iter()
        .zip(b)
        .map(|(row, rhs)| {
            let mut row = row.clone();
            row.push(rhs.clone());
            row
        })
        .collect();

    for col in 0..n {
        if aug[col][col].is_zero() {
            if let Some(swap) = (col + 1..n).find(|&r| !aug[r][col].is_zero()) {
                debug!("swapping rows {col} and {swap}");
                aug.swap(col, swap);
            }
        }
        let pivot = aug[col][col].clone();
        if pivot.is_zero() {
            return Err(GrainsError::Linalg(
                ErrorInfo::new("singular", "matrix is singular")
                    .with_context("column", col.to_string()),
            ));
        }

        for value in aug[col][col..].iter_mut() {
            *value = value.checked_div(&pivot)?;
        }

        let pivot_row = aug[col].clone();
        for (r, row) in aug.iter_mut().enumerate() {
            if r == col || row[col].is_zero() {
                continue;
            }
            let factor = row[col].clone();
            for (c, value) in row.iter_mut().enumerate().skip(col) {
                *value = &*value - &factor * &pivot_row[c];
            }
        }
    }

    Ok(aug.into_iter().map(|mut row| row.swap_remove(n)).collect())
}
