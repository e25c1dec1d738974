//! Dense linear algebra for the small systems the models need.
//!
//! Matrices are row-major `Vec<Vec<f64>>`. Everything here is sized by the
//! number of regressors or state dimensions, never by the sample size, so
//! Gauss-Jordan elimination is sufficient.

use std::f64::consts::PI;

/// Relative pivot size below which a matrix is treated as singular.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Inverts a square matrix with partial pivoting.
///
/// Returns `None` if the matrix is singular to working precision.
pub fn invert(matrix: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = matrix.len();
    let scale = matrix
        .iter()
        .flatten()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }

    let mut a: Vec<Vec<f64>> = matrix.to_vec();
    let mut inv: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))?;
        if a[pivot_row][col].abs() <= SINGULAR_TOLERANCE * scale {
            return None;
        }
        a.swap(col, pivot_row);
        inv.swap(col, pivot_row);

        let pivot = a[col][col];
        for j in 0..n {
            a[col][j] /= pivot;
            inv[col][j] /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                a[row][j] -= factor * a[col][j];
                inv[row][j] -= factor * inv[col][j];
            }
        }
    }

    Some(inv)
}

/// Solves `matrix * x = rhs`.
pub fn solve(matrix: &[Vec<f64>], rhs: &[f64]) -> Option<Vec<f64>> {
    let inv = invert(matrix)?;
    Some(mat_vec(&inv, rhs))
}

/// Matrix-vector product.
pub fn mat_vec(matrix: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    matrix
        .iter()
        .map(|row| row.iter().zip(v).map(|(a, b)| a * b).sum())
        .collect()
}

/// Ordinary least squares estimates.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    /// Coefficients, one per regressor column.
    pub params: Vec<f64>,
    /// Standard errors of the coefficients.
    pub std_errors: Vec<f64>,
    /// Sum of squared residuals.
    pub ssr: f64,
    /// Number of observations.
    pub nobs: usize,
}

impl OlsFit {
    /// t-statistic of coefficient `i`.
    pub fn t_value(&self, i: usize) -> f64 {
        self.params[i] / self.std_errors[i]
    }

    /// Gaussian log-likelihood at the OLS estimates.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -n / 2.0 * ((2.0 * PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion, `-2 llf + 2 k`.
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.params.len() as f64
    }
}

/// Fits `y = X b + e` by least squares.
///
/// `rows` holds one regressor row per observation. Returns `None` when
/// `X'X` is singular or there are no residual degrees of freedom.
pub fn ols(y: &[f64], rows: &[Vec<f64>]) -> Option<OlsFit> {
    let n = y.len();
    let k = rows.first()?.len();
    if rows.len() != n || n <= k {
        return None;
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &yi) in rows.iter().zip(y) {
        for i in 0..k {
            xty[i] += row[i] * yi;
            for j in i..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[i][j] = xtx[j][i];
        }
    }

    let xtx_inv = invert(&xtx)?;
    let params = mat_vec(&xtx_inv, &xty);

    let ssr: f64 = rows
        .iter()
        .zip(y)
        .map(|(row, &yi)| {
            let fitted: f64 = row.iter().zip(&params).map(|(x, b)| x * b).sum();
            (yi - fitted).powi(2)
        })
        .sum();

    let sigma2 = ssr / (n - k) as f64;
    let std_errors = (0..k).map(|i| (sigma2 * xtx_inv[i][i]).sqrt()).collect();

    Some(OlsFit {
        params,
        std_errors,
        ssr,
        nobs: n,
    })
}
