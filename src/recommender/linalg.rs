//! Small dense linear algebra for the per-action design matrices.
//!
//! Matrices are square, row-major and tiny (`d` is a few dozen), so a hand-rolled
//! Cholesky factorization is all the engine needs: it both inverts the symmetric
//! positive-definite design matrix and detects when that invariant has been lost.

use crate::error::{RecError, Result};

/// Smallest admissible Cholesky pivot.
const PIVOT_EPSILON: f64 = 1e-12;

/// Square row-major matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    dim: usize,
    data: Vec<f64>,
}

impl Matrix {
    #[must_use]
    pub fn identity(dim: usize) -> Self {
        let mut data = vec![0.0; dim * dim];
        for i in 0..dim {
            data[i * dim + i] = 1.0;
        }
        Self { dim, data }
    }

    /// Build from nested rows; every row must have exactly `rows.len()` entries.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let dim = rows.len();
        let mut data = Vec::with_capacity(dim * dim);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dim {
                return Err(RecError::MalformedState(format!(
                    "row {i} has {} entries, expected {dim}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self { dim, data })
    }

    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.dim.max(1)).map(<[f64]>::to_vec).collect()
    }

    #[must_use]
    pub const fn dim(&self) -> usize {
        self.dim
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.dim + col]
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// `self += x xᵀ`. Caller guarantees `x.len() == dim`.
    pub fn add_outer(&mut self, x: &[f64]) {
        debug_assert_eq!(x.len(), self.dim);
        for (i, xi) in x.iter().enumerate() {
            let row = &mut self.data[i * self.dim..(i + 1) * self.dim];
            for (cell, xj) in row.iter_mut().zip(x) {
                *cell += xi * xj;
            }
        }
    }

    #[must_use]
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        (0..self.dim).all(|i| {
            (i + 1..self.dim).all(|j| (self.get(i, j) - self.get(j, i)).abs() <= tolerance)
        })
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// `A = L Lᵀ`; fails with `NumericDegenerate` if `A` is not positive-definite.
    pub fn cholesky(&self) -> Result<Cholesky> {
        let n = self.dim;
        let mut l = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..=i {
                let mut sum = self.get(i, j);
                for k in 0..j {
                    sum -= l[i * n + k] * l[j * n + k];
                }
                if i == j {
                    if !sum.is_finite() || sum <= PIVOT_EPSILON {
                        return Err(RecError::NumericDegenerate(format!(
                            "matrix is not positive-definite (pivot {i} = {sum})"
                        )));
                    }
                    l[i * n + i] = sum.sqrt();
                } else {
                    l[i * n + j] = sum / l[j * n + j];
                }
            }
        }
        Ok(Cholesky { dim: n, l })
    }

    /// Explicit inverse of a symmetric positive-definite matrix.
    pub fn inverse_spd(&self) -> Result<Self> {
        let factor = self.cholesky()?;
        let n = self.dim;
        let mut data = vec![0.0; n * n];
        let mut e = vec![0.0; n];
        for col in 0..n {
            e.fill(0.0);
            e[col] = 1.0;
            let solved = factor.solve(&e);
            for (row, v) in solved.into_iter().enumerate() {
                data[row * n + col] = v;
            }
        }
        Ok(Self { dim: n, data })
    }
}

/// Lower-triangular Cholesky factor.
#[derive(Debug, Clone)]
pub struct Cholesky {
    dim: usize,
    l: Vec<f64>,
}

impl Cholesky {
    /// Solve `L y = b`.
    fn forward(&self, b: &[f64]) -> Vec<f64> {
        let n = self.dim;
        let mut y = vec![0.0; n];
        for i in 0..n {
            let mut sum = b[i];
            for k in 0..i {
                sum -= self.l[i * n + k] * y[k];
            }
            y[i] = sum / self.l[i * n + i];
        }
        y
    }

    /// Solve `A z = b`.
    #[must_use]
    pub fn solve(&self, b: &[f64]) -> Vec<f64> {
        let n = self.dim;
        let y = self.forward(b);
        let mut z = vec![0.0; n];
        for i in (0..n).rev() {
            let mut sum = y[i];
            for k in i + 1..n {
                sum -= self.l[k * n + i] * z[k];
            }
            z[i] = sum / self.l[i * n + i];
        }
        z
    }

    /// `xᵀ A⁻¹ x`, computed as `|L⁻¹ x|²` so it is never negative.
    #[must_use]
    pub fn inverse_quadratic_form(&self, x: &[f64]) -> f64 {
        self.forward(x).iter().map(|v| v * v).sum()
    }
}

#[must_use]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn identity_inverts_to_itself() {
        let eye = Matrix::identity(3);
        assert_eq!(eye.inverse_spd().unwrap(), eye);
    }

    #[test]
    fn inverse_of_known_matrix() {
        let a = Matrix::from_rows(&[vec![4.0, 2.0], vec![2.0, 3.0]]).unwrap();
        let inv = a.inverse_spd().unwrap();
        // det = 8, inverse = [[3, -2], [-2, 4]] / 8
        assert!(approx(inv.get(0, 0), 0.375));
        assert!(approx(inv.get(0, 1), -0.25));
        assert!(approx(inv.get(1, 0), -0.25));
        assert!(approx(inv.get(1, 1), 0.5));
    }

    #[test]
    fn solve_and_quadratic_form_agree_with_inverse() {
        let mut a = Matrix::identity(3);
        a.add_outer(&[1.0, 0.5, -0.25]);
        a.add_outer(&[0.0, 2.0, 1.0]);
        let inv = a.inverse_spd().unwrap();
        let factor = a.cholesky().unwrap();
        let x = [0.3, -1.0, 2.0];

        let z = factor.solve(&x);
        for (i, zi) in z.iter().enumerate() {
            let expected: f64 = (0..3).map(|j| inv.get(i, j) * x[j]).sum();
            assert!(approx(*zi, expected));
        }
        assert!(approx(factor.inverse_quadratic_form(&x), dot(&x, &z)));
    }

    #[test]
    fn add_outer_keeps_symmetry() {
        let mut a = Matrix::identity(2);
        a.add_outer(&[1.0, 3.0]);
        assert_eq!(a.to_rows(), vec![vec![2.0, 3.0], vec![3.0, 10.0]]);
        assert!(a.is_symmetric(0.0));
    }

    #[test]
    fn singular_matrix_is_degenerate() {
        let a = Matrix::from_rows(&[vec![1.0, 1.0], vec![1.0, 1.0]]).unwrap();
        assert!(matches!(a.cholesky(), Err(RecError::NumericDegenerate(_))));
    }

    #[test]
    fn nan_matrix_is_degenerate() {
        let a = Matrix::from_rows(&[vec![f64::NAN, 0.0], vec![0.0, 1.0]]).unwrap();
        assert!(matches!(a.inverse_spd(), Err(RecError::NumericDegenerate(_))));
    }

    #[test]
    fn ragged_rows_are_malformed() {
        let err = Matrix::from_rows(&[vec![1.0, 0.0], vec![0.0]]).unwrap_err();
        assert!(matches!(err, RecError::MalformedState(_)));
    }
}
