//! Dense matrix operations
//!
//! Row-major dense matrix used for embedding coordinates, floating point
//! lattice bases and exact rational linear algebra.

use crate::error::{Result, SunitError};
use crate::rational::Rational;
use std::ops::Range;

/// Dense matrix in row-major order
///
/// Zero-sized shapes (`n x 0`, `0 x m`) are valid and used to represent a
/// field without real or without complex places.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Clone> Matrix<T> {
    /// Create a matrix from a flat vector (row-major order)
    pub fn from_flat(data: Vec<T>, rows: usize, cols: usize) -> Self {
        assert_eq!(data.len(), rows * cols);
        Self { data, rows, cols }
    }

    /// Create a matrix from row vectors with an explicit column count, so that
    /// an empty row list still has a well defined shape
    pub fn from_rows(rows: &[Vec<T>], cols: usize) -> Result<Self> {
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(SunitError::ShapeMismatch {
                    context: "matrix row",
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            rows: rows.len(),
            cols,
        })
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// True when the matrix has no entries
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[i * self.cols + j]
    }

    pub fn get_mut(&mut self, i: usize, j: usize) -> &mut T {
        &mut self.data[i * self.cols + j]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn row(&self, i: usize) -> &[T] {
        let start = i * self.cols;
        &self.data[start..start + self.cols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        let start = i * self.cols;
        &mut self.data[start..start + self.cols]
    }

    pub fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0..self.cols {
            for i in 0..self.rows {
                data.push(self.get(i, j).clone());
            }
        }
        Self {
            data,
            rows: self.cols,
            cols: self.rows,
        }
    }

    /// Sub-matrix made of the given row and column ranges
    pub fn slice(&self, rows: Range<usize>, cols: Range<usize>) -> Self {
        assert!(rows.end <= self.rows && cols.end <= self.cols);
        let mut data = Vec::with_capacity(rows.len() * cols.len());
        for i in rows.clone() {
            data.extend_from_slice(&self.row(i)[cols.clone()]);
        }
        Self {
            data,
            rows: rows.len(),
            cols: cols.len(),
        }
    }

    /// Concatenate columns: `[self | other]`
    pub fn hconcat(&self, other: &Self) -> Result<Self> {
        if self.rows != other.rows {
            return Err(SunitError::ShapeMismatch {
                context: "column concatenation",
                expected: self.rows,
                actual: other.rows,
            });
        }
        let cols = self.cols + other.cols;
        let mut data = Vec::with_capacity(self.rows * cols);
        for i in 0..self.rows {
            data.extend_from_slice(self.row(i));
            data.extend_from_slice(other.row(i));
        }
        Ok(Self {
            data,
            rows: self.rows,
            cols,
        })
    }

    /// Apply `f` entrywise
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Matrix<U> {
        Matrix {
            data: self.data.iter().map(f).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl<T: Clone + Default> Matrix<T> {
    /// Create a matrix filled with default values
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![T::default(); rows * cols],
            rows,
            cols,
        }
    }
}

impl Matrix<f64> {
    pub fn identity(n: usize) -> Self {
        let mut m = Self::new(n, n);
        for i in 0..n {
            *m.get_mut(i, i) = 1.0;
        }
        m
    }
}

impl Matrix<Rational> {
    pub fn identity_rational(n: usize) -> Self {
        let mut m = Self::from_flat(vec![Rational::zero(); n * n], n, n);
        for i in 0..n {
            *m.get_mut(i, i) = Rational::one();
        }
        m
    }

    /// Exact inverse by Gauss-Jordan elimination, `None` when singular
    pub fn inverse(&self) -> Option<Self> {
        assert_eq!(self.rows, self.cols, "inverse of a non-square matrix");
        let n = self.rows;
        let mut a = self.clone();
        let mut inv = Self::identity_rational(n);

        for col in 0..n {
            let pivot = (col..n).find(|&r| !a.get(r, col).is_zero())?;
            if pivot != col {
                for j in 0..n {
                    a.data.swap(pivot * n + j, col * n + j);
                    inv.data.swap(pivot * n + j, col * n + j);
                }
            }

            let scale = a.get(col, col).recip()?;
            for j in 0..n {
                *a.get_mut(col, j) = a.get(col, j) * &scale;
                *inv.get_mut(col, j) = inv.get(col, j) * &scale;
            }

            for r in 0..n {
                if r == col || a.get(r, col).is_zero() {
                    continue;
                }
                let factor = a.get(r, col).clone();
                for j in 0..n {
                    *a.get_mut(r, j) = a.get(r, j) - &(&factor * a.get(col, j));
                    *inv.get_mut(r, j) = inv.get(r, j) - &(&factor * inv.get(col, j));
                }
            }
        }

        Some(inv)
    }

    /// Exact determinant by fraction-free pivoting over the rationals
    pub fn determinant(&self) -> Rational {
        assert_eq!(self.rows, self.cols, "determinant of a non-square matrix");
        let n = self.rows;
        let mut a = self.clone();
        let mut det = Rational::one();

        for col in 0..n {
            let Some(pivot) = (col..n).find(|&r| !a.get(r, col).is_zero()) else {
                return Rational::zero();
            };
            if pivot != col {
                for j in 0..n {
                    a.data.swap(pivot * n + j, col * n + j);
                }
                det = -det;
            }
            let p = a.get(col, col).clone();
            det = &det * &p;
            for r in col + 1..n {
                if a.get(r, col).is_zero() {
                    continue;
                }
                let factor = a.get(r, col) / &p;
                for j in col..n {
                    *a.get_mut(r, j) = a.get(r, j) - &(&factor * a.get(col, j));
                }
            }
        }

        det
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn q(n: i64) -> Rational {
        Rational::from_int(n)
    }

    #[test]
    fn test_matrix_access() {
        let m = Matrix::from_flat((0..6).map(|x| x as f64).collect(), 2, 3);

        assert_eq!(*m.get(0, 2), 2.0);
        assert_eq!(*m.get(1, 0), 3.0);
        assert_eq!(m.row(1), &[3.0, 4.0, 5.0]);
        assert_eq!(m.transpose().dims(), (3, 2));
        assert_eq!(*m.transpose().get(2, 1), 5.0);
    }

    #[test]
    fn test_zero_width_matrix() {
        let empty: Matrix<f64> = Matrix::new(3, 0);
        assert!(empty.is_empty());
        assert_eq!(empty.dims(), (3, 0));

        let full = Matrix::identity(3);
        let joined = empty.hconcat(&full).unwrap();
        assert_eq!(joined, full);
    }

    #[test]
    fn test_hconcat_and_slice() {
        let a = Matrix::from_flat(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        let b = Matrix::from_flat(vec![5.0, 6.0], 2, 1);
        let c = a.hconcat(&b).unwrap();
        assert_eq!(c.row(0), &[1.0, 2.0, 5.0]);
        assert_eq!(c.slice(1..2, 1..3).as_slice(), &[4.0, 6.0]);

        let bad = Matrix::from_flat(vec![1.0], 1, 1);
        assert!(a.hconcat(&bad).is_err());
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(Matrix::from_rows(&rows, 2).is_err());
    }

    #[test]
    fn test_rational_inverse_and_determinant() {
        let m = Matrix::from_flat(vec![q(2), q(1), q(7), q(4)], 2, 2);
        assert_eq!(m.determinant(), q(1));

        let inv = m.inverse().unwrap();
        assert_eq!(inv.as_slice(), &[q(4), q(-1), q(-7), q(2)]);

        let singular = Matrix::from_flat(vec![q(1), q(2), q(2), q(4)], 2, 2);
        assert!(singular.inverse().is_none());
        assert!(singular.determinant().is_zero());
    }

    #[test]
    fn test_determinant_with_row_swap() {
        let m = Matrix::from_flat(
            vec![q(0), q(1), q(0), q(1), q(0), q(0), q(0), q(0), q(3)],
            3,
            3,
        );
        assert_eq!(m.determinant(), Rational::from_int(BigInt::from(-3)));
    }
}
