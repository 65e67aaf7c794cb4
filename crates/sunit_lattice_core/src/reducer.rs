//! Lattice reducer
//!
//! Reduction algorithms work on exact integer lattices. [`ApproximateReducer`]
//! snaps a floating point basis onto the integer grid `precision * Z`, hands
//! it to a [`BasisReducer`] and scales the result back.

use crate::error::{LatticeError, Result, SunitError};
use crate::lattice::{hermite_normal_form, LLLConfig, LatticeBasis, LLL};
use crate::matrix::Matrix;
use num_bigint::BigInt;
use num_traits::FromPrimitive;
use tracing::debug;

/// Default snapping grid for floating point bases
pub const DEFAULT_PRECISION: f64 = 1e-4;

/// Exact reduction of an integer basis
///
/// Implementations must return a basis of the same lattice.
pub trait BasisReducer: Send + Sync {
    /// Name of this reducer (for logging)
    fn name(&self) -> &'static str;

    fn reduce(&self, basis: &LatticeBasis) -> std::result::Result<LatticeBasis, LatticeError>;
}

/// LLL reduction, δ = 3/4 unless configured otherwise
#[derive(Debug, Clone, Default)]
pub struct LllReducer {
    pub config: LLLConfig,
}

impl LllReducer {
    pub fn new(config: LLLConfig) -> Self {
        Self { config }
    }
}

impl BasisReducer for LllReducer {
    fn name(&self) -> &'static str {
        "lll"
    }

    fn reduce(&self, basis: &LatticeBasis) -> std::result::Result<LatticeBasis, LatticeError> {
        let (reduced, _) = LLL::reduce(basis, &self.config)?;
        Ok(reduced)
    }
}

impl<R: BasisReducer + ?Sized> BasisReducer for Box<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn reduce(&self, basis: &LatticeBasis) -> std::result::Result<LatticeBasis, LatticeError> {
        (**self).reduce(basis)
    }
}

/// Reduction of floating point bases (rows are basis vectors)
#[derive(Debug, Clone)]
pub struct ApproximateReducer<R> {
    reducer: R,
    precision: f64,
}

impl Default for ApproximateReducer<LllReducer> {
    fn default() -> Self {
        Self::new(LllReducer::default())
    }
}

impl<R: BasisReducer> ApproximateReducer<R> {
    pub fn new(reducer: R) -> Self {
        Self {
            reducer,
            precision: DEFAULT_PRECISION,
        }
    }

    pub fn with_precision(mut self, precision: f64) -> Result<Self> {
        if !precision.is_finite() || precision <= 0.0 {
            return Err(SunitError::InvalidParameter(format!(
                "precision must be positive and finite, got {}",
                precision
            )));
        }
        self.precision = precision;
        Ok(self)
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }

    pub fn reducer(&self) -> &R {
        &self.reducer
    }

    /// Round every entry to the nearest multiple of the precision
    pub fn snap(&self, basis: &Matrix<f64>) -> Result<LatticeBasis> {
        let (rows, cols) = basis.dims();
        if rows == 0 || cols == 0 {
            return Err(LatticeError::EmptyBasis.into());
        }

        let mut vectors = Vec::with_capacity(rows);
        for i in 0..rows {
            let row = basis
                .row(i)
                .iter()
                .map(|&x| {
                    let scaled = (x / self.precision).round_ties_even();
                    BigInt::from_f64(scaled).ok_or(LatticeError::NotRepresentable {
                        value: x,
                        precision: self.precision,
                    })
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            vectors.push(row);
        }
        Ok(LatticeBasis::new(vectors)?)
    }

    /// Snap, reduce, and rescale a full rank basis
    pub fn reduce_basis(&self, basis: &Matrix<f64>) -> Result<Matrix<f64>> {
        let snapped = self.snap(basis)?;
        let reduced = self.reducer.reduce(&snapped)?;
        debug!(
            reducer = self.reducer.name(),
            n = reduced.n,
            m = reduced.m,
            precision = self.precision,
            "reduced approximate basis"
        );
        Ok(reduced.to_f64_matrix(self.precision))
    }

    /// Reduce to a sublattice of rank `target_dimension`
    ///
    /// Each snapped row `b_i` becomes `[e_i | b_i]`; after reduction the last
    /// `target_dimension` rows, restricted to the original columns, are
    /// returned.
    pub fn reduce_lattice_basis(
        &self,
        basis: &Matrix<f64>,
        target_dimension: usize,
    ) -> Result<Matrix<f64>> {
        let snapped = self.snap(basis)?;
        let rank = hermite_normal_form(&snapped.vectors, snapped.m).len();
        if target_dimension > rank {
            return Err(SunitError::TargetDimensionTooLarge {
                requested: target_dimension,
                rank,
            });
        }

        let n = snapped.n;
        let reduced = self.reducer.reduce(&snapped.with_identity_prefix())?;
        let full = reduced.to_f64_matrix(self.precision);
        debug!(
            reducer = self.reducer.name(),
            rank,
            target_dimension,
            "reduced approximate basis to sublattice"
        );
        Ok(full.slice(reduced.n - target_dimension..reduced.n, n..reduced.m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float_basis(rows: &[Vec<i64>], scale: f64) -> Matrix<f64> {
        let flat: Vec<f64> = rows.iter().flatten().map(|&x| x as f64 * scale).collect();
        Matrix::from_flat(flat, rows.len(), rows[0].len())
    }

    fn test_lattice() -> Vec<Vec<i64>> {
        vec![
            vec![19, 2, 32, 46],
            vec![15, 42, 11, 0],
            vec![43, 15, 0, 24],
            vec![20, 44, 44, 0],
        ]
    }

    #[test]
    fn test_lll_reducer_output_is_reduced() {
        let basis = LatticeBasis::from_rows(&test_lattice());
        let reducer = LllReducer::default();
        let reduced = reducer.reduce(&basis).unwrap();
        assert!(LLL::is_reduced(&reduced, &reducer.config));
        assert_eq!(reducer.name(), "lll");
    }

    #[test]
    fn test_reduce_basis_preserves_lattice() {
        // Halves are exact in binary, so snapping is lossless
        let reducer = ApproximateReducer::default().with_precision(0.5).unwrap();
        let basis = float_basis(&test_lattice(), 0.5);

        let reduced = reducer.reduce_basis(&basis).unwrap();
        assert_eq!(reduced.dims(), (4, 4));

        let before = reducer.snap(&basis).unwrap();
        let after = reducer.snap(&reduced).unwrap();
        assert_eq!(
            hermite_normal_form(&before.vectors, 4),
            hermite_normal_form(&after.vectors, 4)
        );
        assert!(LLL::is_reduced(&after, &LLLConfig::default()));
    }

    #[test]
    fn test_reduce_basis_finds_short_vector() {
        // The second row is long and nearly parallel to the first
        let basis = float_basis(&[vec![1, 0], vec![1000, 1]], 1e-2);
        let reducer = ApproximateReducer::default();
        let reduced = reducer.reduce_basis(&basis).unwrap();
        for i in 0..2 {
            let norm: f64 = reduced.row(i).iter().map(|x| x * x).sum::<f64>().sqrt();
            assert!(norm < 0.02, "row {} has norm {}", i, norm);
        }
    }

    #[test]
    fn test_reduce_lattice_basis_dimension() {
        let reducer = ApproximateReducer::default().with_precision(1.0).unwrap();
        let basis = float_basis(&test_lattice(), 1.0);
        for d in 0..=4 {
            let out = reducer.reduce_lattice_basis(&basis, d).unwrap();
            assert_eq!(out.dims(), (d, 4));
        }
    }

    #[test]
    fn test_reduce_lattice_basis_rank_check() {
        let reducer = ApproximateReducer::default().with_precision(1.0).unwrap();
        // Third row is the sum of the first two
        let basis = float_basis(&[vec![1, 2, 3], vec![4, 5, 6], vec![5, 7, 9]], 1.0);

        assert_eq!(reducer.reduce_lattice_basis(&basis, 2).unwrap().rows(), 2);
        assert!(matches!(
            reducer.reduce_lattice_basis(&basis, 3),
            Err(SunitError::TargetDimensionTooLarge {
                requested: 3,
                rank: 2
            })
        ));
    }

    #[test]
    fn test_dependent_rows_rejected_by_full_reduction() {
        let reducer = ApproximateReducer::default().with_precision(1.0).unwrap();
        let basis = float_basis(&[vec![1, 2], vec![2, 4]], 1.0);
        assert!(matches!(
            reducer.reduce_basis(&basis),
            Err(SunitError::Reduction(LatticeError::LinearlyDependent { .. }))
        ));
    }

    #[test]
    fn test_non_finite_entries() {
        let reducer = ApproximateReducer::default();
        let basis = Matrix::from_flat(vec![1.0, f64::NAN, 0.0, 1.0], 2, 2);
        assert!(matches!(
            reducer.reduce_basis(&basis),
            Err(SunitError::Reduction(LatticeError::NotRepresentable { .. }))
        ));

        let empty: Matrix<f64> = Matrix::from_flat(Vec::new(), 0, 3);
        assert!(reducer.reduce_basis(&empty).is_err());
    }

    #[test]
    fn test_precision_validation() {
        assert!(ApproximateReducer::default().with_precision(0.0).is_err());
        assert!(ApproximateReducer::default().with_precision(f64::NAN).is_err());
        assert_eq!(ApproximateReducer::default().precision(), DEFAULT_PRECISION);
    }
}
