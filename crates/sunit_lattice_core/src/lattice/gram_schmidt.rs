//! Exact Gram-Schmidt orthogonalization
//!
//! Given basis B = [b_1, ..., b_n], compute orthogonal vectors b*_i and coefficients μ_ij:
//!
//! ```text
//! b*_1 = b_1
//! b*_i = b_i - Σ_{j<i} μ_ij b*_j
//! μ_ij = <b_i, b*_j> / <b*_j, b*_j>
//! ```
//!
//! Only the coefficients and the squared norms ||b*_i||² are kept; both are
//! exact rationals so the Lovász test never suffers from rounding.

use super::basis::LatticeBasis;
use crate::error::LatticeError;
use crate::rational::Rational;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

/// Gram-Schmidt orthogonalization data
#[derive(Debug, Clone)]
pub struct GramSchmidt {
    /// Coefficients μ_ij stored as a lower triangular matrix: mu[i][j] for j < i
    pub mu: Vec<Vec<Rational>>,
    /// Squared norms ||b*_i||^2
    pub b_star_norms_sq: Vec<Rational>,
    pub n: usize,
}

impl GramSchmidt {
    /// Orthogonalize `basis`, failing if its vectors are linearly dependent
    pub fn compute(basis: &LatticeBasis) -> Result<Self, LatticeError> {
        let n = basis.n;

        let mut mu: Vec<Vec<Rational>> = (0..n).map(|i| vec![Rational::zero(); i]).collect();
        let mut b_star_norms_sq = vec![Rational::zero(); n];

        let gram: Vec<Vec<BigInt>> = (0..n)
            .map(|i| (0..=i).map(|j| basis.inner_product(i, j)).collect())
            .collect();

        for i in 0..n {
            // <b_i, b*_j> = <b_i, b_j> - Σ_{k<j} μ_jk <b_i, b*_k>
            let mut inner_with_b_star: Vec<Rational> = Vec::with_capacity(i);

            for j in 0..i {
                let mut acc = Rational::from_int(gram[i][j].clone());
                for k in 0..j {
                    acc = &acc - &(&mu[j][k] * &inner_with_b_star[k]);
                }
                mu[i][j] = &acc / &b_star_norms_sq[j];
                inner_with_b_star.push(acc);
            }

            // ||b*_i||^2 = <b_i, b_i> - Σ_{j<i} μ_ij <b_i, b*_j>
            let mut norm = Rational::from_int(gram[i][i].clone());
            for j in 0..i {
                norm = &norm - &(&mu[i][j] * &inner_with_b_star[j]);
            }
            if norm.is_zero() {
                return Err(LatticeError::LinearlyDependent { index: i });
            }
            b_star_norms_sq[i] = norm;
        }

        Ok(Self {
            mu,
            b_star_norms_sq,
            n,
        })
    }

    /// Get μ_ij
    ///
    /// # Panics
    /// Panics unless j < i
    pub fn get_mu(&self, i: usize, j: usize) -> &Rational {
        assert!(j < i, "μ_ij only defined for j < i");
        &self.mu[i][j]
    }

    /// |μ_ij| > 1/2
    pub fn needs_size_reduction(&self, i: usize, j: usize) -> bool {
        let mu = self.get_mu(i, j);
        let two_num: BigInt = &mu.numerator * 2;
        two_num.abs() > mu.denominator
    }

    /// Lovász condition at position k:
    /// δ ||b*_{k-1}||² ≤ ||b*_k||² + μ_{k,k-1}² ||b*_{k-1}||²
    pub fn check_lovasz(&self, k: usize, delta_num: i64, delta_den: i64) -> bool {
        if k == 0 {
            return true;
        }

        let prev = &self.b_star_norms_sq[k - 1];
        let mu = &self.mu[k][k - 1];
        let delta = Rational::new(BigInt::from(delta_num), BigInt::from(delta_den));

        let lhs = &delta * prev;
        let rhs = &self.b_star_norms_sq[k] + &(&(mu * mu) * prev);

        // Denominators are positive, so cross multiplication preserves order
        &lhs.numerator * &rhs.denominator <= &rhs.numerator * &lhs.denominator
    }

    /// Update after size reduction b_k = b_k - q * b_j
    pub fn update_size_reduction(&mut self, k: usize, j: usize, q: &BigInt) {
        let q_rat = Rational::from_int(q.clone());
        self.mu[k][j] = &self.mu[k][j] - &q_rat;

        // μ_ki -= q * μ_ji for i < j
        for i in 0..j {
            let prod = &q_rat * &self.mu[j][i];
            self.mu[k][i] = &self.mu[k][i] - &prod;
        }
    }
}
