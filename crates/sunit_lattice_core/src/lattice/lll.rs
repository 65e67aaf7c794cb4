//! LLL Lattice Reduction Algorithm
//!
//! Given a basis B = [b_1, ..., b_n], LLL produces a δ-reduced basis satisfying:
//! 1. **Size reduction**: |μ_ij| ≤ 1/2 for all j < i
//! 2. **Lovász condition**: δ ||b*_i||² ≤ ||b*_{i+1} + μ_{i+1,i} b*_i||²
//!
//! All arithmetic is exact, so the output is a basis of exactly the same
//! lattice as the input.

use super::basis::LatticeBasis;
use super::gram_schmidt::GramSchmidt;
use crate::error::LatticeError;
use num_traits::Zero;
use std::time::Instant;
use tracing::debug;

/// LLL configuration parameters
#[derive(Debug, Clone)]
pub struct LLLConfig {
    /// Lovász parameter δ = delta_num / delta_den (default 3/4).
    /// Must be in (1/4, 1).
    pub delta_num: i64,
    pub delta_den: i64,
    /// Iteration ceiling; hitting it is reported as non-convergence
    pub max_iterations: usize,
}

impl Default for LLLConfig {
    fn default() -> Self {
        Self {
            delta_num: 3,
            delta_den: 4,
            max_iterations: 1_000_000,
        }
    }
}

impl LLLConfig {
    /// δ = 0.99 (strong reduction)
    pub fn strong() -> Self {
        Self {
            delta_num: 99,
            delta_den: 100,
            ..Default::default()
        }
    }

    /// δ = 0.5 (fast but weaker reduction)
    pub fn fast() -> Self {
        Self {
            delta_num: 1,
            delta_den: 2,
            ..Default::default()
        }
    }

    pub fn delta(&self) -> f64 {
        self.delta_num as f64 / self.delta_den as f64
    }
}

/// Statistics from LLL execution
#[derive(Debug, Clone, Default)]
pub struct LLLStats {
    pub size_reductions: usize,
    pub swaps: usize,
    pub iterations: usize,
    /// Total time (seconds)
    pub total_time: f64,
}

/// LLL lattice reduction algorithm
pub struct LLL;

impl LLL {
    /// Reduce a lattice basis using the LLL algorithm
    ///
    /// # Errors
    /// `LinearlyDependent` if the rows do not form a basis, `NoConvergence`
    /// if `config.max_iterations` is exhausted.
    pub fn reduce(
        basis: &LatticeBasis,
        config: &LLLConfig,
    ) -> Result<(LatticeBasis, LLLStats), LatticeError> {
        let start = Instant::now();
        let mut stats = LLLStats::default();

        let mut b = basis.clone();
        let n = b.n;

        let mut gs = GramSchmidt::compute(&b)?;
        if n <= 1 {
            stats.total_time = start.elapsed().as_secs_f64();
            return Ok((b, stats));
        }

        let mut k = 1usize;

        while k < n {
            if stats.iterations >= config.max_iterations {
                return Err(LatticeError::NoConvergence {
                    iterations: stats.iterations,
                });
            }
            stats.iterations += 1;

            Self::size_reduce(&mut b, &mut gs, k, k - 1, &mut stats);

            if gs.check_lovasz(k, config.delta_num, config.delta_den) {
                for j in (0..k - 1).rev() {
                    Self::size_reduce(&mut b, &mut gs, k, j, &mut stats);
                }
                k += 1;
            } else {
                b.swap(k, k - 1);
                // Full recomputation keeps the exact data simple to trust
                gs = GramSchmidt::compute(&b)?;
                stats.swaps += 1;
                k = if k > 1 { k - 1 } else { 1 };
            }
        }

        stats.total_time = start.elapsed().as_secs_f64();
        debug!(
            n,
            m = b.m,
            iterations = stats.iterations,
            swaps = stats.swaps,
            size_reductions = stats.size_reductions,
            "LLL completed in {:.3}s",
            stats.total_time
        );

        Ok((b, stats))
    }

    /// b_k = b_k - round(μ_kj) * b_j
    fn size_reduce(
        basis: &mut LatticeBasis,
        gs: &mut GramSchmidt,
        k: usize,
        j: usize,
        stats: &mut LLLStats,
    ) {
        if !gs.needs_size_reduction(k, j) {
            return;
        }

        let q = gs.get_mu(k, j).round();
        if q.is_zero() {
            return;
        }

        basis.reduce_vector(k, j, &q);
        gs.update_size_reduction(k, j, &q);
        stats.size_reductions += 1;
    }

    /// Check if a basis is LLL-reduced; dependent rows are never reduced
    pub fn is_reduced(basis: &LatticeBasis, config: &LLLConfig) -> bool {
        let Ok(gs) = GramSchmidt::compute(basis) else {
            return false;
        };
        let n = basis.n;

        let size_reduced = (1..n).all(|i| (0..i).all(|j| !gs.needs_size_reduction(i, j)));
        size_reduced && (1..n).all(|k| gs.check_lovasz(k, config.delta_num, config.delta_den))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lll_simple() {
        let basis = LatticeBasis::from_rows(&[vec![1i64, 1], vec![0, 1]]);

        let config = LLLConfig::default();
        let (reduced, _) = LLL::reduce(&basis, &config).unwrap();

        assert!(LLL::is_reduced(&reduced, &config));
    }

    #[test]
    fn test_lll_finds_short_vector() {
        // det = -1279; the second row is 8 * first + (40, 1)
        let basis = LatticeBasis::from_rows(&[vec![201i64, 37], vec![1648, 297]]);

        let config = LLLConfig::default();
        let (reduced, stats) = LLL::reduce(&basis, &config).unwrap();

        assert!(LLL::is_reduced(&reduced, &config));
        assert!(stats.swaps > 0);
        assert!(reduced.norm_squared(0) < basis.norm_squared(0));
    }

    #[test]
    fn test_lll_random() {
        let basis = LatticeBasis::random(5, 5, 8);

        let config = LLLConfig::default();
        match LLL::reduce(&basis, &config) {
            Ok((reduced, _)) => assert!(LLL::is_reduced(&reduced, &config)),
            // A random integer matrix can be singular
            Err(e) => assert!(matches!(e, LatticeError::LinearlyDependent { .. })),
        }
    }

    #[test]
    fn test_lll_identity() {
        let basis = LatticeBasis::identity(3);

        let config = LLLConfig::default();
        let (reduced, stats) = LLL::reduce(&basis, &config).unwrap();

        assert_eq!(stats.swaps, 0);
        assert_eq!(reduced, basis);
    }

    #[test]
    fn test_lll_strong_and_fast() {
        let basis = LatticeBasis::from_rows(&[vec![1i64, 1, 1], vec![-1, 0, 2], vec![3, 5, 6]]);

        let config_weak = LLLConfig::fast();
        let config_strong = LLLConfig::strong();

        let (reduced_weak, _) = LLL::reduce(&basis, &config_weak).unwrap();
        let (reduced_strong, _) = LLL::reduce(&basis, &config_strong).unwrap();

        assert!(LLL::is_reduced(&reduced_weak, &config_weak));
        assert!(LLL::is_reduced(&reduced_strong, &config_strong));
        // Swaps at k = 1 only ever shorten the first vector
        assert!(reduced_strong.norm_squared(0) <= basis.norm_squared(0));
    }

    #[test]
    fn test_iteration_ceiling() {
        let basis = LatticeBasis::from_rows(&[vec![201i64, 37], vec![1648, 297]]);
        let config = LLLConfig {
            max_iterations: 1,
            ..Default::default()
        };
        assert!(matches!(
            LLL::reduce(&basis, &config),
            Err(LatticeError::NoConvergence { iterations: 1 })
        ));
    }

    #[test]
    fn test_dependent_input() {
        let basis = LatticeBasis::from_rows(&[vec![1i64, 2], vec![3, 6]]);
        assert!(matches!(
            LLL::reduce(&basis, &LLLConfig::default()),
            Err(LatticeError::LinearlyDependent { .. })
        ));
    }
}
