//! Number field collaborator
//!
//! The pipeline only needs a handful of queries from a number field: its
//! signature, discriminant, Minkowski embedding, multiplication in the ring of
//! integers, and the factorization of rational primes. [`NumberField`]
//! captures exactly those; [`SimpleField`] implements them for monogenic
//! fields `Q[x]/(f)` with maximal equation order.

pub mod poly;
pub mod simple;

pub use simple::SimpleField;

use crate::error::FieldError;
use crate::ideal::PrimeIdeal;
use crate::matrix::Matrix;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::f64::consts::PI;

/// Queries the lattice pipeline makes of a number field
///
/// Elements of the ring of integers are passed as integer coordinate
/// vectors on the field's integral basis `w_0 = 1, w_1, ..., w_{n-1}`.
pub trait NumberField: Send + Sync {
    /// Degree n = r1 + 2*r2
    fn degree(&self) -> usize;

    /// (r1, r2): number of real places and of complex conjugate pairs
    fn signature(&self) -> (usize, usize);

    /// Discriminant of the ring of integers
    fn discriminant(&self) -> &BigInt;

    /// Real Minkowski embedding, shape (n, n)
    ///
    /// Row i is the image of `w_i`. The first r1 columns hold the real
    /// embeddings; each complex place contributes the two columns
    /// `sqrt(2) * Re(sigma)` and `sqrt(2) * Im(sigma)`.
    fn minkowski_embedding(&self) -> Matrix<f64>;

    /// Product of two integral elements
    fn multiply(&self, a: &[BigInt], b: &[BigInt]) -> Result<Vec<BigInt>, FieldError>;

    /// Factor the ideal (p) into prime ideals with their exponents
    fn factor_prime(&self, p: u64) -> Result<Vec<(PrimeIdeal, u32)>, FieldError>;

    /// Minkowski bound `(n!/n^n) * (4/pi)^r2 * sqrt(|D|)`
    fn minkowski_bound(&self) -> f64 {
        let n = self.degree();
        let (_, r2) = self.signature();
        let factorial_ratio: f64 = (1..=n).map(|k| k as f64 / n as f64).product();
        let abs_disc = self
            .discriminant()
            .magnitude()
            .to_f64()
            .unwrap_or(f64::INFINITY);
        factorial_ratio * (4.0 / PI).powi(r2 as i32) * abs_disc.sqrt()
    }
}
