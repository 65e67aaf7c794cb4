//! Prime ideal enumeration below the Minkowski bound

use crate::error::{Result, SunitError};
use crate::field::NumberField;
use crate::ideal::PrimeIdeal;
use crate::primes::PrimeGenerator;
use std::fmt;
use std::ops::Deref;
use tracing::{debug, info};

/// Ordered set of prime ideals, fixed once enumerated
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FactorBase {
    primes: Vec<PrimeIdeal>,
}

impl FactorBase {
    /// Build from prime ideals, dropping repeats but keeping first-seen order
    pub fn new(primes: Vec<PrimeIdeal>) -> Self {
        let mut unique: Vec<PrimeIdeal> = Vec::with_capacity(primes.len());
        for p in primes {
            if !unique.iter().any(|q| q.prime == p.prime && q.ideal == p.ideal) {
                unique.push(p);
            }
        }
        Self { primes: unique }
    }

    pub fn as_slice(&self) -> &[PrimeIdeal] {
        &self.primes
    }

    /// Distinct rational primes below the ideals, in order
    pub fn rational_primes(&self) -> Vec<u64> {
        let mut out: Vec<u64> = Vec::new();
        for p in &self.primes {
            if out.last() != Some(&p.prime) {
                out.push(p.prime);
            }
        }
        out
    }
}

impl Deref for FactorBase {
    type Target = [PrimeIdeal];

    fn deref(&self) -> &[PrimeIdeal] {
        &self.primes
    }
}

impl fmt::Display for FactorBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.primes.iter().enumerate() {
            writeln!(f, "P{}: {}", i, p)?;
        }
        Ok(())
    }
}

/// Every prime ideal above a rational prime `p <= floor(minkowski_bound) + 1`
///
/// Exponents of the factorization are discarded; ideals come out by
/// increasing `p`, then in factorization order.
pub fn enumerate_bounded_prime_ideals<F: NumberField + ?Sized>(field: &F) -> Result<FactorBase> {
    let bound = field.minkowski_bound();
    if !bound.is_finite() || bound < 0.0 {
        return Err(SunitError::InvalidParameter(format!(
            "minkowski bound {} is not usable",
            bound
        )));
    }
    // Float to int casts saturate, so an absurd bound stays an absurd bound
    let limit = (bound.floor() as u64).saturating_add(1);

    let mut ideals = Vec::new();
    for p in PrimeGenerator::primes_up_to(limit) {
        let factors = field.factor_prime(p)?;
        debug!(p, count = factors.len(), "prime ideals above p");
        ideals.extend(factors.into_iter().map(|(ideal, _)| ideal));
    }

    let base = FactorBase::new(ideals);
    info!(bound, limit, size = base.len(), "enumerated factor base");
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::SimpleField;
    use num_bigint::BigInt;

    #[test]
    fn test_gaussian_integers() {
        let k = SimpleField::quadratic(-1).unwrap();
        assert!((k.minkowski_bound() - 4.0 / std::f64::consts::PI).abs() < 1e-12);

        let base = enumerate_bounded_prime_ideals(&k).unwrap();
        assert_eq!(base.len(), 1);
        assert_eq!(base[0].prime, 2);
        assert_eq!(base[0].norm(), BigInt::from(2));
        assert!(base[0].is_ramified());
    }

    #[test]
    fn test_rationals_use_only_two() {
        // Bound 1 for Q, the +1 still admits p = 2
        let base = enumerate_bounded_prime_ideals(&SimpleField::rationals()).unwrap();
        assert_eq!(base.rational_primes(), vec![2]);
    }

    #[test]
    fn test_order_and_uniqueness() {
        // Q(sqrt -23): |D| = 23, bound ~ 3.05, primes 2, 3 (and 4 is not prime)
        let k = SimpleField::quadratic(-23).unwrap();
        let base = enumerate_bounded_prime_ideals(&k).unwrap();
        assert_eq!(base.rational_primes(), vec![2, 3]);
        // 2 and 3 both split in Q(sqrt -23)
        assert_eq!(base.len(), 4);
        for i in 0..base.len() {
            for j in i + 1..base.len() {
                assert_ne!(base[i], base[j]);
            }
        }
    }

    #[test]
    fn test_new_drops_duplicates() {
        let k = SimpleField::quadratic(-1).unwrap();
        let p: Vec<_> = k.factor_prime(5).unwrap().into_iter().map(|(p, _)| p).collect();
        let base = FactorBase::new(vec![p[0].clone(), p[1].clone(), p[0].clone()]);
        assert_eq!(base.len(), 2);
        assert_eq!(base.as_slice(), &p[..]);
    }
}
