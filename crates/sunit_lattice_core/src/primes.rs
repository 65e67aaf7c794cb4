//! Rational prime enumeration
//!
//! The factor base only ever needs primes below a Minkowski bound, which is
//! small for any field whose lattices fit in memory, so a plain sieve is enough.

/// Prime generator for factor base enumeration
pub struct PrimeGenerator;

impl PrimeGenerator {
    /// All primes p with p <= bound, in increasing order
    pub fn primes_up_to(bound: u64) -> Vec<u64> {
        if bound < 2 {
            return Vec::new();
        }
        let limit = bound as usize;
        let mut composite = vec![false; limit + 1];
        let mut primes = Vec::new();

        for i in 2..=limit {
            if composite[i] {
                continue;
            }
            primes.push(i as u64);
            let mut j = i.saturating_mul(i);
            while j <= limit {
                composite[j] = true;
                j += i;
            }
        }

        primes
    }

    /// Trial division primality test
    pub fn is_prime(n: u64) -> bool {
        if n < 2 {
            return false;
        }
        if n < 4 {
            return true;
        }
        if n % 2 == 0 {
            return false;
        }

        let mut i = 3u64;
        while i.saturating_mul(i) <= n {
            if n % i == 0 {
                return false;
            }
            i += 2;
        }
        true
    }
}
