//! Univariate polynomial helpers
//!
//! Coefficient vectors are stored lowest degree first. Polynomials over F_p
//! use `u64` residues in `[0, p)`.

use crate::error::FieldError;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Evaluate an integer-coefficient polynomial at a complex point (Horner)
pub fn eval_complex(coefficients: &[f64], z: Complex64) -> Complex64 {
    coefficients
        .iter()
        .rev()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z + c)
}

/// All complex roots of a monic polynomial via Durand-Kerner iteration
pub fn complex_roots(coefficients: &[f64], max_iterations: usize) -> Result<Vec<Complex64>, FieldError> {
    let n = coefficients.len() - 1;
    if n == 0 {
        return Ok(Vec::new());
    }

    // Cauchy bound keeps the starting circle around every root
    let radius = 1.0
        + coefficients[..n]
            .iter()
            .map(|c| c.abs())
            .fold(0.0, f64::max);
    // Offset angle avoids starting on a symmetry axis of real polynomials
    let mut roots: Vec<Complex64> = (0..n)
        .map(|k| Complex64::from_polar(radius, 2.0 * PI * k as f64 / n as f64 + 0.4))
        .collect();

    for _ in 0..max_iterations {
        let mut max_step = 0.0f64;
        for i in 0..n {
            let zi = roots[i];
            let denom = (0..n)
                .filter(|&j| j != i)
                .fold(Complex64::new(1.0, 0.0), |acc, j| acc * (zi - roots[j]));
            if denom.norm() == 0.0 {
                // Coincident iterates; nudge apart and keep going
                roots[i] = zi + Complex64::new(1e-8, 1e-8);
                max_step = f64::INFINITY;
                continue;
            }
            let step = eval_complex(coefficients, zi) / denom;
            roots[i] = zi - step;
            max_step = max_step.max(step.norm() / (1.0 + zi.norm()));
        }
        if max_step < 1e-14 {
            return Ok(roots);
        }
    }

    // Accept a result whose residuals are tiny even if the step never settled
    let converged = roots
        .iter()
        .all(|&z| eval_complex(coefficients, z).norm() < 1e-9 * (1.0 + z.norm()).powi(n as i32));
    if converged {
        Ok(roots)
    } else {
        Err(FieldError::RootsDidNotConverge {
            iterations: max_iterations,
        })
    }
}

/// Trim trailing zero coefficients
pub fn normalize_mod(mut a: Vec<u64>) -> Vec<u64> {
    while a.last() == Some(&0) {
        a.pop();
    }
    a
}

/// Degree of a normalized polynomial over F_p (`None` for zero)
pub fn degree_mod(a: &[u64]) -> Option<usize> {
    a.len().checked_sub(1)
}

/// Divide `a` by the monic polynomial `b` over F_p, returning (quotient, remainder)
pub fn div_rem_monic_mod(a: &[u64], b: &[u64], p: u64) -> (Vec<u64>, Vec<u64>) {
    let a = normalize_mod(a.to_vec());
    let db = degree_mod(b).expect("divisor must be non-zero");
    debug_assert_eq!(b[db], 1, "divisor must be monic");

    if a.len() <= db {
        return (Vec::new(), a);
    }

    let mut rem = a;
    let mut quot = vec![0u64; rem.len() - db];
    for k in (0..quot.len()).rev() {
        let coef = rem[k + db] % p;
        quot[k] = coef;
        if coef == 0 {
            continue;
        }
        for (j, &bj) in b.iter().enumerate() {
            let sub = mul_mod(coef, bj, p);
            rem[k + j] = (rem[k + j] + p - sub) % p;
        }
    }
    (normalize_mod(quot), normalize_mod(rem))
}

/// The monic polynomial of degree `degree` whose lower coefficients are the
/// base-p digits of `index`
pub fn monic_from_index(index: u64, degree: usize, p: u64) -> Vec<u64> {
    let mut coeffs = Vec::with_capacity(degree + 1);
    let mut rest = index;
    for _ in 0..degree {
        coeffs.push(rest % p);
        rest /= p;
    }
    coeffs.push(1);
    coeffs
}

/// Factor a monic polynomial over F_p into monic irreducibles with multiplicity
///
/// Trial division by monic polynomials of increasing degree: once all
/// factors of degree below d are removed, any monic divisor of degree d is
/// irreducible.
pub fn factor_monic_mod(f: &[u64], p: u64) -> Vec<(Vec<u64>, u32)> {
    let mut g = normalize_mod(f.iter().map(|c| c % p).collect());
    let mut factors = Vec::new();
    let mut d = 1usize;

    while let Some(deg) = degree_mod(&g) {
        if deg == 0 {
            break;
        }
        if 2 * d > deg {
            factors.push((g, 1));
            break;
        }
        let count = p.saturating_pow(d as u32);
        for index in 0..count {
            let h = monic_from_index(index, d, p);
            let mut e = 0u32;
            loop {
                let (q, r) = div_rem_monic_mod(&g, &h, p);
                if !r.is_empty() {
                    break;
                }
                g = q;
                e += 1;
            }
            if e > 0 {
                factors.push((h, e));
            }
            if degree_mod(&g).map_or(true, |dg| dg < d) {
                break;
            }
        }
        d += 1;
    }

    factors
}

fn mul_mod(a: u64, b: u64, p: u64) -> u64 {
    ((a as u128 * b as u128) % p as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roots_of_x2_plus_1() {
        let roots = complex_roots(&[1.0, 0.0, 1.0], 500).unwrap();
        assert_eq!(roots.len(), 2);
        for z in roots {
            assert!(z.re.abs() < 1e-12);
            assert!((z.im.abs() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_roots_of_cubic() {
        // x^3 - 2: one real root 2^(1/3), one complex pair
        let roots = complex_roots(&[-2.0, 0.0, 0.0, 1.0], 500).unwrap();
        let real: Vec<_> = roots.iter().filter(|z| z.im.abs() < 1e-9).collect();
        assert_eq!(real.len(), 1);
        assert!((real[0].re - 2f64.powf(1.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_division_mod_p() {
        // (x^2 + 1) = (x + 1)^2 mod 2
        let (q, r) = div_rem_monic_mod(&[1, 0, 1], &[1, 1], 2);
        assert_eq!(q, vec![1, 1]);
        assert!(r.is_empty());
    }

    #[test]
    fn test_factor_mod_p() {
        assert_eq!(factor_monic_mod(&[1, 0, 1], 2), vec![(vec![1, 1], 2)]);
        // x^2 + 1 = (x + 2)(x + 3) mod 5
        assert_eq!(
            factor_monic_mod(&[1, 0, 1], 5),
            vec![(vec![2, 1], 1), (vec![3, 1], 1)]
        );
        // x^2 + 1 is irreducible mod 3
        assert_eq!(factor_monic_mod(&[1, 0, 1], 3), vec![(vec![1, 0, 1], 1)]);
    }
}
