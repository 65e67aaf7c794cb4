//! Monogenic number fields `Q[x]/(f)`
//!
//! The integral basis is the power basis `1, a, ..., a^{n-1}` of a root `a`
//! of `f`. This is the whole ring of integers exactly when `Z[a]` is
//! maximal, which holds for every quadratic field built by
//! [`SimpleField::quadratic`] and is the caller's promise otherwise.

use super::poly;
use super::NumberField;
use crate::error::FieldError;
use crate::ideal::{FractionalIdeal, PrimeIdeal};
use crate::matrix::Matrix;
use crate::primes::PrimeGenerator;
use crate::rational::Rational;
use num_bigint::BigInt;
use num_complex::Complex64;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

const ROOT_ITERATIONS: usize = 2_000;

/// A number field given by a monic irreducible integer polynomial
#[derive(Debug, Clone)]
pub struct SimpleField {
    /// Coefficients of f, lowest degree first, leading coefficient 1
    coefficients: Vec<BigInt>,
    degree: usize,
    real_roots: Vec<f64>,
    /// One root per complex conjugate pair, with positive imaginary part
    complex_roots: Vec<Complex64>,
    /// Coordinates of a^k on the power basis for k < 3n
    powers: Vec<Vec<BigInt>>,
    discriminant: BigInt,
}

impl SimpleField {
    /// Field defined by the monic polynomial with the given coefficients
    /// (lowest degree first)
    pub fn new<T: Into<BigInt> + Clone>(coefficients: &[T]) -> Result<Self, FieldError> {
        let coefficients: Vec<BigInt> = coefficients.iter().map(|c| c.clone().into()).collect();
        let degree = match coefficients.len() {
            0 | 1 => {
                return Err(FieldError::InvalidPolynomial(
                    "polynomial must have positive degree".to_string(),
                ))
            }
            len => len - 1,
        };
        if !coefficients[degree].is_one() {
            return Err(FieldError::InvalidPolynomial(format!(
                "leading coefficient {} is not 1",
                coefficients[degree]
            )));
        }

        let powers = power_table(&coefficients, 3 * degree);
        let discriminant = trace_form_determinant(&powers, degree);
        if discriminant.is_zero() {
            return Err(FieldError::InvalidPolynomial(
                "polynomial has repeated roots".to_string(),
            ));
        }

        let float_coefficients: Vec<f64> = coefficients
            .iter()
            .map(|c| c.to_f64().unwrap_or(f64::NAN))
            .collect();
        let roots = poly::complex_roots(&float_coefficients, ROOT_ITERATIONS)?;
        let (real_roots, complex_roots) = split_roots(&roots, degree)?;

        debug!(
            degree,
            r1 = real_roots.len(),
            r2 = complex_roots.len(),
            %discriminant,
            "constructed number field"
        );

        Ok(Self {
            coefficients,
            degree,
            real_roots,
            complex_roots,
            powers,
            discriminant,
        })
    }

    /// Q(sqrt d) with its maximal order
    ///
    /// Uses `w = (1 + sqrt d)/2` with minimal polynomial `x^2 - x - (d-1)/4`
    /// when d ≡ 1 mod 4 and `w = sqrt d` otherwise.
    pub fn quadratic(d: i64) -> Result<Self, FieldError> {
        if d == 0 || d == 1 || !is_squarefree(d) {
            return Err(FieldError::InvalidQuadraticParameter(d));
        }
        if d.rem_euclid(4) == 1 {
            Self::new(&[-(d - 1) / 4, -1, 1])
        } else {
            Self::new(&[-d, 0, 1])
        }
    }

    /// The rational numbers as the degree one field Q[x]/(x)
    pub fn rationals() -> Self {
        Self::new(&[0i64, 1]).expect("x is a valid defining polynomial")
    }

    pub fn coefficients(&self) -> &[BigInt] {
        &self.coefficients
    }

    pub fn real_roots(&self) -> &[f64] {
        &self.real_roots
    }

    pub fn complex_roots(&self) -> &[Complex64] {
        &self.complex_roots
    }

    /// Reduce a polynomial in `a` (any length, coefficients lowest first)
    /// to power basis coordinates
    pub fn reduce(&self, poly: &[BigInt]) -> Vec<BigInt> {
        let mut out = vec![BigInt::zero(); self.degree];
        for (k, c) in poly.iter().enumerate() {
            if c.is_zero() {
                continue;
            }
            let power = self.power(k);
            for (o, p) in out.iter_mut().zip(power.iter()) {
                *o += c * p;
            }
        }
        out
    }

    fn power(&self, k: usize) -> std::borrow::Cow<'_, [BigInt]> {
        if let Some(p) = self.powers.get(k) {
            return std::borrow::Cow::Borrowed(p);
        }
        // Beyond the table: multiply up from the last stored power
        let mut current = self.powers[self.powers.len() - 1].clone();
        for _ in self.powers.len() - 1..k {
            current = shift_and_reduce(&current, &self.coefficients);
        }
        std::borrow::Cow::Owned(current)
    }
}

impl NumberField for SimpleField {
    fn degree(&self) -> usize {
        self.degree
    }

    fn signature(&self) -> (usize, usize) {
        (self.real_roots.len(), self.complex_roots.len())
    }

    fn discriminant(&self) -> &BigInt {
        &self.discriminant
    }

    fn minkowski_embedding(&self) -> Matrix<f64> {
        let n = self.degree;
        let sqrt2 = std::f64::consts::SQRT_2;
        let mut m = Matrix::new(n, n);

        for i in 0..n {
            let row = m.row_mut(i);
            for (j, &r) in self.real_roots.iter().enumerate() {
                row[j] = r.powi(i as i32);
            }
            let offset = self.real_roots.len();
            for (k, &z) in self.complex_roots.iter().enumerate() {
                let zi = z.powu(i as u32);
                row[offset + 2 * k] = sqrt2 * zi.re;
                row[offset + 2 * k + 1] = sqrt2 * zi.im;
            }
        }

        m
    }

    fn multiply(&self, a: &[BigInt], b: &[BigInt]) -> Result<Vec<BigInt>, FieldError> {
        for len in [a.len(), b.len()] {
            if len != self.degree {
                return Err(FieldError::CoordinateLength {
                    expected: self.degree,
                    actual: len,
                });
            }
        }

        let mut product = vec![BigInt::zero(); 2 * self.degree - 1];
        for (i, x) in a.iter().enumerate() {
            if x.is_zero() {
                continue;
            }
            for (j, y) in b.iter().enumerate() {
                product[i + j] += x * y;
            }
        }
        Ok(self.reduce(&product))
    }

    fn factor_prime(&self, p: u64) -> Result<Vec<(PrimeIdeal, u32)>, FieldError> {
        if !PrimeGenerator::is_prime(p) {
            return Err(FieldError::NotPrime(p));
        }
        let p_big = BigInt::from(p);
        let residues: Vec<u64> = self
            .coefficients
            .iter()
            .map(|c| c.mod_floor(&p_big).to_u64().unwrap_or(0))
            .collect();

        let factors = poly::factor_monic_mod(&residues, p);
        let mut out = Vec::with_capacity(factors.len());

        for (g, e) in factors {
            // Kummer-Dedekind: P = pO + g(a)O
            let lifted: Vec<BigInt> = g.iter().map(|&c| BigInt::from(c)).collect();
            let g_alpha = self.reduce(&lifted);

            let mut generators = Vec::with_capacity(2 * self.degree);
            for i in 0..self.degree {
                let mut w = vec![BigInt::zero(); self.degree];
                w[i] = BigInt::one();
                generators.push(w.iter().map(|x| x * &p_big).collect());
                generators.push(self.multiply(&w, &g_alpha)?);
            }
            let ideal = FractionalIdeal::from_integral_rows(&generators, self.degree)
                .map_err(|e| FieldError::InvalidPolynomial(e.to_string()))?;

            let residue_degree = (g.len() - 1) as u32;
            out.push((
                PrimeIdeal::new(p, residue_degree, e, g_alpha, ideal),
                e,
            ));
        }

        debug!(p, factors = out.len(), "factored rational prime");
        Ok(out)
    }
}

impl fmt::Display for SimpleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q[x]/({})", format_polynomial(&self.coefficients, "x"))
    }
}

/// Render a polynomial, highest degree first, e.g. `x^2 - x + 3`
pub fn format_polynomial(coefficients: &[BigInt], var: &str) -> String {
    let mut out = String::new();
    for (k, c) in coefficients.iter().enumerate().rev() {
        if c.is_zero() {
            continue;
        }
        let magnitude = c.abs();
        if out.is_empty() {
            if c.is_negative() {
                out.push('-');
            }
        } else {
            out.push_str(if c.is_negative() { " - " } else { " + " });
        }
        let show_coefficient = !magnitude.is_one() || k == 0;
        if show_coefficient {
            out.push_str(&magnitude.to_string());
        }
        match k {
            0 => {}
            1 => out.push_str(var),
            _ => out.push_str(&format!("{}^{}", var, k)),
        }
    }
    if out.is_empty() {
        out.push('0');
    }
    out
}

/// a * (coordinates of a^k) reduced modulo f
fn shift_and_reduce(current: &[BigInt], coefficients: &[BigInt]) -> Vec<BigInt> {
    let n = current.len();
    let top = current[n - 1].clone();
    let mut next = vec![BigInt::zero(); n];
    for i in (1..n).rev() {
        next[i] = current[i - 1].clone();
    }
    // a^n = -(c_0 + c_1 a + ... + c_{n-1} a^{n-1})
    if !top.is_zero() {
        for i in 0..n {
            next[i] -= &top * &coefficients[i];
        }
    }
    next
}

fn power_table(coefficients: &[BigInt], count: usize) -> Vec<Vec<BigInt>> {
    let n = coefficients.len() - 1;
    let mut powers = Vec::with_capacity(count);
    let mut current = vec![BigInt::zero(); n];
    current[0] = BigInt::one();
    for _ in 0..count.max(1) {
        powers.push(current.clone());
        current = shift_and_reduce(&current, coefficients);
    }
    powers
}

/// det(Tr(a^{i+j})), the discriminant of the power basis
fn trace_form_determinant(powers: &[Vec<BigInt>], n: usize) -> BigInt {
    // Tr(a^k) is the trace of multiplication by a^k: Σ_i coeff of a^i in a^{k+i}
    let traces: Vec<BigInt> = (0..2 * n - 1)
        .map(|k| (0..n).map(|i| powers[k + i][i].clone()).sum())
        .collect();

    let data = (0..n)
        .flat_map(|i| (0..n).map(move |j| (i, j)))
        .map(|(i, j)| Rational::from_int(traces[i + j].clone()))
        .collect();
    let det = Matrix::from_flat(data, n, n).determinant();
    det.floor()
}

fn split_roots(roots: &[Complex64], degree: usize) -> Result<(Vec<f64>, Vec<Complex64>), FieldError> {
    let tolerance = |z: &Complex64| 1e-8 * (1.0 + z.norm());

    let mut real: Vec<f64> = roots
        .iter()
        .filter(|z| z.im.abs() <= tolerance(z))
        .map(|z| z.re)
        .collect();
    let mut complex: Vec<Complex64> = roots
        .iter()
        .filter(|z| z.im > tolerance(z))
        .copied()
        .collect();

    if real.len() + 2 * complex.len() != degree {
        return Err(FieldError::RootsDidNotConverge {
            iterations: ROOT_ITERATIONS,
        });
    }

    real.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    complex.sort_by(|a, b| {
        a.re.partial_cmp(&b.re)
            .unwrap_or(Ordering::Equal)
            .then(a.im.partial_cmp(&b.im).unwrap_or(Ordering::Equal))
    });
    Ok((real, complex))
}

fn is_squarefree(d: i64) -> bool {
    let d = d.unsigned_abs();
    let mut k = 2u64;
    while k.saturating_mul(k) <= d {
        if d % (k * k) == 0 {
            return false;
        }
        k += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(v: &[i64]) -> Vec<BigInt> {
        v.iter().map(|&x| BigInt::from(x)).collect()
    }

    #[test]
    fn test_gaussian_integers() {
        let k = SimpleField::quadratic(-1).unwrap();
        assert_eq!(k.degree(), 2);
        assert_eq!(k.signature(), (0, 1));
        assert_eq!(k.discriminant(), &BigInt::from(-4));
        assert!((k.minkowski_bound() - 4.0 / std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(k.to_string(), "Q[x]/(x^2 + 1)");
    }

    #[test]
    fn test_quadratic_discriminants() {
        // d ≡ 1 mod 4 uses (1 + sqrt d)/2
        assert_eq!(SimpleField::quadratic(5).unwrap().discriminant(), &BigInt::from(5));
        assert_eq!(SimpleField::quadratic(-3).unwrap().discriminant(), &BigInt::from(-3));
        assert_eq!(SimpleField::quadratic(2).unwrap().discriminant(), &BigInt::from(8));
        assert_eq!(SimpleField::quadratic(-5).unwrap().discriminant(), &BigInt::from(-20));
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(SimpleField::quadratic(0).is_err());
        assert!(SimpleField::quadratic(1).is_err());
        assert!(SimpleField::quadratic(12).is_err());
        assert!(SimpleField::new(&[1i64, 1]).is_ok());
        assert!(SimpleField::new(&[1i64, 0, 2]).is_err());
        assert!(SimpleField::new(&[1i64]).is_err());
        // (x - 1)^2
        assert!(SimpleField::new(&[1i64, -2, 1]).is_err());
    }

    #[test]
    fn test_multiplication() {
        let k = SimpleField::quadratic(-1).unwrap();
        // (1 + i)(1 - i) = 2
        assert_eq!(
            k.multiply(&coords(&[1, 1]), &coords(&[1, -1])).unwrap(),
            coords(&[2, 0])
        );

        let cubic = SimpleField::new(&[-2i64, 0, 0, 1]).unwrap();
        // a * a^2 = a^3 = 2
        assert_eq!(
            cubic.multiply(&coords(&[0, 1, 0]), &coords(&[0, 0, 1])).unwrap(),
            coords(&[2, 0, 0])
        );
    }

    #[test]
    fn test_multiply_rejects_wrong_coordinate_length() {
        let k = SimpleField::quadratic(-1).unwrap();
        assert!(matches!(
            k.multiply(&coords(&[1, 1, 0]), &coords(&[1, 0])),
            Err(FieldError::CoordinateLength {
                expected: 2,
                actual: 3
            })
        ));
        assert!(matches!(
            k.multiply(&coords(&[1, 0]), &coords(&[1])),
            Err(FieldError::CoordinateLength {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_signatures() {
        assert_eq!(SimpleField::rationals().signature(), (1, 0));
        assert_eq!(SimpleField::quadratic(2).unwrap().signature(), (2, 0));
        assert_eq!(SimpleField::new(&[-2i64, 0, 0, 1]).unwrap().signature(), (1, 1));
    }

    #[test]
    fn test_embedding_rows_are_powers() {
        let k = SimpleField::quadratic(2).unwrap();
        let m = k.minkowski_embedding();
        let s = 2f64.sqrt();
        assert_eq!(m.dims(), (2, 2));
        assert!((m.get(0, 0) - 1.0).abs() < 1e-12);
        assert!((m.get(1, 0) + s).abs() < 1e-12);
        assert!((m.get(1, 1) - s).abs() < 1e-12);

        let g = SimpleField::quadratic(-1).unwrap().minkowski_embedding();
        // sqrt(2) * (Re, Im) of 1 and of i
        assert!((g.get(0, 0) - std::f64::consts::SQRT_2).abs() < 1e-12);
        assert!(g.get(0, 1).abs() < 1e-12);
        assert!(g.get(1, 0).abs() < 1e-12);
        assert!((g.get(1, 1) - std::f64::consts::SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_factor_prime_kinds() {
        let k = SimpleField::quadratic(-1).unwrap();

        let ramified = k.factor_prime(2).unwrap();
        assert_eq!(ramified.len(), 1);
        assert_eq!(ramified[0].1, 2);
        assert_eq!(ramified[0].0.norm(), BigInt::from(2));

        let split = k.factor_prime(5).unwrap();
        assert_eq!(split.len(), 2);
        assert!(split.iter().all(|(p, e)| *e == 1 && p.norm() == BigInt::from(5)));
        assert_ne!(split[0].0.ideal, split[1].0.ideal);

        let inert = k.factor_prime(3).unwrap();
        assert_eq!(inert.len(), 1);
        assert_eq!(inert[0].0.residue_degree, 2);
        assert_eq!(inert[0].0.norm(), BigInt::from(9));

        assert_eq!(k.factor_prime(4), Err(FieldError::NotPrime(4)));
    }

    #[test]
    fn test_format_polynomial() {
        assert_eq!(format_polynomial(&coords(&[-1, -1, 1]), "x"), "x^2 - x - 1");
        assert_eq!(format_polynomial(&coords(&[3, 0, -2]), "a"), "-2a^2 + 3");
        assert_eq!(format_polynomial(&coords(&[0, 0]), "x"), "0");
    }
}
