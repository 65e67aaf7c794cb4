//! Minkowski embedding coordinates and ideal lattice construction
//!
//! The field's real embedding matrix is split into the `r1` real columns and
//! the `2*r2` columns of the complex places. Each complex column pair
//! `(sqrt2 Re sigma, sqrt2 Im sigma)` is rotated by
//! `U = (1/sqrt2) [[1, -i], [1, i]]` into `(conj sigma, sigma)`, which keeps
//! the coordinates compatible with complex scaling while the pair still
//! carries exactly two real degrees of freedom.
//!
//! An ideal lattice is the image of a fractional ideal's Z-basis under these
//! coordinates, twisted by one [`PlaceValue`] per place.

use crate::error::{Result, SunitError};
use crate::field::NumberField;
use crate::ideal::{FractionalIdeal, PrimeIdeal};
use crate::matrix::Matrix;
use crate::rational::Rational;
use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;
use tracing::debug;

/// Embedding coordinates of the integral basis, computed once per field
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingCoordinates {
    /// Shape (n, r1)
    pub real: Matrix<f64>,
    /// Shape (n, 2*r2); columns 2k and 2k+1 hold `conj sigma_k` and `sigma_k`
    pub complex: Matrix<Complex64>,
    pub r1: usize,
    pub r2: usize,
}

impl EmbeddingCoordinates {
    pub fn degree(&self) -> usize {
        self.real.rows()
    }

    pub fn signature(&self) -> (usize, usize) {
        (self.r1, self.r2)
    }
}

/// Split the Minkowski embedding of `field` and rotate its complex pairs
pub fn build_embedding<F: NumberField + ?Sized>(field: &F) -> Result<EmbeddingCoordinates> {
    let n = field.degree();
    let (r1, r2) = field.signature();
    if r1 + 2 * r2 != n {
        return Err(SunitError::ShapeMismatch {
            context: "field signature",
            expected: n,
            actual: r1 + 2 * r2,
        });
    }

    let minkowski = field.minkowski_embedding();
    if minkowski.dims() != (n, n) {
        return Err(SunitError::ShapeMismatch {
            context: "minkowski embedding",
            expected: n,
            actual: minkowski.cols(),
        });
    }

    let real = minkowski.slice(0..n, 0..r1);
    let mut complex = minkowski
        .slice(0..n, r1..n)
        .map(|&x| Complex64::new(x, 0.0));

    for i in 0..n {
        let row = complex.row_mut(i);
        for pair in row.chunks_exact_mut(2) {
            let (x, y) = (pair[0], pair[1]);
            let iy = Complex64::i() * y;
            pair[0] = (x - iy) * FRAC_1_SQRT_2;
            pair[1] = (x + iy) * FRAC_1_SQRT_2;
        }
    }

    debug!(n, r1, r2, "built embedding coordinates");
    Ok(EmbeddingCoordinates {
        real,
        complex,
        r1,
        r2,
    })
}

/// Scaling applied at one place of the field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaceValue {
    /// Real place: multiply by `sign * e^log_magnitude`
    Real { sign: i8, log_magnitude: f64 },
    /// Complex place: multiply `sigma` by `e^(log_magnitude + i*phase)` and
    /// `conj sigma` by the conjugate factor
    Complex { phase: f64, log_magnitude: f64 },
}

impl PlaceValue {
    fn validate(&self) -> Result<()> {
        match *self {
            PlaceValue::Real { sign, log_magnitude } => {
                if sign != 1 && sign != -1 {
                    return Err(SunitError::InvalidParameter(format!(
                        "real place sign must be +1 or -1, got {}",
                        sign
                    )));
                }
                check_finite("log magnitude", log_magnitude)
            }
            PlaceValue::Complex {
                phase,
                log_magnitude,
            } => {
                check_finite("phase", phase)?;
                check_finite("log magnitude", log_magnitude)
            }
        }
    }
}

/// One [`PlaceValue`] per place: `r1` real places then `r2` complex places
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceValues {
    values: Vec<PlaceValue>,
}

impl PlaceValues {
    pub fn new(values: Vec<PlaceValue>) -> Self {
        Self { values }
    }

    /// Sign 1, magnitude 0 and phase 0 everywhere
    pub fn identity(r1: usize, r2: usize) -> Self {
        let real = (0..r1).map(|_| PlaceValue::Real {
            sign: 1,
            log_magnitude: 0.0,
        });
        let complex = (0..r2).map(|_| PlaceValue::Complex {
            phase: 0.0,
            log_magnitude: 0.0,
        });
        Self {
            values: real.chain(complex).collect(),
        }
    }

    pub fn as_slice(&self) -> &[PlaceValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Column factors for the real coordinates and the rotated complex
    /// coordinates, checked against the embedding's signature
    fn factors(&self, r1: usize, r2: usize) -> Result<(Vec<f64>, Vec<Complex64>)> {
        if self.values.len() != r1 + r2 {
            return Err(SunitError::ShapeMismatch {
                context: "place values",
                expected: r1 + r2,
                actual: self.values.len(),
            });
        }

        let mut real = Vec::with_capacity(r1);
        let mut complex = Vec::with_capacity(2 * r2);
        for (index, value) in self.values.iter().enumerate() {
            value.validate()?;
            match (*value, index < r1) {
                (PlaceValue::Real { sign, log_magnitude }, true) => {
                    real.push(f64::from(sign) * log_magnitude.exp());
                }
                (
                    PlaceValue::Complex {
                        phase,
                        log_magnitude,
                    },
                    false,
                ) => {
                    let scale = Complex64::from_polar(log_magnitude.exp(), phase);
                    complex.push(scale.conj());
                    complex.push(scale);
                }
                _ => {
                    return Err(SunitError::InvalidParameter(format!(
                        "place {} has the wrong kind for signature ({}, {})",
                        index, r1, r2
                    )))
                }
            }
        }
        Ok((real, complex))
    }
}

/// Lattice basis in embedding coordinates, rows are basis vectors
///
/// A half is `None` when the field has no places of that kind.
#[derive(Debug, Clone, PartialEq)]
pub struct IdealLattice {
    pub real: Option<Matrix<f64>>,
    pub complex: Option<Matrix<Complex64>>,
}

impl IdealLattice {
    /// Number of basis vectors
    pub fn rank(&self) -> usize {
        match (&self.real, &self.complex) {
            (Some(m), _) => m.rows(),
            (None, Some(m)) => m.rows(),
            (None, None) => 0,
        }
    }

    /// Ambient dimension r1 + 2*r2
    pub fn dimension(&self) -> usize {
        self.real.as_ref().map_or(0, |m| m.cols()) + self.complex.as_ref().map_or(0, |m| m.cols())
    }
}

/// The fractional ideal `prod p_i^(-z_i)`
///
/// Positive and negative exponents are collected separately so only one
/// inverse is taken. An empty or all-zero exponent vector is the unit ideal.
pub fn ideal_from_exponents<F: NumberField + ?Sized>(
    factor_base: &[PrimeIdeal],
    exponents: &[i64],
    field: &F,
) -> Result<FractionalIdeal> {
    if exponents.len() != factor_base.len() {
        return Err(SunitError::ShapeMismatch {
            context: "exponent vector",
            expected: factor_base.len(),
            actual: exponents.len(),
        });
    }

    let n = field.degree();
    let mut numerator = FractionalIdeal::unit(n);
    let mut denominator = FractionalIdeal::unit(n);
    for (prime, &z) in factor_base.iter().zip(exponents) {
        if z > 0 {
            denominator = denominator.mul(&prime.ideal.pow(z, field)?, field)?;
        } else if z < 0 {
            let e = z.checked_neg().ok_or_else(|| {
                SunitError::InvalidParameter(format!("exponent {} out of range", z))
            })?;
            numerator = numerator.mul(&prime.ideal.pow(e, field)?, field)?;
        }
    }

    if denominator.is_unit() {
        Ok(numerator)
    } else {
        numerator.mul(&denominator.inverse(field)?, field)
    }
}

/// Embed the Z-basis of `prod p_i^(-z_i)` and twist it by `places`
pub fn build_ideal_lattice<F: NumberField + ?Sized>(
    factor_base: &[PrimeIdeal],
    exponents: &[i64],
    places: &PlaceValues,
    embedding: &EmbeddingCoordinates,
    field: &F,
) -> Result<IdealLattice> {
    let n = embedding.degree();
    if field.degree() != n {
        return Err(SunitError::ShapeMismatch {
            context: "embedding degree",
            expected: field.degree(),
            actual: n,
        });
    }
    let (real_scale, complex_scale) = places.factors(embedding.r1, embedding.r2)?;

    let ideal = ideal_from_exponents(factor_base, exponents, field)?;
    let generators: Vec<Vec<f64>> = ideal
        .basis_rows()
        .iter()
        .map(|row| row.iter().map(Rational::to_f64).collect())
        .collect();
    debug!(
        n,
        norm = %ideal.norm(),
        "embedding fractional ideal basis"
    );

    let real = (embedding.r1 > 0).then(|| {
        let mut image = embed_rows(&generators, &embedding.real);
        scale_columns(&mut image, &real_scale);
        image
    });
    let complex = (embedding.r2 > 0).then(|| {
        let mut image = embed_rows(&generators, &embedding.complex);
        scale_columns(&mut image, &complex_scale);
        image
    });

    Ok(IdealLattice { real, complex })
}

/// Row i of the result is `generators[i] * coordinates`
fn embed_rows<T>(generators: &[Vec<f64>], coordinates: &Matrix<T>) -> Matrix<T>
where
    T: Copy + Default + std::ops::Add<Output = T> + std::ops::Mul<f64, Output = T>,
{
    let cols = coordinates.cols();
    let mut out = Matrix::new(generators.len(), cols);
    for (i, g) in generators.iter().enumerate() {
        let row = out.row_mut(i);
        for (k, &gk) in g.iter().enumerate() {
            if gk == 0.0 {
                continue;
            }
            for (j, &c) in coordinates.row(k).iter().enumerate() {
                row[j] = row[j] + c * gk;
            }
        }
    }
    out
}

fn scale_columns<T>(m: &mut Matrix<T>, factors: &[T])
where
    T: Copy + Default + std::ops::Mul<Output = T>,
{
    for i in 0..m.rows() {
        for (x, &f) in m.row_mut(i).iter_mut().zip(factors) {
            *x = *x * f;
        }
    }
}

fn check_finite(what: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SunitError::InvalidParameter(format!(
            "{} must be finite, got {}",
            what, value
        )))
    }
}
