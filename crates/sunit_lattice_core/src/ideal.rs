//! Fractional ideal arithmetic
//!
//! A fractional ideal is stored as `(1/d) * M` where `M` is a full rank
//! Z-module of integral coordinate vectors in Hermite normal form. With
//! `gcd(d, entries of M) = 1` the representation is unique, so derived
//! equality is ideal equality.

use crate::error::{Result, SunitError};
use crate::field::simple::format_polynomial;
use crate::field::NumberField;
use crate::lattice::{hermite_normal_form, LatticeBasis};
use crate::matrix::Matrix;
use crate::rational::Rational;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FractionalIdeal {
    denominator: BigInt,
    basis: LatticeBasis,
}

impl FractionalIdeal {
    /// The ring of integers itself
    pub fn unit(degree: usize) -> Self {
        Self {
            denominator: BigInt::one(),
            basis: LatticeBasis::identity(degree),
        }
    }

    /// Integral ideal spanned as a Z-module by `rows`
    pub fn from_integral_rows(rows: &[Vec<BigInt>], degree: usize) -> Result<Self> {
        Self::from_scaled_rows(rows, BigInt::one(), degree)
    }

    /// The O-ideal generated by integral elements
    pub fn from_generators<F: NumberField + ?Sized>(
        field: &F,
        generators: &[Vec<BigInt>],
    ) -> Result<Self> {
        let n = field.degree();
        let mut rows = Vec::with_capacity(generators.len() * n);
        for g in generators {
            check_length(g.len(), n)?;
            for i in 0..n {
                let mut w = vec![BigInt::zero(); n];
                w[i] = BigInt::one();
                rows.push(field.multiply(&w, g)?);
            }
        }
        Self::from_integral_rows(&rows, n)
    }

    /// Z-module spanned by rational coordinate vectors
    pub fn from_rational_rows(rows: &[Vec<Rational>], degree: usize) -> Result<Self> {
        let denominator = rows
            .iter()
            .flat_map(|r| r.iter())
            .fold(BigInt::one(), |acc, x| acc.lcm(&x.denominator));
        let scaled: Vec<Vec<BigInt>> = rows
            .iter()
            .map(|r| {
                r.iter()
                    .map(|x| &x.numerator * (&denominator / &x.denominator))
                    .collect()
            })
            .collect();
        Self::from_scaled_rows(&scaled, denominator, degree)
    }

    fn from_scaled_rows(rows: &[Vec<BigInt>], denominator: BigInt, degree: usize) -> Result<Self> {
        for r in rows {
            check_length(r.len(), degree)?;
        }
        let hnf = hermite_normal_form(rows, degree);
        if hnf.len() != degree {
            return Err(SunitError::InvalidParameter(format!(
                "module of rank {} is not a fractional ideal of a degree {} field",
                hnf.len(),
                degree
            )));
        }

        let common = hnf
            .iter()
            .flat_map(|r| r.iter())
            .fold(denominator.clone(), |acc, x| acc.gcd(x));
        let vectors = hnf
            .into_iter()
            .map(|r| r.into_iter().map(|x| x / &common).collect())
            .collect();

        Ok(Self {
            denominator: denominator / &common,
            basis: LatticeBasis::new(vectors)?,
        })
    }

    pub fn degree(&self) -> usize {
        self.basis.m
    }

    pub fn denominator(&self) -> &BigInt {
        &self.denominator
    }

    pub fn is_integral(&self) -> bool {
        self.denominator.is_one()
    }

    pub fn is_unit(&self) -> bool {
        *self == Self::unit(self.degree())
    }

    /// Z-basis of the ideal in rational coordinates on the integral basis
    pub fn basis_rows(&self) -> Vec<Vec<Rational>> {
        self.basis
            .vectors
            .iter()
            .map(|r| {
                r.iter()
                    .map(|x| Rational::new(x.clone(), self.denominator.clone()))
                    .collect()
            })
            .collect()
    }

    /// Absolute norm: index of the numerator module over `d^n`
    pub fn norm(&self) -> Rational {
        // Triangular HNF: the determinant is the product of the pivots
        let det = (0..self.basis.n).fold(BigInt::one(), |acc, i| acc * &self.basis.vectors[i][i]);
        let scale = num_traits::pow(self.denominator.clone(), self.degree());
        Rational::new(det, scale)
    }

    pub fn mul<F: NumberField + ?Sized>(&self, other: &Self, field: &F) -> Result<Self> {
        let n = self.degree();
        check_length(other.degree(), n)?;
        check_length(field.degree(), n)?;

        let mut rows = Vec::with_capacity(n * n);
        for a in &self.basis.vectors {
            for b in &other.basis.vectors {
                rows.push(field.multiply(a, b)?);
            }
        }
        Self::from_scaled_rows(&rows, &self.denominator * &other.denominator, n)
    }

    /// `I^{-1} = {x in K : x I ⊆ O}`
    ///
    /// With `I = (1/d) J`, `x J ⊆ O` says `x M_k` is integral for the
    /// multiplication matrix `M_k` of every generator of `J`. The columns of
    /// the `M_k` span a lattice `L` and the solutions are its dual lattice.
    pub fn inverse<F: NumberField + ?Sized>(&self, field: &F) -> Result<Self> {
        let n = self.degree();
        check_length(field.degree(), n)?;

        // Columns of [M_1 | ... | M_n]: column j of M_k is (w_i g_k)_j over i
        let mut columns: Vec<Vec<BigInt>> = Vec::with_capacity(n * n);
        for g in &self.basis.vectors {
            let images = (0..n)
                .map(|i| {
                    let mut w = vec![BigInt::zero(); n];
                    w[i] = BigInt::one();
                    field.multiply(&w, g)
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            for j in 0..n {
                columns.push(images.iter().map(|img| img[j].clone()).collect());
            }
        }
        let lattice = hermite_normal_form(&columns, n);
        if lattice.len() != n {
            return Err(SunitError::InvalidParameter(
                "cannot invert the zero ideal".to_string(),
            ));
        }

        // Dual basis: rows of (L^T)^{-1}
        let data = (0..n)
            .flat_map(|i| (0..n).map(move |j| (i, j)))
            .map(|(i, j)| Rational::from_int(lattice[j][i].clone()))
            .collect();
        let dual = Matrix::from_flat(data, n, n)
            .inverse()
            .ok_or_else(|| SunitError::InvalidParameter("singular ideal lattice".to_string()))?;

        let d = Rational::from_int(self.denominator.clone());
        let rows: Vec<Vec<Rational>> = (0..n)
            .map(|i| dual.row(i).iter().map(|x| x * &d).collect())
            .collect();
        Self::from_rational_rows(&rows, n)
    }

    /// Integer power; negative exponents go through [`Self::inverse`]
    pub fn pow<F: NumberField + ?Sized>(&self, exponent: i64, field: &F) -> Result<Self> {
        let mut base = if exponent < 0 {
            self.inverse(field)?
        } else {
            self.clone()
        };
        let mut e = exponent.unsigned_abs();
        let mut acc = Self::unit(self.degree());

        while e > 0 {
            if e & 1 == 1 {
                acc = acc.mul(&base, field)?;
            }
            e >>= 1;
            if e > 0 {
                base = base.mul(&base, field)?;
            }
        }
        Ok(acc)
    }
}

impl fmt::Display for FractionalIdeal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_integral() {
            write!(f, "1/{} * ", self.denominator)?;
        }
        write!(f, "<")?;
        for (i, row) in self.basis.vectors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", format_polynomial(row, "a"))?;
        }
        write!(f, ">")
    }
}

/// A prime ideal lying above a rational prime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimeIdeal {
    pub prime: u64,
    /// f: the norm is p^f
    pub residue_degree: u32,
    /// e: exponent of this prime in the factorization of (p)
    pub ramification: u32,
    /// Second generator of the two-element form (p, g(a))
    pub generator: Vec<BigInt>,
    pub ideal: FractionalIdeal,
}

impl PrimeIdeal {
    pub fn new(
        prime: u64,
        residue_degree: u32,
        ramification: u32,
        generator: Vec<BigInt>,
        ideal: FractionalIdeal,
    ) -> Self {
        Self {
            prime,
            residue_degree,
            ramification,
            generator,
            ideal,
        }
    }

    pub fn norm(&self) -> BigInt {
        num_traits::pow(BigInt::from(self.prime), self.residue_degree as usize)
    }

    pub fn is_ramified(&self) -> bool {
        self.ramification > 1
    }
}

impl fmt::Display for PrimeIdeal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let generator = format_polynomial(&self.generator, "a");
        write!(
            f,
            "({}, {}) [norm {}, e = {}, f = {}]",
            self.prime,
            generator,
            self.norm(),
            self.ramification,
            self.residue_degree
        )
    }
}

fn check_length(actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(SunitError::ShapeMismatch {
            context: "ideal coordinates",
            expected,
            actual,
        });
    }
    Ok(())
}
