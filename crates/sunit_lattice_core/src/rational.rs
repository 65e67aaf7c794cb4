//! Exact rational numbers
//!
//! Used by Gram-Schmidt orthogonalization and by fractional ideal arithmetic,
//! where every intermediate value must stay exact.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Exact rational number (numerator / denominator), always in lowest terms
/// with a positive denominator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rational {
    pub numerator: BigInt,
    pub denominator: BigInt,
}

impl Rational {
    /// Create a rational number from numerator and denominator
    ///
    /// # Panics
    /// Panics if `den` is zero
    pub fn new(num: BigInt, den: BigInt) -> Self {
        assert!(!den.is_zero(), "Rational denominator cannot be zero");
        let mut r = Self {
            numerator: num,
            denominator: den,
        };
        r.reduce();
        r
    }

    /// Create a rational from an integer
    pub fn from_int<T: Into<BigInt>>(n: T) -> Self {
        Self {
            numerator: n.into(),
            denominator: BigInt::one(),
        }
    }

    pub fn zero() -> Self {
        Self::from_int(0)
    }

    pub fn one() -> Self {
        Self::from_int(1)
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    pub fn is_integer(&self) -> bool {
        self.denominator.is_one()
    }

    /// Multiplicative inverse, `None` for zero
    pub fn recip(&self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(Self::new(self.denominator.clone(), self.numerator.clone()))
        }
    }

    /// Nearest integer, ties rounded up: floor(x + 1/2)
    pub fn round(&self) -> BigInt {
        let two_num: BigInt = &self.numerator * 2;
        let two_den: BigInt = &self.denominator * 2;
        (&two_num + &self.denominator).div_floor(&two_den)
    }

    pub fn floor(&self) -> BigInt {
        self.numerator.div_floor(&self.denominator)
    }

    /// Lossy conversion for reporting and embedding into floating point space
    pub fn to_f64(&self) -> f64 {
        match (self.numerator.to_f64(), self.denominator.to_f64()) {
            (Some(n), Some(d)) if n.is_finite() && d.is_finite() => n / d,
            _ => {
                // Both sides overflow f64; shift them down together first
                let shift = self
                    .numerator
                    .bits()
                    .max(self.denominator.bits())
                    .saturating_sub(1000);
                let n = (&self.numerator >> shift).to_f64().unwrap_or(0.0);
                let d = (&self.denominator >> shift).to_f64().unwrap_or(1.0);
                n / d
            }
        }
    }

    fn reduce(&mut self) {
        if self.numerator.is_zero() {
            self.denominator = BigInt::one();
            return;
        }

        let g = self.numerator.gcd(&self.denominator);
        self.numerator = &self.numerator / &g;
        self.denominator = &self.denominator / &g;

        if self.denominator.is_negative() {
            self.numerator = -&self.numerator;
            self.denominator = -&self.denominator;
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator.is_one() {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::from_int(n)
    }
}

impl From<BigInt> for Rational {
    fn from(n: BigInt) -> Self {
        Self::from_int(n)
    }
}

impl Add for &Rational {
    type Output = Rational;

    fn add(self, other: Self) -> Rational {
        let num = &self.numerator * &other.denominator + &other.numerator * &self.denominator;
        let den = &self.denominator * &other.denominator;
        Rational::new(num, den)
    }
}

impl Add for Rational {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        &self + &other
    }
}

impl Sub for &Rational {
    type Output = Rational;

    fn sub(self, other: Self) -> Rational {
        let num = &self.numerator * &other.denominator - &other.numerator * &self.denominator;
        let den = &self.denominator * &other.denominator;
        Rational::new(num, den)
    }
}

impl Sub for Rational {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        &self - &other
    }
}

impl Mul for &Rational {
    type Output = Rational;

    fn mul(self, other: Self) -> Rational {
        let num = &self.numerator * &other.numerator;
        let den = &self.denominator * &other.denominator;
        Rational::new(num, den)
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        &self * &other
    }
}

impl Div for &Rational {
    type Output = Rational;

    /// # Panics
    /// Panics on division by zero
    fn div(self, other: Self) -> Rational {
        let num = &self.numerator * &other.denominator;
        let den = &self.denominator * &other.numerator;
        Rational::new(num, den)
    }
}

impl Div for Rational {
    type Output = Self;

    fn div(self, other: Self) -> Self {
        &self / &other
    }
}

impl Neg for Rational {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            numerator: -self.numerator,
            denominator: self.denominator,
        }
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            numerator: -&self.numerator,
            denominator: self.denominator.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64, d: i64) -> Rational {
        Rational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_rational_normalizes_sign_and_terms() {
        assert_eq!(q(4, -8), q(-1, 2));
        assert_eq!(q(0, -5), Rational::zero());
        assert!(q(6, 3).is_integer());
    }

    #[test]
    fn test_rational_arithmetic() {
        let a = q(1, 2);
        let b = q(1, 3);

        assert_eq!(&a + &b, q(5, 6));
        assert_eq!(&a - &b, q(1, 6));
        assert_eq!(&a * &b, q(1, 6));
        assert_eq!(&a / &b, q(3, 2));
        assert_eq!(-a, q(-1, 2));
    }

    #[test]
    fn test_rounding() {
        assert_eq!(q(7, 2).round(), BigInt::from(4));
        assert_eq!(q(-7, 2).round(), BigInt::from(-3));
        assert_eq!(q(-7, 3).round(), BigInt::from(-2));
        assert_eq!(q(-7, 3).floor(), BigInt::from(-3));
    }

    #[test]
    fn test_recip_and_f64() {
        assert_eq!(q(-2, 3).recip(), Some(q(-3, 2)));
        assert_eq!(Rational::zero().recip(), None);
        assert!((q(1, 4).to_f64() - 0.25).abs() < 1e-15);
    }
}
