//! Integer lattice basis representation

use crate::error::LatticeError;
use crate::matrix::Matrix;
use num_bigint::BigInt;
use num_traits::{One, ToPrimitive, Zero};
use std::fmt;

/// A lattice basis represented as a matrix of row vectors
///
/// Each row b_i is a basis vector in Z^m.
/// The lattice L(B) = {Σ x_i b_i : x_i ∈ Z}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatticeBasis {
    /// Basis vectors as rows (n vectors of dimension m)
    pub vectors: Vec<Vec<BigInt>>,
    /// Number of basis vectors (rank, when independent)
    pub n: usize,
    /// Dimension of the ambient space
    pub m: usize,
}

impl LatticeBasis {
    /// Create a new lattice basis from row vectors
    pub fn new(vectors: Vec<Vec<BigInt>>) -> Result<Self, LatticeError> {
        let Some(first) = vectors.first() else {
            return Err(LatticeError::EmptyBasis);
        };
        let m = first.len();
        if let Some(bad) = vectors.iter().find(|v| v.len() != m) {
            return Err(LatticeError::RaggedBasis {
                expected: m,
                actual: bad.len(),
            });
        }

        let n = vectors.len();
        Ok(Self { vectors, n, m })
    }

    /// Create a lattice basis from integer rows
    ///
    /// # Panics
    /// Panics on empty or ragged input; meant for literals in tests and benches
    pub fn from_rows<T: Into<BigInt> + Clone>(rows: &[Vec<T>]) -> Self {
        let vectors: Vec<Vec<BigInt>> = rows
            .iter()
            .map(|row| row.iter().map(|x| x.clone().into()).collect())
            .collect();
        Self::new(vectors).expect("literal basis must be rectangular and non-empty")
    }

    /// The standard basis of Z^n
    pub fn identity(n: usize) -> Self {
        let vectors = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| if i == j { BigInt::one() } else { BigInt::zero() })
                    .collect()
            })
            .collect();
        Self { vectors, n, m: n }
    }

    /// Create a random lattice basis for testing
    ///
    /// # Arguments
    /// * `n` - Number of basis vectors (rank)
    /// * `m` - Dimension of ambient space
    /// * `bits` - Maximum bit size of entries
    pub fn random(n: usize, m: usize, bits: usize) -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let half = 1i64 << (bits.clamp(2, 62) - 1);

        let vectors: Vec<Vec<BigInt>> = (0..n)
            .map(|_| {
                (0..m)
                    .map(|_| BigInt::from(rng.gen_range(-half..half)))
                    .collect()
            })
            .collect();

        Self { vectors, n, m }
    }

    pub fn get(&self, i: usize) -> &[BigInt] {
        &self.vectors[i]
    }

    /// Swap two basis vectors
    pub fn swap(&mut self, i: usize, j: usize) {
        self.vectors.swap(i, j);
    }

    /// Compute inner product <b_i, b_j>
    pub fn inner_product(&self, i: usize, j: usize) -> BigInt {
        self.vectors[i]
            .iter()
            .zip(self.vectors[j].iter())
            .map(|(a, b)| a * b)
            .fold(BigInt::zero(), |acc, x| acc + x)
    }

    /// Compute squared norm ||b_i||^2
    pub fn norm_squared(&self, i: usize) -> BigInt {
        self.inner_product(i, i)
    }

    /// Update b_i = b_i - q * b_j (size reduction step)
    pub fn reduce_vector(&mut self, i: usize, j: usize, q: &BigInt) {
        for k in 0..self.m {
            self.vectors[i][k] = &self.vectors[i][k] - q * &self.vectors[j][k];
        }
    }


    /// Prepend the identity: row i becomes `[e_i | b_i]`
    ///
    /// The identity block records the unimodular transform applied by a
    /// subsequent reduction.
    pub fn with_identity_prefix(&self) -> Self {
        let vectors = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut out: Vec<BigInt> = (0..self.n)
                    .map(|j| if i == j { BigInt::one() } else { BigInt::zero() })
                    .collect();
                out.extend(row.iter().cloned());
                out
            })
            .collect();
        Self {
            vectors,
            n: self.n,
            m: self.n + self.m,
        }
    }

    /// Convert to floating point, multiplying every entry by `scale`
    pub fn to_f64_matrix(&self, scale: f64) -> Matrix<f64> {
        let data = self
            .vectors
            .iter()
            .flat_map(|v| v.iter())
            .map(|x| x.to_f64().unwrap_or(f64::NAN) * scale)
            .collect();
        Matrix::from_flat(data, self.n, self.m)
    }
}

impl fmt::Display for LatticeBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "LatticeBasis ({}×{}):", self.n, self.m)?;
        for (i, v) in self.vectors.iter().enumerate() {
            write!(f, "  b_{}: [", i)?;
            for (j, x) in v.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", x)?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}
