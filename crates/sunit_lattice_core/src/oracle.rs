//! Oracle state builder
//!
//! Produces the amplitudes of a discretized Gaussian over a lattice, the
//! classical half of the hidden subgroup oracle. The lattice basis is first
//! brought back to real coordinates, reduced, and then every coefficient
//! vector representable on the qubit register is weighted by
//! `exp(-pi * ||sum c_i b_i||^2 / s^2)`.
//!
//! # Register layout
//!
//! Each of the `n` axes gets `q = floor(num_qubits / n)` qubits. An axis
//! index `k` in `0..2^q` is the q-bit two's complement word of the integer
//! coefficient, sign bit first, so index 0 is the coefficient 0 and the
//! register covers `-2^(q-1) ..= 2^(q-1) - 1`. Flat indices are row-major,
//! the last axis varies fastest.

use crate::error::{Result, SunitError};
use crate::matrix::Matrix;
use crate::reducer::{ApproximateReducer, BasisReducer};
use num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default ceiling on the number of grid points (2^22)
pub const DEFAULT_MAX_GRID_POINTS: usize = 1 << 22;

/// How often the enumeration polls for cancellation and deadlines
const POLL_INTERVAL: usize = 1 << 12;

/// Relative tolerance on the imaginary residue of the real representation
const REAL_TOLERANCE: f64 = 1e-8;

/// Physical parameters of the oracle state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OracleParams {
    /// Total qubit budget, split evenly across lattice dimensions
    pub num_qubits: usize,
    /// Straddle resolution; must be below half the shortest reduced vector
    pub nu: f64,
    /// Gaussian width s
    pub gaussian_width: f64,
}

impl OracleParams {
    fn validate(&self) -> Result<()> {
        if !self.gaussian_width.is_finite() || self.gaussian_width <= 0.0 {
            return Err(SunitError::InvalidParameter(format!(
                "gaussian width must be positive and finite, got {}",
                self.gaussian_width
            )));
        }
        if !self.nu.is_finite() || self.nu <= 0.0 {
            return Err(SunitError::InvalidParameter(format!(
                "straddle parameter nu must be positive and finite, got {}",
                self.nu
            )));
        }
        Ok(())
    }
}

/// Resource limits for grid enumeration
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Largest grid (in points) that will be allocated
    pub max_grid_points: usize,
    /// Wall clock budget for enumeration
    pub deadline: Option<Duration>,
    /// Set to true from another thread to abandon the build
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            max_grid_points: DEFAULT_MAX_GRID_POINTS,
            deadline: None,
            cancel: None,
        }
    }
}

impl OracleConfig {
    pub fn with_max_grid_points(mut self, max_grid_points: usize) -> Self {
        self.max_grid_points = max_grid_points;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn poll(&self, start: Instant) -> Result<()> {
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(SunitError::Cancelled);
            }
        }
        if let Some(deadline) = self.deadline {
            let elapsed = start.elapsed();
            if elapsed >= deadline {
                return Err(SunitError::DeadlineExceeded(elapsed));
            }
        }
        Ok(())
    }
}

/// Un-normalized Gaussian amplitudes over the register grid
#[derive(Debug, Clone, PartialEq)]
pub struct OracleAmplitudeGrid {
    dimension: usize,
    qubits_per_dimension: usize,
    basis: Matrix<f64>,
    amplitudes: Vec<f64>,
}

impl OracleAmplitudeGrid {
    /// Number of axes n
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn qubits_per_dimension(&self) -> usize {
        self.qubits_per_dimension
    }

    /// Points per axis, 2^q
    pub fn axis_len(&self) -> usize {
        1 << self.qubits_per_dimension
    }

    pub fn shape(&self) -> Vec<usize> {
        vec![self.axis_len(); self.dimension]
    }

    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// The reduced basis the grid coefficients refer to (rows are vectors)
    pub fn basis(&self) -> &Matrix<f64> {
        &self.basis
    }

    /// Flat row-major amplitudes
    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    pub fn flat_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.dimension {
            return None;
        }
        let axis = self.axis_len();
        index.iter().try_fold(0usize, |acc, &k| {
            (k < axis).then_some(acc * axis + k)
        })
    }

    pub fn get(&self, index: &[usize]) -> Option<f64> {
        self.flat_index(index).map(|i| self.amplitudes[i])
    }

    /// Signed lattice coefficients of a flat grid index
    pub fn coefficients(&self, flat: usize) -> Vec<i64> {
        grid_coefficients(flat, self.dimension, self.qubits_per_dimension)
    }

    /// Lattice vector `sum c_i b_i` of a flat grid index
    pub fn lattice_vector(&self, flat: usize) -> Vec<f64> {
        combine(&self.basis, &self.coefficients(flat))
    }

    /// Register bits of a flat grid index, axis by axis, sign bit first
    pub fn basis_state(&self, flat: usize) -> Vec<u8> {
        let q = self.qubits_per_dimension;
        let total = q * self.dimension;
        (0..total)
            .map(|bit| ((flat >> (total - 1 - bit)) & 1) as u8)
            .collect()
    }

    /// Sum of squared amplitudes
    pub fn norm_squared(&self) -> f64 {
        self.amplitudes.iter().map(|a| a * a).sum()
    }

    /// Unit-norm state vector for the state preparation step
    pub fn normalized(&self) -> Vec<f64> {
        let norm = self.norm_squared().sqrt();
        if norm == 0.0 {
            return self.amplitudes.clone();
        }
        self.amplitudes.iter().map(|a| a / norm).collect()
    }
}

/// Undo the embedding rotation on each complex column pair
///
/// The pair `(conj z, z)` maps to `(sqrt2 Re z, -sqrt2 Im z)`; an imaginary
/// residue above tolerance means the pair was not conjugate.
pub fn real_representation(complex: &Matrix<Complex64>) -> Result<Matrix<f64>> {
    let (rows, cols) = complex.dims();
    if cols % 2 != 0 {
        return Err(SunitError::ShapeMismatch {
            context: "complex coordinate pairs",
            expected: cols + 1,
            actual: cols,
        });
    }

    let mut out = Matrix::new(rows, cols);
    for i in 0..rows {
        let row = complex.row(i);
        let scale = 1.0 + row.iter().map(|z| z.norm()).fold(0.0, f64::max);
        for (k, pair) in row.chunks_exact(2).enumerate() {
            let (a, b) = (pair[0], pair[1]);
            let first = (a + b) * FRAC_1_SQRT_2;
            let second = (b - a) * Complex64::i() * FRAC_1_SQRT_2;
            for (j, value) in [(2 * k, first), (2 * k + 1, second)] {
                if value.im.abs() > REAL_TOLERANCE * scale {
                    return Err(SunitError::InvalidParameter(format!(
                        "complex coordinates {} and {} of row {} are not a conjugate pair",
                        2 * k,
                        2 * k + 1,
                        i
                    )));
                }
                *out.get_mut(i, j) = value.re;
            }
        }
    }
    Ok(out)
}

/// Real basis `[real | real_representation(complex)]`, either half optional
pub fn real_basis(
    real: Option<&Matrix<f64>>,
    complex: Option<&Matrix<Complex64>>,
) -> Result<Matrix<f64>> {
    match (real, complex.map(real_representation).transpose()?) {
        (Some(r), Some(c)) => r.hconcat(&c),
        (Some(r), None) => Ok(r.clone()),
        (None, Some(c)) => Ok(c),
        (None, None) => Err(SunitError::InvalidParameter(
            "lattice has neither real nor complex coordinates".to_string(),
        )),
    }
}

/// Build the Gaussian amplitude grid for a lattice given in embedding coordinates
pub fn build_oracle_amplitudes<R: BasisReducer>(
    real: Option<&Matrix<f64>>,
    complex: Option<&Matrix<Complex64>>,
    params: &OracleParams,
    reducer: &ApproximateReducer<R>,
    config: &OracleConfig,
) -> Result<OracleAmplitudeGrid> {
    params.validate()?;

    let concatenated = real_basis(real, complex)?;
    let (rows, n) = concatenated.dims();
    if rows != n {
        return Err(SunitError::ShapeMismatch {
            context: "oracle basis rows",
            expected: n,
            actual: rows,
        });
    }

    let q = params.num_qubits / n.max(1);
    let total = grid_size(q, n, config.max_grid_points)?;

    let basis = reducer.reduce_basis(&concatenated)?;
    let shortest = (0..n)
        .map(|i| basis.row(i).iter().map(|x| x * x).sum::<f64>().sqrt())
        .fold(f64::INFINITY, f64::min);
    if 2.0 * params.nu >= shortest {
        return Err(SunitError::InvalidParameter(format!(
            "straddle parameter nu = {} must be below half the shortest reduced vector ({})",
            params.nu, shortest
        )));
    }

    info!(
        dimension = n,
        qubits_per_dimension = q,
        points = total,
        "building oracle amplitude grid"
    );

    let start = Instant::now();
    let scale = PI / (params.gaussian_width * params.gaussian_width);
    let mut amplitudes = Vec::with_capacity(total);
    for flat in 0..total {
        if flat % POLL_INTERVAL == 0 {
            config.poll(start)?;
        }
        let coefficients = grid_coefficients(flat, n, q);
        let v = combine(&basis, &coefficients);
        let norm_sq: f64 = v.iter().map(|x| x * x).sum();
        amplitudes.push((-scale * norm_sq).exp());
    }

    debug!(
        elapsed = ?start.elapsed(),
        shortest,
        "oracle amplitude grid complete"
    );
    Ok(OracleAmplitudeGrid {
        dimension: n,
        qubits_per_dimension: q,
        basis,
        amplitudes,
    })
}

/// Number of grid points, rejected before anything is allocated
fn grid_size(q: usize, n: usize, limit: usize) -> Result<usize> {
    let intractable = || SunitError::Intractable {
        qubits_per_dimension: q,
        dimension: n,
        limit,
    };
    if q == 0 {
        return Err(intractable());
    }
    let bits = q.checked_mul(n).ok_or_else(intractable)?;
    let total = u32::try_from(bits)
        .ok()
        .and_then(|b| 1usize.checked_shl(b))
        .ok_or_else(intractable)?;
    if total > limit {
        return Err(intractable());
    }
    Ok(total)
}

fn grid_coefficients(flat: usize, n: usize, q: usize) -> Vec<i64> {
    let mask = (1usize << q) - 1;
    (0..n)
        .map(|axis| {
            let word = (flat >> (q * (n - 1 - axis))) & mask;
            twos_complement(word as u64, q)
        })
        .collect()
}

fn twos_complement(word: u64, q: usize) -> i64 {
    if q < 64 && word >= 1u64 << (q - 1) {
        let half = 1i64 << (q - 1);
        word as i64 - half - half
    } else {
        word as i64
    }
}

fn combine(basis: &Matrix<f64>, coefficients: &[i64]) -> Vec<f64> {
    let mut v = vec![0.0; basis.cols()];
    for (i, &c) in coefficients.iter().enumerate() {
        if c == 0 {
            continue;
        }
        for (x, b) in v.iter_mut().zip(basis.row(i)) {
            *x += c as f64 * b;
        }
    }
    v
}

/// q-bit two's complement of `value`, sign bit first
pub fn encode_signed(value: i64, qubits: usize) -> Result<Vec<u8>> {
    if qubits == 0 || qubits > 63 {
        return Err(SunitError::InvalidParameter(format!(
            "register width must be between 1 and 63 qubits, got {}",
            qubits
        )));
    }
    let half = 1i64 << (qubits - 1);
    if value < -half || value >= half {
        return Err(SunitError::InvalidParameter(format!(
            "{} does not fit in a {}-qubit signed register",
            value, qubits
        )));
    }
    let word = (value as u64) & ((1u64 << qubits) - 1);
    Ok((0..qubits)
        .map(|bit| ((word >> (qubits - 1 - bit)) & 1) as u8)
        .collect())
}

/// Inverse of [`encode_signed`]
pub fn decode_signed(bits: &[u8]) -> Result<i64> {
    if bits.is_empty() || bits.len() > 63 {
        return Err(SunitError::InvalidParameter(format!(
            "register width must be between 1 and 63 qubits, got {}",
            bits.len()
        )));
    }
    let mut word = 0u64;
    for &b in bits {
        if b > 1 {
            return Err(SunitError::InvalidParameter(format!(
                "register bit must be 0 or 1, got {}",
                b
            )));
        }
        word = (word << 1) | u64::from(b);
    }
    Ok(twos_complement(word, bits.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{build_embedding, build_ideal_lattice, PlaceValues};
    use crate::field::{NumberField, SimpleField};

    fn gaussian_lattice() -> (Option<Matrix<f64>>, Option<Matrix<Complex64>>) {
        let k = SimpleField::quadratic(-1).unwrap();
        let e = build_embedding(&k).unwrap();
        let lattice = build_ideal_lattice(&[], &[], &PlaceValues::identity(0, 1), &e, &k).unwrap();
        (lattice.real, lattice.complex)
    }

    fn params(num_qubits: usize) -> OracleParams {
        OracleParams {
            num_qubits,
            nu: 0.1,
            gaussian_width: 2.0,
        }
    }

    fn build(num_qubits: usize, config: &OracleConfig) -> Result<OracleAmplitudeGrid> {
        let (real, complex) = gaussian_lattice();
        build_oracle_amplitudes(
            real.as_ref(),
            complex.as_ref(),
            &params(num_qubits),
            &ApproximateReducer::default(),
            config,
        )
    }

    #[test]
    fn test_grid_shape_and_range() {
        let grid = build(4, &OracleConfig::default()).unwrap();
        assert_eq!(grid.shape(), vec![4, 4]);
        assert_eq!(grid.len(), 16);
        assert!(grid.amplitudes().iter().all(|&a| a > 0.0 && a <= 1.0));
        assert_eq!(grid.get(&[0, 0]), Some(1.0));
        assert_eq!(grid.get(&[4, 0]), None);
    }

    #[test]
    fn test_odd_budget_rounds_down() {
        let grid = build(5, &OracleConfig::default()).unwrap();
        assert_eq!(grid.qubits_per_dimension(), 2);
        assert_eq!(grid.shape(), vec![4, 4]);
    }

    #[test]
    fn test_amplitude_matches_gaussian() {
        let grid = build(4, &OracleConfig::default()).unwrap();
        let s = params(4).gaussian_width;
        for flat in 0..grid.len() {
            let v = grid.lattice_vector(flat);
            let norm_sq: f64 = v.iter().map(|x| x * x).sum();
            let expected = (-PI * norm_sq / (s * s)).exp();
            assert!((grid.amplitudes()[flat] - expected).abs() < 1e-12);
        }
        // Index 3 on the last axis is the coefficient -1
        assert_eq!(grid.coefficients(3), vec![0, -1]);
        assert_eq!(grid.coefficients(4), vec![1, 0]);
    }

    #[test]
    fn test_grid_is_symmetric_under_negation() {
        let grid = build(4, &OracleConfig::default()).unwrap();
        let a = grid.get(&[1, 1]).unwrap();
        let b = grid.get(&[3, 3]).unwrap();
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_normalized() {
        let grid = build(4, &OracleConfig::default()).unwrap();
        let state = grid.normalized();
        let total: f64 = state.iter().map(|a| a * a).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_basis_state_bits() {
        let grid = build(4, &OracleConfig::default()).unwrap();
        let flat = grid.flat_index(&[1, 3]).unwrap();
        assert_eq!(grid.basis_state(flat), vec![0, 1, 1, 1]);
        assert_eq!(decode_signed(&grid.basis_state(flat)[2..]).unwrap(), -1);
    }

    #[test]
    fn test_zero_qubits_per_dimension() {
        assert!(matches!(
            build(1, &OracleConfig::default()),
            Err(SunitError::Intractable {
                qubits_per_dimension: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_grid_ceiling() {
        let config = OracleConfig::default().with_max_grid_points(8);
        assert!(matches!(
            build(4, &config),
            Err(SunitError::Intractable { limit: 8, .. })
        ));
        // 2^(q*n) would not even fit in a usize
        assert!(matches!(
            build(200, &OracleConfig::default().with_max_grid_points(usize::MAX)),
            Err(SunitError::Intractable { .. })
        ));
    }

    #[test]
    fn test_nu_must_be_small() {
        let (real, complex) = gaussian_lattice();
        let mut p = params(4);
        p.nu = 1.0;
        let result = build_oracle_amplitudes(
            real.as_ref(),
            complex.as_ref(),
            &p,
            &ApproximateReducer::default(),
            &OracleConfig::default(),
        );
        assert!(matches!(result, Err(SunitError::InvalidParameter(_))));

        p.nu = -0.1;
        let result = build_oracle_amplitudes(
            real.as_ref(),
            complex.as_ref(),
            &p,
            &ApproximateReducer::default(),
            &OracleConfig::default(),
        );
        assert!(matches!(result, Err(SunitError::InvalidParameter(_))));
    }

    #[test]
    fn test_cancel_and_deadline() {
        let flag = Arc::new(AtomicBool::new(true));
        let cancelled = build(4, &OracleConfig::default().with_cancel_flag(flag));
        assert!(matches!(cancelled, Err(SunitError::Cancelled)));

        let late = build(4, &OracleConfig::default().with_deadline(Duration::ZERO));
        assert!(matches!(late, Err(SunitError::DeadlineExceeded(_))));
    }

    #[test]
    fn test_real_representation_inverts_rotation() {
        let k = SimpleField::new(&[-2i64, 0, 0, 1]).unwrap();
        let e = build_embedding(&k).unwrap();
        let real = real_representation(&e.complex).unwrap();
        let g = k.minkowski_embedding();
        for i in 0..3 {
            assert!((real.get(i, 0) - g.get(i, 1)).abs() < 1e-12);
            assert!((real.get(i, 1) + g.get(i, 2)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_real_representation_rejects_non_conjugate() {
        let m = Matrix::from_flat(vec![Complex64::new(1.0, 0.0), Complex64::new(0.0, 1.0)], 1, 2);
        assert!(real_representation(&m).is_err());
    }

    #[test]
    fn test_mixed_signature_concatenates() {
        let k = SimpleField::new(&[-2i64, 0, 0, 1]).unwrap();
        let e = build_embedding(&k).unwrap();
        let lattice = build_ideal_lattice(&[], &[], &PlaceValues::identity(1, 1), &e, &k).unwrap();
        let grid = build_oracle_amplitudes(
            lattice.real.as_ref(),
            lattice.complex.as_ref(),
            &OracleParams {
                num_qubits: 6,
                nu: 0.1,
                gaussian_width: 3.0,
            },
            &ApproximateReducer::default(),
            &OracleConfig::default(),
        )
        .unwrap();
        assert_eq!(grid.shape(), vec![4, 4, 4]);
        assert_eq!(grid.amplitudes()[0], 1.0);
    }

    #[test]
    fn test_signed_encoding() {
        assert_eq!(encode_signed(0, 3).unwrap(), vec![0, 0, 0]);
        assert_eq!(encode_signed(3, 3).unwrap(), vec![0, 1, 1]);
        assert_eq!(encode_signed(-1, 3).unwrap(), vec![1, 1, 1]);
        assert_eq!(encode_signed(-4, 3).unwrap(), vec![1, 0, 0]);
        assert!(encode_signed(4, 3).is_err());
        assert!(encode_signed(0, 0).is_err());

        for value in -4..4 {
            let bits = encode_signed(value, 3).unwrap();
            assert_eq!(decode_signed(&bits).unwrap(), value);
        }
        assert!(decode_signed(&[0, 2]).is_err());
    }
}
