//! Error types for the S-unit lattice pipeline

use std::time::Duration;
use thiserror::Error;

/// Failures inside exact lattice reduction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LatticeError {
    #[error("basis vector {index} is linearly dependent on the preceding vectors")]
    LinearlyDependent { index: usize },

    #[error("lattice reduction did not converge within {iterations} iterations")]
    NoConvergence { iterations: usize },

    #[error("entry {value} cannot be snapped to an integer grid of precision {precision}")]
    NotRepresentable { value: f64, precision: f64 },

    #[error("basis has no vectors")]
    EmptyBasis,

    #[error("basis rows have inconsistent lengths: expected {expected}, got {actual}")]
    RaggedBasis { expected: usize, actual: usize },
}

/// Failures constructing or querying a number field
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("invalid defining polynomial: {0}")]
    InvalidPolynomial(String),

    #[error("quadratic field parameter {0} must be squarefree and different from 0 and 1")]
    InvalidQuadraticParameter(i64),

    #[error("root finding did not converge after {iterations} iterations")]
    RootsDidNotConverge { iterations: usize },

    #[error("{0} is not a rational prime")]
    NotPrime(u64),

    #[error("element has {actual} coordinates, field degree is {expected}")]
    CoordinateLength { expected: usize, actual: usize },
}

/// Errors surfaced by the pipeline stages
#[derive(Error, Debug)]
pub enum SunitError {
    #[error("shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("target dimension {requested} exceeds basis rank {rank}")]
    TargetDimensionTooLarge { requested: usize, rank: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(
        "oracle grid with {qubits_per_dimension} qubits on each of {dimension} axes exceeds the limit of {limit} points"
    )]
    Intractable {
        qubits_per_dimension: usize,
        dimension: usize,
        limit: usize,
    },

    #[error("lattice reduction failed: {0}")]
    Reduction(#[from] LatticeError),

    #[error("number field error: {0}")]
    Field(#[from] FieldError),

    #[error("oracle construction cancelled")]
    Cancelled,

    #[error("oracle construction exceeded its deadline after {0:?}")]
    DeadlineExceeded(Duration),
}

pub type Result<T> = std::result::Result<T, SunitError>;
