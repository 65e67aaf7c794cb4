//! S-unit Lattice Core Library
//!
//! Classical preprocessing for a lattice-based hidden subgroup approach to
//! unit and class group computation.
//!
//! # Overview
//!
//! Given a number field and a factor base of prime ideals, the pipeline embeds
//! fractional ideals `prod p_i^(-z_i)` into R^n through the Minkowski
//! embedding, reduces the resulting lattice, and prepares the amplitudes of a
//! discretized Gaussian over that lattice on a qubit register grid.
//!
//! # Key Components
//!
//! - [`field`] - Number field collaborator trait and monogenic fields
//! - [`ideal`] - Exact fractional ideal arithmetic
//! - [`lattice`] - Exact lattice algorithms (LLL, Hermite normal form)
//! - [`reducer`] - Reduction of floating point bases behind a trait seam
//! - [`embedding`] - Embedding coordinates and ideal lattice construction
//! - [`oracle`] - Gaussian amplitude grid over a lattice
//! - [`factor_base`] - Prime ideals below the Minkowski bound
//! - [`pipeline`] - Per-field driver for lattice and oracle queries

pub mod embedding;
pub mod error;
pub mod factor_base;
pub mod field;
pub mod ideal;
pub mod lattice;
pub mod matrix;
pub mod oracle;
pub mod pipeline;
pub mod primes;
pub mod rational;
pub mod reducer;

pub use embedding::{
    build_embedding, build_ideal_lattice, ideal_from_exponents, EmbeddingCoordinates, IdealLattice,
    PlaceValue, PlaceValues,
};
pub use error::{FieldError, LatticeError, Result, SunitError};
pub use factor_base::{enumerate_bounded_prime_ideals, FactorBase};
pub use field::{NumberField, SimpleField};
pub use ideal::{FractionalIdeal, PrimeIdeal};
pub use lattice::{hermite_normal_form, GramSchmidt, LLLConfig, LLLStats, LatticeBasis, LLL};
pub use matrix::Matrix;
pub use oracle::{
    build_oracle_amplitudes, decode_signed, encode_signed, real_representation, OracleAmplitudeGrid,
    OracleConfig, OracleParams,
};
pub use pipeline::{PipelineConfig, QueryStats, SUnitPipeline};
pub use primes::PrimeGenerator;
pub use rational::Rational;
pub use reducer::{ApproximateReducer, BasisReducer, LllReducer};
