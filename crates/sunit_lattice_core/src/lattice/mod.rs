//! Exact integer lattice algorithms
//!
//! # Key Components
//!
//! - [`LatticeBasis`] - Row basis of an integer lattice
//! - [`GramSchmidt`] - Exact rational Gram-Schmidt orthogonalization
//! - [`LLL`] - LLL lattice reduction
//! - [`hermite_normal_form`] - Canonical basis of a Z-module
//!
//! # Example
//!
//! ```
//! use sunit_lattice_core::lattice::{LatticeBasis, LLL, LLLConfig};
//!
//! let basis = LatticeBasis::from_rows(&[
//!     vec![1, 0, 3],
//!     vec![0, 1, 5],
//!     vec![0, 0, 7],
//! ]);
//!
//! let (reduced, stats) = LLL::reduce(&basis, &LLLConfig::default()).unwrap();
//! assert!(LLL::is_reduced(&reduced, &LLLConfig::default()));
//! println!("{} swaps", stats.swaps);
//! ```

pub mod basis;
pub mod gram_schmidt;
pub mod hnf;
pub mod lll;

pub use basis::LatticeBasis;
pub use gram_schmidt::GramSchmidt;
pub use hnf::hermite_normal_form;
pub use lll::{LLLConfig, LLLStats, LLL};
