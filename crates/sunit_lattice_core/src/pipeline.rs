//! S-unit lattice pipeline
//!
//! Ties the stages together for one field:
//!
//! ```text
//! field ──► factor base ──┐
//!   │                     ├──► ideal lattice ──► reduction ──► oracle grid
//!   └──► embedding ───────┘
//! ```
//!
//! The factor base and embedding coordinates are computed once in
//! [`SUnitPipeline::new`] and shared read-only by every query, so a pipeline
//! can serve queries from several threads at once.

use crate::embedding::{build_embedding, build_ideal_lattice, EmbeddingCoordinates, IdealLattice, PlaceValues};
use crate::error::Result;
use crate::factor_base::{enumerate_bounded_prime_ideals, FactorBase};
use crate::field::NumberField;
use crate::matrix::Matrix;
use crate::oracle::{build_oracle_amplitudes, real_basis, OracleAmplitudeGrid, OracleConfig, OracleParams};
use crate::reducer::{ApproximateReducer, BasisReducer};
use std::time::Instant;
use tracing::info;

/// Configuration for oracle queries
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub oracle: OracleConfig,
}

/// Timings of a single query (seconds)
#[derive(Debug, Clone, Default)]
pub struct QueryStats {
    pub lattice_time: f64,
    pub oracle_time: f64,
}

/// Per-field driver for lattice and oracle queries
pub struct SUnitPipeline<F: NumberField, R: BasisReducer> {
    field: F,
    reducer: ApproximateReducer<R>,
    config: PipelineConfig,
    factor_base: FactorBase,
    embedding: EmbeddingCoordinates,
}

impl<F: NumberField, R: BasisReducer> SUnitPipeline<F, R> {
    pub fn new(field: F, reducer: ApproximateReducer<R>) -> Result<Self> {
        Self::with_config(field, reducer, PipelineConfig::default())
    }

    pub fn with_config(field: F, reducer: ApproximateReducer<R>, config: PipelineConfig) -> Result<Self> {
        let start = Instant::now();
        let factor_base = enumerate_bounded_prime_ideals(&field)?;
        let embedding = build_embedding(&field)?;
        let (r1, r2) = embedding.signature();
        info!(
            degree = field.degree(),
            r1,
            r2,
            factor_base = factor_base.len(),
            reducer = reducer.reducer().name(),
            "pipeline ready in {:.3}s",
            start.elapsed().as_secs_f64()
        );

        Ok(Self {
            field,
            reducer,
            config,
            factor_base,
            embedding,
        })
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    pub fn factor_base(&self) -> &FactorBase {
        &self.factor_base
    }

    pub fn embedding(&self) -> &EmbeddingCoordinates {
        &self.embedding
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Identity place values for this field's signature
    pub fn identity_places(&self) -> PlaceValues {
        let (r1, r2) = self.embedding.signature();
        PlaceValues::identity(r1, r2)
    }

    /// Embedded basis of `prod p_i^(-z_i)` twisted by `places`
    pub fn ideal_lattice(&self, exponents: &[i64], places: &PlaceValues) -> Result<IdealLattice> {
        build_ideal_lattice(&self.factor_base, exponents, places, &self.embedding, &self.field)
    }

    /// Sublattice of rank `target_dimension` of the real form of an ideal lattice
    pub fn reduced_sublattice(
        &self,
        exponents: &[i64],
        places: &PlaceValues,
        target_dimension: usize,
    ) -> Result<Matrix<f64>> {
        let lattice = self.ideal_lattice(exponents, places)?;
        let basis = real_basis(lattice.real.as_ref(), lattice.complex.as_ref())?;
        self.reducer.reduce_lattice_basis(&basis, target_dimension)
    }

    /// Oracle amplitude grid for one exponent vector and place twist
    pub fn oracle(
        &self,
        exponents: &[i64],
        places: &PlaceValues,
        params: &OracleParams,
    ) -> Result<(OracleAmplitudeGrid, QueryStats)> {
        let mut stats = QueryStats::default();

        let start = Instant::now();
        let lattice = self.ideal_lattice(exponents, places)?;
        stats.lattice_time = start.elapsed().as_secs_f64();

        let start = Instant::now();
        let grid = build_oracle_amplitudes(
            lattice.real.as_ref(),
            lattice.complex.as_ref(),
            params,
            &self.reducer,
            &self.config.oracle,
        )?;
        stats.oracle_time = start.elapsed().as_secs_f64();

        Ok((grid, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::PlaceValue;
    use crate::error::SunitError;
    use crate::field::SimpleField;
    use crate::reducer::LllReducer;

    fn pipeline(field: SimpleField) -> SUnitPipeline<SimpleField, LllReducer> {
        SUnitPipeline::new(field, ApproximateReducer::default()).unwrap()
    }

    #[test]
    fn test_gaussian_integers_end_to_end() {
        let p = pipeline(SimpleField::quadratic(-1).unwrap());
        assert_eq!(p.factor_base().len(), 1);
        assert_eq!(p.embedding().real.cols(), 0);

        let params = OracleParams {
            num_qubits: 4,
            nu: 0.05,
            gaussian_width: 2.0,
        };
        let places = p.identity_places();
        let (unit, _) = p.oracle(&[0], &places, &params).unwrap();
        let (inverse, _) = p.oracle(&[1], &places, &params).unwrap();

        assert_eq!(unit.shape(), vec![4, 4]);
        assert_eq!(inverse.shape(), vec![4, 4]);
        assert_eq!(unit.amplitudes()[0], 1.0);
        assert_eq!(inverse.amplitudes()[0], 1.0);
        // P2^-1 is a finer lattice, so its Gaussian decays more slowly
        assert!(inverse.norm_squared() > unit.norm_squared());
    }

    #[test]
    fn test_zero_exponents_match_embedding() {
        for field in [
            SimpleField::quadratic(2).unwrap(),
            SimpleField::quadratic(-23).unwrap(),
            SimpleField::new(&[-2i64, 0, 0, 1]).unwrap(),
        ] {
            let p = pipeline(field);
            let zeros = vec![0; p.factor_base().len()];
            let lattice = p.ideal_lattice(&zeros, &p.identity_places()).unwrap();
            let e = p.embedding();
            assert_eq!(lattice.real.is_some(), e.r1 > 0);
            assert_eq!(lattice.complex.is_some(), e.r2 > 0);
            if let Some(real) = &lattice.real {
                assert_eq!(real, &e.real);
            }
            if let Some(complex) = &lattice.complex {
                assert_eq!(complex, &e.complex);
            }
        }
    }

    #[test]
    fn test_dimension_consistency() {
        for field in [
            SimpleField::rationals(),
            SimpleField::quadratic(5).unwrap(),
            SimpleField::quadratic(-3).unwrap(),
            SimpleField::new(&[-2i64, 0, 0, 1]).unwrap(),
        ] {
            let n = field.degree();
            let p = pipeline(field);
            let lattice = p.ideal_lattice(&vec![0; p.factor_base().len()], &p.identity_places()).unwrap();
            assert_eq!(lattice.dimension(), n);
            assert_eq!(lattice.rank(), n);
        }
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let p = pipeline(SimpleField::quadratic(-1).unwrap());
        let result = p.ideal_lattice(&[1, 0], &p.identity_places());
        assert!(matches!(result, Err(SunitError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_reduced_sublattice() {
        let p = pipeline(SimpleField::quadratic(2).unwrap());
        let places = PlaceValues::new(vec![
            PlaceValue::Real {
                sign: 1,
                log_magnitude: 0.5,
            },
            PlaceValue::Real {
                sign: -1,
                log_magnitude: -0.5,
            },
        ]);
        let zeros = vec![0; p.factor_base().len()];
        for d in 0..=2 {
            let basis = p.reduced_sublattice(&zeros, &places, d).unwrap();
            assert_eq!(basis.dims(), (d, 2));
        }
        assert!(matches!(
            p.reduced_sublattice(&zeros, &places, 3),
            Err(SunitError::TargetDimensionTooLarge { .. })
        ));
    }

    #[test]
    fn test_concurrent_queries_share_pipeline() {
        let p = pipeline(SimpleField::quadratic(-1).unwrap());
        let params = OracleParams {
            num_qubits: 4,
            nu: 0.05,
            gaussian_width: 2.0,
        };
        let places = p.identity_places();
        let sequential: Vec<_> = (-1..=1)
            .map(|z| p.oracle(&[z], &places, &params).unwrap().0)
            .collect();

        let parallel: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (-1..=1)
                .map(|z| {
                    let (p, places) = (&p, &places);
                    scope.spawn(move || p.oracle(&[z], places, &params).unwrap().0)
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(sequential, parallel);
    }
}
