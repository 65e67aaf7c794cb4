//! Field, embedding and oracle subcommands

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;
use sunit_lattice_core::{
    ApproximateReducer, NumberField, OracleConfig, OracleParams, PipelineConfig, PlaceValue,
    PlaceValues, SUnitPipeline, SimpleField,
};
use tracing::info;

pub struct OracleOptions {
    pub exponents: Option<Vec<i64>>,
    pub log_magnitudes: Option<Vec<f64>>,
    pub qubits: usize,
    pub nu: f64,
    pub width: f64,
    pub precision: f64,
    pub max_grid_points: usize,
    pub timeout_ms: Option<u64>,
    pub export: Option<PathBuf>,
}

pub fn run_factor_base(field: SimpleField) -> Result<()> {
    let (r1, r2) = field.signature();
    println!("Field:          {}", field);
    println!("Signature:      ({}, {})", r1, r2);
    println!("Discriminant:   {}", field.discriminant());
    println!("Minkowski bound {:.6}", field.minkowski_bound());
    println!();

    let pipeline = SUnitPipeline::new(field, ApproximateReducer::default())?;
    let base = pipeline.factor_base();
    println!("Factor base ({} prime ideals):", base.len());
    print!("{}", base);
    Ok(())
}

pub fn run_embedding(field: SimpleField) -> Result<()> {
    println!("Field: {}", field);
    let pipeline = SUnitPipeline::new(field, ApproximateReducer::default())?;
    let e = pipeline.embedding();

    println!();
    println!("Real coordinates ({} x {}):", e.real.rows(), e.real.cols());
    for i in 0..e.real.rows() {
        let row: Vec<String> = e.real.row(i).iter().map(|x| format!("{:>12.6}", x)).collect();
        println!("  [{}]", row.join(" "));
    }

    println!();
    println!("Complex coordinates ({} x {}):", e.complex.rows(), e.complex.cols());
    for i in 0..e.complex.rows() {
        let row: Vec<String> = e
            .complex
            .row(i)
            .iter()
            .map(|z| format!("{:>10.6}{:+.6}i", z.re, z.im))
            .collect();
        println!("  [{}]", row.join("  "));
    }
    Ok(())
}

pub fn run_oracle(field: SimpleField, options: OracleOptions) -> Result<()> {
    let reducer = ApproximateReducer::default().with_precision(options.precision)?;
    let mut oracle = OracleConfig::default().with_max_grid_points(options.max_grid_points);
    if let Some(ms) = options.timeout_ms {
        oracle = oracle.with_deadline(Duration::from_millis(ms));
    }
    let pipeline = SUnitPipeline::with_config(field, reducer, PipelineConfig { oracle })?;

    let exponents = options
        .exponents
        .unwrap_or_else(|| vec![0; pipeline.factor_base().len()]);
    let places = match options.log_magnitudes {
        None => pipeline.identity_places(),
        Some(m) => twisted_places(&pipeline, &m)?,
    };

    let params = OracleParams {
        num_qubits: options.qubits,
        nu: options.nu,
        gaussian_width: options.width,
    };
    let (grid, stats) = pipeline.oracle(&exponents, &places, &params)?;

    println!("Field:               {}", pipeline.field());
    println!("Exponents:           {:?}", exponents);
    println!(
        "Grid:                {:?} ({} qubits per dimension)",
        grid.shape(),
        grid.qubits_per_dimension()
    );
    println!("Sum of squares:      {:.6}", grid.norm_squared());
    println!("Lattice time:        {:.3} ms", stats.lattice_time * 1000.0);
    println!("Oracle time:         {:.3} ms", stats.oracle_time * 1000.0);
    println!();
    println!("Reduced basis:");
    let basis = grid.basis();
    for i in 0..basis.rows() {
        let row: Vec<String> = basis.row(i).iter().map(|x| format!("{:>12.6}", x)).collect();
        println!("  [{}]", row.join(" "));
    }

    if let Some(path) = options.export {
        let file = File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut out = BufWriter::new(file);
        writeln!(out, "index,coefficients,bits,amplitude,normalized")?;
        let normalized = grid.normalized();
        for (flat, (&a, &u)) in grid.amplitudes().iter().zip(&normalized).enumerate() {
            let coefficients: Vec<String> = grid.coefficients(flat).iter().map(|c| c.to_string()).collect();
            let bits: String = grid.basis_state(flat).iter().map(|b| char::from(b'0' + b)).collect();
            writeln!(
                out,
                "{},{},{},{:.12e},{:.12e}",
                flat,
                coefficients.join(" "),
                bits,
                a,
                u
            )?;
        }
        out.flush()?;
        info!(path = %path.display(), points = grid.len(), "exported amplitudes");
        println!();
        println!("Amplitudes exported to: {}", path.display());
    }
    Ok(())
}

/// Sign +1 and phase 0 everywhere, with the given log-magnitude per place
fn twisted_places<R>(pipeline: &SUnitPipeline<SimpleField, R>, log_magnitudes: &[f64]) -> Result<PlaceValues>
where
    R: sunit_lattice_core::BasisReducer,
{
    let (r1, r2) = pipeline.embedding().signature();
    if log_magnitudes.len() != r1 + r2 {
        bail!(
            "expected {} log magnitudes (one per place), got {}",
            r1 + r2,
            log_magnitudes.len()
        );
    }
    let values = log_magnitudes
        .iter()
        .enumerate()
        .map(|(i, &m)| {
            if i < r1 {
                PlaceValue::Real {
                    sign: 1,
                    log_magnitude: m,
                }
            } else {
                PlaceValue::Complex {
                    phase: 0.0,
                    log_magnitude: m,
                }
            }
        })
        .collect();
    Ok(PlaceValues::new(values))
}
