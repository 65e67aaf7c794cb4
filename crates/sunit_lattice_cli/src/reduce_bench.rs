//! Exact LLL Benchmark
//!
//! Times the exact rational LLL used by the reducer on random square lattices.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use sunit_lattice_core::{LLLConfig, LatticeBasis, LLL};
use tracing::warn;

/// Results from a single benchmark run
#[derive(Debug, Clone)]
pub struct ReduceBenchResult {
    pub n: usize,
    pub bits: usize,
    pub ms: f64,
    pub swaps: usize,
    pub size_reductions: usize,
    pub iterations: usize,
    pub verified: bool,
}

/// Run the benchmark over every configuration within the given limits
pub fn run_reduce_benchmark(
    max_dim: usize,
    max_bits: usize,
    config: LLLConfig,
    export: Option<PathBuf>,
) -> Result<()> {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Exact LLL Reduction Benchmark               ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!(
        "Max dimension: {}, Max bits: {}, δ = {:.2}",
        max_dim,
        max_bits,
        config.delta()
    );
    println!();

    let configs: Vec<(usize, usize)> = vec![
        (2, 8),
        (4, 8),
        (8, 8),
        (10, 12),
        (15, 16),
        (20, 16),
        (25, 16),
        (30, 20),
    ]
    .into_iter()
    .filter(|&(n, b)| n <= max_dim && b <= max_bits)
    .collect();

    println!("┌──────┬──────┬────────────┬────────────┬────────────┬──────────┐");
    println!("│  n   │ bits │  Time (ms) │   Swaps    │ Iterations │ Verified │");
    println!("├──────┼──────┼────────────┼────────────┼────────────┼──────────┤");

    let mut results = Vec::with_capacity(configs.len());
    for &(n, bits) in &configs {
        let Some(result) = benchmark_reduce(n, bits, &config) else {
            continue;
        };
        let verified_str = if result.verified { "✓" } else { "✗" };
        println!(
            "│ {:>4} │ {:>4} │ {:>10.2} │ {:>10} │ {:>10} │    {}     │",
            n, bits, result.ms, result.swaps, result.iterations, verified_str
        );
        results.push(result);
    }

    println!("└──────┴──────┴────────────┴────────────┴────────────┴──────────┘");
    println!();

    if let Some(path) = export {
        export_results(&path, &results)?;
        println!("Results exported to: {}", path.display());
    }
    Ok(())
}

fn benchmark_reduce(n: usize, bits: usize, config: &LLLConfig) -> Option<ReduceBenchResult> {
    let basis = LatticeBasis::random(n, n, bits);

    let start = Instant::now();
    let (reduced, stats) = match LLL::reduce(&basis, config) {
        Ok(out) => out,
        Err(e) => {
            // Random bases are singular with tiny probability
            warn!(n, bits, error = %e, "skipping configuration");
            return None;
        }
    };
    let ms = start.elapsed().as_secs_f64() * 1000.0;

    Some(ReduceBenchResult {
        n,
        bits,
        ms,
        swaps: stats.swaps,
        size_reductions: stats.size_reductions,
        iterations: stats.iterations,
        verified: LLL::is_reduced(&reduced, config),
    })
}

fn export_results(path: &PathBuf, results: &[ReduceBenchResult]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "n,bits,ms,swaps,size_reductions,iterations,verified")?;

    for r in results {
        writeln!(
            out,
            "{},{},{:.6},{},{},{},{}",
            r.n, r.bits, r.ms, r.swaps, r.size_reductions, r.iterations, r.verified
        )?;
    }
    out.flush()?;
    Ok(())
}
