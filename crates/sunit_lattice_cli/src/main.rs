//! S-unit Lattice CLI
//!
//! Drives the lattice construction and oracle preparation pipeline.
//!
//! # Usage
//! ```bash
//! # Prime ideals below the Minkowski bound of Q(i)
//! sunit-lattice factor-base --quadratic -1
//!
//! # Embedding coordinates of Q(2^(1/3))
//! sunit-lattice embedding --poly=-2,0,0,1
//!
//! # Oracle amplitudes for P^-1 with 8 qubits, exported to CSV
//! sunit-lattice oracle --quadratic -1 --exponents 1 --qubits 8 --export grid.csv
//!
//! # Exact LLL timings on random lattices
//! sunit-lattice reduce-bench --max-dim 20
//! ```

mod commands;
mod reduce_bench;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use sunit_lattice_core::{LLLConfig, SimpleField};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sunit-lattice")]
#[command(about = "Ideal lattices and Gaussian oracle states for S-unit computations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the prime ideals below the Minkowski bound
    FactorBase {
        #[command(flatten)]
        field: FieldArgs,
    },

    /// Print the real and rotated complex embedding coordinates
    Embedding {
        #[command(flatten)]
        field: FieldArgs,
    },

    /// Build the Gaussian oracle amplitude grid for one exponent vector
    Oracle {
        #[command(flatten)]
        field: FieldArgs,

        /// Exponents z_i of prod p_i^(-z_i), one per factor base ideal
        /// (all zero when omitted)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        exponents: Option<Vec<i64>>,

        /// Log-magnitude twist, one per place (zero when omitted)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        log_magnitudes: Option<Vec<f64>>,

        /// Total qubit budget
        #[arg(long, default_value = "8")]
        qubits: usize,

        /// Straddle resolution
        #[arg(long, default_value = "0.05")]
        nu: f64,

        /// Gaussian width s
        #[arg(long, default_value = "2.0")]
        width: f64,

        /// Snapping precision before reduction
        #[arg(long, default_value = "0.0001")]
        precision: f64,

        /// Refuse grids with more points than this
        #[arg(long, default_value = "4194304")]
        max_grid_points: usize,

        /// Abandon enumeration after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Export amplitudes to CSV
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Benchmark exact LLL on random lattices
    ReduceBench {
        /// Maximum dimension
        #[arg(long, default_value = "20")]
        max_dim: usize,

        /// Maximum entry bit size
        #[arg(long, default_value = "16")]
        max_bits: usize,

        /// Reduction strength
        #[arg(long, value_enum, default_value = "default")]
        delta: DeltaChoice,

        /// Export results to CSV
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

/// Number field selection; Q(i) when neither flag is given
#[derive(Args)]
struct FieldArgs {
    /// Q(sqrt d) for a squarefree d
    #[arg(long, allow_hyphen_values = true, conflicts_with = "poly")]
    quadratic: Option<i64>,

    /// Q[x]/(f) for monic f, coefficients lowest degree first
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    poly: Option<Vec<i64>>,
}

impl FieldArgs {
    fn build(&self) -> Result<SimpleField> {
        let field = match (&self.poly, self.quadratic) {
            (Some(coefficients), _) => SimpleField::new(coefficients.as_slice())?,
            (None, Some(d)) => SimpleField::quadratic(d)?,
            (None, None) => SimpleField::quadratic(-1)?,
        };
        Ok(field)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DeltaChoice {
    /// δ = 3/4
    Default,
    /// δ = 0.99
    Strong,
    /// δ = 1/2
    Fast,
}

impl DeltaChoice {
    fn config(self) -> LLLConfig {
        match self {
            DeltaChoice::Default => LLLConfig::default(),
            DeltaChoice::Strong => LLLConfig::strong(),
            DeltaChoice::Fast => LLLConfig::fast(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::FactorBase { field } => {
            commands::run_factor_base(field.build()?)?;
        }
        Commands::Embedding { field } => {
            commands::run_embedding(field.build()?)?;
        }
        Commands::Oracle {
            field,
            exponents,
            log_magnitudes,
            qubits,
            nu,
            width,
            precision,
            max_grid_points,
            timeout_ms,
            export,
        } => {
            let options = commands::OracleOptions {
                exponents,
                log_magnitudes,
                qubits,
                nu,
                width,
                precision,
                max_grid_points,
                timeout_ms,
                export,
            };
            commands::run_oracle(field.build()?, options)?;
        }
        Commands::ReduceBench {
            max_dim,
            max_bits,
            delta,
            export,
        } => {
            reduce_bench::run_reduce_benchmark(max_dim, max_bits, delta.config(), export)?;
        }
    }

    Ok(())
}
