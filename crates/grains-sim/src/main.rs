use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use commands::{
    arith::{self, ArithArgs},
    blocks::{self, BlocksArgs},
    concurrency::{self, ConcurrencyArgs},
    diffuse::{self, DiffuseArgs},
    docs_check::{self, DocsCheckArgs},
    integrate::{self, IntegrateArgs},
    pagerank::{self, PagerankArgs},
    probability::{self, ProbabilityArgs},
    refine::{self, RefineArgs},
    solve::{self, SolveArgs},
    sqrt::{self, SqrtArgs},
};
use grains_core::errors::{ErrorInfo, GrainsError};
use grains_core::{stable_hash_string, to_canonical_json_bytes, RunProvenance, SchemaVersion};
use serde::de::DeserializeOwned;
use serde::Serialize;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "grains-sim", about = "Finite-capacity grain computations")]
struct Cli {
    /// Log per-iteration detail.
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Write the JSON report here instead of stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Approximate a square root as k/M.
    Sqrt(SqrtArgs),
    /// Exact and Ω-bounded fraction arithmetic.
    Arith(ArithArgs),
    /// Solve a linear system by Gauss-Jordan elimination.
    Solve(SolveArgs),
    /// Trapezoid integral of a polynomial.
    Integrate(IntegrateArgs),
    /// Run a one-dimensional diffusion scheme.
    Diffuse(DiffuseArgs),
    /// Estimate PageRank with a damped random walk.
    Pagerank(PagerankArgs),
    /// Adaptive block probability flow.
    Blocks(BlocksArgs),
    /// Grain distributions, updates and environment transitions.
    Probability(ProbabilityArgs),
    /// Batch tasks under load-driven concurrency refinement.
    Concurrency(ConcurrencyArgs),
    /// Capacity refinement watched by system memory.
    Refine(RefineArgs),
    /// Inspect a documentation bundle.
    DocsCheck(DocsCheckArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let out = cli.out.as_deref();
    match &cli.command {
        Command::Sqrt(args) => sqrt::run(args, out),
        Command::Arith(args) => arith::run(args, out),
        Command::Solve(args) => solve::run(args, out),
        Command::Integrate(args) => integrate::run(args, out),
        Command::Diffuse(args) => diffuse::run(args, out),
        Command::Pagerank(args) => pagerank::run(args, out),
        Command::Blocks(args) => blocks::run(args, out),
        Command::Probability(args) => probability::run(args, out),
        Command::Concurrency(args) => concurrency::run(args, out),
        Command::Refine(args) => refine::run(args, out),
        Command::DocsCheck(args) => docs_check::run(args, out),
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: SchemaVersion,
    command: &'a str,
    provenance: RunProvenance,
    result: &'a T,
}

/// Wraps `result` with schema and provenance and writes it as canonical JSON.
pub(crate) fn write_report<I: Serialize, T: Serialize>(
    command: &str,
    input: &I,
    seed: u64,
    result: &T,
    out: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let input_hash = stable_hash_string(input).map_err(|err| Box::new(err) as Box<dyn Error>)?;
    let envelope = Envelope {
        schema_version: SchemaVersion::default(),
        command,
        provenance: RunProvenance::new(input_hash, seed)
            .with_tool("grains-sim", env!("CARGO_PKG_VERSION")),
        result,
    };
    let json =
        to_canonical_json_bytes(&envelope).map_err(|err| Box::new(err) as Box<dyn Error>)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &json)?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&json)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

/// Reads JSON or YAML depending on the file extension.
pub(crate) fn load_input<T: DeserializeOwned>(path: &Path) -> Result<T, GrainsError> {
    let data = fs::read(path).map_err(|err| {
        GrainsError::Serde(
            ErrorInfo::new("io", err.to_string()).with_context("path", path.display().to_string()),
        )
    })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => grains_core::from_json_slice(&data),
        _ => grains_core::from_yaml_slice(&data),
    }
}
