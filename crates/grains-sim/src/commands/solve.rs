use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Args;
use grains_calc::{solve, Matrix};
use grains_core::Grain;
use serde::{Deserialize, Serialize};

use super::boxed;
use crate::{load_input, write_report};

#[derive(Args, Debug)]
pub struct SolveArgs {
    /// JSON or YAML file holding `a` (rows) and `b`.
    #[arg(long)]
    pub system: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum GrainValue {
    Integer(i64),
    Text(String),
}

impl GrainValue {
    fn grain(&self) -> Result<Grain, Box<dyn Error>> {
        match self {
            GrainValue::Integer(value) => Ok(Grain::from_integer(*value)),
            GrainValue::Text(text) => text.parse().map_err(boxed),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SystemFile {
    a: Vec<Vec<GrainValue>>,
    b: Vec<GrainValue>,
}

#[derive(Debug, Serialize)]
struct SolveReport {
    solution: Vec<Grain>,
    verified: bool,
}

pub fn run(args: &SolveArgs, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let system: SystemFile = load_input(&args.system).map_err(boxed)?;
    let a = system
        .a
        .iter()
        .map(|row| row.iter().map(GrainValue::grain).collect())
        .collect::<Result<Vec<Vec<Grain>>, _>>()?;
    let b = system
        .b
        .iter()
        .map(GrainValue::grain)
        .collect::<Result<Vec<Grain>, _>>()?;
    let solution = solve(&a, &b).map_err(boxed)?;
    let verified = Matrix::from_rows(a.clone())
        .and_then(|matrix| matrix.mul_vec(&solution))
        .map(|product| product == b)
        .map_err(boxed)?;
    let input = (&a, &b);
    let report = SolveReport { solution, verified };
    write_report("solve", &input, 0, &report, out)
}
