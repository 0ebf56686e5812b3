use std::error::Error;
use std::path::Path;

use clap::{Args, ValueEnum};
use grains_core::{BoundedGrain, Grain};
use serde::Serialize;

use super::boxed;
use crate::write_report;

#[derive(Args, Debug)]
pub struct ArithArgs {
    /// Left operand, `n` or `n/d`.
    #[arg(long, allow_hyphen_values = true)]
    pub lhs: Grain,
    /// Right operand, `n` or `n/d`.
    #[arg(long, allow_hyphen_values = true)]
    pub rhs: Grain,
    /// Operation to apply.
    #[arg(long, value_enum)]
    pub op: Op,
    /// Also compute under this denominator bound.
    #[arg(long)]
    pub omega: Option<i64>,
}

#[derive(Clone, Copy, Debug, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Serialize)]
struct ArithInput<'a> {
    lhs: &'a Grain,
    rhs: &'a Grain,
    op: Op,
    omega: Option<i64>,
}

#[derive(Debug, Serialize)]
struct ArithReport {
    exact: Grain,
    decimal: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounded: Option<BoundedGrain>,
}

fn exact(op: Op, lhs: &Grain, rhs: &Grain) -> Result<Grain, Box<dyn Error>> {
    Ok(match op {
        Op::Add => lhs + rhs,
        Op::Sub => lhs - rhs,
        Op::Mul => lhs * rhs,
        Op::Div => lhs.checked_div(rhs).map_err(boxed)?,
    })
}

fn to_bounded(value: &Grain, omega: i64) -> Result<BoundedGrain, Box<dyn Error>> {
    let num = i64::try_from(value.numer()).map_err(|_| format!("{value} does not fit in i64"))?;
    let den = i64::try_from(value.denom()).map_err(|_| format!("{value} does not fit in i64"))?;
    BoundedGrain::with_omega(num, den, omega).map_err(boxed)
}

fn bounded(op: Op, lhs: &Grain, rhs: &Grain, omega: i64) -> Result<BoundedGrain, Box<dyn Error>> {
    let lhs = to_bounded(lhs, omega)?;
    let rhs = to_bounded(rhs, omega)?;
    let result = match op {
        Op::Add => lhs.add(&rhs),
        Op::Sub => lhs.sub(&rhs),
        Op::Mul => lhs.mul(&rhs),
        Op::Div => lhs.div(&rhs),
    };
    result.map_err(boxed)
}

pub fn run(args: &ArithArgs, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let exact = exact(args.op, &args.lhs, &args.rhs)?;
    let bounded = args
        .omega
        .map(|omega| bounded(args.op, &args.lhs, &args.rhs, omega))
        .transpose()?;
    let input = ArithInput {
        lhs: &args.lhs,
        rhs: &args.rhs,
        op: args.op,
        omega: args.omega,
    };
    let report = ArithReport {
        decimal: exact.to_f64(),
        exact,
        bounded,
    };
    write_report("arith", &input, 0, &report, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_result_matches_exact_when_within_omega() {
        let lhs = Grain::ratio(1, 3);
        let rhs = Grain::ratio(1, 6);
        let exact = exact(Op::Add, &lhs, &rhs).unwrap();
        let bounded = bounded(Op::Add, &lhs, &rhs, 100).unwrap();
        assert_eq!(exact, Grain::ratio(1, 2));
        assert_eq!(bounded.to_grain(), exact);
    }

    #[test]
    fn bounded_result_rejects_large_denominators() {
        let lhs = Grain::ratio(1, 7);
        let rhs = Grain::ratio(1, 11);
        assert!(bounded(Op::Mul, &lhs, &rhs, 50).is_err());
    }
}
