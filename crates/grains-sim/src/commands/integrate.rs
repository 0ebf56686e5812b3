use std::error::Error;
use std::path::Path;

use clap::Args;
use grains_calc::{forward_difference, trapezoid, Polynomial};
use grains_core::Grain;
use serde::Serialize;

use super::boxed;
use crate::write_report;

#[derive(Args, Debug)]
pub struct IntegrateArgs {
    /// Comma separated coefficients in ascending powers.
    #[arg(long, allow_hyphen_values = true)]
    pub coefficients: String,
    /// Lower bound.
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub from: Grain,
    /// Upper bound.
    #[arg(long, default_value = "1", allow_hyphen_values = true)]
    pub to: Grain,
    /// Number of trapezoids.
    #[arg(long, default_value_t = 4)]
    pub steps: u64,
}

#[derive(Debug, Serialize)]
struct IntegrateInput<'a> {
    polynomial: &'a Polynomial,
    from: &'a Grain,
    to: &'a Grain,
    steps: u64,
}

#[derive(Debug, Serialize)]
struct IntegrateReport {
    polynomial: String,
    integral: Grain,
    decimal: f64,
    samples: Vec<Grain>,
    differences: Vec<Grain>,
}

pub fn run(args: &IntegrateArgs, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let polynomial = Polynomial::parse(&args.coefficients).map_err(boxed)?;
    let integral =
        trapezoid(|x| polynomial.eval(x), &args.from, &args.to, args.steps).map_err(boxed)?;
    let h = (&args.to - &args.from)
        .checked_div(&Grain::from_integer(args.steps))
        .map_err(boxed)?;
    let samples: Vec<Grain> = (0..=args.steps)
        .map(|i| polynomial.eval(&(&args.from + &h * Grain::from_integer(i))))
        .collect();
    // a zero-width interval has no differences to report
    let differences = if h.is_zero() {
        Vec::new()
    } else {
        forward_difference(&samples, &h).map_err(boxed)?
    };
    let input = IntegrateInput {
        polynomial: &polynomial,
        from: &args.from,
        to: &args.to,
        steps: args.steps,
    };
    let report = IntegrateReport {
        polynomial: polynomial.to_string(),
        decimal: integral.to_f64(),
        integral,
        samples,
        differences,
    };
    write_report("integrate", &input, 0, &report, out)
}
