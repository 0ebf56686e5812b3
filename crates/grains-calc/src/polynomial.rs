use std::fmt::{self, Display};

use grains_core::errors::GrainsError;
use grains_core::Grain;
use serde::{Deserialize, Serialize};

/// Polynomial with exact coefficients in ascending powers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polynomial {
    coefficients: Vec<Grain>,
}

impl Polynomial {
    /// `coefficients[i]` multiplies `x^i`.
    pub fn new(coefficients: Vec<Grain>) -> Self {
        Self { coefficients }
    }

    /// Parses a comma separated coefficient list such as `0,0,1` or `1/2, 3`.
    pub fn parse(list: &str) -> Result<Self, GrainsError> {
        let coefficients = list
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Grain>, _>>()?;
        Ok(Self::new(coefficients))
    }

    /// Coefficients in ascending powers.
    pub fn coefficients(&self) -> &[Grain] {
        &self.coefficients
    }

    /// Horner evaluation.
    pub fn eval(&self, x: &Grain) -> Grain {
        self.coefficients
            .iter()
            .rev()
            .fold(Grain::zero(), |acc, c| acc * x + c)
    }
}

impl Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self
            .coefficients
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_zero())
            .map(|(power, c)| match power {
                0 => c.to_string(),
                1 => format!("{c}·x"),
                _ => format!("{c}·x^{power}"),
            })
            .collect();
        if terms.is_empty() {
            write!(f, "0")
        } else {
            write!(f, "{}", terms.join(" + "))
        }
    }
}
