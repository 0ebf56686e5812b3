use std::path::Path;

use grains_core::errors::{ErrorInfo, GrainsError};
use serde::{Deserialize, Serialize};

/// Two directory names that hold the same assets under different schemes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemePair {
    /// First directory name.
    pub first: String,
    /// Competing directory name.
    pub second: String,
}

impl SchemePair {
    /// Builds a pair.
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }
}

/// Expected shape of a documentation bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsLayout {
    /// README path relative to the bundle root.
    #[serde(default = "default_readme")]
    pub readme: String,
    /// Globs matching numbered manuals.
    #[serde(default = "default_manual_globs")]
    pub manual_globs: Vec<String>,
    /// Globs matching math introductions.
    #[serde(default = "default_math_intro_globs")]
    pub math_intro_globs: Vec<String>,
    /// Directory holding the scripts.
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: String,
    /// Scripts the bundle must ship.
    #[serde(default = "default_expected_scripts")]
    pub expected_scripts: Vec<String>,
    /// Directory schemes that must not both be in use.
    #[serde(default = "default_scheme_pairs")]
    pub scheme_pairs: Vec<SchemePair>,
    /// Word every manual link label must contain, case-insensitively.
    #[serde(default = "default_manual_label")]
    pub manual_label: String,
}

fn default_readme() -> String {
    "README.md".to_string()
}

fn default_manual_globs() -> Vec<String> {
    vec![
        "manual/finite_manual_*.pdf".to_string(),
        "manuals/finite_manual_*.pdf".to_string(),
    ]
}

fn default_math_intro_globs() -> Vec<String> {
    vec![
        "manual_math/intro_finite_math_*.pdf".to_string(),
        "math-intro/intro_finite_math_*.pdf".to_string(),
    ]
}

fn default_scripts_dir() -> String {
    "scripts".to_string()
}

fn default_expected_scripts() -> Vec<String> {
    [
        "finite_newton.py",
        "gauss_jordan.py",
        "grain_agg.py",
        "grain_probability.py",
        "grains_arithmetic.py",
    ]
    .iter()
    .map(|name| name.to_string())
    .collect()
}

fn default_scheme_pairs() -> Vec<SchemePair> {
    vec![
        SchemePair::new("manual", "manuals"),
        SchemePair::new("manual_math", "math-intro"),
    ]
}

fn default_manual_label() -> String {
    "manual".to_string()
}

impl Default for DocsLayout {
    fn default() -> Self {
        Self {
            readme: default_readme(),
            manual_globs: default_manual_globs(),
            math_intro_globs: default_math_intro_globs(),
            scripts_dir: default_scripts_dir(),
            expected_scripts: default_expected_scripts(),
            scheme_pairs: default_scheme_pairs(),
            manual_label: default_manual_label(),
        }
    }
}

impl DocsLayout {
    /// Loads and validates a layout from YAML.
    pub fn from_yaml_path(path: &Path) -> Result<Self, GrainsError> {
        let data = std::fs::read(path).map_err(|err| {
            GrainsError::Serde(
                ErrorInfo::new("io", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        let layout: DocsLayout = grains_core::from_yaml_slice(&data)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Requires a README path and at least one manual glob.
    pub fn validate(&self) -> Result<(), GrainsError> {
        if self.readme.trim().is_empty() {
            return Err(GrainsError::config("readme", "README path must not be empty"));
        }
        if self.manual_globs.is_empty() {
            return Err(GrainsError::config(
                "manual_globs",
                "at least one manual glob is required",
            ));
        }
        Ok(())
    }
}
