//! Structured error types shared across the grains crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`GrainsError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (capacities, indices, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the grains workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum GrainsError {
    /// Exact arithmetic failures (zero denominators, overflow).
    #[error("arithmetic error: {0}")]
    Arithmetic(ErrorInfo),
    /// A finite capacity bound was exceeded or misused.
    #[error("capacity error: {0}")]
    Capacity(ErrorInfo),
    /// Linear system errors.
    #[error("linalg error: {0}")]
    Linalg(ErrorInfo),
    /// Root search errors.
    #[error("search error: {0}")]
    Search(ErrorInfo),
    /// Grain probability errors.
    #[error("probability error: {0}")]
    Probability(ErrorInfo),
    /// Documentation bundle inspection errors.
    #[error("docs error: {0}")]
    Docs(ErrorInfo),
    /// Invalid configuration values.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Serialization, schema and IO errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl GrainsError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            GrainsError::Arithmetic(info)
            | GrainsError::Capacity(info)
            | GrainsError::Linalg(info)
            | GrainsError::Search(info)
            | GrainsError::Probability(info)
            | GrainsError::Docs(info)
            | GrainsError::Config(info)
            | GrainsError::Serde(info) => info,
        }
    }

    /// Shorthand for an arithmetic overflow raised by checked integer math.
    pub fn overflow(operation: &str) -> Self {
        GrainsError::Arithmetic(
            ErrorInfo::new("overflow", "integer overflow in finite arithmetic")
                .with_context("operation", operation),
        )
    }

    /// Shorthand for a configuration error on a single field.
    pub fn config(field: &str, message: impl Into<String>) -> Self {
        GrainsError::Config(ErrorInfo::new("invalid-config", message).with_context("field", field))
    }
}
