//! Structured error types shared across benchcmp crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Diagnostic carried by every [`BenchError`].
///
/// `context` holds the machine-readable facts a report needs to point at the
/// problem: the `$...` path into a payload, the case name, the offending
/// environment variable. Keys are kept sorted so two identical failures render
/// identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Kebab-case identifier such as `unencodable-type` or `case-panicked`.
    pub code: String,
    /// One-line description for humans.
    pub message: String,
    /// Facts about where the failure happened.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// What the caller can change to make the failure go away.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Diagnostic with no context and no hint.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records one fact; a repeated key keeps the last value.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Attaches a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Payload path the failure refers to, when there is one.
    pub fn path(&self) -> Option<&str> {
        self.context.get("path").map(String::as_str)
    }
}

/// Canonical error type for the benchmark comparison engine.
///
/// Encoding, comparison and configuration errors are local to the call that
/// produced them. [`BenchError::Determinism`] is the only family that means the
/// environment itself is broken and the whole run should stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum BenchError {
    /// A value cannot be represented as a JSON-like value.
    #[error("unencodable type: {0}")]
    Unencodable(ErrorInfo),
    /// NaN or an infinity was encountered while encoding in strict mode.
    #[error("non-finite number: {0}")]
    NonFinite(ErrorInfo),
    /// Tolerance values were negative or not numbers.
    #[error("tolerance config error: {0}")]
    ToleranceConfig(ErrorInfo),
    /// A benchmark case failed before producing its payloads.
    #[error("case execution error: {0}")]
    CaseExecution(ErrorInfo),
    /// The mandatory RNG or process environment could not be prepared.
    #[error("determinism error: {0}")]
    Determinism(ErrorInfo),
    /// Runner configuration or environment overrides were malformed.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Decoding or serialization failures outside the canonical encoder.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        let mut facts = self.context.iter();
        if let Some((key, value)) = facts.next() {
            write!(f, " ({key}={value}")?;
            for (key, value) in facts {
                write!(f, ", {key}={value}")?;
            }
            write!(f, ")")?;
        }
        match &self.hint {
            Some(hint) => write!(f, "; hint: {hint}"),
            None => Ok(()),
        }
    }
}

impl BenchError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            BenchError::Unencodable(info)
            | BenchError::NonFinite(info)
            | BenchError::ToleranceConfig(info)
            | BenchError::CaseExecution(info)
            | BenchError::Determinism(info)
            | BenchError::Config(info)
            | BenchError::Serde(info) => info,
        }
    }

    /// Returns whether the error means the process environment cannot be trusted.
    pub fn is_environment_fatal(&self) -> bool {
        matches!(self, BenchError::Determinism(_))
    }

    /// Builds an [`BenchError::Unencodable`] naming the offending type and path.
    pub fn unencodable(type_name: impl Into<String>, path: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let path = path.into();
        BenchError::Unencodable(
            ErrorInfo::new(
                "unencodable-type",
                format!("value of type `{type_name}` at {path} is not JSON-like"),
            )
            .with_context("type", type_name)
            .with_context("path", path),
        )
    }

    /// Builds a [`BenchError::NonFinite`] for the literal found at `path`.
    pub fn non_finite(literal: &str, path: impl Into<String>) -> Self {
        let path = path.into();
        BenchError::NonFinite(
            ErrorInfo::new(
                "non-finite-number",
                format!("{literal} at {path} is not a valid JSON number"),
            )
            .with_context("path", path)
            .with_context("value", literal)
            .with_hint("encode with the permissive non-finite policy to emit it as a string"),
        )
    }
}

