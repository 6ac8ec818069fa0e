use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Category of a single structural or numeric difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    /// Sequences of different lengths.
    Length,
    /// Key present in the expected mapping only.
    KeyMissing,
    /// Key present in the actual mapping only.
    KeyExtra,
    /// Values of different kinds, or a container against a scalar.
    TypeMismatch,
    /// Numbers outside tolerance.
    NumericMismatch,
    /// Strings, booleans or other scalars that differ.
    ValueMismatch,
    /// Summary of mismatches dropped once the cap was reached.
    Truncated,
}

impl MismatchKind {
    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MismatchKind::Length => "length",
            MismatchKind::KeyMissing => "key_missing",
            MismatchKind::KeyExtra => "key_extra",
            MismatchKind::TypeMismatch => "type_mismatch",
            MismatchKind::NumericMismatch => "numeric_mismatch",
            MismatchKind::ValueMismatch => "value_mismatch",
            MismatchKind::Truncated => "truncated",
        }
    }
}

impl Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One difference found by the comparator. Records are built once and then
/// only read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    path: String,
    kind: MismatchKind,
    actual_repr: String,
    expected_repr: String,
    detail: String,
}

impl Mismatch {
    pub(crate) fn new(
        path: impl Into<String>,
        kind: MismatchKind,
        actual_repr: impl Into<String>,
        expected_repr: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            kind,
            actual_repr: actual_repr.into(),
            expected_repr: expected_repr.into(),
            detail: detail.into(),
        }
    }

    /// Location, e.g. `$.metrics.energy[2]`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Category.
    pub fn kind(&self) -> MismatchKind {
        self.kind
    }

    /// Short rendering of the actual side.
    pub fn actual_repr(&self) -> &str {
        &self.actual_repr
    }

    /// Short rendering of the expected side.
    pub fn expected_repr(&self) -> &str {
        &self.expected_repr
    }

    /// Human readable explanation.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: actual={} expected={} ({})",
            self.path, self.kind, self.actual_repr, self.expected_repr, self.detail
        )
    }
}

/// Joins mismatches into a multi-line report, one record per line.
pub fn summarize(mismatches: &[Mismatch]) -> String {
    let mut out = String::new();
    for (idx, mismatch) in mismatches.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(&mismatch.to_string());
    }
    out
}
