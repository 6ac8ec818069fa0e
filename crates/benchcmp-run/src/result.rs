use std::collections::BTreeMap;

use benchcmp_canon::{stable_hash_with, EncodeOptions};
use benchcmp_core::errors::BenchError;
use benchcmp_core::{to_value, JsonValue, Mapping};
use benchcmp_diff::Mismatch;
use serde::{Deserialize, Serialize};

/// Outcome category of one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Payloads matched within tolerance.
    Passed,
    /// Payloads were compared and differ.
    Failed,
    /// The case did not produce payloads.
    Errored,
}

/// Result of one benchmark case. Built once by the runner, then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    /// Case name.
    pub case_name: String,
    /// Seed applied before the case ran.
    pub seed: u64,
    /// `true` exactly when the case passed.
    pub ok: bool,
    /// Outcome category.
    pub status: CaseStatus,
    /// Differences found, in traversal order. Empty for errored cases.
    pub mismatches: Vec<Mismatch>,
    /// Bounded canonical rendering of the expected payload.
    pub expected_rendered: String,
    /// Bounded canonical rendering of the actual payload.
    pub actual_rendered: String,
    /// Metadata returned by the case.
    #[serde(default)]
    pub metadata: Mapping,
    /// Which random sources were seeded for this case.
    #[serde(default)]
    pub capabilities: BTreeMap<String, bool>,
    /// Rendered error for errored cases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Options used whenever a result or report is encoded; metadata may hold
/// non-finite floats, which are kept as their literals.
pub(crate) fn report_options() -> EncodeOptions {
    EncodeOptions::default().permissive()
}

impl CaseResult {
    /// The result as a JSON-like value.
    pub fn to_value(&self) -> Result<JsonValue, BenchError> {
        to_value(self)
    }

    /// Canonical compact encoding of the result.
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>, BenchError> {
        benchcmp_canon::encode_serializable(self, &report_options()).map(String::into_bytes)
    }

    /// Stable SHA-256 of [`CaseResult::to_canonical_bytes`].
    pub fn result_hash(&self) -> Result<String, BenchError> {
        stable_hash_with(self, &report_options())
    }
}
