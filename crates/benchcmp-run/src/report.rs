use std::fs;
use std::path::Path;

use benchcmp_canon::{encode_serializable, stable_hash_with};
use benchcmp_core::errors::{BenchError, ErrorInfo};
use serde::{Deserialize, Serialize};

use crate::result::{report_options, CaseResult, CaseStatus};

/// Overall outcome of a run, mapped onto process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Every case passed.
    Passed,
    /// At least one case failed comparison and none errored.
    Failed,
    /// A case or the harness errored before a verdict could be produced.
    Errored,
}

impl Verdict {
    /// `0` passed, `1` failed, `2` errored.
    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::Passed => 0,
            Verdict::Failed => 1,
            Verdict::Errored => 2,
        }
    }

    /// Verdict for a set of case results; an empty set passes.
    pub fn from_results(results: &[CaseResult]) -> Self {
        if results.iter().any(|r| r.status == CaseStatus::Errored) {
            Verdict::Errored
        } else if results.iter().any(|r| r.status == CaseStatus::Failed) {
            Verdict::Failed
        } else {
            Verdict::Passed
        }
    }
}

/// Exit code for the outcome of a whole run, treating harness errors as `2`.
pub fn exit_code_for(outcome: &Result<SuiteReport, BenchError>) -> i32 {
    match outcome {
        Ok(report) => report.exit_code(),
        Err(_) => Verdict::Errored.exit_code(),
    }
}

/// Per-status case counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteCounts {
    /// Cases that passed.
    pub passed: usize,
    /// Cases that failed comparison.
    pub failed: usize,
    /// Cases that errored.
    pub errored: usize,
}

/// Aggregated report for a suite run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Content hash of `results`.
    pub report_hash: String,
    /// Overall verdict.
    pub verdict: Verdict,
    /// Per-status counts.
    pub counts: SuiteCounts,
    /// Per-case results in execution order.
    pub results: Vec<CaseResult>,
}

impl SuiteReport {
    /// Builds a report from results while computing the stable hash.
    pub fn new(results: Vec<CaseResult>) -> Result<Self, BenchError> {
        let mut counts = SuiteCounts::default();
        for result in &results {
            match result.status {
                CaseStatus::Passed => counts.passed += 1,
                CaseStatus::Failed => counts.failed += 1,
                CaseStatus::Errored => counts.errored += 1,
            }
        }
        Ok(Self {
            report_hash: stable_hash_with(&results, &report_options())?,
            verdict: Verdict::from_results(&results),
            counts,
            results,
        })
    }

    /// Process exit code for this report.
    pub fn exit_code(&self) -> i32 {
        self.verdict.exit_code()
    }

    /// Canonical pretty encoding with a trailing newline.
    pub fn to_pretty_string(&self) -> Result<String, BenchError> {
        let mut text = encode_serializable(self, &report_options().pretty())?;
        text.push('\n');
        Ok(text)
    }

    /// Writes [`SuiteReport::to_pretty_string`] to `path`.
    pub fn write_report(&self, path: impl AsRef<Path>) -> Result<(), BenchError> {
        let path = path.as_ref();
        let text = self.to_pretty_string()?;
        fs::write(path, text).map_err(|err| {
            BenchError::Serde(
                ErrorInfo::new("report-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}
