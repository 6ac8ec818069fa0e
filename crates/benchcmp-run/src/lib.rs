#![deny(missing_docs)]
#![doc = "Benchmark runner: applies the determinism policy, runs a case, compares its payloads within tolerance and renders a verdict."]

/// Case payloads and the [`BenchmarkCase`] seam.
pub mod case;
/// YAML configuration and `BENCHMARK_*` environment overrides.
pub mod config;
/// Suite verdicts, exit codes and reports.
pub mod report;
/// Per-case results.
pub mod result;
/// Case execution.
pub mod runner;

pub use case::{BenchmarkCase, CaseOutput, FnCase};
pub use config::RunnerConfig;
pub use report::{exit_code_for, SuiteCounts, SuiteReport, Verdict};
pub use result::{CaseResult, CaseStatus};
pub use runner::{run_case, BenchmarkRunner};
