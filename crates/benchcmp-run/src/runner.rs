use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::panic::{catch_unwind, AssertUnwindSafe};

use benchcmp_canon::render_bounded;
use benchcmp_core::errors::{BenchError, ErrorInfo};
use benchcmp_core::JsonValue;
use benchcmp_det::DeterminismPolicy;
use benchcmp_diff::{Comparator, ToleranceConfig};
use tracing::{info, warn};

use crate::case::{BenchmarkCase, CaseOutput};
use crate::config::RunnerConfig;
use crate::report::SuiteReport;
use crate::result::{report_options, CaseResult, CaseStatus};

/// Runs one case under the default determinism policy.
///
/// Errors returned by `case_fn` and panics inside it produce an errored
/// [`CaseResult`]. The only `Err` is an environment-fatal
/// [`BenchError::Determinism`] from seeding.
pub fn run_case<F, E>(
    case_name: &str,
    seed: u64,
    tolerance: &ToleranceConfig,
    case_fn: F,
) -> Result<CaseResult, BenchError>
where
    F: FnOnce() -> Result<CaseOutput, E>,
    E: Display,
{
    let config = RunnerConfig {
        seed,
        tolerance: *tolerance,
        ..RunnerConfig::default()
    };
    BenchmarkRunner::new(config).run_case_with_seed(case_name, seed, case_fn)
}

/// Applies the determinism policy, runs cases, compares their payloads and
/// collects results.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkRunner {
    config: RunnerConfig,
    policy: DeterminismPolicy,
}

impl BenchmarkRunner {
    /// Runner with the default determinism policy.
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            policy: DeterminismPolicy::default(),
        }
    }

    /// Replaces the determinism policy.
    pub fn with_policy(mut self, policy: DeterminismPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs `case_fn` with the configured seed.
    pub fn run_case<F, E>(&self, case_name: &str, case_fn: F) -> Result<CaseResult, BenchError>
    where
        F: FnOnce() -> Result<CaseOutput, E>,
        E: Display,
    {
        self.run_case_with_seed(case_name, self.config.seed, case_fn)
    }

    /// Runs `case_fn` after applying the policy for `seed`. The policy stays
    /// applied afterwards; use [`BenchmarkRunner::run_suite`] for isolation.
    pub fn run_case_with_seed<F, E>(
        &self,
        case_name: &str,
        seed: u64,
        case_fn: F,
    ) -> Result<CaseResult, BenchError>
    where
        F: FnOnce() -> Result<CaseOutput, E>,
        E: Display,
    {
        let context = self.policy.apply(seed)?;
        Ok(self.execute(case_name, seed, context.capabilities(), case_fn))
    }

    /// Runs every case in order, each inside its own scoped determinism guard
    /// so one case's seeding does not leak into the next.
    ///
    /// Stops at the first environment-fatal error.
    pub fn run_suite<'a, I>(&self, cases: I) -> Result<SuiteReport, BenchError>
    where
        I: IntoIterator<Item = &'a dyn BenchmarkCase>,
    {
        let mut results = Vec::new();
        for case in cases {
            let seed = case.seed().unwrap_or(self.config.seed);
            let guard = self.policy.scoped(seed)?;
            let result = self.execute(case.name(), seed, guard.capabilities(), || case.run());
            drop(guard);
            results.push(result);
        }
        SuiteReport::new(results)
    }

    fn execute<F, E>(
        &self,
        case_name: &str,
        seed: u64,
        capabilities: BTreeMap<String, bool>,
        case_fn: F,
    ) -> CaseResult
    where
        F: FnOnce() -> Result<CaseOutput, E>,
        E: Display,
    {
        let output = match catch_unwind(AssertUnwindSafe(case_fn)) {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                let error = case_error("case-returned-error", case_name, err.to_string());
                return self.errored(case_name, seed, capabilities, error);
            }
            Err(payload) => {
                let error = case_error("case-panicked", case_name, panic_message(payload.as_ref()));
                return self.errored(case_name, seed, capabilities, error);
            }
        };

        let comparator = Comparator::default()
            .with_plan(self.config.plan())
            .max_mismatches(self.config.max_mismatches);
        let mismatches = comparator.compare(&output.actual, &output.expected);
        let ok = mismatches.is_empty();
        let status = if ok {
            CaseStatus::Passed
        } else {
            CaseStatus::Failed
        };
        info!(
            case = case_name,
            seed,
            status = ?status,
            mismatches = mismatches.len(),
            "case finished"
        );
        CaseResult {
            case_name: case_name.to_string(),
            seed,
            ok,
            status,
            mismatches,
            expected_rendered: self.render(&output.expected),
            actual_rendered: self.render(&output.actual),
            metadata: output.metadata,
            capabilities,
            detail: None,
        }
    }

    fn errored(
        &self,
        case_name: &str,
        seed: u64,
        capabilities: BTreeMap<String, bool>,
        error: BenchError,
    ) -> CaseResult {
        warn!(case = case_name, seed, error = %error, "case errored");
        CaseResult {
            case_name: case_name.to_string(),
            seed,
            ok: false,
            status: CaseStatus::Errored,
            mismatches: Vec::new(),
            expected_rendered: String::new(),
            actual_rendered: String::new(),
            metadata: Default::default(),
            capabilities,
            detail: Some(error.to_string()),
        }
    }

    fn render(&self, value: &JsonValue) -> String {
        render_bounded(value, &report_options(), self.config.render_limit)
            .unwrap_or_else(|err| format!("<unencodable: {}>", err.info().message))
    }
}

fn case_error(code: &str, case_name: &str, message: String) -> BenchError {
    BenchError::CaseExecution(ErrorInfo::new(code, message).with_context("case", case_name))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "case panicked with a non-string payload".to_string()
    }
}
