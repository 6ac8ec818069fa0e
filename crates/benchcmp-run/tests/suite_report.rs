use std::sync::{Mutex, MutexGuard};

use benchcmp_core::{decode, BenchError, JsonValue};
use benchcmp_det::standard;
use rand::RngCore;
use benchcmp_run::{
    exit_code_for, BenchmarkCase, BenchmarkRunner, CaseOutput, CaseStatus, FnCase, RunnerConfig,
    SuiteReport, Verdict,
};

static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn passing() -> FnCase<impl Fn() -> Result<CaseOutput, BenchError>> {
    FnCase::new("passing", || Ok(CaseOutput::new(1.0, 1.0)))
}

fn failing() -> FnCase<impl Fn() -> Result<CaseOutput, BenchError>> {
    FnCase::new("failing", || Ok(CaseOutput::new(1.0, 2.0)))
}

fn erroring() -> FnCase<impl Fn() -> Result<CaseOutput, BenchError>> {
    FnCase::new("erroring", || {
        Err(BenchError::CaseExecution(benchcmp_core::ErrorInfo::new(
            "missing-input",
            "input file not found",
        )))
    })
}

#[test]
fn verdicts_map_to_exit_codes() {
    let _serial = serial();
    let runner = BenchmarkRunner::default();
    let (pass, fail, error) = (passing(), failing(), erroring());

    let report = runner.run_suite([&pass as &dyn BenchmarkCase]).unwrap();
    assert_eq!(report.verdict, Verdict::Passed);
    assert_eq!(report.exit_code(), 0);

    let report = runner
        .run_suite([&pass as &dyn BenchmarkCase, &fail])
        .unwrap();
    assert_eq!(report.verdict, Verdict::Failed);
    assert_eq!(report.exit_code(), 1);

    let report = runner
        .run_suite([&pass as &dyn BenchmarkCase, &fail, &error])
        .unwrap();
    assert_eq!(report.verdict, Verdict::Errored);
    assert_eq!(report.exit_code(), 2);
    assert_eq!(report.counts.passed, 1);
    assert_eq!(report.counts.failed, 1);
    assert_eq!(report.counts.errored, 1);
    assert_eq!(report.results[2].status, CaseStatus::Errored);

    assert_eq!(SuiteReport::new(Vec::new()).unwrap().exit_code(), 0);
}

#[test]
fn harness_errors_exit_with_two() {
    let outcome: Result<SuiteReport, BenchError> = Err(BenchError::Config(
        benchcmp_core::ErrorInfo::new("config-yaml", "bad file"),
    ));
    assert_eq!(exit_code_for(&outcome), 2);
}

#[test]
fn suite_cases_are_isolated_and_reproducible() {
    let _serial = serial();
    let draw = FnCase::new("draw", || {
        let value = standard::next_u64()?;
        Ok(CaseOutput::new(JsonValue::Null, JsonValue::Null).with_metadata("draw", value))
    })
    .with_seed(8);
    let runner = BenchmarkRunner::new(RunnerConfig {
        seed: 1,
        ..RunnerConfig::default()
    });

    benchcmp_det::apply(555).unwrap();
    let before = standard::with_rng(|rng| rng.clone().next_u64()).unwrap();
    let report = runner.run_suite([&draw as &dyn BenchmarkCase, &draw]).unwrap();
    let after = standard::with_rng(|rng| rng.clone().next_u64()).unwrap();

    assert_eq!(report.results[0].seed, 8);
    assert_eq!(report.results[0].metadata, report.results[1].metadata);
    assert_eq!(before, after);
}

#[test]
fn report_is_written_pretty_with_trailing_newline() {
    let _serial = serial();
    let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
    let runner = BenchmarkRunner::default();
    let (pass, fail) = (passing(), failing());
    let report = tracing::subscriber::with_default(subscriber, || {
        runner.run_suite([&pass as &dyn BenchmarkCase, &fail])
    })
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    report.write_report(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.ends_with("}\n"));
    assert!(!text.ends_with("\n\n"));
    assert!(text.starts_with("{\n  \"counts\": {"));

    let decoded = decode(&text).unwrap();
    assert_eq!(decoded.get("verdict"), Some(&JsonValue::from("failed")));
    let parsed: SuiteReport = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, report);
}

#[test]
fn report_hash_depends_only_on_results() {
    let _serial = serial();
    let runner = BenchmarkRunner::default();
    let fail = failing();
    let first = runner.run_suite([&fail as &dyn BenchmarkCase]).unwrap();
    let second = runner.run_suite([&fail as &dyn BenchmarkCase]).unwrap();
    assert_eq!(first.report_hash, second.report_hash);
    assert_eq!(first.to_pretty_string().unwrap(), second.to_pretty_string().unwrap());
}

#[test]
fn write_failure_is_reported_with_path() {
    let report = SuiteReport::new(Vec::new()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let err = report.write_report(dir.path().join("missing").join("r.json")).unwrap_err();
    assert_eq!(err.info().code, "report-write");
    assert!(err.info().context.contains_key("path"));
}
