use std::collections::HashMap;
use std::io::Write;

use benchcmp_core::BenchError;
use benchcmp_diff::ToleranceConfig;
use benchcmp_run::RunnerConfig;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn empty_yaml_uses_defaults() {
    let config = RunnerConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, RunnerConfig::default());
    assert_eq!(config.seed, 0);
    assert_eq!(config.tolerance, ToleranceConfig::exact());
    assert_eq!(config.max_mismatches, 50);
    assert_eq!(config.render_limit, 4096);
}

#[test]
fn yaml_fields_and_aliases_parse() {
    let config = RunnerConfig::from_yaml_str(
        "seed: 17\n\
         tolerance:\n  atol: 1.0e-8\n  rtol: 1.0e-6\n\
         overrides:\n  \"$.energy\":\n    abs_tol: 0.01\n\
         max_mismatches: 5\n",
    )
    .unwrap();
    assert_eq!(config.seed, 17);
    assert_eq!(config.tolerance, ToleranceConfig::new(1e-8, 1e-6).unwrap());
    assert_eq!(config.max_mismatches, 5);
    assert_eq!(config.render_limit, 4096);
    let plan = config.plan();
    assert_eq!(plan.for_path("$.energy").abs_tol(), 0.01);
    assert_eq!(plan.for_path("$.other"), &config.tolerance);
}

#[test]
fn negative_tolerance_in_yaml_is_rejected() {
    let err = RunnerConfig::from_yaml_str("tolerance:\n  abs_tol: -1.0\n").unwrap_err();
    assert_eq!(err.info().code, "config-yaml");
    assert!(err.info().message.contains("non-negative"));
}

#[test]
fn load_reads_a_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "seed: 9\nrender_limit: 64").unwrap();
    let config = RunnerConfig::load(file.path()).unwrap();
    assert_eq!(config.seed, 9);
    assert_eq!(config.render_limit, 64);

    let err = RunnerConfig::load(file.path().with_extension("missing")).unwrap_err();
    assert_eq!(err.info().code, "config-read");
}

#[test]
fn unset_environment_changes_nothing() {
    let config = RunnerConfig::default().with_env_overrides(lookup(&[])).unwrap();
    assert_eq!(config, RunnerConfig::default());
}

#[test]
fn environment_overrides_seed_and_tolerances() {
    let base = RunnerConfig {
        tolerance: ToleranceConfig::new(0.5, 0.25).unwrap(),
        ..RunnerConfig::default()
    };
    let config = base
        .with_env_overrides(lookup(&[
            ("BENCHMARK_SEED", "123"),
            ("BENCHMARK_ATOL", "1e-9"),
            (
                "BENCHMARK_TOLERANCES_JSON",
                r#"{"$.loss": {"atol": 0.1, "rtol": 0.0}}"#,
            ),
        ]))
        .unwrap();
    assert_eq!(config.seed, 123);
    assert_eq!(config.tolerance.abs_tol(), 1e-9);
    assert_eq!(config.tolerance.rel_tol(), 0.25);
    assert_eq!(config.overrides["$.loss"], ToleranceConfig::new(0.1, 0.0).unwrap());
}

#[test]
fn malformed_environment_values_are_errors() {
    let err = RunnerConfig::default()
        .with_env_overrides(lookup(&[("BENCHMARK_SEED", "-4")]))
        .unwrap_err();
    assert_eq!(err.info().code, "invalid-env-seed");

    let err = RunnerConfig::default()
        .with_env_overrides(lookup(&[("BENCHMARK_RTOL", "tight")]))
        .unwrap_err();
    assert_eq!(err.info().code, "invalid-env-tolerance");

    let err = RunnerConfig::default()
        .with_env_overrides(lookup(&[("BENCHMARK_ATOL", "-0.1")]))
        .unwrap_err();
    assert!(matches!(err, BenchError::ToleranceConfig(_)));

    let err = RunnerConfig::default()
        .with_env_overrides(lookup(&[("BENCHMARK_TOLERANCES_JSON", "not json")]))
        .unwrap_err();
    assert_eq!(err.info().code, "invalid-tolerance-overrides");
}
