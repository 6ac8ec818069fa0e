use std::sync::{Mutex, MutexGuard};

use benchcmp_core::{BenchError, ErrorInfo};
use benchcmp_det::{
    apply, standard, Availability, DeterminismPolicy, RngSource, SourceState, SourceStatus,
    StandardSource, Unavailable,
};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Broken {
    mandatory: bool,
}

impl RngSource for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    fn snapshot(&self) -> Result<SourceState, BenchError> {
        Ok(SourceState::new(()))
    }

    fn seed(&self, _seed: u64) -> Result<(), BenchError> {
        Err(BenchError::Determinism(ErrorInfo::new("device-lost", "accelerator went away")))
    }

    fn restore(&self, _state: SourceState) -> Result<(), BenchError> {
        Ok(())
    }
}

#[test]
fn same_seed_gives_same_stream() {
    let _serial = serial();
    apply(42).unwrap();
    let first: Vec<u64> = (0..4).map(|_| standard::next_u64().unwrap()).collect();
    apply(42).unwrap();
    let second: Vec<u64> = (0..4).map(|_| standard::next_u64().unwrap()).collect();
    assert_eq!(first, second);

    let mut reference = StdRng::seed_from_u64(42);
    assert_eq!(first[0], reference.next_u64());

    apply(43).unwrap();
    assert_ne!(standard::next_u64().unwrap(), first[0]);
}

#[test]
fn floats_are_reproducible_too() {
    let _serial = serial();
    apply(7).unwrap();
    let a = standard::gen_f64().unwrap();
    apply(7).unwrap();
    let b = standard::gen_f64().unwrap();
    assert_eq!(a.to_bits(), b.to_bits());
    assert!((0.0..1.0).contains(&a));
}

#[test]
fn default_policy_reports_builtin_sources() {
    let _serial = serial();
    let context = apply(1).unwrap();
    assert_eq!(context.seed(), 1);
    let caps = context.capabilities();
    assert_eq!(caps.get("standard"), Some(&true));
    #[cfg(feature = "chacha")]
    assert_eq!(caps.get("chacha"), Some(&true));
    #[cfg(not(feature = "chacha"))]
    assert_eq!(caps.get("chacha"), Some(&false));
}

#[cfg(feature = "chacha")]
#[test]
fn chacha_is_seeded_from_its_substream() {
    use benchcmp_core::derive_substream_seed;
    use rand_chacha::ChaCha8Rng;

    let _serial = serial();
    apply(99).unwrap();
    let drawn = benchcmp_det::chacha::with_rng(|rng| rng.next_u64()).unwrap();
    let mut reference = ChaCha8Rng::seed_from_u64(derive_substream_seed(99, 1));
    assert_eq!(drawn, reference.next_u64());
}

#[test]
fn missing_optional_source_is_skipped() {
    let _serial = serial();
    let policy = DeterminismPolicy::empty()
        .register(StandardSource)
        .register(Unavailable::new("gpu"))
        .with_environment(false);
    let context = policy.apply(3).unwrap();
    assert_eq!(context.report().status("gpu"), Some(&SourceStatus::NotInstalled));
    assert_eq!(context.capabilities().get("gpu"), Some(&false));
    assert!(context.environment().is_empty());
    assert_eq!(Unavailable::new("gpu").availability(), Availability::NotInstalled);
}

#[test]
fn failing_optional_source_is_reported_not_raised() {
    let _serial = serial();
    let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
    let policy = DeterminismPolicy::empty()
        .register(StandardSource)
        .register(Broken { mandatory: false })
        .with_environment(false);
    let context = tracing::subscriber::with_default(subscriber, || policy.apply(5)).unwrap();
    match context.report().status("broken") {
        Some(SourceStatus::Failed(reason)) => assert!(reason.contains("accelerator went away")),
        other => panic!("unexpected status {other:?}"),
    }
    assert_eq!(context.capabilities().get("standard"), Some(&true));
}

#[test]
fn failing_mandatory_source_is_environment_fatal() {
    let _serial = serial();
    let policy = DeterminismPolicy::empty()
        .register(Broken { mandatory: true })
        .with_environment(false);
    let err = policy.apply(5).unwrap_err();
    assert!(err.is_environment_fatal());
    assert_eq!(err.info().code, "mandatory-rng-unseeded");
    assert_eq!(err.info().context.get("source").map(String::as_str), Some("broken"));
}

#[test]
fn substream_handles_follow_the_seed() {
    let _serial = serial();
    let context = DeterminismPolicy::empty().with_environment(false).apply(11).unwrap();
    let mut a = context.rng(2);
    let mut b = context.rng(2);
    let mut c = context.rng(3);
    let first = a.next_u64();
    assert_eq!(first, b.next_u64());
    assert_ne!(first, c.next_u64());
    assert_eq!(context.rng_for("case-a").seed(), benchcmp_core::derive_labelled_seed(11, "case-a"));
}

#[test]
fn environment_is_pinned() {
    let _serial = serial();
    std::env::set_var("OMP_NUM_THREADS", "16");
    let context = apply(21).unwrap();
    assert_eq!(std::env::var("OMP_NUM_THREADS").unwrap(), "1");
    assert_eq!(std::env::var("PYTHONHASHSEED").unwrap(), "21");
    assert_eq!(std::env::var("TZ").unwrap(), "UTC");
    assert_eq!(std::env::var("LC_ALL").unwrap(), "C");
    assert_eq!(context.environment().get("RAYON_NUM_THREADS").map(String::as_str), Some("1"));

    let snapshot = benchcmp_det::environment_snapshot();
    assert_eq!(snapshot.len(), 10);
    assert_eq!(snapshot.get("LANG"), Some(&Some("C".to_string())));
}

#[test]
fn report_serializes_with_tagged_statuses() {
    let _serial = serial();
    let policy = DeterminismPolicy::empty()
        .register(StandardSource)
        .register(Broken { mandatory: false })
        .with_environment(false);
    let context = policy.apply(0).unwrap();
    let text = serde_json::to_string(context.report()).unwrap();
    assert!(text.contains(r#""standard":{"status":"seeded"}"#), "{text}");
    assert!(text.contains(r#""status":"failed""#), "{text}");
}
