use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard};

use benchcmp_det::{scoped, standard, DeterminismPolicy, StandardSource};

static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn peek() -> u64 {
    standard::with_rng(|rng| {
        use rand::RngCore;
        rng.clone().next_u64()
    })
    .unwrap()
}

#[test]
fn generator_state_is_restored_on_drop() {
    let _serial = serial();
    benchcmp_det::apply(1234).unwrap();
    standard::next_u64().unwrap();
    let before = peek();
    {
        let guard = scoped(5).unwrap();
        assert_eq!(guard.seed(), 5);
        standard::next_u64().unwrap();
        assert_ne!(peek(), before);
    }
    assert_eq!(peek(), before);
}

#[test]
fn environment_is_restored_including_unset_variables() {
    let _serial = serial();
    std::env::set_var("MKL_NUM_THREADS", "8");
    std::env::remove_var("TZ");
    {
        let _guard = scoped(9).unwrap();
        assert_eq!(std::env::var("MKL_NUM_THREADS").unwrap(), "1");
        assert_eq!(std::env::var("TZ").unwrap(), "UTC");
    }
    assert_eq!(std::env::var("MKL_NUM_THREADS").unwrap(), "8");
    assert!(std::env::var("TZ").is_err());
}

#[test]
fn state_is_restored_when_the_scope_panics() {
    let _serial = serial();
    benchcmp_det::apply(77).unwrap();
    let before = peek();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let _guard = scoped(1).unwrap();
        standard::next_u64().unwrap();
        panic!("case blew up");
    }));
    assert!(outcome.is_err());
    assert_eq!(peek(), before);
}

#[test]
fn nested_scopes_unwind_in_order() {
    let _serial = serial();
    benchcmp_det::apply(500).unwrap();
    let outer_before = peek();
    {
        let _outer = scoped(1).unwrap();
        let inner_before = peek();
        {
            let _inner = scoped(2).unwrap();
            standard::next_u64().unwrap();
        }
        assert_eq!(peek(), inner_before);
    }
    assert_eq!(peek(), outer_before);
}

#[test]
fn scope_without_environment_leaves_variables_alone() {
    let _serial = serial();
    std::env::set_var("OPENBLAS_NUM_THREADS", "4");
    let policy = DeterminismPolicy::empty()
        .register(StandardSource)
        .with_environment(false);
    {
        let guard = policy.scoped(3).unwrap();
        assert!(guard.environment().is_empty());
        assert_eq!(std::env::var("OPENBLAS_NUM_THREADS").unwrap(), "4");
    }
    assert_eq!(std::env::var("OPENBLAS_NUM_THREADS").unwrap(), "4");
}
