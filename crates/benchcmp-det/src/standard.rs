//! The mandatory process-wide generator.
//!
//! Case code draws from this slot through [`with_rng`] so that seeding it is
//! enough to make the case reproducible.

use std::sync::{Mutex, MutexGuard, PoisonError};

use benchcmp_core::errors::{BenchError, ErrorInfo};
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::source::{RngSource, SourceState};

/// Capability name of the standard source.
pub const NAME: &str = "standard";

static STANDARD: Lazy<Mutex<StdRng>> = Lazy::new(|| Mutex::new(StdRng::from_entropy()));

fn lock() -> Result<MutexGuard<'static, StdRng>, BenchError> {
    STANDARD.lock().map_err(|_| {
        BenchError::Determinism(
            ErrorInfo::new("rng-poisoned", "the standard generator slot is poisoned")
                .with_context("source", NAME)
                .with_hint("a previous user of the generator panicked; reseed it through the policy"),
        )
    })
}

// Seeding and restoring replace the whole state, so a panic in an earlier
// holder does not matter to them.
fn reclaim() -> MutexGuard<'static, StdRng> {
    let guard = STANDARD.lock().unwrap_or_else(PoisonError::into_inner);
    STANDARD.clear_poison();
    guard
}

/// Runs `f` with exclusive access to the standard generator.
pub fn with_rng<R>(f: impl FnOnce(&mut StdRng) -> R) -> Result<R, BenchError> {
    let mut rng = lock()?;
    Ok(f(&mut rng))
}

/// Next 64 random bits from the standard generator.
pub fn next_u64() -> Result<u64, BenchError> {
    with_rng(|rng| rng.next_u64())
}

/// Uniform float in `[0, 1)` from the standard generator.
pub fn gen_f64() -> Result<f64, BenchError> {
    with_rng(|rng| rng.gen::<f64>())
}

/// [`RngSource`] over the standard slot.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardSource;

impl RngSource for StandardSource {
    fn name(&self) -> &str {
        NAME
    }

    fn is_mandatory(&self) -> bool {
        true
    }

    fn snapshot(&self) -> Result<SourceState, BenchError> {
        let rng = reclaim();
        Ok(SourceState::new(rng.clone()))
    }

    fn seed(&self, seed: u64) -> Result<(), BenchError> {
        let mut rng = reclaim();
        *rng = StdRng::seed_from_u64(seed);
        Ok(())
    }

    fn restore(&self, state: SourceState) -> Result<(), BenchError> {
        let saved: StdRng = state.downcast(NAME)?;
        let mut rng = reclaim();
        *rng = saved;
        Ok(())
    }
}
