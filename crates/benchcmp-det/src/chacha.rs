//! Optional ChaCha8 stream, seeded from substream 1 of the run seed.

use std::sync::{Mutex, MutexGuard, PoisonError};

use benchcmp_core::derive_substream_seed;
use benchcmp_core::errors::{BenchError, ErrorInfo};
use once_cell::sync::Lazy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::source::{RngSource, SourceState};

/// Capability name of the ChaCha source.
pub const NAME: &str = "chacha";

/// Substream of the run seed that feeds this source.
pub const SUBSTREAM: u64 = 1;

static CHACHA: Lazy<Mutex<ChaCha8Rng>> = Lazy::new(|| Mutex::new(ChaCha8Rng::from_entropy()));

fn lock() -> Result<MutexGuard<'static, ChaCha8Rng>, BenchError> {
    CHACHA.lock().map_err(|_| {
        BenchError::Determinism(
            ErrorInfo::new("rng-poisoned", "the chacha generator slot is poisoned")
                .with_context("source", NAME),
        )
    })
}

fn reclaim() -> MutexGuard<'static, ChaCha8Rng> {
    let guard = CHACHA.lock().unwrap_or_else(PoisonError::into_inner);
    CHACHA.clear_poison();
    guard
}

/// Runs `f` with exclusive access to the ChaCha generator.
pub fn with_rng<R>(f: impl FnOnce(&mut ChaCha8Rng) -> R) -> Result<R, BenchError> {
    let mut rng = lock()?;
    Ok(f(&mut rng))
}

/// [`RngSource`] over the ChaCha slot.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChaChaSource;

impl RngSource for ChaChaSource {
    fn name(&self) -> &str {
        NAME
    }

    fn snapshot(&self) -> Result<SourceState, BenchError> {
        let rng = reclaim();
        Ok(SourceState::new(rng.clone()))
    }

    fn seed(&self, seed: u64) -> Result<(), BenchError> {
        let mut rng = reclaim();
        *rng = ChaCha8Rng::seed_from_u64(derive_substream_seed(seed, SUBSTREAM));
        Ok(())
    }

    fn restore(&self, state: SourceState) -> Result<(), BenchError> {
        let saved: ChaCha8Rng = state.downcast(NAME)?;
        let mut rng = reclaim();
        *rng = saved;
        Ok(())
    }
}
