use std::any::Any;

use benchcmp_core::errors::{BenchError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Whether a source can be seeded in this build/process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// The source is present and can be seeded.
    Installed,
    /// The source is not compiled in or not present at runtime.
    NotInstalled,
}

/// Opaque saved state of one source, produced by [`RngSource::snapshot`] and
/// consumed by [`RngSource::restore`].
pub struct SourceState(Box<dyn Any + Send>);

impl SourceState {
    /// Wraps a concrete state value.
    pub fn new<T: Any + Send>(state: T) -> Self {
        Self(Box::new(state))
    }

    /// Recovers the concrete state, failing if it was produced by a different
    /// kind of source.
    pub fn downcast<T: Any>(self, source: &str) -> Result<T, BenchError> {
        self.0.downcast::<T>().map(|boxed| *boxed).map_err(|_| {
            BenchError::Determinism(
                ErrorInfo::new("foreign-rng-state", "saved state does not belong to this source")
                    .with_context("source", source),
            )
        })
    }
}

impl std::fmt::Debug for SourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SourceState(..)")
    }
}

/// A process-wide pseudo-random source the policy seeds and restores.
pub trait RngSource: Send + Sync {
    /// Stable name used in capability reports.
    fn name(&self) -> &str;

    /// Whether the source can be seeded here.
    fn availability(&self) -> Availability {
        Availability::Installed
    }

    /// A mandatory source that cannot be seeded aborts the run.
    fn is_mandatory(&self) -> bool {
        false
    }

    /// Captures the current state.
    fn snapshot(&self) -> Result<SourceState, BenchError>;

    /// Reseeds the source deterministically from `seed`.
    fn seed(&self, seed: u64) -> Result<(), BenchError>;

    /// Puts back a state captured by [`RngSource::snapshot`].
    fn restore(&self, state: SourceState) -> Result<(), BenchError>;
}

/// Placeholder for a source that is not available in this build.
#[derive(Debug, Clone)]
pub struct Unavailable {
    name: String,
}

impl Unavailable {
    /// Names the missing source.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn missing(&self) -> BenchError {
        BenchError::Determinism(
            ErrorInfo::new("source-not-installed", format!("{} is not installed", self.name))
                .with_context("source", self.name.clone()),
        )
    }
}

impl RngSource for Unavailable {
    fn name(&self) -> &str {
        &self.name
    }

    fn availability(&self) -> Availability {
        Availability::NotInstalled
    }

    fn snapshot(&self) -> Result<SourceState, BenchError> {
        Err(self.missing())
    }

    fn seed(&self, _seed: u64) -> Result<(), BenchError> {
        Err(self.missing())
    }

    fn restore(&self, _state: SourceState) -> Result<(), BenchError> {
        Err(self.missing())
    }
}
