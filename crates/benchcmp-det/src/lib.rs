#![deny(missing_docs)]
#![doc = "Determinism policy: seeds process-wide random sources, pins environment variables, and restores both when scoped."]

#[cfg(feature = "chacha")]
pub mod chacha;
pub mod env;
/// Policy, capability report and scoped guard.
pub mod policy;
/// The [`RngSource`] seam.
pub mod source;
pub mod standard;

pub use env::{environment_snapshot, normalized_environment};
pub use policy::{
    CapabilityReport, DeterminismContext, DeterminismGuard, DeterminismPolicy, SourceStatus,
};
pub use source::{Availability, RngSource, SourceState, Unavailable};
pub use standard::StandardSource;

/// Applies the default policy for `seed`.
pub fn apply(seed: u64) -> Result<DeterminismContext, benchcmp_core::BenchError> {
    DeterminismPolicy::default().apply(seed)
}

/// Applies the default policy for `seed` until the returned guard drops.
pub fn scoped(seed: u64) -> Result<DeterminismGuard, benchcmp_core::BenchError> {
    DeterminismPolicy::default().scoped(seed)
}
