use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use benchcmp_core::errors::{BenchError, ErrorInfo};
use benchcmp_core::RngHandle;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::env::{apply_environment, environment_snapshot, normalized_environment, restore_environment};
use crate::source::{Availability, RngSource, SourceState};
use crate::standard::StandardSource;

/// Outcome of seeding one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SourceStatus {
    /// Seeded successfully.
    Seeded,
    /// Not present; skipped.
    NotInstalled,
    /// Present but seeding failed. Only optional sources end up here.
    Failed(String),
}

/// Per-source seeding outcomes for one application of the policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityReport {
    sources: BTreeMap<String, SourceStatus>,
}

impl CapabilityReport {
    fn record(&mut self, name: &str, status: SourceStatus) {
        self.sources.insert(name.to_string(), status);
    }

    /// Status of the source called `name`.
    pub fn status(&self, name: &str) -> Option<&SourceStatus> {
        self.sources.get(name)
    }

    /// All statuses keyed by source name.
    pub fn sources(&self) -> &BTreeMap<String, SourceStatus> {
        &self.sources
    }

    /// Source name to "was actually seeded".
    pub fn capabilities(&self) -> BTreeMap<String, bool> {
        self.sources
            .iter()
            .map(|(name, status)| (name.clone(), *status == SourceStatus::Seeded))
            .collect()
    }
}

/// What [`DeterminismPolicy::apply`] established.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterminismContext {
    seed: u64,
    report: CapabilityReport,
    environment: BTreeMap<String, String>,
}

impl DeterminismContext {
    /// Seed that was applied.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Detailed per-source outcomes.
    pub fn report(&self) -> &CapabilityReport {
        &self.report
    }

    /// Source name to "was actually seeded".
    pub fn capabilities(&self) -> BTreeMap<String, bool> {
        self.report.capabilities()
    }

    /// Environment variables written, empty when normalization is disabled.
    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    /// Independent generator for `substream`, derived from the applied seed.
    pub fn rng(&self, substream: u64) -> RngHandle {
        RngHandle::substream(self.seed, substream)
    }

    /// Independent generator keyed by `label`, typically a case name.
    pub fn rng_for(&self, label: &str) -> RngHandle {
        RngHandle::labelled(self.seed, label)
    }
}

/// Seeds every registered random source and pins the environment.
///
/// Applying the policy mutates process-wide state. Concurrent `apply` calls in
/// one process race with each other; run cases sequentially or one per process.
#[derive(Clone)]
pub struct DeterminismPolicy {
    sources: Vec<Arc<dyn RngSource>>,
    normalize_environment: bool,
}

impl fmt::Debug for DeterminismPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.sources.iter().map(|source| source.name()).collect();
        f.debug_struct("DeterminismPolicy")
            .field("sources", &names)
            .field("normalize_environment", &self.normalize_environment)
            .finish()
    }
}

impl Default for DeterminismPolicy {
    fn default() -> Self {
        let mut policy = Self::empty().register(StandardSource);
        #[cfg(feature = "chacha")]
        {
            policy = policy.register(crate::chacha::ChaChaSource);
        }
        #[cfg(not(feature = "chacha"))]
        {
            policy = policy.register(crate::source::Unavailable::new("chacha"));
        }
        policy
    }
}

impl DeterminismPolicy {
    /// Policy without any sources; environment normalization stays on.
    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
            normalize_environment: true,
        }
    }

    /// Adds a source. Sources are seeded in registration order.
    pub fn register<S: RngSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Enables or disables environment pinning.
    pub fn with_environment(mut self, normalize: bool) -> Self {
        self.normalize_environment = normalize;
        self
    }

    /// Names of the registered sources.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    /// Seeds every available source and pins the environment.
    ///
    /// Missing sources are skipped and reported. A failing optional source is
    /// logged and reported as failed. A failing mandatory source aborts with
    /// [`BenchError::Determinism`].
    pub fn apply(&self, seed: u64) -> Result<DeterminismContext, BenchError> {
        let mut report = CapabilityReport::default();
        for source in &self.sources {
            let name = source.name();
            if source.availability() == Availability::NotInstalled {
                if source.is_mandatory() {
                    return Err(mandatory_failure(name, "source is not installed"));
                }
                debug!(source = name, "skipping source that is not installed");
                report.record(name, SourceStatus::NotInstalled);
                continue;
            }
            match source.seed(seed) {
                Ok(()) => {
                    debug!(source = name, seed, "seeded source");
                    report.record(name, SourceStatus::Seeded);
                }
                Err(err) if source.is_mandatory() => {
                    return Err(mandatory_failure(name, &err.to_string()));
                }
                Err(err) => {
                    warn!(source = name, error = %err, "optional source could not be seeded");
                    report.record(name, SourceStatus::Failed(err.to_string()));
                }
            }
        }
        let environment = if self.normalize_environment {
            let vars = normalized_environment(seed);
            apply_environment(&vars);
            vars
        } else {
            BTreeMap::new()
        };
        Ok(DeterminismContext {
            seed,
            report,
            environment,
        })
    }

    /// Applies the policy and returns a guard that restores the previous
    /// source states and environment when dropped, including during unwinding.
    pub fn scoped(&self, seed: u64) -> Result<DeterminismGuard, BenchError> {
        let mut saved = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            if source.availability() == Availability::NotInstalled {
                continue;
            }
            match source.snapshot() {
                Ok(state) => saved.push((Arc::clone(source), state)),
                Err(err) if source.is_mandatory() => {
                    return Err(mandatory_failure(source.name(), &err.to_string()));
                }
                Err(err) => {
                    warn!(source = source.name(), error = %err, "optional source state not captured");
                }
            }
        }
        let restore = Restore {
            saved,
            environment: self.normalize_environment.then(environment_snapshot),
        };
        // On failure `restore` drops here and undoes any partial seeding.
        let context = self.apply(seed)?;
        Ok(DeterminismGuard {
            context,
            _restore: restore,
        })
    }
}

fn mandatory_failure(name: &str, reason: &str) -> BenchError {
    BenchError::Determinism(
        ErrorInfo::new(
            "mandatory-rng-unseeded",
            format!("mandatory source `{name}` could not be seeded"),
        )
        .with_context("source", name)
        .with_context("reason", reason)
        .with_hint("the environment cannot produce reproducible results; abort the run"),
    )
}

/// Scoped application of a [`DeterminismPolicy`]; derefs to the context.
#[derive(Debug)]
pub struct DeterminismGuard {
    context: DeterminismContext,
    _restore: Restore,
}

impl DeterminismGuard {
    /// Context established on entry.
    pub fn context(&self) -> &DeterminismContext {
        &self.context
    }
}

impl Deref for DeterminismGuard {
    type Target = DeterminismContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

struct Restore {
    saved: Vec<(Arc<dyn RngSource>, SourceState)>,
    environment: Option<BTreeMap<String, Option<String>>>,
}

impl fmt::Debug for Restore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Restore")
            .field("saved_sources", &self.saved.len())
            .field("environment", &self.environment.is_some())
            .finish()
    }
}

impl Drop for Restore {
    fn drop(&mut self) {
        for (source, state) in self.saved.drain(..).rev() {
            if let Err(err) = source.restore(state) {
                warn!(source = source.name(), error = %err, "failed to restore source state");
            }
        }
        if let Some(snapshot) = self.environment.take() {
            restore_environment(&snapshot);
        }
    }
}
