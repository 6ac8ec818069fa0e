use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use benchcmp_core::errors::{BenchError, ErrorInfo};
use benchcmp_diff::{ToleranceConfig, TolerancePlan};
use serde::{Deserialize, Serialize};

/// Seed override variable.
pub const ENV_SEED: &str = "BENCHMARK_SEED";
/// Absolute tolerance override variable.
pub const ENV_ATOL: &str = "BENCHMARK_ATOL";
/// Relative tolerance override variable.
pub const ENV_RTOL: &str = "BENCHMARK_RTOL";
/// Per-path tolerance overrides, as a JSON object.
pub const ENV_TOLERANCES_JSON: &str = "BENCHMARK_TOLERANCES_JSON";

/// YAML-configurable parameters governing a benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Seed applied before every case.
    #[serde(default)]
    pub seed: u64,
    /// Tolerance for paths without an override.
    #[serde(default)]
    pub tolerance: ToleranceConfig,
    /// Per-path tolerances keyed by mismatch path.
    #[serde(default)]
    pub overrides: BTreeMap<String, ToleranceConfig>,
    /// Mismatches reported per case before truncating.
    #[serde(default = "default_max_mismatches")]
    pub max_mismatches: usize,
    /// Byte bound for the rendered payloads in a result.
    #[serde(default = "default_render_limit")]
    pub render_limit: usize,
}

fn default_max_mismatches() -> usize {
    benchcmp_diff::DEFAULT_MAX_MISMATCHES
}

fn default_render_limit() -> usize {
    4096
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            tolerance: ToleranceConfig::exact(),
            overrides: BTreeMap::new(),
            max_mismatches: default_max_mismatches(),
            render_limit: default_render_limit(),
        }
    }
}

fn config_error(code: &str, message: impl Into<String>) -> BenchError {
    BenchError::Config(ErrorInfo::new(code, message.into()))
}

impl RunnerConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(contents: &str) -> Result<Self, BenchError> {
        serde_yaml::from_str(contents).map_err(|err| config_error("config-yaml", err.to_string()))
    }

    /// Reads and parses a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BenchError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| {
            BenchError::Config(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Tolerance plan combining the default tolerance with the overrides.
    pub fn plan(&self) -> TolerancePlan {
        TolerancePlan {
            default: self.tolerance,
            overrides: self.overrides.clone(),
        }
    }

    /// Applies overrides from the process environment.
    pub fn with_process_env(self) -> Result<Self, BenchError> {
        self.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `BENCHMARK_*` overrides looked up through `lookup`.
    ///
    /// Unset variables leave the configuration untouched. Values that do not
    /// parse are [`BenchError::Config`]; tolerances that parse but are invalid
    /// are [`BenchError::ToleranceConfig`]. Per-path entries from
    /// `BENCHMARK_TOLERANCES_JSON` replace configured entries for the same path.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, BenchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_SEED) {
            self.seed = raw.trim().parse().map_err(|_| {
                BenchError::Config(
                    ErrorInfo::new("invalid-env-seed", format!("{ENV_SEED} is not an unsigned integer"))
                        .with_context("value", raw.clone()),
                )
            })?;
        }
        let abs_tol = parse_float(&lookup, ENV_ATOL)?.unwrap_or(self.tolerance.abs_tol());
        let rel_tol = parse_float(&lookup, ENV_RTOL)?.unwrap_or(self.tolerance.rel_tol());
        self.tolerance = ToleranceConfig::new(abs_tol, rel_tol)?;
        if let Some(raw) = lookup(ENV_TOLERANCES_JSON) {
            let parsed = TolerancePlan::from_overrides_json(self.tolerance, &raw)?;
            self.overrides.extend(parsed.overrides);
        }
        Ok(self)
    }
}

fn parse_float<F>(lookup: &F, key: &str) -> Result<Option<f64>, BenchError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<f64>().map(Some).map_err(|_| {
            BenchError::Config(
                ErrorInfo::new("invalid-env-tolerance", format!("{key} is not a number"))
                    .with_context("value", raw.clone()),
            )
        }),
    }
}
