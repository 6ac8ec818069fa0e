use std::collections::BTreeMap;

use benchcmp_core::errors::{BenchError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Absolute and relative tolerance for numeric comparison.
///
/// Both components are non-negative and never NaN. A component may be
/// `f64::INFINITY` to make it unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTolerance", into = "RawTolerance")]
pub struct ToleranceConfig {
    abs_tol: f64,
    rel_tol: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawTolerance {
    #[serde(default, alias = "atol")]
    abs_tol: f64,
    #[serde(default, alias = "rtol")]
    rel_tol: f64,
}

impl ToleranceConfig {
    /// Validates and builds a tolerance.
    pub fn new(abs_tol: f64, rel_tol: f64) -> Result<Self, BenchError> {
        check_component("abs_tol", abs_tol)?;
        check_component("rel_tol", rel_tol)?;
        Ok(Self { abs_tol, rel_tol })
    }

    /// Zero tolerance: numbers must be equal.
    pub const fn exact() -> Self {
        Self {
            abs_tol: 0.0,
            rel_tol: 0.0,
        }
    }

    /// Absolute component.
    pub fn abs_tol(&self) -> f64 {
        self.abs_tol
    }

    /// Relative component, scaled by the larger magnitude of the two operands.
    pub fn rel_tol(&self) -> f64 {
        self.rel_tol
    }

    /// Largest difference allowed between operands of magnitude up to `scale`.
    pub fn allowance(&self, scale: f64) -> f64 {
        self.abs_tol.max(self.rel_tol * scale)
    }
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self::exact()
    }
}

impl TryFrom<RawTolerance> for ToleranceConfig {
    type Error = BenchError;

    fn try_from(raw: RawTolerance) -> Result<Self, Self::Error> {
        ToleranceConfig::new(raw.abs_tol, raw.rel_tol)
    }
}

impl From<ToleranceConfig> for RawTolerance {
    fn from(config: ToleranceConfig) -> Self {
        RawTolerance {
            abs_tol: config.abs_tol,
            rel_tol: config.rel_tol,
        }
    }
}

fn check_component(name: &str, value: f64) -> Result<(), BenchError> {
    if value.is_nan() || value < 0.0 {
        return Err(BenchError::ToleranceConfig(
            ErrorInfo::new(
                "invalid-tolerance",
                format!("{name} must be a non-negative number"),
            )
            .with_context("field", name)
            .with_context("value", value.to_string()),
        ));
    }
    Ok(())
}

/// Default tolerance plus exact-path overrides.
///
/// Override keys are full paths such as `$.metrics.energy` and only apply to
/// numbers found at exactly that path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TolerancePlan {
    /// Tolerance for paths without an override.
    #[serde(default)]
    pub default: ToleranceConfig,
    /// Per-path tolerances.
    #[serde(default)]
    pub overrides: BTreeMap<String, ToleranceConfig>,
}

impl TolerancePlan {
    /// Plan that applies `default` everywhere.
    pub fn uniform(default: ToleranceConfig) -> Self {
        Self {
            default,
            overrides: BTreeMap::new(),
        }
    }

    /// Adds or replaces the override for `path`.
    pub fn with_override(mut self, path: impl Into<String>, tolerance: ToleranceConfig) -> Self {
        self.overrides.insert(path.into(), tolerance);
        self
    }

    /// Tolerance in effect at `path`.
    pub fn for_path(&self, path: &str) -> &ToleranceConfig {
        self.overrides.get(path).unwrap_or(&self.default)
    }

    /// Parses overrides from a JSON object of the form
    /// `{"$.a": {"atol": 1e-6, "rtol": 0.0}}` and layers them over `default`.
    pub fn from_overrides_json(default: ToleranceConfig, text: &str) -> Result<Self, BenchError> {
        let overrides: BTreeMap<String, ToleranceConfig> =
            serde_json::from_str(text).map_err(|err| {
                BenchError::ToleranceConfig(
                    ErrorInfo::new("invalid-tolerance-overrides", err.to_string())
                        .with_hint("expected an object mapping paths to {\"atol\", \"rtol\"}"),
                )
            })?;
        Ok(Self { default, overrides })
    }
}

impl From<ToleranceConfig> for TolerancePlan {
    fn from(default: ToleranceConfig) -> Self {
        Self::uniform(default)
    }
}
