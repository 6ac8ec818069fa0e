use benchcmp_core::errors::BenchError;
use benchcmp_core::{to_value, JsonValue, Mapping};
use serde::Serialize;

/// What a benchmark case produces: the reference payload, the payload under
/// test, and free-form metadata carried into the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseOutput {
    /// Reference payload.
    pub expected: JsonValue,
    /// Payload produced by the code under test.
    pub actual: JsonValue,
    /// Extra context, copied verbatim into the result.
    pub metadata: Mapping,
}

impl CaseOutput {
    /// Output without metadata.
    pub fn new(expected: impl Into<JsonValue>, actual: impl Into<JsonValue>) -> Self {
        Self {
            expected: expected.into(),
            actual: actual.into(),
            metadata: Mapping::new(),
        }
    }

    /// Builds an output from serializable payloads. Payloads that are not
    /// JSON-like yield [`BenchError::Unencodable`], which the runner reports as
    /// an errored case.
    pub fn from_serializable<E, A>(expected: &E, actual: &A) -> Result<Self, BenchError>
    where
        E: Serialize + ?Sized,
        A: Serialize + ?Sized,
    {
        Ok(Self::new(to_value(expected)?, to_value(actual)?))
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A named case the runner can execute as part of a suite.
pub trait BenchmarkCase {
    /// Stable case name used in results and logs.
    fn name(&self) -> &str;

    /// Seed for this case; `None` uses the runner's configured seed.
    fn seed(&self) -> Option<u64> {
        None
    }

    /// Produces the payloads to compare.
    fn run(&self) -> Result<CaseOutput, BenchError>;
}

/// [`BenchmarkCase`] backed by a closure.
pub struct FnCase<F> {
    name: String,
    seed: Option<u64>,
    body: F,
}

impl<F> FnCase<F>
where
    F: Fn() -> Result<CaseOutput, BenchError>,
{
    /// Wraps `body` under `name`.
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            seed: None,
            body,
        }
    }

    /// Pins the seed for this case.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl<F> BenchmarkCase for FnCase<F>
where
    F: Fn() -> Result<CaseOutput, BenchError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn seed(&self) -> Option<u64> {
        self.seed
    }

    fn run(&self) -> Result<CaseOutput, BenchError> {
        (self.body)()
    }
}
