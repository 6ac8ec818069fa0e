#![deny(missing_docs)]
#![doc = "Structural, tolerance-aware comparison of benchmark payloads."]

use benchcmp_core::JsonValue;

pub mod compare;
/// Mismatch records and their categories.
pub mod mismatch;
/// Absolute/relative tolerances and per-path plans.
pub mod tolerance;

pub use compare::{
    compare, compare_default, numbers_close, Comparator, DEFAULT_MAX_MISMATCHES, REPR_LIMIT,
};
pub use mismatch::{summarize, Mismatch, MismatchKind};
pub use tolerance::{ToleranceConfig, TolerancePlan};

/// Panics with a line-per-mismatch report when `actual` and `expected` differ
/// beyond `tolerance`. Intended for test suites.
#[track_caller]
pub fn assert_json_close(actual: &JsonValue, expected: &JsonValue, tolerance: &ToleranceConfig) {
    let mismatches = compare_default(actual, expected, tolerance);
    if !mismatches.is_empty() {
        panic!(
            "values differ at {} location(s):\n{}",
            mismatches.len(),
            summarize(&mismatches)
        );
    }
}
