//! Depth-first structural walk over two value trees.
//!
//! The walk visits expected-only keys, then actual-only keys, then shared keys
//! in sorted order, and sequence indices in ascending order, so two runs over
//! the same inputs report the same mismatches in the same order.

use benchcmp_canon::render_repr;
use benchcmp_core::JsonValue;

use crate::mismatch::{Mismatch, MismatchKind};
use crate::tolerance::{TolerancePlan, ToleranceConfig};

/// Cap applied by [`compare_default`].
pub const DEFAULT_MAX_MISMATCHES: usize = 50;

/// Byte bound for the `actual_repr` / `expected_repr` of a mismatch.
pub const REPR_LIMIT: usize = 120;

const ABSENT: &str = "<absent>";

/// Tolerance-aware comparator with a mismatch cap.
#[derive(Debug, Clone)]
pub struct Comparator {
    plan: TolerancePlan,
    max_mismatches: usize,
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(ToleranceConfig::exact())
    }
}

impl Comparator {
    /// Comparator applying `tolerance` at every path.
    pub fn new(tolerance: ToleranceConfig) -> Self {
        Self {
            plan: TolerancePlan::uniform(tolerance),
            max_mismatches: DEFAULT_MAX_MISMATCHES,
        }
    }

    /// Replaces the tolerance plan, keeping the cap.
    pub fn with_plan(mut self, plan: TolerancePlan) -> Self {
        self.plan = plan;
        self
    }

    /// Sets the maximum number of mismatches reported before truncating.
    pub fn max_mismatches(mut self, max_mismatches: usize) -> Self {
        self.max_mismatches = max_mismatches;
        self
    }

    /// Active tolerance plan.
    pub fn plan(&self) -> &TolerancePlan {
        &self.plan
    }

    /// Compares `actual` against `expected`. An empty result means they match.
    ///
    /// When more than the cap is found, the first `max_mismatches` records are
    /// followed by one [`MismatchKind::Truncated`] record at `$` whose detail
    /// names how many were suppressed.
    pub fn compare(&self, actual: &JsonValue, expected: &JsonValue) -> Vec<Mismatch> {
        let mut walker = Walker {
            plan: &self.plan,
            cap: self.max_mismatches,
            found: Vec::new(),
            suppressed: 0,
        };
        let mut path = String::from("$");
        walker.walk(actual, expected, &mut path);
        let Walker {
            mut found,
            suppressed,
            cap,
            ..
        } = walker;
        if suppressed > 0 {
            found.push(Mismatch::new(
                "$",
                MismatchKind::Truncated,
                "",
                "",
                format!("{suppressed} further mismatches suppressed after the first {cap}"),
            ));
        }
        found
    }
}

/// Compares with one tolerance and an explicit cap.
pub fn compare(
    actual: &JsonValue,
    expected: &JsonValue,
    tolerance: &ToleranceConfig,
    max_mismatches: usize,
) -> Vec<Mismatch> {
    Comparator::new(*tolerance)
        .max_mismatches(max_mismatches)
        .compare(actual, expected)
}

/// Compares with one tolerance and [`DEFAULT_MAX_MISMATCHES`].
pub fn compare_default(
    actual: &JsonValue,
    expected: &JsonValue,
    tolerance: &ToleranceConfig,
) -> Vec<Mismatch> {
    compare(actual, expected, tolerance, DEFAULT_MAX_MISMATCHES)
}

/// Returns whether two floats agree under `tolerance`.
///
/// NaN matches only NaN and an infinity matches only the same infinity.
/// Finite values match when `|a - b| <= max(abs_tol, rel_tol * max(|a|, |b|))`.
pub fn numbers_close(a: f64, b: f64, tolerance: &ToleranceConfig) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    if a.is_infinite() || b.is_infinite() {
        return a == b;
    }
    let diff = (a - b).abs();
    diff <= tolerance.allowance(a.abs().max(b.abs()))
}

struct Walker<'a> {
    plan: &'a TolerancePlan,
    cap: usize,
    found: Vec<Mismatch>,
    suppressed: usize,
}

impl Walker<'_> {
    fn record(&mut self, make: impl FnOnce() -> Mismatch) {
        if self.found.len() < self.cap {
            self.found.push(make());
        } else {
            self.suppressed += 1;
        }
    }

    fn walk(&mut self, actual: &JsonValue, expected: &JsonValue, path: &mut String) {
        match (actual, expected) {
            (a, e) if a.is_number() && e.is_number() => self.numbers(a, e, path),
            (JsonValue::Sequence(a), JsonValue::Sequence(e)) => self.sequences(a, e, path),
            (JsonValue::Mapping(a), JsonValue::Mapping(e)) => {
                let missing: Vec<&String> = e.keys().filter(|key| !a.contains_key(*key)).collect();
                for key in missing {
                    let child = child_key(path, key);
                    self.record(|| {
                        Mismatch::new(
                            child,
                            MismatchKind::KeyMissing,
                            ABSENT,
                            render_repr(&e[key], REPR_LIMIT),
                            format!("key `{key}` missing from actual"),
                        )
                    });
                }
                let extra: Vec<&String> = a.keys().filter(|key| !e.contains_key(*key)).collect();
                for key in extra {
                    let child = child_key(path, key);
                    self.record(|| {
                        Mismatch::new(
                            child,
                            MismatchKind::KeyExtra,
                            render_repr(&a[key], REPR_LIMIT),
                            ABSENT,
                            format!("unexpected key `{key}` in actual"),
                        )
                    });
                }
                for (key, actual_child) in a {
                    if let Some(expected_child) = e.get(key) {
                        let mark = path.len();
                        path.push('.');
                        path.push_str(key);
                        self.walk(actual_child, expected_child, path);
                        path.truncate(mark);
                    }
                }
            }
            (JsonValue::Null, JsonValue::Null) => {}
            (JsonValue::Bool(a), JsonValue::Bool(e)) if a == e => {}
            (JsonValue::String(a), JsonValue::String(e)) if a == e => {}
            (a, e) if !a.is_container() && !e.is_container() && !bool_against_number(a, e) => {
                self.value_mismatch(actual, expected, path)
            }
            _ => {
                let detail = format!(
                    "type differs: actual is {}, expected {}",
                    actual.kind_name(),
                    expected.kind_name()
                );
                self.scalar_mismatch(MismatchKind::TypeMismatch, actual, expected, path, detail);
            }
        }
    }

    fn sequences(&mut self, actual: &[JsonValue], expected: &[JsonValue], path: &mut String) {
        if actual.len() != expected.len() {
            let here = path.clone();
            let (a_len, e_len) = (actual.len(), expected.len());
            self.record(|| {
                Mismatch::new(
                    here,
                    MismatchKind::Length,
                    a_len.to_string(),
                    e_len.to_string(),
                    format!("sequence length differs: actual has {a_len} items, expected {e_len}"),
                )
            });
        }
        for (index, (a, e)) in actual.iter().zip(expected).enumerate() {
            let mark = path.len();
            path.push_str(&format!("[{index}]"));
            self.walk(a, e, path);
            path.truncate(mark);
        }
    }

    fn numbers(&mut self, actual: &JsonValue, expected: &JsonValue, path: &str) {
        let tolerance = *self.plan.for_path(path);
        let detail = match (actual, expected) {
            (JsonValue::Int(a), JsonValue::Int(e)) => {
                if a == e {
                    return;
                }
                let diff = match a.checked_sub(*e) {
                    Some(delta) => delta.unsigned_abs() as f64,
                    None => (*a as f64 - *e as f64).abs(),
                };
                let scale = (*a as f64).abs().max((*e as f64).abs());
                if diff <= tolerance.allowance(scale) {
                    return;
                }
                exceeded(diff, scale, &tolerance)
            }
            _ => {
                let (Some(a), Some(e)) = (actual.as_f64(), expected.as_f64()) else {
                    return;
                };
                if numbers_close(a, e, &tolerance) {
                    return;
                }
                if a.is_finite() && e.is_finite() {
                    exceeded((a - e).abs(), a.abs().max(e.abs()), &tolerance)
                } else {
                    "non-finite values differ".to_string()
                }
            }
        };
        self.scalar_mismatch(MismatchKind::NumericMismatch, actual, expected, path, detail);
    }

    fn value_mismatch(&mut self, actual: &JsonValue, expected: &JsonValue, path: &str) {
        self.scalar_mismatch(
            MismatchKind::ValueMismatch,
            actual,
            expected,
            path,
            if actual.kind_name() == expected.kind_name() {
                format!("{} values differ", actual.kind_name())
            } else {
                format!(
                    "values differ: actual is {}, expected {}",
                    actual.kind_name(),
                    expected.kind_name()
                )
            },
        );
    }

    fn scalar_mismatch(
        &mut self,
        kind: MismatchKind,
        actual: &JsonValue,
        expected: &JsonValue,
        path: &str,
        detail: String,
    ) {
        self.record(|| {
            Mismatch::new(
                path,
                kind,
                render_repr(actual, REPR_LIMIT),
                render_repr(expected, REPR_LIMIT),
                detail,
            )
        });
    }
}

// Booleans never take part in numeric comparison, so this pairing is a type error.
fn bool_against_number(a: &JsonValue, b: &JsonValue) -> bool {
    matches!(
        (a, b),
        (JsonValue::Bool(_), n) | (n, JsonValue::Bool(_)) if n.is_number()
    )
}

fn child_key(path: &str, key: &str) -> String {
    format!("{path}.{key}")
}

fn exceeded(diff: f64, scale: f64, tolerance: &ToleranceConfig) -> String {
    format!(
        "|actual - expected| = {diff:e} exceeds max(abs_tol={:e}, rel_tol={:e} * {scale:e})",
        tolerance.abs_tol(),
        tolerance.rel_tol()
    )
}
