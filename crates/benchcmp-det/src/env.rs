//! Environment variables that influence reproducibility of numeric code.

use std::collections::BTreeMap;
use std::env;

use tracing::debug;

/// Hash-randomization seed variable; set to the run seed.
pub const HASH_SEED_KEY: &str = "PYTHONHASHSEED";

/// Thread-pool size variables pinned to `1` to fix reduction order.
pub const THREAD_KEYS: [&str; 6] = [
    "OMP_NUM_THREADS",
    "MKL_NUM_THREADS",
    "OPENBLAS_NUM_THREADS",
    "NUMEXPR_NUM_THREADS",
    "VECLIB_MAXIMUM_THREADS",
    "RAYON_NUM_THREADS",
];

/// Timezone and locale variables with their pinned values.
pub const LOCALE_KEYS: [(&str, &str); 3] = [("TZ", "UTC"), ("LC_ALL", "C"), ("LANG", "C")];

/// Every variable the policy writes.
pub fn normalized_keys() -> Vec<&'static str> {
    let mut keys = vec![HASH_SEED_KEY];
    keys.extend(THREAD_KEYS);
    keys.extend(LOCALE_KEYS.iter().map(|(key, _)| *key));
    keys.sort_unstable();
    keys
}

/// Values the policy writes for `seed`, keyed by variable name.
pub fn normalized_environment(seed: u64) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    vars.insert(HASH_SEED_KEY.to_string(), seed.to_string());
    for key in THREAD_KEYS {
        vars.insert(key.to_string(), "1".to_string());
    }
    for (key, value) in LOCALE_KEYS {
        vars.insert(key.to_string(), value.to_string());
    }
    vars
}

/// Current values of the determinism-relevant variables; `None` for unset.
pub fn environment_snapshot() -> BTreeMap<String, Option<String>> {
    normalized_keys()
        .into_iter()
        .map(|key| (key.to_string(), env::var(key).ok()))
        .collect()
}

/// Forces the normalized values into the process environment.
pub(crate) fn apply_environment(vars: &BTreeMap<String, String>) {
    for (key, value) in vars {
        debug!(key = key.as_str(), value = value.as_str(), "pinning environment variable");
        env::set_var(key, value);
    }
}

/// Puts back a snapshot taken by [`environment_snapshot`], unsetting
/// variables that were absent.
pub(crate) fn restore_environment(snapshot: &BTreeMap<String, Option<String>>) {
    for (key, value) in snapshot {
        match value {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }
}
