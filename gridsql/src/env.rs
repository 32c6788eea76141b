//! Environment variable lookups over a snapshot of the environment.
//!
//! Configuration takes `&[(String, String)]` instead of reading the process
//! environment directly, so hosts without one (WASI components, tests) can pass
//! whatever they have.
//!
//! ```
//! use gridsql::env;
//!
//! let vars = vec![("GRIDSQL_TAKE_LIMIT".to_string(), "250".to_string())];
//! assert_eq!(env::u64(&vars, "GRIDSQL_TAKE_LIMIT"), Some(250));
//! assert!(!env::bool(&vars, "GRIDSQL_DISABLE_GROUP_RECONCILE", false));
//! ```

/// Snapshot the current process environment.
pub fn snapshot() -> Vec<(String, String)> {
    std::env::vars().collect()
}

/// Get an environment variable by name.
#[must_use]
pub fn get(env: &[(String, String)], name: &str) -> Option<String> {
    env.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
}

/// Get an environment variable or return a default value.
#[must_use]
pub fn get_or(env: &[(String, String)], name: &str, default: &str) -> String {
    get(env, name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable as a boolean.
///
/// Returns `true` if the value is "true", "1", or "yes" (case-insensitive),
/// `default` if the variable is not set.
#[must_use]
pub fn bool(env: &[(String, String)], name: &str, default: bool) -> bool {
    get(env, name).map_or(default, |v| {
        let v_lower = v.trim().to_lowercase();
        v_lower == "true" || v_lower == "1" || v_lower == "yes"
    })
}

/// Get an environment variable as an unsigned integer.
///
/// Unset or unparsable values are `None`.
#[must_use]
pub fn u64(env: &[(String, String)], name: &str) -> Option<u64> {
    get(env, name).and_then(|v| v.trim().parse().ok())
}
