//! Environment lookups shared by the function configs.
//!
//! Every config is built from a lookup closure so tests can feed a map
//! instead of mutating the process environment.

use crate::error::ConfigError;

/// Variable holding the origin allowed by CORS.
pub const ALLOWED_ORIGIN_VAR: &str = "WEBSITE_URL";

pub fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// A variable that must be present and non-blank.
pub fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(var)),
    }
}

/// A variable that may be absent; blank values count as absent.
pub fn optional<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var).filter(|value| !value.trim().is_empty())
}

/// The configured CORS origin, or an empty string when unset.
pub fn allowed_origin<F>(lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(ALLOWED_ORIGIN_VAR).unwrap_or_default()
}
