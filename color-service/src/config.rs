use common::config::{allowed_origin, optional, process_env, required};
use common::ConfigError;

use crate::service::WriteMode;

pub const TABLE_NAME_VAR: &str = "TABLE_NAME";
pub const WRITE_MODE_VAR: &str = "COLOR_WRITE_MODE";
pub const COLORS_PATH_VAR: &str = "COLORS_PATH";
pub const DEFAULT_COLORS_PATH: &str = "/colors";

/// Color service configuration, read once at cold start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub table_name: String,
    pub allowed_origin: String,
    pub write_mode: WriteMode,
    /// Resource path the gateway forwards, e.g. `/colors` or `/prod/colors`.
    pub colors_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let write_mode = match optional(&lookup, WRITE_MODE_VAR) {
            Some(value) => value.parse()?,
            None => WriteMode::default(),
        };

        let colors_path = match optional(&lookup, COLORS_PATH_VAR) {
            Some(value) => resource_path(&value)?,
            None => DEFAULT_COLORS_PATH.to_string(),
        };

        Ok(Self {
            table_name: required(&lookup, TABLE_NAME_VAR)?,
            allowed_origin: allowed_origin(&lookup),
            write_mode,
            colors_path,
        })
    }
}

fn resource_path(value: &str) -> Result<String, ConfigError> {
    let value = value.trim();
    if !value.starts_with('/') {
        return Err(ConfigError::Invalid {
            var: COLORS_PATH_VAR,
            reason: format!("expected an absolute path, got `{value}`"),
        });
    }
    let trimmed = value.trim_end_matches('/');
    Ok(if trimmed.is_empty() { "/" } else { trimmed }.to_string())
}
