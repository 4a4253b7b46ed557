use common::config::{allowed_origin, optional, process_env, required};
use common::ConfigError;

pub const CLIENT_ID_VAR: &str = "CLIENT_ID";
pub const REGION_VAR: &str = "AWS_REGION";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub client_id: String,
    pub region: Option<String>,
    pub allowed_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            client_id: required(&lookup, CLIENT_ID_VAR)?,
            region: optional(&lookup, REGION_VAR),
            allowed_origin: allowed_origin(&lookup),
        })
    }
}
