use std::str::FromStr;
use std::sync::Arc;

use common::{ConfigError, Outcome, ServiceError};
use tracing::debug;

use crate::model::{now_timestamp, ColorRecord, ColorSubmission};
use crate::store::ColorStore;

/// How a repeated submission for the same name is stored; `Append` unless
/// `COLOR_WRITE_MODE` says otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Add the color to the stored list with an atomic store-side append.
    #[default]
    Append,
    /// Replace the stored list with the submitted color; last write wins.
    Overwrite,
}

impl FromStr for WriteMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "overwrite" => Ok(Self::Overwrite),
            other => Err(ConfigError::Invalid {
                var: crate::config::WRITE_MODE_VAR,
                reason: format!("expected `append` or `overwrite`, got `{other}`"),
            }),
        }
    }
}

pub struct ColorService {
    store: Arc<dyn ColorStore>,
    write_mode: WriteMode,
}

impl ColorService {
    pub fn new(store: Arc<dyn ColorStore>, write_mode: WriteMode) -> Self {
        Self { store, write_mode }
    }

    pub async fn submit(
        &self,
        submission: ColorSubmission,
    ) -> Result<Outcome<ColorRecord>, ServiceError> {
        let timestamp = now_timestamp();
        let record = match self.write_mode {
            WriteMode::Append => {
                let colors = self
                    .store
                    .append_color(&submission.name, &submission.color, &timestamp)
                    .await?;
                ColorRecord {
                    key: submission.name,
                    colors,
                    timestamp,
                }
            }
            WriteMode::Overwrite => {
                let record = ColorRecord {
                    key: submission.name,
                    colors: vec![submission.color],
                    timestamp,
                };
                self.store.put(&record).await?;
                record
            }
        };

        debug!(key = %record.key, colors = record.colors.len(), "stored submission");
        Ok(Outcome::created(record))
    }

    /// Records whose key starts with `prefix`, or all of them, ordered by key.
    pub async fn search(
        &self,
        prefix: Option<&str>,
    ) -> Result<Outcome<Vec<ColorRecord>>, ServiceError> {
        let mut records = self.store.scan(prefix).await?;
        records.sort_by(|a, b| a.key.cmp(&b.key));
        debug!(prefix, found = records.len(), "searched colors");
        Ok(Outcome::ok(records))
    }
}
