//! Persistence for color records.
//!
//! [`DynamoDbStore`] backs the deployed function; [`MemoryStore`] keeps
//! records in process for tests.

mod dynamodb;
mod memory;

use async_trait::async_trait;
use common::ServiceError;
use thiserror::Error;

use crate::model::ColorRecord;

pub use dynamodb::DynamoDbStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },

    #[error("malformed item: {0}")]
    MalformedItem(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::upstream(err)
    }
}

#[async_trait]
pub trait ColorStore: Send + Sync {
    /// `None` when no record exists for `key`.
    async fn get(&self, key: &str) -> Result<Option<ColorRecord>, StoreError>;

    /// Unconditionally replaces the record stored under `record.key`.
    async fn put(&self, record: &ColorRecord) -> Result<(), StoreError>;

    /// Appends `color` to the list stored under `key`, creating the record if
    /// needed, and returns the updated list. Implementations must apply the
    /// append atomically so concurrent writers never drop each other's colors.
    async fn append_color(
        &self,
        key: &str,
        color: &str,
        timestamp: &str,
    ) -> Result<Vec<String>, StoreError>;

    /// Every record, or those whose key starts with `prefix`.
    async fn scan(&self, prefix: Option<&str>) -> Result<Vec<ColorRecord>, StoreError>;
}
