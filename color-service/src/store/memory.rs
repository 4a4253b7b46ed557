use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ColorStore, StoreError};
use crate::model::ColorRecord;

/// In-process store. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<BTreeMap<String, ColorRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ColorStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<ColorRecord>, StoreError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn put(&self, record: &ColorRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(record.key.clone(), record.clone());
        Ok(())
    }

    async fn append_color(
        &self,
        key: &str,
        color: &str,
        timestamp: &str,
    ) -> Result<Vec<String>, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .entry(key.to_string())
            .or_insert_with(|| ColorRecord {
                key: key.to_string(),
                colors: Vec::new(),
                timestamp: timestamp.to_string(),
            });
        record.colors.push(color.to_string());
        record.timestamp = timestamp.to_string();
        Ok(record.colors.clone())
    }

    async fn scan(&self, prefix: Option<&str>) -> Result<Vec<ColorRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| prefix.map_or(true, |p| r.key.starts_with(p)))
            .cloned()
            .collect())
    }
}
