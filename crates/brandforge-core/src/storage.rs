//! Conversation and blob storage ports
//!
//! Persistence is an external collaborator: these traits are the whole
//! contract, and the in-memory adapters exist for local runs and tests.
//! Stored results never carry image bytes - the blob store owns bytes and
//! hands back references.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

/// A stored conversation document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Document id
    pub id: String,
    /// Partition the document lives in (e.g. a session id)
    pub partition_key: String,
    /// Arbitrary document body
    pub payload: serde_json::Value,
    /// Last write time
    pub updated_at: DateTime<Utc>,
}

impl ConversationRecord {
    /// Create a record stamped with the current time
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        partition_key: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            partition_key: partition_key.into(),
            payload,
            updated_at: Utc::now(),
        }
    }
}

/// Filter for conversation queries
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Restrict to one partition
    pub partition_key: Option<String>,
}

/// Conversation document store port
#[async_trait::async_trait]
pub trait ConversationStore: Send + Sync {
    /// Fetch a document, or `None` when absent
    async fn get(&self, id: &str, partition_key: &str) -> Result<Option<ConversationRecord>>;

    /// Insert or replace a document, returning the stored version
    async fn upsert(&self, record: ConversationRecord) -> Result<ConversationRecord>;

    /// Stream documents matching the filter
    async fn query(&self, filter: RecordFilter) -> Result<BoxStream<'static, ConversationRecord>>;
}

/// Blob storage port
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist bytes, returning a reference URL
    async fn put(&self, bytes: Vec<u8>, content_type: &str) -> Result<String>;

    /// Fetch bytes by reference URL
    async fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// In-memory conversation store
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    records: RwLock<HashMap<(String, String), ConversationRecord>>,
}

impl InMemoryConversationStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get(&self, id: &str, partition_key: &str) -> Result<Option<ConversationRecord>> {
        let records = self.records.read().await;
        Ok(records
            .get(&(partition_key.to_string(), id.to_string()))
            .cloned())
    }

    async fn upsert(&self, mut record: ConversationRecord) -> Result<ConversationRecord> {
        record.updated_at = Utc::now();
        let mut records = self.records.write().await;
        records.insert(
            (record.partition_key.clone(), record.id.clone()),
            record.clone(),
        );
        Ok(record)
    }

    async fn query(&self, filter: RecordFilter) -> Result<BoxStream<'static, ConversationRecord>> {
        let records = self.records.read().await;
        let matching: Vec<ConversationRecord> = records
            .values()
            .filter(|r| {
                filter
                    .partition_key
                    .as_ref()
                    .is_none_or(|pk| r.partition_key == *pk)
            })
            .cloned()
            .collect();
        Ok(stream::iter(matching).boxed())
    }
}

/// In-memory blob store; URLs use the `memory://` scheme.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, (String, Vec<u8>)>>,
}

impl InMemoryBlobStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let url = format!("memory://blobs/{}", Uuid::new_v4());
        let mut blobs = self.blobs.write().await;
        blobs.insert(url.clone(), (content_type.to_string(), bytes));
        Ok(url)
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let blobs = self.blobs.read().await;
        blobs
            .get(url)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| Error::Storage(format!("blob not found: {url}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_conversation_store_roundtrip() {
        let store = InMemoryConversationStore::new();
        let record = ConversationRecord::new("c1", "session-1", serde_json::json!({"x": 1}));

        store.upsert(record).await.unwrap();
        let loaded = store.get("c1", "session-1").await.unwrap().unwrap();
        assert_eq!(loaded.payload["x"], 1);

        assert!(store.get("c1", "other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_conversation_query_filters_by_partition() {
        let store = InMemoryConversationStore::new();
        store
            .upsert(ConversationRecord::new("a", "p1", serde_json::json!({})))
            .await
            .unwrap();
        store
            .upsert(ConversationRecord::new("b", "p2", serde_json::json!({})))
            .await
            .unwrap();

        let results: Vec<_> = store
            .query(RecordFilter {
                partition_key: Some("p1".to_string()),
            })
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "a");
    }

    #[tokio::test]
    async fn test_blob_store_roundtrip() {
        let store = InMemoryBlobStore::new();
        let url = store.put(vec![1, 2, 3], "image/png").await.unwrap();

        assert!(url.starts_with("memory://blobs/"));
        assert_eq!(store.get(&url).await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_blob_store_missing_url() {
        let store = InMemoryBlobStore::new();
        let result = store.get("memory://blobs/nope").await;
        assert!(matches!(result, Err(Error::Storage(_))));
    }

    #[tokio::test]
    async fn test_mock_blob_store_is_usable() {
        let mut mock = MockBlobStore::new();
        mock.expect_put()
            .returning(|_, _| Ok("memory://blobs/fixed".to_string()));

        let url = mock.put(vec![0u8; 4], "image/png").await.unwrap();
        assert_eq!(url, "memory://blobs/fixed");
    }
}
