//! Suspended workflow requests awaiting caller input
//!
//! A suspended run is modeled as an explicit `PendingRequest` holding a
//! snapshot of the conversation, plus a oneshot resolver the run awaits.
//! `resolve` wakes the exact run that registered the request.

use brandforge_llm::Message;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::{oneshot, RwLock};
use uuid::Uuid;

/// A registered request for caller input
#[derive(Debug, Clone, Serialize)]
pub struct PendingRequest {
    /// Unique request id
    pub id: Uuid,
    /// Question shown to the caller
    pub prompt: String,
    /// Conversation state at suspension, so a suspended run is observable
    /// and persistable rather than trapped in a closure
    pub conversation_snapshot: Vec<Message>,
    /// When the request was registered
    pub created_at: DateTime<Utc>,
}

/// Error from resolving a pending request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PendingError {
    /// Unknown or already-resolved request id
    #[error("pending request not found")]
    NotFound,
}

/// Registry of suspended requests
#[derive(Debug, Default)]
pub struct PendingRequests {
    requests: RwLock<HashMap<Uuid, PendingRequest>>,
    /// oneshot senders keyed by request id - resolvers wake waiting runs
    resolvers: RwLock<HashMap<Uuid, oneshot::Sender<String>>>,
}

impl PendingRequests {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending request.
    ///
    /// Returns the request plus the receiver the suspended run awaits.
    pub async fn register(
        &self,
        prompt: impl Into<String>,
        conversation_snapshot: Vec<Message>,
    ) -> (PendingRequest, oneshot::Receiver<String>) {
        let request = PendingRequest {
            id: Uuid::new_v4(),
            prompt: prompt.into(),
            conversation_snapshot,
            created_at: Utc::now(),
        };
        let (tx, rx) = oneshot::channel();

        {
            let mut requests = self.requests.write().await;
            requests.insert(request.id, request.clone());
        }
        {
            let mut resolvers = self.resolvers.write().await;
            resolvers.insert(request.id, tx);
        }

        (request, rx)
    }

    /// Resolve a pending request with the caller's answer, resuming the
    /// suspended run.
    ///
    /// # Errors
    /// `NotFound` when the id is unknown or already resolved.
    pub async fn resolve(&self, id: Uuid, answer: String) -> Result<(), PendingError> {
        let tx = {
            let mut resolvers = self.resolvers.write().await;
            resolvers.remove(&id).ok_or(PendingError::NotFound)?
        };
        {
            let mut requests = self.requests.write().await;
            requests.remove(&id);
        }
        // The waiting run may have been dropped; the answer has nowhere to
        // go then, which is equivalent to a resolved request.
        let _ = tx.send(answer);
        Ok(())
    }

    /// Look up a pending request by id
    pub async fn get(&self, id: Uuid) -> Option<PendingRequest> {
        self.requests.read().await.get(&id).cloned()
    }

    /// Number of requests currently awaiting an answer
    pub async fn len(&self) -> usize {
        self.requests.read().await.len()
    }

    /// True when nothing is suspended
    pub async fn is_empty(&self) -> bool {
        self.requests.read().await.is_empty()
    }

    /// Drop a request without answering it (the run was abandoned).
    pub async fn discard(&self, id: Uuid) {
        self.requests.write().await.remove(&id);
        self.resolvers.write().await.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_resolve() {
        let pending = PendingRequests::new();
        let (request, rx) = pending.register("What tone?", vec![]).await;

        assert_eq!(pending.len().await, 1);
        pending
            .resolve(request.id, "Playful".to_string())
            .await
            .unwrap();

        assert_eq!(rx.await.unwrap(), "Playful");
        assert!(pending.is_empty().await);
    }

    #[tokio::test]
    async fn test_resolve_unknown_id() {
        let pending = PendingRequests::new();
        let result = pending.resolve(Uuid::new_v4(), "answer".to_string()).await;
        assert_eq!(result, Err(PendingError::NotFound));
    }

    #[tokio::test]
    async fn test_double_resolve_fails() {
        let pending = PendingRequests::new();
        let (request, _rx) = pending.register("q", vec![]).await;

        pending.resolve(request.id, "a".to_string()).await.unwrap();
        let result = pending.resolve(request.id, "b".to_string()).await;
        assert_eq!(result, Err(PendingError::NotFound));
    }

    #[tokio::test]
    async fn test_snapshot_is_kept() {
        let pending = PendingRequests::new();
        let snapshot = vec![Message::user("original brief")];
        let (request, _rx) = pending.register("q", snapshot).await;

        let stored = pending.get(request.id).await.unwrap();
        assert_eq!(stored.conversation_snapshot.len(), 1);
        assert_eq!(stored.conversation_snapshot[0].content, "original brief");
    }
}
