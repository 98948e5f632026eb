//! # Document Store Capability
//!
//! Narrow interface over the remote document database the workflow is built
//! against. The store supplies durable collections with CRUD, query-by-field,
//! ordered retrieval, atomic write batches, and push-based change
//! notification. The engine only ever talks to this trait; the backing
//! service is never reimplemented here.
//!
//! Mutual exclusion is delegated to the store: a single document write is
//! atomic, and [`DocumentStore::apply_batch`] extends that atomicity across
//! the multi-document stage transitions of the approval chain.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::{Result, WorkflowError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;

/// A stored document: opaque id plus JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    /// Decode the payload into a typed model.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.data.clone()).map_err(WorkflowError::from)
    }
}

/// Decode a whole result set into typed models.
pub fn decode_all<T: DeserializeOwned>(documents: &[Document]) -> Result<Vec<T>> {
    documents.iter().map(Document::decode).collect()
}

/// Incremental diff metadata delivered alongside each snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    /// Present for interface completeness; normal workflow operations never
    /// remove documents.
    Removed,
}

#[derive(Debug, Clone)]
pub struct DocumentChange {
    pub kind: ChangeKind,
    pub id: String,
}

/// One push notification: the full current result set of a collection plus
/// the diff that produced it.
#[derive(Debug, Clone)]
pub struct CollectionEvent {
    pub collection: String,
    pub documents: Vec<Document>,
    pub changes: Vec<DocumentChange>,
    pub observed_at: DateTime<Utc>,
}

/// A standing query over one collection. Dropping the subscription releases
/// it; there are no leaked standing queries.
pub struct CollectionSubscription {
    receiver: broadcast::Receiver<CollectionEvent>,
}

impl CollectionSubscription {
    pub(crate) fn new(receiver: broadcast::Receiver<CollectionEvent>) -> Self {
        Self { receiver }
    }

    /// Wait for the next change notification. Returns `None` once the store
    /// has been dropped. A lagged subscriber skips straight to the newest
    /// event, which is safe because every event carries the full result set.
    pub async fn next_event(&mut self) -> Option<CollectionEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// A single write within an atomic batch.
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Insert a new document under a caller-chosen id.
    Create {
        collection: String,
        id: String,
        data: Value,
    },
    /// Merge fields into an existing document; fails if it does not exist.
    Update {
        collection: String,
        id: String,
        fields: Value,
    },
    /// Merge fields, creating the document when absent.
    Merge {
        collection: String,
        id: String,
        fields: Value,
    },
}

/// The capability consumed from the document-store collaborator.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document with a store-generated id; returns the id.
    async fn create(&self, collection: &str, data: Value) -> Result<String>;

    /// Create or fully replace the document at `id`.
    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<()>;

    /// Fetch one document by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Merge fields into an existing document; `NotFound` if absent.
    async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<()>;

    /// Merge fields into the document, creating it when absent. Unrelated
    /// fields already present are preserved.
    async fn merge(&self, collection: &str, id: &str, fields: Value) -> Result<()>;

    /// All documents whose `field` equals `value`.
    async fn query_eq(&self, collection: &str, field: &str, value: Value)
        -> Result<Vec<Document>>;

    /// All documents in the collection, ordered by a field.
    async fn query_ordered(
        &self,
        collection: &str,
        order_by: &str,
        descending: bool,
    ) -> Result<Vec<Document>>;

    /// Apply every write or none of them.
    async fn apply_batch(&self, writes: Vec<WriteOp>) -> Result<()>;

    /// Open a standing query over `collection`.
    fn watch(&self, collection: &str) -> CollectionSubscription;
}

/// Shallow-merge `fields` into `target`. Both are expected to be JSON
/// objects; a non-object target is replaced wholesale.
pub(crate) fn merge_fields(target: &mut Value, fields: &Value) {
    match (target.as_object_mut(), fields.as_object()) {
        (Some(existing), Some(incoming)) => {
            for (key, value) in incoming {
                existing.insert(key.clone(), value.clone());
            }
        }
        _ => *target = fields.clone(),
    }
}

/// Total order over JSON values for ordered retrieval: null < bool < number
/// < string < array < object. Documents missing the order field sort as null.
pub(crate) fn compare_values(a: &Value, b: &Value) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
