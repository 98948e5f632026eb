//! In-memory [`DocumentStore`] implementation.
//!
//! Backs tests and local development with the same semantics the workflow
//! relies on from the remote service: per-document atomic writes, atomic
//! batches, and push notifications carrying the full result set plus diff
//! metadata.

use super::{
    compare_values, merge_fields, ChangeKind, CollectionEvent, CollectionSubscription, Document,
    DocumentChange, DocumentStore, WriteOp,
};
use crate::error::{Result, WorkflowError};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::broadcast;
use uuid::Uuid;

pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
    watchers: RwLock<HashMap<String, broadcast::Sender<CollectionEvent>>>,
    channel_capacity: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_channel_capacity(256)
    }

    pub fn with_channel_capacity(channel_capacity: usize) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            watchers: RwLock::new(HashMap::new()),
            channel_capacity,
        }
    }

    fn sender_for(&self, collection: &str) -> broadcast::Sender<CollectionEvent> {
        let mut watchers = self.watchers.write();
        watchers
            .entry(collection.to_string())
            .or_insert_with(|| broadcast::channel(self.channel_capacity).0)
            .clone()
    }

    fn snapshot(&self, collection: &str) -> Vec<Document> {
        let collections = self.collections.read();
        collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Deliver the current result set to subscribers. Send errors mean no
    /// subscribers, which is fine.
    fn publish(&self, collection: &str, changes: Vec<DocumentChange>) {
        let sender = {
            let watchers = self.watchers.read();
            match watchers.get(collection) {
                Some(sender) => sender.clone(),
                None => return,
            }
        };

        let event = CollectionEvent {
            collection: collection.to_string(),
            documents: self.snapshot(collection),
            changes,
            observed_at: Utc::now(),
        };
        let _ = sender.send(event);
    }

    fn not_found(collection: &str, id: &str) -> WorkflowError {
        WorkflowError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, data: Value) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        {
            let mut collections = self.collections.write();
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.clone(), data);
        }
        self.publish(
            collection,
            vec![DocumentChange {
                kind: ChangeKind::Added,
                id: id.clone(),
            }],
        );
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        let kind = {
            let mut collections = self.collections.write();
            let documents = collections.entry(collection.to_string()).or_default();
            let kind = if documents.contains_key(id) {
                ChangeKind::Modified
            } else {
                ChangeKind::Added
            };
            documents.insert(id.to_string(), data);
            kind
        };
        self.publish(
            collection,
            vec![DocumentChange {
                kind,
                id: id.to_string(),
            }],
        );
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .map(|data| Document {
                id: id.to_string(),
                data: data.clone(),
            }))
    }

    async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<()> {
        {
            let mut collections = self.collections.write();
            let data = collections
                .get_mut(collection)
                .and_then(|documents| documents.get_mut(id))
                .ok_or_else(|| Self::not_found(collection, id))?;
            merge_fields(data, &fields);
        }
        self.publish(
            collection,
            vec![DocumentChange {
                kind: ChangeKind::Modified,
                id: id.to_string(),
            }],
        );
        Ok(())
    }

    async fn merge(&self, collection: &str, id: &str, fields: Value) -> Result<()> {
        let kind = {
            let mut collections = self.collections.write();
            let documents = collections.entry(collection.to_string()).or_default();
            match documents.get_mut(id) {
                Some(data) => {
                    merge_fields(data, &fields);
                    ChangeKind::Modified
                }
                None => {
                    documents.insert(id.to_string(), fields);
                    ChangeKind::Added
                }
            }
        };
        self.publish(
            collection,
            vec![DocumentChange {
                kind,
                id: id.to_string(),
            }],
        );
        Ok(())
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> Result<Vec<Document>> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|(_, data)| data.get(field) == Some(&value))
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn query_ordered(
        &self,
        collection: &str,
        order_by: &str,
        descending: bool,
    ) -> Result<Vec<Document>> {
        let mut documents = self.snapshot(collection);
        documents.sort_by(|a, b| {
            let left = a.data.get(order_by).unwrap_or(&Value::Null);
            let right = b.data.get(order_by).unwrap_or(&Value::Null);
            let ordering = compare_values(left, right);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
        Ok(documents)
    }

    async fn apply_batch(&self, writes: Vec<WriteOp>) -> Result<()> {
        let mut touched: HashMap<String, Vec<DocumentChange>> = HashMap::new();
        {
            let mut collections = self.collections.write();

            // Validate before mutating so the batch is all-or-nothing.
            for write in &writes {
                if let WriteOp::Update { collection, id, .. } = write {
                    let exists = collections
                        .get(collection)
                        .map(|documents| documents.contains_key(id))
                        .unwrap_or(false);
                    if !exists {
                        return Err(Self::not_found(collection, id));
                    }
                }
            }

            for write in writes {
                let (collection, change) = match write {
                    WriteOp::Create { collection, id, data } => {
                        collections
                            .entry(collection.clone())
                            .or_default()
                            .insert(id.clone(), data);
                        (
                            collection,
                            DocumentChange {
                                kind: ChangeKind::Added,
                                id,
                            },
                        )
                    }
                    WriteOp::Update {
                        collection,
                        id,
                        fields,
                    } => {
                        // Presence checked above.
                        if let Some(data) = collections
                            .get_mut(&collection)
                            .and_then(|documents| documents.get_mut(&id))
                        {
                            merge_fields(data, &fields);
                        }
                        (
                            collection,
                            DocumentChange {
                                kind: ChangeKind::Modified,
                                id,
                            },
                        )
                    }
                    WriteOp::Merge {
                        collection,
                        id,
                        fields,
                    } => {
                        let documents = collections.entry(collection.clone()).or_default();
                        let kind = match documents.get_mut(&id) {
                            Some(data) => {
                                merge_fields(data, &fields);
                                ChangeKind::Modified
                            }
                            None => {
                                documents.insert(id.clone(), fields);
                                ChangeKind::Added
                            }
                        };
                        (collection, DocumentChange { kind, id })
                    }
                };
                touched.entry(collection).or_default().push(change);
            }
        }

        for (collection, changes) in touched {
            self.publish(&collection, changes);
        }
        Ok(())
    }

    fn watch(&self, collection: &str) -> CollectionSubscription {
        CollectionSubscription::new(self.sender_for(collection).subscribe())
    }
}
