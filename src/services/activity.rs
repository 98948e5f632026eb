//! # Activity Log
//!
//! Append-only record of workflow events for audit and the UI feed. Writes
//! are best-effort: a failed audit write is traced locally and swallowed so
//! it can never block the primary workflow operation.

use crate::constants::collections;
use crate::error::Result;
use crate::models::{ActivityEntry, UserAccount};
use crate::store::{decode_all, DocumentStore};
use chrono::Utc;
use std::sync::Arc;

pub struct ActivityLogger {
    store: Arc<dyn DocumentStore>,
}

impl ActivityLogger {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Append one entry. Failures are swallowed.
    pub async fn record(
        &self,
        actor: &UserAccount,
        action: &str,
        task_id: Option<&str>,
        details: impl Into<String>,
    ) {
        let entry = ActivityEntry {
            action: action.to_string(),
            task_id: task_id.map(str::to_string),
            details: details.into(),
            user_id: actor.id.clone(),
            user_name: actor.name.clone(),
            user_email: Some(actor.email.clone()),
            timestamp: Utc::now(),
        };

        let data = match serde_json::to_value(&entry) {
            Ok(data) => data,
            Err(error) => {
                tracing::warn!(%error, action, "failed to encode activity entry");
                return;
            }
        };

        if let Err(error) = self.store.create(collections::ACTIVITY_LOG, data).await {
            tracing::warn!(%error, action, "activity log write failed");
        }
    }

    /// The most recent entries, newest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<ActivityEntry>> {
        let documents = self
            .store
            .query_ordered(collections::ACTIVITY_LOG, "timestamp", true)
            .await?;
        let mut entries: Vec<ActivityEntry> = decode_all(&documents)?;
        entries.truncate(limit);
        Ok(entries)
    }
}
