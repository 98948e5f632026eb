//! # Notification Dispatcher
//!
//! Fans one notification record out to every directory entry holding the
//! role an approval level requires. There is no deduplication across calls:
//! re-triggering the same level re-notifies every matching principal.

use crate::constants::{collections, notification_types, ApprovalLevel};
use crate::error::{authorization, Result, WorkflowError};
use crate::models::{Notification, UserAccount};
use crate::store::{decode_all, DocumentStore};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

pub struct NotificationDispatcher {
    store: Arc<dyn DocumentStore>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create one unread notification per principal holding the role the
    /// given level requires. Returns how many were notified.
    pub async fn notify_approvers(&self, task_id: &str, level: ApprovalLevel) -> Result<usize> {
        let role = level.required_role();
        let approvers = self
            .store
            .query_eq(collections::USERS, "role", json!(role))
            .await?;

        for approver in &approvers {
            let notification = Notification {
                id: Uuid::new_v4().to_string(),
                user_id: approver.id.clone(),
                task_id: task_id.to_string(),
                kind: notification_types::APPROVAL_REQUEST.to_string(),
                message: format!("Your approval is required: {}", level.title()),
                read: false,
                created_at: Utc::now(),
            };
            self.store
                .set(
                    collections::NOTIFICATIONS,
                    &notification.id,
                    serde_json::to_value(&notification)?,
                )
                .await?;
        }

        tracing::debug!(task_id, level = %level, count = approvers.len(), "notified approvers");
        Ok(approvers.len())
    }

    /// Flip the read flag. Only the recipient may do this.
    pub async fn mark_read(&self, recipient: &UserAccount, notification_id: &str) -> Result<()> {
        let document = self
            .store
            .get(collections::NOTIFICATIONS, notification_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound {
                collection: collections::NOTIFICATIONS.to_string(),
                id: notification_id.to_string(),
            })?;
        let notification: Notification = document.decode()?;

        if notification.user_id != recipient.id {
            return Err(authorization(
                "only the recipient may mark a notification read",
            ));
        }

        self.store
            .update(collections::NOTIFICATIONS, notification_id, json!({"read": true}))
            .await
    }

    /// Unread notifications for one recipient.
    pub async fn unread_for(&self, user_id: &str) -> Result<Vec<Notification>> {
        let documents = self
            .store
            .query_eq(collections::NOTIFICATIONS, "user_id", json!(user_id))
            .await?;
        let notifications: Vec<Notification> = decode_all(&documents)?;
        Ok(notifications.into_iter().filter(|n| !n.read).collect())
    }

    pub async fn unread_count(&self, user_id: &str) -> Result<usize> {
        Ok(self.unread_for(user_id).await?.len())
    }
}
