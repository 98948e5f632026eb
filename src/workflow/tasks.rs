//! # Task Entity Store
//!
//! Typed CRUD and status/progress updates over the task collection. Creation
//! permissions are enforced by the caller (the engine), not stamped here;
//! tasks are never physically removed by normal workflow operations.

use crate::constants::{collections, TaskStatus};
use crate::error::{Result, WorkflowError};
use crate::models::{NewTask, Task};
use crate::store::{decode_all, DocumentStore};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

pub struct TaskStore {
    store: Arc<dyn DocumentStore>,
}

impl TaskStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a task document, stamping status, progress, creator and
    /// timestamps. Returns the stored task.
    pub async fn create(&self, new_task: NewTask, creator_id: &str) -> Result<Task> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            phase: new_task.phase,
            title: new_task.title,
            description: new_task.description,
            due_date: new_task.due_date,
            assignee_name: new_task.assignee_name,
            category: new_task.category,
            priority: new_task.priority,
            deliverables: Vec::new(),
            approval_flow: new_task.approval_flow,
            status: TaskStatus::NotStarted,
            progress: 0,
            created_by: creator_id.to_string(),
            created_at: now,
            updated_at: now,
            last_updated_by: None,
            status_notes: None,
            submitted_at: None,
            submitted_by: None,
            current_approval_id: None,
            current_approval_level: None,
            final_approved_at: None,
            final_approved_by: None,
            published_at: None,
            published_by: None,
            rejection_reason: None,
        };

        self.store
            .set(collections::TASKS, &task.id, serde_json::to_value(&task)?)
            .await?;
        Ok(task)
    }

    /// Fetch a task; `NotFound` if it does not exist.
    pub async fn get(&self, id: &str) -> Result<Task> {
        match self.store.get(collections::TASKS, id).await? {
            Some(document) => document.decode(),
            None => Err(WorkflowError::NotFound {
                collection: collections::TASKS.to_string(),
                id: id.to_string(),
            }),
        }
    }

    /// Update the task's status, stamping the actor and update time.
    /// Optional notes land on the document alongside the status.
    pub async fn update_status(
        &self,
        id: &str,
        status: TaskStatus,
        updated_by: &str,
        notes: Option<&str>,
    ) -> Result<()> {
        let mut fields = json!({
            "status": status,
            "last_updated_by": updated_by,
        });
        if let Some(notes) = notes {
            fields["status_notes"] = json!(notes);
        }
        self.update_fields(id, fields).await
    }

    /// Update the progress percentage. Callers are expected to stay within
    /// the 0..=100 domain; no further bound is enforced here.
    pub async fn update_progress(&self, id: &str, progress: u8) -> Result<()> {
        self.update_fields(id, json!({ "progress": progress })).await
    }

    /// Merge arbitrary fields into the task document, bumping `updated_at`.
    pub async fn update_fields(&self, id: &str, mut fields: Value) -> Result<()> {
        if let Some(map) = fields.as_object_mut() {
            map.insert("updated_at".to_string(), serde_json::to_value(Utc::now())?);
        }
        self.store.update(collections::TASKS, id, fields).await
    }

    /// Every task, newest first.
    pub async fn all_ordered(&self) -> Result<Vec<Task>> {
        let documents = self
            .store
            .query_ordered(collections::TASKS, "created_at", true)
            .await?;
        decode_all(&documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Role;
    use crate::store::MemoryStore;

    fn task_store() -> TaskStore {
        TaskStore::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_create_stamps_lifecycle_fields() {
        let tasks = task_store();
        let mut new_task = NewTask::new(1, "Launch teaser video");
        new_task.approval_flow = vec![Role::Editor, Role::Supervisor];

        let task = tasks.create(new_task, "u1").await.unwrap();
        assert_eq!(task.status, TaskStatus::NotStarted);
        assert_eq!(task.progress, 0);
        assert_eq!(task.created_by, "u1");

        let fetched = tasks.get(&task.id).await.unwrap();
        assert_eq!(fetched, task);
    }

    #[tokio::test]
    async fn test_get_missing_task() {
        let tasks = task_store();
        let err = tasks.get("missing").await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_status_and_progress() {
        let tasks = task_store();
        let task = tasks
            .create(NewTask::new(1, "Radio spot"), "u1")
            .await
            .unwrap();

        tasks
            .update_status(&task.id, TaskStatus::InProgress, "u2", None)
            .await
            .unwrap();
        tasks.update_progress(&task.id, 40).await.unwrap();

        let updated = tasks.get(&task.id).await.unwrap();
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(updated.progress, 40);
        assert_eq!(updated.last_updated_by.as_deref(), Some("u2"));
        assert!(updated.status_notes.is_none());
        assert!(updated.updated_at >= task.updated_at);
    }

    #[tokio::test]
    async fn test_update_status_records_notes() {
        let tasks = task_store();
        let task = tasks
            .create(NewTask::new(1, "Radio spot"), "u1")
            .await
            .unwrap();

        tasks
            .update_status(
                &task.id,
                TaskStatus::InProgress,
                "u2",
                Some("script revision underway"),
            )
            .await
            .unwrap();

        let updated = tasks.get(&task.id).await.unwrap();
        assert_eq!(
            updated.status_notes.as_deref(),
            Some("script revision underway")
        );

        // A later update without notes keeps the previous note.
        tasks
            .update_status(&task.id, TaskStatus::PendingReview, "u2", None)
            .await
            .unwrap();
        let updated = tasks.get(&task.id).await.unwrap();
        assert_eq!(
            updated.status_notes.as_deref(),
            Some("script revision underway")
        );
    }

    #[tokio::test]
    async fn test_all_ordered_newest_first() {
        let tasks = task_store();
        let first = tasks.create(NewTask::new(1, "First"), "u1").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = tasks.create(NewTask::new(2, "Second"), "u1").await.unwrap();

        let all = tasks.all_ordered().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);
    }
}
