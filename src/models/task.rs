//! # Task Model
//!
//! The addressable unit of work in the campaign. A task moves through the
//! approval lifecycle via the engine's operations and is never hard-deleted
//! by normal workflow; the document accumulates lifecycle metadata instead.

use crate::constants::{ApprovalLevel, Role, TaskStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A campaign task document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// Campaign phase the task belongs to (1..3).
    pub phase: u8,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub assignee_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    /// Required deliverables, recorded on submission.
    #[serde(default)]
    pub deliverables: Vec<String>,
    /// The approval-flow template configured at creation: the ordered roles
    /// this task was intended to pass through.
    #[serde(default)]
    pub approval_flow: Vec<Role>,
    pub status: TaskStatus,
    /// Progress percentage in the 0..=100 domain.
    pub progress: u8,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_updated_by: Option<String>,
    /// Free-form note attached to the latest status update.
    #[serde(default)]
    pub status_notes: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub submitted_by: Option<String>,
    #[serde(default)]
    pub current_approval_id: Option<String>,
    #[serde(default)]
    pub current_approval_level: Option<ApprovalLevel>,
    #[serde(default)]
    pub final_approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub final_approved_by: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_by: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

/// Caller-supplied fields for task creation; everything else is stamped by
/// the task store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub phase: u8,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub assignee_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub approval_flow: Vec<Role>,
}

impl NewTask {
    pub fn new(phase: u8, title: impl Into<String>) -> Self {
        Self {
            phase,
            title: title.into(),
            description: None,
            due_date: None,
            assignee_name: None,
            category: None,
            priority: None,
            approval_flow: Vec::new(),
        }
    }
}
