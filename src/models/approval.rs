//! # Approval Record Model
//!
//! One record per approval stage a task passes through. The chain is never
//! mutated in place: each stage transition creates a fresh record, and the
//! historical records accumulate. At most one record per task is pending at
//! any time.

use crate::constants::{ApprovalLevel, ApprovalStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub id: String,
    pub task_id: String,
    pub level: ApprovalLevel,
    pub requested_by: String,
    pub requested_at: DateTime<Utc>,
    pub status: ApprovalStatus,
    #[serde(default)]
    pub decided_by: Option<String>,
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

impl ApprovalRecord {
    /// A fresh pending record for the given stage.
    pub fn pending(
        id: impl Into<String>,
        task_id: impl Into<String>,
        level: ApprovalLevel,
        requested_by: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            task_id: task_id.into(),
            level,
            requested_by: requested_by.into(),
            requested_at: Utc::now(),
            status: ApprovalStatus::Pending,
            decided_by: None,
            decided_at: None,
            comments: None,
            rejection_reason: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }
}
