use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle states.
///
/// `not_started -> in_progress -> pending_review -> pending_approval ->
/// {approved -> published} | rejected`. A rejected task re-enters
/// `in_progress` through a fresh `start`; `published` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Initial state when the task is created.
    NotStarted,
    /// An assignee is actively working the task.
    InProgress,
    /// Submitted, waiting for the review chain to pick it up.
    PendingReview,
    /// A pending approval record exists at some level.
    PendingApproval,
    /// Cleared the full approval chain, ready to publish.
    Approved,
    /// Published. Terminal.
    Published,
    /// Rejected at some approval level; requires a manual restart to leave.
    Rejected,
}

impl TaskStatus {
    /// Check if this is a terminal state (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Published)
    }

    /// Check if the assignee can (re)start work from this state.
    pub fn allows_start(&self) -> bool {
        matches!(self, Self::NotStarted | Self::Rejected)
    }

    /// Check if this state counts as active work for the campaign rollup.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::InProgress => write!(f, "in_progress"),
            Self::PendingReview => write!(f, "pending_review"),
            Self::PendingApproval => write!(f, "pending_approval"),
            Self::Approved => write!(f, "approved"),
            Self::Published => write!(f, "published"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "pending_review" => Ok(Self::PendingReview),
            "pending_approval" => Ok(Self::PendingApproval),
            "approved" => Ok(Self::Approved),
            "published" => Ok(Self::Published),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// Approval record states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Invalid approval status: {s}")),
        }
    }
}

impl Default for ApprovalStatus {
    fn default() -> Self {
        Self::Pending
    }
}
