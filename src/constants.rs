//! # System Constants and Configuration
//!
//! Core constants and enums that define the operational boundaries of the
//! campaign approval workflow: the fixed role hierarchy, its permission sets,
//! the global approval-level sequence, and the logical collection layout of
//! the backing document store.

use serde::{Deserialize, Serialize};

// Re-export state types for convenience
pub use crate::workflow::{ApprovalStatus, TaskStatus};

/// Logical collection names in the backing document store.
pub mod collections {
    pub const TASKS: &str = "campaign_tasks";
    pub const APPROVALS: &str = "approvals";
    pub const USERS: &str = "users";
    pub const ACTIVITY_LOG: &str = "activity_log";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const KPI: &str = "kpi_metrics";

    /// Fixed document id of the singleton campaign progress snapshot.
    pub const CAMPAIGN_PROGRESS_DOC: &str = "campaign_progress";
}

/// Activity log action tags.
pub mod actions {
    pub const TASK_CREATED: &str = "task_created";
    pub const STATUS_CHANGED: &str = "status_changed";
    pub const SUBMITTED_REVIEW: &str = "submitted_review";
    pub const APPROVED: &str = "approved";
    pub const FINAL_APPROVED: &str = "final_approved";
    pub const REJECTED: &str = "rejected";
    pub const PUBLISHED: &str = "published";
    pub const USER_CREATED: &str = "user_created";
    pub const ROLE_CHANGED: &str = "role_changed";
}

/// Notification type tags.
pub mod notification_types {
    pub const APPROVAL_REQUEST: &str = "approval_request";
}

/// Named capabilities aggregated into role permission sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Universal wildcard held only by super admins.
    All,
    ManageUsers,
    ManageTasks,
    CreateTasks,
    EditOwnTasks,
    SubmitReview,
    ReviewTasks,
    ApproveInitial,
    ApproveFinal,
    Publish,
    ViewReports,
    ManageBudget,
    ViewTasks,
}

/// The fixed role hierarchy. Roles are static configuration: they are never
/// created or destroyed at runtime, and each carries a numeric authority
/// level and a static permission set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    Editor,
    Supervisor,
    Manager,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Numeric authority level, monotonically increasing with authority.
    pub fn level(&self) -> u8 {
        match self {
            Self::Viewer => 10,
            Self::Editor => 30,
            Self::Supervisor => 50,
            Self::Manager => 70,
            Self::Admin => 90,
            Self::SuperAdmin => 100,
        }
    }

    /// The static permission set associated with this role.
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Self::SuperAdmin => &[Permission::All],
            Self::Admin => &[
                Permission::ManageUsers,
                Permission::ManageTasks,
                Permission::ApproveFinal,
                Permission::Publish,
                Permission::ViewReports,
                Permission::ManageBudget,
            ],
            Self::Manager => &[
                Permission::ManageTasks,
                Permission::ApproveFinal,
                Permission::Publish,
                Permission::ViewReports,
                Permission::ManageBudget,
            ],
            Self::Supervisor => &[
                Permission::ReviewTasks,
                Permission::ApproveInitial,
                Permission::ViewReports,
            ],
            Self::Editor => &[
                Permission::CreateTasks,
                Permission::EditOwnTasks,
                Permission::SubmitReview,
            ],
            Self::Viewer => &[Permission::ViewTasks],
        }
    }

    /// Whether this role carries administrative authority over approvals.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Viewer => write!(f, "viewer"),
            Self::Editor => write!(f, "editor"),
            Self::Supervisor => write!(f, "supervisor"),
            Self::Manager => write!(f, "manager"),
            Self::Admin => write!(f, "admin"),
            Self::SuperAdmin => write!(f, "super_admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(Self::Viewer),
            "editor" => Ok(Self::Editor),
            "supervisor" => Ok(Self::Supervisor),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            _ => Err(format!("Invalid role: {s}")),
        }
    }
}

/// One stage in the fixed global approval sequence, bound to a required role.
///
/// Progression through the chain is strictly linear: there is no skip-level
/// or parallel-approval support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApprovalLevel {
    #[serde(rename = "level_1")]
    Level1,
    #[serde(rename = "level_2")]
    Level2,
    #[serde(rename = "level_3")]
    Level3,
    #[serde(rename = "level_4")]
    Level4,
}

impl ApprovalLevel {
    /// The full global sequence, in chain order.
    pub const SEQUENCE: [ApprovalLevel; 4] = [
        ApprovalLevel::Level1,
        ApprovalLevel::Level2,
        ApprovalLevel::Level3,
        ApprovalLevel::Level4,
    ];

    /// First stage of the chain that reviews submitted work. Level 1 is the
    /// authoring stage, so review notifications start at level 2.
    pub const FIRST_REVIEW: ApprovalLevel = ApprovalLevel::Level2;

    /// The role required to decide an approval at this level.
    pub fn required_role(&self) -> Role {
        match self {
            Self::Level1 => Role::Editor,
            Self::Level2 => Role::Supervisor,
            Self::Level3 => Role::Manager,
            Self::Level4 => Role::Admin,
        }
    }

    /// Human-facing stage title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Level1 => "Content Creation",
            Self::Level2 => "Supervisor Review",
            Self::Level3 => "Manager Approval",
            Self::Level4 => "Final Approval",
        }
    }

    /// Zero-based position of this level within the global sequence.
    pub fn ordinal(&self) -> usize {
        match self {
            Self::Level1 => 0,
            Self::Level2 => 1,
            Self::Level3 => 2,
            Self::Level4 => 3,
        }
    }

    /// The next level in the global sequence, if any.
    pub fn next(&self) -> Option<ApprovalLevel> {
        Self::SEQUENCE.get(self.ordinal() + 1).copied()
    }
}

impl std::fmt::Display for ApprovalLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Level1 => write!(f, "level_1"),
            Self::Level2 => write!(f, "level_2"),
            Self::Level3 => write!(f, "level_3"),
            Self::Level4 => write!(f, "level_4"),
        }
    }
}

impl std::str::FromStr for ApprovalLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "level_1" => Ok(Self::Level1),
            "level_2" => Ok(Self::Level2),
            "level_3" => Ok(Self::Level3),
            "level_4" => Ok(Self::Level4),
            _ => Err(format!("Invalid approval level: {s}")),
        }
    }
}
