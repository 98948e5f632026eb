//! # User Account Model
//!
//! The directory record behind an authenticated principal. Accounts are
//! provisioned on first sign-in, mutated only by holders of `manage_users`,
//! and deactivated rather than deleted.

use crate::constants::{Permission, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated identity delivered by the identity provider, before the
/// directory has resolved it into an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Opaque, stable, provider-issued id.
    pub uid: String,
    pub display_name: Option<String>,
    pub email: String,
    pub photo_url: Option<String>,
    /// Signup provider tag, e.g. `google.com` or `password`.
    pub provider: String,
}

/// A directory account: principal identity plus role, permission set, and
/// activation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    pub role: Role,
    pub permissions: Vec<Permission>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub provider: String,
}

impl UserAccount {
    /// True if the account's permission set contains the wildcard or the
    /// permission literal.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&Permission::All) || self.permissions.contains(&permission)
    }

    pub fn can_manage_users(&self) -> bool {
        self.has_permission(Permission::ManageUsers)
    }

    pub fn can_manage_tasks(&self) -> bool {
        self.has_permission(Permission::ManageTasks) || self.has_permission(Permission::CreateTasks)
    }

    pub fn can_approve(&self) -> bool {
        self.has_permission(Permission::ApproveInitial)
            || self.has_permission(Permission::ApproveFinal)
    }

    pub fn can_publish(&self) -> bool {
        self.has_permission(Permission::Publish)
    }

    pub fn can_view_reports(&self) -> bool {
        self.has_permission(Permission::ViewReports)
    }
}
