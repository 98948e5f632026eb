//! # User/Role Directory
//!
//! Maps an authenticated principal to a role and permission set, answers
//! authorization queries, and administers accounts. The role is resolved by
//! a deterministic rule evaluated once, at account creation: admin allow-list
//! first, then the organization email domain, then viewer. Accounts are
//! deactivated rather than deleted, and no principal can alter or deactivate
//! its own account.

use crate::config::CampaignConfig;
use crate::constants::{actions, collections, Role};
use crate::error::{authorization, Result, WorkflowError};
use crate::models::{AuthUser, UserAccount};
use crate::services::ActivityLogger;
use crate::store::{decode_all, DocumentStore};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

pub struct UserDirectory {
    store: Arc<dyn DocumentStore>,
    activity: Arc<ActivityLogger>,
    config: CampaignConfig,
}

impl UserDirectory {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        activity: Arc<ActivityLogger>,
        config: CampaignConfig,
    ) -> Self {
        Self {
            store,
            activity,
            config,
        }
    }

    /// Deterministic role assignment, evaluated at account creation only.
    pub fn resolve_role(&self, email: &str) -> Role {
        if self.config.admin_emails.iter().any(|e| e == email) {
            Role::Admin
        } else if email.ends_with(&format!("@{}", self.config.organization_domain)) {
            Role::Editor
        } else {
            Role::Viewer
        }
    }

    /// Provision the account on first sign-in, or refresh last-login and
    /// photo on a returning one. Deactivated accounts are refused.
    pub async fn handle_sign_in(&self, auth: &AuthUser) -> Result<UserAccount> {
        match self.store.get(collections::USERS, &auth.uid).await? {
            Some(document) => {
                let account: UserAccount = document.decode()?;
                if !account.is_active {
                    return Err(authorization("account is deactivated"));
                }
                let now = Utc::now();
                self.store
                    .update(
                        collections::USERS,
                        &auth.uid,
                        json!({
                            "last_login": now,
                            "photo_url": auth.photo_url,
                        }),
                    )
                    .await?;
                Ok(UserAccount {
                    last_login: now,
                    photo_url: auth.photo_url.clone(),
                    ..account
                })
            }
            None => self.create_account(auth).await,
        }
    }

    async fn create_account(&self, auth: &AuthUser) -> Result<UserAccount> {
        let role = self.resolve_role(&auth.email);
        let name = auth
            .display_name
            .clone()
            .unwrap_or_else(|| auth.email.split('@').next().unwrap_or_default().to_string());
        let now = Utc::now();

        let account = UserAccount {
            id: auth.uid.clone(),
            name,
            email: auth.email.clone(),
            photo_url: auth.photo_url.clone(),
            role,
            permissions: role.permissions().to_vec(),
            is_active: true,
            created_at: now,
            last_login: now,
            provider: auth.provider.clone(),
        };

        self.store
            .set(
                collections::USERS,
                &account.id,
                serde_json::to_value(&account)?,
            )
            .await?;

        self.activity
            .record(
                &account,
                actions::USER_CREATED,
                None,
                format!("New account created: {}", account.name),
            )
            .await;

        tracing::info!(user_id = %account.id, role = %account.role, "account provisioned");
        Ok(account)
    }

    /// Fetch one account by id.
    pub async fn get(&self, user_id: &str) -> Result<UserAccount> {
        match self.store.get(collections::USERS, user_id).await? {
            Some(document) => document.decode(),
            None => Err(WorkflowError::NotFound {
                collection: collections::USERS.to_string(),
                id: user_id.to_string(),
            }),
        }
    }

    /// Every account, newest first. Requires `manage_users`.
    pub async fn all_users(&self, acting: &UserAccount) -> Result<Vec<UserAccount>> {
        if !acting.can_manage_users() {
            return Err(authorization("listing accounts requires manage_users"));
        }
        let documents = self
            .store
            .query_ordered(collections::USERS, "created_at", true)
            .await?;
        decode_all(&documents)
    }

    /// Change another principal's role. Requires `manage_users`; self-role
    /// changes always fail.
    pub async fn update_user_role(
        &self,
        acting: &UserAccount,
        user_id: &str,
        new_role: Role,
    ) -> Result<()> {
        if !acting.can_manage_users() {
            return Err(authorization("changing roles requires manage_users"));
        }
        if acting.id == user_id {
            return Err(authorization("a principal cannot change its own role"));
        }

        self.store
            .update(
                collections::USERS,
                user_id,
                json!({
                    "role": new_role,
                    "permissions": new_role.permissions(),
                    "updated_at": Utc::now(),
                    "updated_by": acting.id,
                }),
            )
            .await?;

        self.activity
            .record(
                acting,
                actions::ROLE_CHANGED,
                None,
                format!("Role of {user_id} changed to {new_role}"),
            )
            .await;
        Ok(())
    }

    /// Activate or deactivate another principal's account. Requires
    /// `manage_users`; self-deactivation always fails.
    pub async fn set_user_active(
        &self,
        acting: &UserAccount,
        user_id: &str,
        is_active: bool,
    ) -> Result<()> {
        if !acting.can_manage_users() {
            return Err(authorization("changing activation requires manage_users"));
        }
        if acting.id == user_id {
            return Err(authorization(
                "a principal cannot change its own activation state",
            ));
        }

        self.store
            .update(
                collections::USERS,
                user_id,
                json!({
                    "is_active": is_active,
                    "updated_at": Utc::now(),
                    "updated_by": acting.id,
                }),
            )
            .await
    }
}
