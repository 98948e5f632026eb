//! # System Assembly
//!
//! Wires the directory, engine, and supporting services onto one document
//! store and one configuration. Components share the store through `Arc`,
//! so a system is cheap to construct per process and its pieces can be
//! borrowed independently.

use crate::config::CampaignConfig;
use crate::directory::UserDirectory;
use crate::error::Result;
use crate::identity::IdentityProvider;
use crate::models::UserAccount;
use crate::services::{
    ActivityLogger, NotificationDispatcher, ProgressAggregator, RealtimeProjection,
};
use crate::store::{DocumentStore, MemoryStore};
use crate::workflow::{AdvancePolicy, ApprovalEngine};
use std::sync::Arc;

pub struct CampaignSystem {
    store: Arc<dyn DocumentStore>,
    config: CampaignConfig,
    activity: Arc<ActivityLogger>,
    notifier: Arc<NotificationDispatcher>,
    aggregator: Arc<ProgressAggregator>,
    directory: UserDirectory,
    engine: ApprovalEngine,
}

impl CampaignSystem {
    pub fn new(store: Arc<dyn DocumentStore>, config: CampaignConfig) -> Self {
        Self::with_policy(store, config, AdvancePolicy::default())
    }

    /// Assemble the system over a fresh in-memory store sized from
    /// `config.event_channel_capacity`.
    pub fn in_memory(config: CampaignConfig) -> Self {
        let store = Arc::new(MemoryStore::with_channel_capacity(
            config.event_channel_capacity,
        ));
        Self::new(store, config)
    }

    pub fn with_policy(
        store: Arc<dyn DocumentStore>,
        config: CampaignConfig,
        policy: AdvancePolicy,
    ) -> Self {
        let activity = Arc::new(ActivityLogger::new(store.clone()));
        let notifier = Arc::new(NotificationDispatcher::new(store.clone()));
        let aggregator = Arc::new(ProgressAggregator::new(store.clone()));
        let directory = UserDirectory::new(store.clone(), activity.clone(), config.clone());
        let engine = ApprovalEngine::new(
            store.clone(),
            activity.clone(),
            notifier.clone(),
            aggregator.clone(),
        )
        .with_policy(policy);

        Self {
            store,
            config,
            activity,
            notifier,
            aggregator,
            directory,
            engine,
        }
    }

    /// Run the interactive sign-in flow against `provider` and resolve the
    /// resulting principal to a directory account.
    pub async fn sign_in_interactive(
        &self,
        provider: &dyn IdentityProvider,
    ) -> Result<UserAccount> {
        let auth = provider.sign_in_interactive().await?;
        self.directory.handle_sign_in(&auth).await
    }

    /// Credential sign-in against `provider`, resolved to a directory
    /// account.
    pub async fn sign_in_with_credentials(
        &self,
        provider: &dyn IdentityProvider,
        email: &str,
        password: &str,
    ) -> Result<UserAccount> {
        let auth = provider.sign_in_with_credentials(email, password).await?;
        self.directory.handle_sign_in(&auth).await
    }

    /// Start a realtime board projection, tracking `user_id`'s unread badge
    /// when given.
    pub fn project(&self, user_id: Option<String>) -> RealtimeProjection {
        RealtimeProjection::spawn(self.store.clone(), self.aggregator.clone(), user_id)
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    pub fn engine(&self) -> &ApprovalEngine {
        &self.engine
    }

    pub fn activity(&self) -> &ActivityLogger {
        &self.activity
    }

    pub fn notifications(&self) -> &NotificationDispatcher {
        &self.notifier
    }

    pub fn progress(&self) -> &ProgressAggregator {
        &self.aggregator
    }

    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }
}
