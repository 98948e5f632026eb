//! # Identity Provider Capability
//!
//! Narrow interface over the third-party identity collaborator. The core
//! consumes sign-in/sign-out primitives and a change-notification channel
//! delivering the current principal or an absence signal; the provider's
//! internal protocol is out of scope.
//!
//! Provider failures surface as [`crate::error::WorkflowError::Remote`] with
//! the provider's error code classified via
//! [`crate::error::RemoteErrorKind::from_provider_code`].

use crate::error::Result;
use crate::models::AuthUser;
use async_trait::async_trait;
use tokio::sync::watch;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Interactive (popup-style) sign-in.
    async fn sign_in_interactive(&self) -> Result<AuthUser>;

    /// Direct credential sign-in.
    async fn sign_in_with_credentials(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Create a new account with the given display name and credentials.
    async fn create_account(&self, name: &str, email: &str, password: &str) -> Result<AuthUser>;

    async fn sign_out(&self) -> Result<()>;

    /// Auth-state channel: `Some(user)` while signed in, `None` otherwise.
    /// The receiver observes every state change until the provider is
    /// dropped.
    fn watch_auth_state(&self) -> watch::Receiver<Option<AuthUser>>;
}
