//! # Structured Error Handling
//!
//! Error taxonomy for the campaign workflow core. Authorization and
//! precondition failures are raised before any remote mutation is attempted;
//! remote failures abort the operation at the point of failure with no
//! compensating rollback of sub-steps already committed.

use thiserror::Error;

/// Classification of a failed remote call, derived from provider error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteErrorKind {
    /// Network round trip failed.
    Network,
    /// Bad credentials, weak password, dismissed sign-in prompt.
    Credential,
    /// Account already exists for the given identity.
    DuplicateAccount,
    /// Anything the provider reports that we do not classify further.
    Unknown,
}

impl RemoteErrorKind {
    /// Map a provider-supplied error code onto a user-facing category.
    pub fn from_provider_code(code: &str) -> Self {
        match code {
            "auth/network-request-failed" => Self::Network,
            "auth/user-not-found"
            | "auth/wrong-password"
            | "auth/weak-password"
            | "auth/popup-closed-by-user" => Self::Credential,
            "auth/email-already-in-use" => Self::DuplicateAccount,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Credential => "credential",
            Self::DuplicateAccount => "duplicate_account",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Caller lacks the permission or role required for the operation.
    #[error("authorization error: {0}")]
    Authorization(String),

    /// Operation attempted against an entity whose state does not permit it.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// A document-store or identity-provider call failed.
    #[error("remote operation failed ({kind}): {message}")]
    Remote {
        kind: RemoteErrorKind,
        message: String,
    },

    /// The referenced document does not exist.
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// A stored document could not be decoded into its model type.
    #[error("invalid document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}

impl WorkflowError {
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

/// Construct an authorization error.
pub fn authorization(message: impl Into<String>) -> WorkflowError {
    WorkflowError::Authorization(message.into())
}

/// Construct a precondition error.
pub fn precondition(message: impl Into<String>) -> WorkflowError {
    WorkflowError::Precondition(message.into())
}

/// Construct a remote failure from a provider error code and message.
pub fn remote_failure(code: &str, message: impl Into<String>) -> WorkflowError {
    WorkflowError::Remote {
        kind: RemoteErrorKind::from_provider_code(code),
        message: message.into(),
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
