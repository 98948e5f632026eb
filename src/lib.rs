#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Campaign Core
//!
//! Client-side core of a marketing-campaign task tracker: a role-gated task
//! lifecycle driven through a sequential approval chain, with an activity
//! audit log, approver notifications, a campaign-wide progress rollup, and a
//! realtime board projection.
//!
//! The crate owns workflow semantics only. Durable storage and identity are
//! consumed through two narrow capabilities, [`store::DocumentStore`] and
//! [`identity::IdentityProvider`]; an in-memory store backs the test suite.
//!
//! ## Module Organization
//!
//! - [`workflow`] - Task statuses, the task entity store, and the
//!   [`workflow::ApprovalEngine`] driving role-gated transitions
//! - [`directory`] - Account provisioning, role resolution, administration
//! - [`services`] - Activity log, notification fan-out, progress rollup,
//!   realtime projection
//! - [`models`] - Typed documents exchanged with the store
//! - [`store`] / [`identity`] - Collaborator capabilities
//! - [`system`] - One-stop assembly of the above onto a store and a config
//! - [`config`] / [`logging`] / [`error`] / [`constants`] - Ambient support
//!
//! ## Example
//!
//! ```no_run
//! use campaign_core::config::CampaignConfig;
//! use campaign_core::store::MemoryStore;
//! use campaign_core::system::CampaignSystem;
//! use std::sync::Arc;
//!
//! let system = CampaignSystem::new(Arc::new(MemoryStore::new()), CampaignConfig::default());
//! let _board = system.project(None);
//! ```

pub mod config;
pub mod constants;
pub mod directory;
pub mod error;
pub mod identity;
pub mod logging;
pub mod models;
pub mod services;
pub mod store;
pub mod system;
pub mod workflow;

pub use config::CampaignConfig;
pub use constants::{ApprovalLevel, Permission, Role};
pub use directory::UserDirectory;
pub use error::{Result, WorkflowError};
pub use models::{NewTask, Task, UserAccount};
pub use system::CampaignSystem;
pub use workflow::{AdvancePolicy, ApprovalEngine, ApprovalOutcome, ApprovalStatus, TaskStatus};
