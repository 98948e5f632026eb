//! # Data Layer
//!
//! Typed models for every logical collection in the backing document store.
//! Each model serializes to the JSON document shape the store persists; the
//! document id is carried inside the payload so a decoded model is
//! self-contained.

pub mod activity;
pub mod approval;
pub mod notification;
pub mod progress;
pub mod task;
pub mod user;

// Re-export core models for easy access
pub use activity::ActivityEntry;
pub use approval::ApprovalRecord;
pub use notification::Notification;
pub use progress::{CampaignProgress, ProgressStats};
pub use task::{NewTask, Task};
pub use user::{AuthUser, UserAccount};
