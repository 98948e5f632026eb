//! Notification record: created by the dispatcher, read-flag mutable only by
//! the recipient, never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    /// Recipient account id.
    pub user_id: String,
    pub task_id: String,
    /// Type tag, see [`crate::constants::notification_types`].
    pub kind: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
