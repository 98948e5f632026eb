//! Activity log entry: append-only, ordered by timestamp, never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Action tag, see [`crate::constants::actions`].
    pub action: String,
    #[serde(default)]
    pub task_id: Option<String>,
    pub details: String,
    pub user_id: String,
    pub user_name: String,
    #[serde(default)]
    pub user_email: Option<String>,
    pub timestamp: DateTime<Utc>,
}
