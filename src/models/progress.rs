//! # Campaign Progress Snapshot
//!
//! The singleton aggregate summarizing task completion across the whole
//! campaign. It is fully recomputed on every task-state-affecting event and
//! merge-upserted so unrelated KPI fields (reach, engagement, leads) survive
//! each rewrite. Last writer wins under concurrent recomputation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The counts a single recomputation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressStats {
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub in_progress_tasks: u32,
    /// round(100 * completed / total); 0 when there are no tasks.
    pub progress_percentage: u8,
}

impl ProgressStats {
    pub fn compute(total: u32, completed: u32, in_progress: u32) -> Self {
        let progress_percentage = if total > 0 {
            ((completed as f64 / total as f64) * 100.0).round() as u8
        } else {
            0
        };
        Self {
            total_tasks: total,
            completed_tasks: completed,
            in_progress_tasks: in_progress,
            progress_percentage,
        }
    }
}

/// The full snapshot document, including the KPI target fields the
/// aggregator never touches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignProgress {
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub in_progress_tasks: u32,
    pub progress_percentage: u8,
    #[serde(default)]
    pub reach_target: Option<u64>,
    #[serde(default)]
    pub reach_current: Option<u64>,
    #[serde(default)]
    pub engagement_target: Option<u64>,
    #[serde(default)]
    pub engagement_current: Option<u64>,
    #[serde(default)]
    pub leads_target: Option<u64>,
    #[serde(default)]
    pub leads_current: Option<u64>,
    pub updated_at: DateTime<Utc>,
}
