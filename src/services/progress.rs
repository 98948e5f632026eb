//! # Progress Aggregator
//!
//! Campaign-wide rollup: a full scan of the task collection, not an
//! incremental counter, recomputed after every task-state-affecting event.
//! The singleton snapshot is merge-upserted so unrelated KPI fields survive,
//! and concurrent recomputations resolve last-writer-wins.

use crate::constants::{collections, TaskStatus};
use crate::error::Result;
use crate::models::{CampaignProgress, ProgressStats, Task};
use crate::store::{decode_all, DocumentStore};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

pub struct ProgressAggregator {
    store: Arc<dyn DocumentStore>,
}

impl ProgressAggregator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Scan every task, recompute the counts, and merge the snapshot.
    /// Idempotent given a stable task set.
    pub async fn recompute(&self) -> Result<ProgressStats> {
        let documents = self
            .store
            .query_ordered(collections::TASKS, "created_at", true)
            .await?;
        let tasks: Vec<Task> = decode_all(&documents)?;

        let total = tasks.len() as u32;
        let completed = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Published)
            .count() as u32;
        let in_progress = tasks.iter().filter(|t| t.status.is_active()).count() as u32;

        let stats = ProgressStats::compute(total, completed, in_progress);

        self.store
            .merge(
                collections::KPI,
                collections::CAMPAIGN_PROGRESS_DOC,
                json!({
                    "total_tasks": stats.total_tasks,
                    "completed_tasks": stats.completed_tasks,
                    "in_progress_tasks": stats.in_progress_tasks,
                    "progress_percentage": stats.progress_percentage,
                    "updated_at": Utc::now(),
                }),
            )
            .await?;

        tracing::debug!(
            total = stats.total_tasks,
            completed = stats.completed_tasks,
            percentage = stats.progress_percentage,
            "campaign progress recomputed"
        );
        Ok(stats)
    }

    /// The stored snapshot, including the KPI target fields the aggregator
    /// itself never writes. `None` before the first recomputation.
    pub async fn snapshot(&self) -> Result<Option<CampaignProgress>> {
        match self
            .store
            .get(collections::KPI, collections::CAMPAIGN_PROGRESS_DOC)
            .await?
        {
            Some(document) => Ok(Some(document.decode()?)),
            None => Ok(None),
        }
    }
}
