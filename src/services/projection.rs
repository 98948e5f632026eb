//! # Realtime Board Projection
//!
//! Client-facing read model fed by the store's standing queries. Each push
//! event carries the full task result set, so the projection replaces its
//! board wholesale rather than patching it, and a lagged subscriber that
//! skipped events still converges on the next one. Task events also trigger
//! a progress recompute; a second optional subscription keeps the signed-in
//! principal's unread-notification badge current.

use crate::constants::collections;
use crate::error::Result;
use crate::models::{Notification, Task};
use crate::services::ProgressAggregator;
use crate::store::{decode_all, DocumentStore};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Default)]
struct BoardState {
    /// Tasks partitioned by campaign phase, each partition newest first.
    phases: HashMap<u8, Vec<Task>>,
    unread_count: usize,
}

/// Live view over the task board and the current principal's unread badge.
///
/// Dropping or shutting the projection down releases its standing queries.
pub struct RealtimeProjection {
    board: Arc<RwLock<BoardState>>,
    revision_rx: watch::Receiver<u64>,
    tasks_handle: JoinHandle<()>,
    notifications_handle: Option<JoinHandle<()>>,
}

impl RealtimeProjection {
    /// Open standing queries and start projecting. When `user_id` is given,
    /// the unread-notification badge is tracked for that principal.
    pub fn spawn(
        store: Arc<dyn DocumentStore>,
        aggregator: Arc<ProgressAggregator>,
        user_id: Option<String>,
    ) -> Self {
        let board = Arc::new(RwLock::new(BoardState::default()));
        let (revision_tx, revision_rx) = watch::channel(0u64);
        let revision_tx = Arc::new(revision_tx);

        let tasks_handle = {
            let board = board.clone();
            let revision_tx = revision_tx.clone();
            let mut subscription = store.watch(collections::TASKS);
            tokio::spawn(async move {
                while let Some(event) = subscription.next_event().await {
                    match decode_all::<Task>(&event.documents) {
                        Ok(tasks) => {
                            let mut phases: HashMap<u8, Vec<Task>> = HashMap::new();
                            for task in tasks {
                                phases.entry(task.phase).or_default().push(task);
                            }
                            for partition in phases.values_mut() {
                                partition.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                            }
                            board.write().phases = phases;
                            revision_tx.send_modify(|r| *r += 1);
                        }
                        Err(error) => {
                            tracing::warn!(%error, "skipping malformed task snapshot");
                            continue;
                        }
                    }
                    if let Err(error) = aggregator.recompute().await {
                        tracing::warn!(%error, "progress recompute failed");
                    }
                }
            })
        };

        let notifications_handle = user_id.map(|user_id| {
            let board = board.clone();
            let mut subscription = store.watch(collections::NOTIFICATIONS);
            tokio::spawn(async move {
                while let Some(event) = subscription.next_event().await {
                    match decode_all::<Notification>(&event.documents) {
                        Ok(notifications) => {
                            let unread = notifications
                                .iter()
                                .filter(|n| n.user_id == user_id && !n.read)
                                .count();
                            board.write().unread_count = unread;
                            revision_tx.send_modify(|r| *r += 1);
                        }
                        Err(error) => {
                            tracing::warn!(%error, "skipping malformed notification snapshot");
                        }
                    }
                }
            })
        });

        Self {
            board,
            revision_rx,
            tasks_handle,
            notifications_handle,
        }
    }

    /// Tasks in one campaign phase, newest first.
    pub fn tasks_for_phase(&self, phase: u8) -> Vec<Task> {
        self.board
            .read()
            .phases
            .get(&phase)
            .cloned()
            .unwrap_or_default()
    }

    /// Every projected task across all phases.
    pub fn snapshot(&self) -> Vec<Task> {
        let board = self.board.read();
        let mut phases: Vec<&u8> = board.phases.keys().collect();
        phases.sort();
        phases
            .into_iter()
            .flat_map(|phase| board.phases[phase].iter().cloned())
            .collect()
    }

    /// The tracked principal's unread-notification count. Zero when no
    /// principal is tracked.
    pub fn unread_count(&self) -> usize {
        self.board.read().unread_count
    }

    /// A channel that ticks whenever the projection absorbs an event. Lets
    /// callers await convergence instead of polling.
    pub fn watch_revision(&self) -> watch::Receiver<u64> {
        self.revision_rx.clone()
    }

    /// Stop projecting and release the standing queries.
    pub fn shutdown(self) {
        self.tasks_handle.abort();
        if let Some(handle) = self.notifications_handle {
            handle.abort();
        }
    }
}
