//! # Approval Chain Engine
//!
//! Drives a task through the role-gated approval lifecycle: a linear state
//! machine with branching terminal outcomes (approve-forward, reject,
//! final-approve) and side effects against the activity log, the
//! notification dispatcher, and the progress aggregator.
//!
//! Every operation takes the acting principal explicitly; there is no
//! ambient current-user state. Authorization and precondition guards run
//! before any remote write. Stage transitions that touch several documents
//! (decide the current approval record, open the next one, move the task)
//! are applied as one atomic store batch, so a crash cannot leave an
//! approval recorded without an active follow-on request.

use super::states::{ApprovalStatus, TaskStatus};
use super::tasks::TaskStore;
use crate::constants::{actions, collections, ApprovalLevel};
use crate::error::{authorization, precondition, Result};
use crate::models::{ApprovalRecord, NewTask, Task, UserAccount};
use crate::services::{ActivityLogger, NotificationDispatcher, ProgressAggregator};
use crate::store::{DocumentStore, WriteOp};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Progress value stamped when work begins, as a visual signal.
const STARTED_PROGRESS: u8 = 10;

/// How the chain determines the next stage after an approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvancePolicy {
    /// Advance through the fixed global 4-level sequence regardless of the
    /// task's own approval-flow template. This reproduces the historical
    /// behavior: a task configured for a 2-stage flow is still driven
    /// through all remaining global stages.
    #[default]
    GlobalSequence,
    /// Honor the task's own approval-flow length: the chain finalizes once
    /// as many stages have cleared as the template names. Tasks with an
    /// empty template fall back to the global sequence.
    TaskFlow,
}

/// What an `approve` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// The chain moved on: a fresh pending record now exists at `level`.
    Advanced {
        level: ApprovalLevel,
        approval_id: String,
    },
    /// The last stage cleared; the task is approved and ready to publish.
    FinalApproved,
}

pub struct ApprovalEngine {
    store: Arc<dyn DocumentStore>,
    tasks: TaskStore,
    activity: Arc<ActivityLogger>,
    notifier: Arc<NotificationDispatcher>,
    aggregator: Arc<ProgressAggregator>,
    advance_policy: AdvancePolicy,
}

impl ApprovalEngine {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        activity: Arc<ActivityLogger>,
        notifier: Arc<NotificationDispatcher>,
        aggregator: Arc<ProgressAggregator>,
    ) -> Self {
        Self {
            tasks: TaskStore::new(store.clone()),
            store,
            activity,
            notifier,
            aggregator,
            advance_policy: AdvancePolicy::default(),
        }
    }

    pub fn with_policy(mut self, advance_policy: AdvancePolicy) -> Self {
        self.advance_policy = advance_policy;
        self
    }

    /// The underlying task entity store.
    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    /// Create a task. Requires task-creation permission.
    pub async fn create_task(&self, actor: &UserAccount, new_task: NewTask) -> Result<Task> {
        if !actor.can_manage_tasks() {
            return Err(authorization("creating tasks requires a task permission"));
        }

        let task = self.tasks.create(new_task, &actor.id).await?;
        self.activity
            .record(
                actor,
                actions::TASK_CREATED,
                Some(&task.id),
                task.title.clone(),
            )
            .await;
        Ok(task)
    }

    /// Begin (or, after a rejection, resume) work on a task.
    pub async fn start(&self, actor: &UserAccount, task_id: &str) -> Result<()> {
        let task = self.tasks.get(task_id).await?;
        if !task.status.allows_start() {
            return Err(precondition(format!(
                "task {task_id} cannot be started from status {}",
                task.status
            )));
        }

        self.tasks
            .update_fields(
                task_id,
                json!({
                    "status": TaskStatus::InProgress,
                    "progress": STARTED_PROGRESS,
                    "last_updated_by": actor.id,
                }),
            )
            .await?;

        self.activity
            .record(
                actor,
                actions::STATUS_CHANGED,
                Some(task_id),
                format!("Status changed to {}", TaskStatus::InProgress),
            )
            .await;
        Ok(())
    }

    /// Record an assignee's progress update.
    pub async fn update_progress(
        &self,
        actor: &UserAccount,
        task_id: &str,
        progress: u8,
    ) -> Result<()> {
        self.tasks.update_progress(task_id, progress).await?;
        tracing::debug!(task_id, progress, actor = %actor.id, "progress updated");
        Ok(())
    }

    /// Submit in-progress work for review, stamping submission metadata and
    /// notifying the first reviewing stage's role.
    pub async fn submit_for_review(
        &self,
        actor: &UserAccount,
        task_id: &str,
        deliverables: Vec<String>,
    ) -> Result<()> {
        let task = self.tasks.get(task_id).await?;
        if task.status != TaskStatus::InProgress {
            return Err(precondition(format!(
                "task {task_id} cannot be submitted from status {}",
                task.status
            )));
        }

        self.tasks
            .update_fields(
                task_id,
                json!({
                    "status": TaskStatus::PendingReview,
                    "deliverables": deliverables,
                    "submitted_at": Utc::now(),
                    "submitted_by": actor.id,
                }),
            )
            .await?;

        self.activity
            .record(
                actor,
                actions::SUBMITTED_REVIEW,
                Some(task_id),
                "Task submitted for review",
            )
            .await;
        self.notifier
            .notify_approvers(task_id, ApprovalLevel::FIRST_REVIEW)
            .await?;
        Ok(())
    }

    /// Open a pending approval record at `level` and move the task into
    /// `pending_approval`. Refused while another record is still pending,
    /// which keeps the at-most-one-pending invariant.
    pub async fn request_approval(
        &self,
        actor: &UserAccount,
        task_id: &str,
        level: ApprovalLevel,
    ) -> Result<String> {
        let task = self.tasks.get(task_id).await?;
        self.ensure_no_pending_approval(&task).await?;

        let record = ApprovalRecord::pending(Uuid::new_v4().to_string(), task_id, level, &actor.id);
        let approval_id = record.id.clone();

        self.store
            .apply_batch(vec![
                WriteOp::Create {
                    collection: collections::APPROVALS.to_string(),
                    id: approval_id.clone(),
                    data: serde_json::to_value(&record)?,
                },
                WriteOp::Update {
                    collection: collections::TASKS.to_string(),
                    id: task_id.to_string(),
                    fields: json!({
                        "status": TaskStatus::PendingApproval,
                        "current_approval_id": approval_id,
                        "current_approval_level": level,
                        "updated_at": Utc::now(),
                    }),
                },
            ])
            .await?;

        self.notifier.notify_approvers(task_id, level).await?;
        Ok(approval_id)
    }

    /// Decide the task's active approval record in the affirmative and
    /// either chain into the next stage or finalize.
    pub async fn approve(
        &self,
        actor: &UserAccount,
        task_id: &str,
        approval_id: &str,
        comments: Option<String>,
    ) -> Result<ApprovalOutcome> {
        let task = self.tasks.get(task_id).await?;
        let level = self.check_decision_guards(actor, &task, approval_id)?;

        let decided = json!({
            "status": ApprovalStatus::Approved,
            "decided_by": actor.id,
            "decided_at": Utc::now(),
            "comments": comments,
        });

        match self.next_level(&task, level) {
            Some(next) => {
                let record =
                    ApprovalRecord::pending(Uuid::new_v4().to_string(), task_id, next, &actor.id);
                let next_approval_id = record.id.clone();

                self.store
                    .apply_batch(vec![
                        WriteOp::Update {
                            collection: collections::APPROVALS.to_string(),
                            id: approval_id.to_string(),
                            fields: decided,
                        },
                        WriteOp::Create {
                            collection: collections::APPROVALS.to_string(),
                            id: next_approval_id.clone(),
                            data: serde_json::to_value(&record)?,
                        },
                        WriteOp::Update {
                            collection: collections::TASKS.to_string(),
                            id: task_id.to_string(),
                            fields: json!({
                                "status": TaskStatus::PendingApproval,
                                "current_approval_id": next_approval_id,
                                "current_approval_level": next,
                                "updated_at": Utc::now(),
                            }),
                        },
                    ])
                    .await?;

                self.activity
                    .record(
                        actor,
                        actions::APPROVED,
                        Some(task_id),
                        format!("Approved at {}", level.title()),
                    )
                    .await;
                self.notifier.notify_approvers(task_id, next).await?;
                Ok(ApprovalOutcome::Advanced {
                    level: next,
                    approval_id: next_approval_id,
                })
            }
            None => {
                self.store
                    .apply_batch(vec![
                        WriteOp::Update {
                            collection: collections::APPROVALS.to_string(),
                            id: approval_id.to_string(),
                            fields: decided,
                        },
                        WriteOp::Update {
                            collection: collections::TASKS.to_string(),
                            id: task_id.to_string(),
                            fields: json!({
                                "status": TaskStatus::Approved,
                                "final_approved_at": Utc::now(),
                                "final_approved_by": actor.id,
                                "updated_at": Utc::now(),
                            }),
                        },
                    ])
                    .await?;

                self.activity
                    .record(
                        actor,
                        actions::FINAL_APPROVED,
                        Some(task_id),
                        "Final approval granted, ready to publish",
                    )
                    .await;
                Ok(ApprovalOutcome::FinalApproved)
            }
        }
    }

    /// Decide the active approval record in the negative. The task parks in
    /// `rejected` until the assignee manually restarts it; there is no
    /// automatic re-notification.
    pub async fn reject(
        &self,
        actor: &UserAccount,
        task_id: &str,
        approval_id: &str,
        reason: &str,
    ) -> Result<()> {
        let task = self.tasks.get(task_id).await?;
        self.check_decision_guards(actor, &task, approval_id)?;

        self.store
            .apply_batch(vec![
                WriteOp::Update {
                    collection: collections::APPROVALS.to_string(),
                    id: approval_id.to_string(),
                    fields: json!({
                        "status": ApprovalStatus::Rejected,
                        "decided_by": actor.id,
                        "decided_at": Utc::now(),
                        "rejection_reason": reason,
                    }),
                },
                WriteOp::Update {
                    collection: collections::TASKS.to_string(),
                    id: task_id.to_string(),
                    fields: json!({
                        "status": TaskStatus::Rejected,
                        "rejection_reason": reason,
                        "updated_at": Utc::now(),
                    }),
                },
            ])
            .await?;

        self.activity
            .record(
                actor,
                actions::REJECTED,
                Some(task_id),
                format!("Rejected: {reason}"),
            )
            .await;
        Ok(())
    }

    /// Publish an approved task. Requires publish permission and
    /// `status == approved`; otherwise refused with no state change.
    pub async fn publish(&self, actor: &UserAccount, task_id: &str) -> Result<()> {
        if !actor.can_publish() {
            return Err(authorization("publishing requires the publish permission"));
        }

        let task = self.tasks.get(task_id).await?;
        if task.status != TaskStatus::Approved {
            return Err(precondition(format!(
                "task {task_id} is not approved (status {})",
                task.status
            )));
        }

        self.tasks
            .update_fields(
                task_id,
                json!({
                    "status": TaskStatus::Published,
                    "progress": 100,
                    "published_at": Utc::now(),
                    "published_by": actor.id,
                }),
            )
            .await?;

        self.activity
            .record(actor, actions::PUBLISHED, Some(task_id), "Task published")
            .await;
        self.aggregator.recompute().await?;
        Ok(())
    }

    /// Guards shared by `approve` and `reject`: the task must be awaiting a
    /// decision, `approval_id` must reference its active record, and the
    /// actor must hold the level's required role or administrative
    /// authority.
    fn check_decision_guards(
        &self,
        actor: &UserAccount,
        task: &Task,
        approval_id: &str,
    ) -> Result<ApprovalLevel> {
        if task.status != TaskStatus::PendingApproval {
            return Err(precondition(format!(
                "task {} is not awaiting approval (status {})",
                task.id, task.status
            )));
        }
        if task.current_approval_id.as_deref() != Some(approval_id) {
            return Err(precondition(format!(
                "approval {approval_id} is not the active approval for task {}",
                task.id
            )));
        }
        let level = task
            .current_approval_level
            .ok_or_else(|| precondition(format!("task {} has no approval level", task.id)))?;

        let required = level.required_role();
        if actor.role != required && !actor.role.is_admin() {
            return Err(authorization(format!(
                "deciding {} requires the {required} role",
                level.title()
            )));
        }
        Ok(level)
    }

    async fn ensure_no_pending_approval(&self, task: &Task) -> Result<()> {
        if let Some(current_id) = &task.current_approval_id {
            if let Some(document) = self.store.get(collections::APPROVALS, current_id).await? {
                let record: ApprovalRecord = document.decode()?;
                if record.is_pending() {
                    return Err(precondition(format!(
                        "task {} already has a pending approval ({current_id})",
                        task.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// The stage after `level`, or `None` when the chain finalizes.
    fn next_level(&self, task: &Task, level: ApprovalLevel) -> Option<ApprovalLevel> {
        let next = level.next()?;
        match self.advance_policy {
            AdvancePolicy::GlobalSequence => Some(next),
            AdvancePolicy::TaskFlow => {
                if task.approval_flow.is_empty() {
                    return Some(next);
                }
                let limit = task.approval_flow.len().min(ApprovalLevel::SEQUENCE.len());
                (next.ordinal() < limit).then_some(next)
            }
        }
    }
}
