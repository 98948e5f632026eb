//! End-to-end lifecycle tests through the assembled system: provisioning
//! accounts from sign-ins, driving tasks through the approval chain, and
//! checking the rollup, audit, and notification side effects.

use campaign_core::config::CampaignConfig;
use campaign_core::constants::{actions, collections, ApprovalLevel, Role};
use campaign_core::models::{AuthUser, NewTask};
use campaign_core::store::{DocumentStore, MemoryStore};
use campaign_core::system::CampaignSystem;
use campaign_core::workflow::{AdvancePolicy, ApprovalOutcome, TaskStatus};
use campaign_core::UserAccount;
use std::sync::Arc;

fn auth(uid: &str, email: &str, name: &str) -> AuthUser {
    AuthUser {
        uid: uid.to_string(),
        display_name: Some(name.to_string()),
        email: email.to_string(),
        photo_url: None,
        provider: "password".to_string(),
    }
}

struct Cast {
    editor: UserAccount,
    supervisor: UserAccount,
    manager: UserAccount,
    admin: UserAccount,
}

/// Provision one account per approval role. Admin comes from the allow-list;
/// editor from the organization domain; supervisor and manager are promoted
/// by the admin, since role resolution alone never grants those roles.
async fn provision_cast(system: &CampaignSystem) -> Cast {
    let directory = system.directory();
    let admin = directory
        .handle_sign_in(&auth("a1", "admin@nobles.jo", "Amal"))
        .await
        .unwrap();
    let editor = directory
        .handle_sign_in(&auth("e1", "dana@nobles.jo", "Dana"))
        .await
        .unwrap();
    let supervisor = directory
        .handle_sign_in(&auth("s1", "sami@nobles.jo", "Sami"))
        .await
        .unwrap();
    let manager = directory
        .handle_sign_in(&auth("m1", "mira@nobles.jo", "Mira"))
        .await
        .unwrap();

    directory
        .update_user_role(&admin, "s1", Role::Supervisor)
        .await
        .unwrap();
    directory
        .update_user_role(&admin, "m1", Role::Manager)
        .await
        .unwrap();

    Cast {
        editor,
        supervisor: directory.get("s1").await.unwrap(),
        manager: directory.get("m1").await.unwrap(),
        admin,
    }
}

fn system() -> (Arc<MemoryStore>, CampaignSystem) {
    let store = Arc::new(MemoryStore::new());
    let system = CampaignSystem::new(store.clone(), CampaignConfig::default());
    (store, system)
}

#[tokio::test]
async fn two_stage_flow_still_advances_through_global_sequence() {
    let (_, system) = system();
    let cast = provision_cast(&system).await;
    let engine = system.engine();

    let mut new_task = NewTask::new(1, "Launch teaser video");
    new_task.approval_flow = vec![Role::Editor, Role::Supervisor];
    let task = engine.create_task(&cast.editor, new_task).await.unwrap();

    engine.start(&cast.editor, &task.id).await.unwrap();
    engine
        .submit_for_review(&cast.editor, &task.id, vec!["teaser.mp4".to_string()])
        .await
        .unwrap();

    let first = engine
        .request_approval(&cast.editor, &task.id, ApprovalLevel::Level1)
        .await
        .unwrap();
    let outcome = engine
        .approve(&cast.editor, &task.id, &first, None)
        .await
        .unwrap();
    let second = match outcome {
        ApprovalOutcome::Advanced { level, approval_id } => {
            assert_eq!(level, ApprovalLevel::Level2);
            approval_id
        }
        other => panic!("unexpected outcome: {other:?}"),
    };

    // Level-2 approval request notified the supervisor.
    assert!(
        system
            .notifications()
            .unread_count(&cast.supervisor.id)
            .await
            .unwrap()
            >= 1
    );

    // Even though the task's own template names only two stages, clearing
    // the second advances to the third global stage instead of finalizing.
    let outcome = engine
        .approve(&cast.supervisor, &task.id, &second, None)
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        ApprovalOutcome::Advanced {
            level: ApprovalLevel::Level3,
            ..
        }
    ));
    let task = engine.tasks().get(&task.id).await.unwrap();
    assert_eq!(task.status, TaskStatus::PendingApproval);
    assert_eq!(task.current_approval_level, Some(ApprovalLevel::Level3));
}

#[tokio::test]
async fn task_flow_policy_finalizes_after_template_stages() {
    let store = Arc::new(MemoryStore::new());
    let system =
        CampaignSystem::with_policy(store, CampaignConfig::default(), AdvancePolicy::TaskFlow);
    let cast = provision_cast(&system).await;
    let engine = system.engine();

    let mut new_task = NewTask::new(1, "Launch teaser video");
    new_task.approval_flow = vec![Role::Editor, Role::Supervisor];
    let task = engine.create_task(&cast.editor, new_task).await.unwrap();
    engine.start(&cast.editor, &task.id).await.unwrap();
    engine
        .submit_for_review(&cast.editor, &task.id, vec![])
        .await
        .unwrap();

    let first = engine
        .request_approval(&cast.editor, &task.id, ApprovalLevel::Level1)
        .await
        .unwrap();
    let second = match engine
        .approve(&cast.editor, &task.id, &first, None)
        .await
        .unwrap()
    {
        ApprovalOutcome::Advanced { approval_id, .. } => approval_id,
        other => panic!("unexpected outcome: {other:?}"),
    };
    let outcome = engine
        .approve(&cast.supervisor, &task.id, &second, None)
        .await
        .unwrap();
    assert_eq!(outcome, ApprovalOutcome::FinalApproved);
    assert_eq!(
        engine.tasks().get(&task.id).await.unwrap().status,
        TaskStatus::Approved
    );
}

#[tokio::test]
async fn rejection_records_reason_verbatim_and_blocks_publish() {
    let (_, system) = system();
    let cast = provision_cast(&system).await;
    let engine = system.engine();

    let task = engine
        .create_task(&cast.editor, NewTask::new(2, "Outdoor banners"))
        .await
        .unwrap();
    engine.start(&cast.editor, &task.id).await.unwrap();
    engine
        .submit_for_review(&cast.editor, &task.id, vec![])
        .await
        .unwrap();
    let approval_id = engine
        .request_approval(&cast.editor, &task.id, ApprovalLevel::Level2)
        .await
        .unwrap();

    engine
        .reject(&cast.supervisor, &task.id, &approval_id, "missing deliverable")
        .await
        .unwrap();

    let rejected = engine.tasks().get(&task.id).await.unwrap();
    assert_eq!(rejected.status, TaskStatus::Rejected);
    assert_eq!(
        rejected.rejection_reason.as_deref(),
        Some("missing deliverable")
    );

    let err = engine.publish(&cast.manager, &task.id).await.unwrap_err();
    assert!(err.is_precondition());
    assert_eq!(
        engine.tasks().get(&task.id).await.unwrap().status,
        TaskStatus::Rejected
    );

    // The assignee resumes work manually; nothing advances automatically.
    engine.start(&cast.editor, &task.id).await.unwrap();
    assert_eq!(
        engine.tasks().get(&task.id).await.unwrap().status,
        TaskStatus::InProgress
    );
}

#[tokio::test]
async fn full_chain_to_publish_updates_rollup() {
    let (store, system) = system();
    let cast = provision_cast(&system).await;
    let engine = system.engine();

    // Twenty tasks; five driven to published.
    let mut ids = Vec::new();
    for i in 0..20 {
        let task = engine
            .create_task(&cast.editor, NewTask::new(1, format!("Task {i}")))
            .await
            .unwrap();
        ids.push(task.id);
    }
    for id in ids.iter().take(5) {
        engine.start(&cast.editor, id).await.unwrap();
        engine
            .submit_for_review(&cast.editor, id, vec![])
            .await
            .unwrap();
        let mut approval_id = engine
            .request_approval(&cast.editor, id, ApprovalLevel::Level1)
            .await
            .unwrap();
        loop {
            match engine
                .approve(&cast.admin, id, &approval_id, None)
                .await
                .unwrap()
            {
                ApprovalOutcome::Advanced { approval_id: next, .. } => approval_id = next,
                ApprovalOutcome::FinalApproved => break,
            }
        }
        engine.publish(&cast.manager, id).await.unwrap();

        let published = engine.tasks().get(id).await.unwrap();
        assert_eq!(published.status, TaskStatus::Published);
        assert_eq!(published.progress, 100);
    }

    let snapshot = store
        .get(collections::KPI, collections::CAMPAIGN_PROGRESS_DOC)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.data["total_tasks"], 20);
    assert_eq!(snapshot.data["completed_tasks"], 5);
    assert_eq!(snapshot.data["progress_percentage"], 25);
}

#[tokio::test]
async fn at_most_one_pending_approval_per_task() {
    let (_, system) = system();
    let cast = provision_cast(&system).await;
    let engine = system.engine();

    let task = engine
        .create_task(&cast.editor, NewTask::new(1, "Radio spot"))
        .await
        .unwrap();
    engine.start(&cast.editor, &task.id).await.unwrap();
    engine
        .submit_for_review(&cast.editor, &task.id, vec![])
        .await
        .unwrap();
    engine
        .request_approval(&cast.editor, &task.id, ApprovalLevel::Level1)
        .await
        .unwrap();

    let err = engine
        .request_approval(&cast.editor, &task.id, ApprovalLevel::Level1)
        .await
        .unwrap_err();
    assert!(err.is_precondition());
}

#[tokio::test]
async fn final_approval_is_terminal_for_the_chain() {
    let (_, system) = system();
    let cast = provision_cast(&system).await;
    let engine = system.engine();

    let task = engine
        .create_task(&cast.editor, NewTask::new(3, "Wrap-up report"))
        .await
        .unwrap();
    engine.start(&cast.editor, &task.id).await.unwrap();
    engine
        .submit_for_review(&cast.editor, &task.id, vec![])
        .await
        .unwrap();
    let approval_id = engine
        .request_approval(&cast.editor, &task.id, ApprovalLevel::Level4)
        .await
        .unwrap();

    let outcome = engine
        .approve(&cast.admin, &task.id, &approval_id, Some("done".to_string()))
        .await
        .unwrap();
    assert_eq!(outcome, ApprovalOutcome::FinalApproved);

    let task = engine.tasks().get(&task.id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Approved);
    assert!(task.final_approved_at.is_some());

    // Deciding the already-decided record again is refused.
    let err = engine
        .approve(&cast.admin, &task.id, &approval_id, None)
        .await
        .unwrap_err();
    assert!(err.is_precondition());
}

#[tokio::test]
async fn self_role_change_is_always_refused() {
    let (_, system) = system();
    let cast = provision_cast(&system).await;

    let err = system
        .directory()
        .update_user_role(&cast.admin, &cast.admin.id, Role::SuperAdmin)
        .await
        .unwrap_err();
    assert!(err.is_authorization());
    assert_eq!(
        system.directory().get(&cast.admin.id).await.unwrap().role,
        Role::Admin
    );
}

#[tokio::test]
async fn submission_notifies_first_review_stage() {
    let (_, system) = system();
    let cast = provision_cast(&system).await;
    let engine = system.engine();

    let task = engine
        .create_task(&cast.editor, NewTask::new(1, "Street interviews"))
        .await
        .unwrap();
    engine.start(&cast.editor, &task.id).await.unwrap();
    engine
        .submit_for_review(&cast.editor, &task.id, vec![])
        .await
        .unwrap();

    // First review sits with supervisors, not with the submitting editor.
    assert_eq!(
        system
            .notifications()
            .unread_count(&cast.supervisor.id)
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        system
            .notifications()
            .unread_count(&cast.editor.id)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn audit_trail_covers_the_whole_lifecycle() {
    let (_, system) = system();
    let cast = provision_cast(&system).await;
    let engine = system.engine();

    let task = engine
        .create_task(&cast.editor, NewTask::new(1, "Landing page"))
        .await
        .unwrap();
    engine.start(&cast.editor, &task.id).await.unwrap();
    engine
        .submit_for_review(&cast.editor, &task.id, vec![])
        .await
        .unwrap();
    let approval_id = engine
        .request_approval(&cast.editor, &task.id, ApprovalLevel::Level4)
        .await
        .unwrap();
    engine
        .approve(&cast.admin, &task.id, &approval_id, None)
        .await
        .unwrap();
    engine.publish(&cast.manager, &task.id).await.unwrap();

    let entries = system.activity().recent(50).await.unwrap();
    let recorded: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
    for action in [
        actions::TASK_CREATED,
        actions::STATUS_CHANGED,
        actions::SUBMITTED_REVIEW,
        actions::FINAL_APPROVED,
        actions::PUBLISHED,
    ] {
        assert!(recorded.contains(&action), "missing audit action {action}");
    }
}

#[tokio::test]
async fn projection_follows_the_lifecycle() {
    let (_, system) = system();
    let cast = provision_cast(&system).await;
    let engine = system.engine();

    let projection = system.project(Some(cast.supervisor.id.clone()));
    let mut revision = projection.watch_revision();

    let task = engine
        .create_task(&cast.editor, NewTask::new(1, "Teaser"))
        .await
        .unwrap();
    engine.start(&cast.editor, &task.id).await.unwrap();
    engine
        .submit_for_review(&cast.editor, &task.id, vec![])
        .await
        .unwrap();

    tokio::time::timeout(std::time::Duration::from_secs(2), async {
        loop {
            let board = projection.tasks_for_phase(1);
            if board.len() == 1
                && board[0].status == TaskStatus::PendingReview
                && projection.unread_count() == 1
            {
                break;
            }
            revision.changed().await.unwrap();
        }
    })
    .await
    .unwrap();

    projection.shutdown();
}
