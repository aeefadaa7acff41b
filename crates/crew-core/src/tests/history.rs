//! History recorder tests: best-effort decoupling, per-principal
//! append-only ordering, no lost writes under concurrency.

use std::sync::Arc;

use crew_history::{HistoryAction, HistoryError};

use super::common::*;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::tasks::TaskInput;

#[tokio::test]
async fn operations_leave_a_history_trail() {
    for engine in engines().await {
        let owner = test_principal("owner");
        let joiner = test_principal("joiner");

        let project = engine
            .create_project(&owner, new_project("app", 3))
            .await
            .unwrap();
        engine
            .join_project(&joiner, &project.join_code.0)
            .await
            .unwrap();
        engine
            .add_task(
                &owner,
                &project.id,
                TaskInput {
                    title: "write brief".to_string(),
                    description: "d".to_string(),
                    assigned_to: "joiner".to_string(),
                    due_date: None,
                },
            )
            .await
            .unwrap();
        engine.delete_project(&owner, &project.id).await.unwrap();

        let owners = engine.history(&owner).await.unwrap();
        let texts: Vec<_> = owners.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Created project: app",
                "Added task: write brief to project: app",
                "Deleted project: app",
            ]
        );
        let actions: Vec<_> = owners.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                HistoryAction::ProjectCreate,
                HistoryAction::TaskAdd,
                HistoryAction::ProjectDelete,
            ]
        );

        let joiners = engine.history(&joiner).await.unwrap();
        assert_eq!(joiners.len(), 1);
        assert_eq!(joiners[0].text, "Joined project: app");
        assert_eq!(joiners[0].get_principal_id(), joiner.id);
    }
}

#[tokio::test]
async fn rejected_operations_leave_no_trail() {
    let engine = memory_engine();
    let owner = test_principal("owner");
    let member = test_principal("member");

    let project = engine
        .create_project(&owner, new_project("app", 2))
        .await
        .unwrap();
    engine
        .join_project(&member, &project.join_code.0)
        .await
        .unwrap();

    // Forbidden task, failed rejoin, failed join on a full team.
    let _ = engine
        .add_task(
            &member,
            &project.id,
            TaskInput {
                title: "t".to_string(),
                description: "d".to_string(),
                assigned_to: "x".to_string(),
                due_date: None,
            },
        )
        .await
        .unwrap_err();
    let _ = engine
        .join_project(&member, &project.join_code.0)
        .await
        .unwrap_err();
    let _ = engine
        .join_project(&test_principal("late"), &project.join_code.0)
        .await
        .unwrap_err();

    let entries = engine.history(&member).await.unwrap();
    assert_eq!(entries.len(), 1, "only the successful join is recorded");
}

// Ten concurrent operations attributable to one principal must produce
// exactly ten entries: per-principal appends are atomic at the store, so
// none may be lost to a read-modify-write race.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_operations_lose_no_history() {
    for engine in engines().await {
        let principal = test_principal("busy");
        let engine = Arc::new(engine);

        let mut handles = Vec::new();
        for i in 0..10 {
            let engine = Arc::clone(&engine);
            let principal = principal.clone();
            handles.push(tokio::spawn(async move {
                engine
                    .submit_support_query(&principal, &format!("query {}", i))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let entries = engine.history(&principal).await.unwrap();
        assert_eq!(entries.len(), 10);
        assert!(entries
            .iter()
            .all(|e| e.action == HistoryAction::SupportQuery));
    }
}

#[tokio::test]
async fn recorder_failure_does_not_fail_the_primary_operation() {
    let mut mock = MockBackend::new();
    mock.expect_create_project()
        .times(1)
        .returning(|params| Ok(project_from(params)));
    mock.expect_record()
        .times(1)
        .returning(|_| Err(HistoryError::Database("disk full".into())));

    let engine = Engine::new(mock);
    let project = engine
        .create_project(&test_principal("owner"), new_project("app", 2))
        .await
        .unwrap();

    assert_eq!(project.name, "app");
}

#[tokio::test]
async fn support_query_requires_text() {
    let engine = memory_engine();
    let err = engine
        .submit_support_query(&test_principal("user"), "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn support_query_is_recorded_verbatim() {
    let engine = memory_engine();
    let user = test_principal("user");

    engine
        .submit_support_query(&user, "  how do I rotate a join code?  ")
        .await
        .unwrap();

    let entries = engine.history(&user).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].text,
        "Submitted support query: how do I rotate a join code?"
    );
}

#[tokio::test]
async fn history_is_empty_for_unknown_principals() {
    for engine in engines().await {
        let entries = engine.history(&test_principal("ghost")).await.unwrap();
        assert!(entries.is_empty());
    }
}
