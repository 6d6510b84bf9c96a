mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use common::{job_ids, jobs, HeldMutator, JobBoard, ScriptedPrompt};
use serde_json::json;
use shared::{
    Adapted, CollectionConfig, Job, JobStatus, MarketplaceAction, MutationCoordinator,
    MutationError, MutationOutcome, MutationRequest, PaginatedCollectionController,
    PerformOptions, Reload,
};

type BoardSource = Adapted<Arc<JobBoard>, shared::JsonPageAdapter<Job>>;

fn board_controller(board: &Arc<JobBoard>) -> PaginatedCollectionController<Job, BoardSource> {
    PaginatedCollectionController::new(
        Arc::new(Adapted::new(Arc::clone(board), Job::page_adapter())),
        CollectionConfig::new("my-jobs").with_page_size(3),
    )
    .unwrap()
}

#[tokio::test]
async fn double_cancel_sends_one_request() {
    let mutator = Arc::new(HeldMutator::default());
    let coordinator = MutationCoordinator::new(Arc::clone(&mutator));
    let board = JobBoard::with_jobs(jobs(1..=3));
    let list = board_controller(&board);

    let first = coordinator.perform(
        MutationRequest::new("cancel", json!({"id": 7})),
        PerformOptions::new(&list),
    );
    let second = async {
        mutator.wait_for_calls(1).await;
        let outcome = coordinator
            .perform(
                MutationRequest::new("cancel", json!({"id": 7})),
                PerformOptions::new(&list),
            )
            .await;
        mutator.release();
        outcome
    };

    let (first, second) = tokio::join!(first, second);
    assert_matches!(first, Ok(MutationOutcome::Completed(_)));
    assert_matches!(
        second,
        Err(MutationError::ConcurrencyRejected { ref action, ref target })
            if action == "cancel" && target.as_deref() == Some("7")
    );
    assert_eq!(mutator.call_count(), 1);
    // The successful cancel reloaded the bound list.
    assert_eq!(board.fetches.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn different_targets_run_concurrently() {
    let mutator = Arc::new(HeldMutator::default());
    let coordinator = MutationCoordinator::new(Arc::clone(&mutator));
    let board = JobBoard::with_jobs(jobs(1..=3));
    let list = board_controller(&board);

    let first = coordinator.perform(MarketplaceAction::Cancel.on(1), PerformOptions::new(&list));
    let second = async {
        mutator.wait_for_calls(1).await;
        let pending = coordinator.perform(MarketplaceAction::Cancel.on(2), PerformOptions::new(&list));
        let release = async {
            mutator.wait_for_calls(2).await;
            mutator.release();
            mutator.release();
        };
        let (outcome, ()) = tokio::join!(pending, release);
        outcome
    };

    let (first, second) = tokio::join!(first, second);
    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(mutator.call_count(), 2);
}

#[tokio::test]
async fn successful_action_refetches_list_from_page_one() {
    let board = JobBoard::with_jobs(jobs(1..=6));
    let list = board_controller(&board);
    list.load().await;
    list.load_more().await;
    assert_eq!(list.items().await.len(), 6);

    let coordinator = MutationCoordinator::new(Arc::clone(&board));
    let outcome = coordinator
        .perform(MarketplaceAction::Cancel.on(2), PerformOptions::new(&list))
        .await;
    assert_matches!(outcome, Ok(MutationOutcome::Completed(body)) if body["status"] == "cancelled");

    let items = list.items().await;
    assert_eq!(job_ids(&items), vec![1, 2, 3]);
    assert_eq!(items[1].status, JobStatus::Cancelled);
    assert_eq!(list.page().await, 1);
}

#[tokio::test]
async fn validation_failure_is_returned_and_list_untouched() {
    let mut all = jobs(1..=3);
    all[0].status = JobStatus::Cancelled;
    let board = JobBoard::with_jobs(all);
    let list = board_controller(&board);
    list.load().await;

    let coordinator = MutationCoordinator::new(Arc::clone(&board));
    let outcome = coordinator
        .perform(MarketplaceAction::Cancel.on(1), PerformOptions::new(&list))
        .await;
    let err = outcome.unwrap_err();
    assert_eq!(
        err.user_message().as_deref(),
        Some("This job is already cancelled")
    );
    assert_eq!(board.fetches.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn declined_prompt_leaves_job_alone() {
    let board = JobBoard::with_jobs(jobs(1..=2));
    let list = board_controller(&board);
    list.load().await;
    let prompt = ScriptedPrompt::answering(false);

    let coordinator = MutationCoordinator::new(Arc::clone(&board));
    let action = MarketplaceAction::Cancel;
    let outcome = coordinator
        .perform(
            action.on(1),
            PerformOptions::new(&list).confirm_with(prompt.as_ref(), action.confirmation().unwrap()),
        )
        .await;

    assert_matches!(outcome, Ok(MutationOutcome::Declined));
    assert_eq!(
        *prompt.messages.lock().unwrap(),
        vec!["Are you sure you want to cancel?".to_string()]
    );
    assert_eq!(board.status_of(1), Some(JobStatus::Open));
    assert!(board.mutations.lock().unwrap().is_empty());
    // Nothing was sent, so nothing was reloaded.
    assert_eq!(board.fetches.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn controller_is_a_reload_target() {
    let board = JobBoard::with_jobs(jobs(1..=4));
    let list = board_controller(&board);
    list.load().await;
    list.load_more().await;

    Reload::reload(&list).await;
    assert_eq!(list.items().await.len(), 3);
}
