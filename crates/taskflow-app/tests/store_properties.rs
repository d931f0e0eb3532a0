//! End-to-end behaviour of the task and category stores through the façade.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use taskflow_app::{
    AsyncCategoryRepository, AsyncTaskRepository, CategoryRepository, Fixtures, LatencyProfile,
    MemoryStore, MemoryTaskFlow, Operation, TaskFlow, TaskPatch, TaskRepository,
};
use taskflow_core::{
    CategoryId, DateBucket, FilterSpec, FixedClock, HistoryAction, NewCategory, NewTask, Priority,
    Task, TaskId, View, apply_at,
};
use time::OffsetDateTime;
use time::macros::datetime;

const NOW: OffsetDateTime = datetime!(2025-06-16 08:00 UTC);

fn empty_flow(latency: &LatencyProfile) -> (MemoryTaskFlow, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(NOW));
    let flow = TaskFlow::new(
        AsyncTaskRepository::new(
            TaskRepository::new(MemoryStore::new(), clock.clone()),
            latency.clone(),
        ),
        AsyncCategoryRepository::new(CategoryRepository::new(MemoryStore::new()), latency.clone()),
        clock.clone(),
    );
    (flow, clock)
}

#[tokio::test(start_paused = true)]
async fn created_tasks_start_open_with_one_history_entry() {
    let (flow, _) = empty_flow(&LatencyProfile::reference());
    for (expected, title) in (1_u64..).zip(["alpha", "beta", "gamma"]) {
        let task = flow.tasks().create(NewTask::new(title)).await.unwrap();
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
        assert_eq!(task.id, TaskId(expected));
        assert_eq!(task.edit_history.len(), 1);
        assert_eq!(task.edit_history[0].action, HistoryAction::Created);
        assert!(task.edit_history[0].changes.iter().all(|change| change.old_value.is_null()));
    }
}

#[tokio::test(start_paused = true)]
async fn completed_at_tracks_patch_value_regardless_of_prior_state() {
    let (flow, clock) = empty_flow(&LatencyProfile::reference());
    let task = flow.tasks().create(NewTask::new("ship")).await.unwrap();

    for completed in [true, true, false, false, true] {
        clock.advance(time::Duration::minutes(5));
        let updated = flow
            .tasks()
            .update(task.id, TaskPatch::completion(completed))
            .await
            .unwrap();
        assert_eq!(updated.completed, completed);
        assert_eq!(updated.completed_at.is_some(), completed);
    }
}

#[tokio::test(start_paused = true)]
async fn patch_equal_to_current_values_appends_nothing() {
    let (flow, _) = empty_flow(&LatencyProfile::none());
    let task = flow
        .tasks()
        .create(
            NewTask::new("report")
                .priority(Priority::High)
                .due(Some(datetime!(2025-06-20 17:00 UTC))),
        )
        .await
        .unwrap();

    let patch = TaskPatch {
        title: Some(task.title.clone()),
        priority: Some(task.priority),
        due_date: Some(task.due_date),
        category_id: Some(None),
        ..TaskPatch::default()
    };
    let updated = flow.tasks().update(task.id, patch).await.unwrap();
    assert_eq!(updated.edit_history.len(), task.edit_history.len());
}

#[tokio::test(start_paused = true)]
async fn ids_survive_updates_and_id_keys_are_ignored() {
    let (flow, _) = empty_flow(&LatencyProfile::none());
    let task = flow.tasks().create(NewTask::new("stable")).await.unwrap();
    let patch: TaskPatch = serde_json::from_str(r#"{"title":"renamed"}"#).unwrap();
    let updated = flow.tasks().update(task.id, patch).await.unwrap();
    assert_eq!(updated.id, task.id);
    assert!(serde_json::from_str::<TaskPatch>(r#"{"id":7}"#).is_ok());
}

#[tokio::test(start_paused = true)]
async fn reorder_assigns_positions_from_sequence() {
    let (flow, _) = empty_flow(&LatencyProfile::reference());
    for title in ["one", "two", "three", "four"] {
        flow.tasks().create(NewTask::new(title)).await.unwrap();
    }

    let tasks = flow
        .tasks()
        .reorder(&[TaskId(3), TaskId(1), TaskId(2)])
        .await
        .unwrap();
    let order = |id: u64| tasks.iter().find(|task| task.id == TaskId(id)).unwrap().order;
    assert_eq!(order(3), 1);
    assert_eq!(order(1), 2);
    assert_eq!(order(2), 3);
    assert_eq!(order(4), 4);
}

#[tokio::test(start_paused = true)]
async fn active_view_matches_open_tasks_in_sorted_order() {
    let fixtures = Fixtures::builtin().unwrap();
    let flow = MemoryTaskFlow::seeded(fixtures, Arc::new(FixedClock::new(NOW)), &LatencyProfile::none());

    let active = flow
        .list(&FilterSpec::default().with_view(View::Active))
        .await
        .unwrap();
    let all = flow.tasks().get_all().await.unwrap();
    assert_eq!(active.len(), all.iter().filter(|task| !task.completed).count());
    for pair in active.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.priority.weight() >= b.priority.weight());
        if a.priority == b.priority
            && let (Some(a_due), Some(b_due)) = (a.due_date, b.due_date)
        {
            assert!(a_due <= b_due);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn overdue_filter_skips_completed_tasks() {
    let (flow, _) = empty_flow(&LatencyProfile::none());
    let late = datetime!(2025-06-01 09:00 UTC);
    let open = flow.tasks().create(NewTask::new("late").due(Some(late))).await.unwrap();
    let done = flow.tasks().create(NewTask::new("late but done").due(Some(late))).await.unwrap();
    flow.tasks().update(done.id, TaskPatch::completion(true)).await.unwrap();

    let overdue = flow
        .list(&FilterSpec::default().with_date_filters([DateBucket::Overdue]))
        .await
        .unwrap();
    let ids: Vec<TaskId> = overdue.iter().map(|task| task.id).collect();
    assert_eq!(ids, vec![open.id]);
}

#[tokio::test(start_paused = true)]
async fn deleting_a_category_keeps_referencing_tasks() {
    let (flow, _) = empty_flow(&LatencyProfile::reference());
    let category = flow
        .categories()
        .create(NewCategory {
            name: "Errands".into(),
            color: "#f59e0b".into(),
            icon: "ShoppingCart".into(),
        })
        .await
        .unwrap();
    let task = flow
        .tasks()
        .create(NewTask::new("post office").category(Some(category.id)))
        .await
        .unwrap();

    assert!(flow.delete_category(category.id).await.unwrap());
    let after = flow.tasks().get_by_id(task.id).await.unwrap();
    assert_eq!(after, task);
    assert_eq!(flow.integrity_report().await.unwrap().dangling.len(), 1);
    assert!(flow.categories_or_empty().await.is_empty());
}

#[test]
fn urgent_ties_break_on_earlier_due_date() {
    let make = |id: u64, priority: Priority, due: Option<OffsetDateTime>| Task {
        id: TaskId(id),
        title: format!("task {id}"),
        description: String::new(),
        priority,
        category_id: None,
        due_date: due,
        completed: false,
        completed_at: None,
        created_at: NOW,
        order: 0,
        edit_history: Vec::new(),
    };
    let tasks = [
        make(1, Priority::Low, None),
        make(2, Priority::Urgent, Some(datetime!(2024-01-01 00:00 UTC))),
        make(3, Priority::Urgent, Some(datetime!(2023-01-01 00:00 UTC))),
    ];
    let sorted = apply_at(&tasks, &FilterSpec::default(), NOW);
    let ids: Vec<u64> = sorted.iter().map(|task| task.id.0).collect();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[tokio::test(start_paused = true)]
async fn at_most_one_operation_runs_at_a_time() {
    let latency = LatencyProfile::none().with(Operation::Update, Duration::from_millis(300));
    let (flow, _) = empty_flow(&latency);
    let task = flow.tasks().create(NewTask::new("contended")).await.unwrap();

    let rename = |title: &'static str| TaskPatch {
        title: Some(title.into()),
        ..TaskPatch::default()
    };
    let start = tokio::time::Instant::now();
    let (a, b, c) = tokio::join!(
        flow.tasks().update(task.id, rename("a")),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            flow.tasks().update(task.id, rename("b")).await
        },
        async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            flow.tasks().update(task.id, rename("c")).await
        },
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(400));

    let stored = flow.tasks().get_by_id(task.id).await.unwrap();
    assert_eq!(stored.title, "c");
    let titles: Vec<String> = stored
        .edit_history
        .iter()
        .skip(1)
        .map(|entry| entry.changes[0].new_value.to_string())
        .collect();
    assert_eq!(titles, vec!["\"a\"", "\"b\"", "\"c\""]);
}

#[tokio::test(start_paused = true)]
async fn counts_move_only_through_explicit_refresh() {
    let fixtures = Fixtures::builtin().unwrap();
    let flow = MemoryTaskFlow::seeded(fixtures, Arc::new(FixedClock::new(NOW)), &LatencyProfile::reference());

    flow.tasks()
        .create(NewTask::new("extra work").category(Some(CategoryId(1))))
        .await
        .unwrap();
    assert_eq!(flow.categories().get_by_id(CategoryId(1)).await.unwrap().task_count, 2);

    flow.refresh_task_counts().await.unwrap();
    assert_eq!(flow.categories().get_by_id(CategoryId(1)).await.unwrap().task_count, 3);
}
