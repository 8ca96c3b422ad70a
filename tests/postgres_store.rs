//! Needs a live PostgreSQL. Run with
//! `DATABASE_URL=postgres://... cargo test -- --ignored`.

use resource_store::{
    AppError, ListQuery, NewTask, Patch, PgTaskStore, ResourceStore, TaskFilter, TaskPatch,
    TaskStatus,
};
use sqlx::postgres::PgPoolOptions;

async fn fresh_store() -> PgTaskStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect DATABASE_URL");
    let table = format!("tasks_test_{}", uuid::Uuid::new_v4().simple());
    let store = PgTaskStore::new(pool, &table).expect("valid table name");
    store.ensure_table().await.expect("create table");
    store
}

fn new_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: None,
    }
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn crud_round_trip() {
    let store = fresh_store().await;

    let a = store.create(new_task("Task 1")).await.unwrap();
    let b = store.create(new_task("Task 2")).await.unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(a.status, TaskStatus::Pending);
    assert_eq!(store.get(a.id).await.unwrap(), a);

    let updated = store
        .update(
            b.id,
            TaskPatch {
                status: Patch::Set(TaskStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Task 2");
    assert!(updated.updated_at > b.updated_at);
    assert_eq!(updated.created_at, b.created_at);

    let pending = store
        .list(ListQuery::new().with_filter(Some(TaskFilter::Status(TaskStatus::Pending))))
        .await
        .unwrap();
    assert_eq!(pending, vec![a.clone()]);

    store.delete(a.id).await.unwrap();
    assert!(matches!(store.delete(a.id).await, Err(AppError::NotFound { .. })));
    assert!(matches!(store.get(a.id).await, Err(AppError::NotFound { .. })));
    assert_eq!(store.list(ListQuery::new()).await.unwrap(), vec![updated]);

    store.drop_table().await.unwrap();
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn missing_row_update_is_not_found() {
    let store = fresh_store().await;
    let kept = store.create(new_task("Keep")).await.unwrap();
    let patch = TaskPatch {
        title: Patch::Set("Updated".into()),
        ..Default::default()
    };
    assert!(matches!(
        store.update(kept.id + 1000, patch).await,
        Err(AppError::NotFound { kind: "Task", .. })
    ));
    assert_eq!(store.list(ListQuery::new()).await.unwrap(), vec![kept]);
    store.drop_table().await.unwrap();
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn pagination_orders_by_id() {
    let store = fresh_store().await;
    let mut ids = Vec::new();
    for i in 0..6 {
        ids.push(store.create(new_task(&format!("t{i}"))).await.unwrap().id);
    }
    let page = store.list(ListQuery::new().skip(1).take(3)).await.unwrap();
    assert_eq!(page.iter().map(|t| t.id).collect::<Vec<_>>(), ids[1..4].to_vec());
    store.drop_table().await.unwrap();
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn failed_update_rolls_back() {
    let store = fresh_store().await;
    let original = store.create(new_task("Original Title")).await.unwrap();
    // Unvalidated patch; the column rejects the value mid-transaction.
    let patch = TaskPatch {
        title: Patch::Set("a".repeat(201)),
        status: Patch::Set(TaskStatus::Completed),
        ..Default::default()
    };
    assert!(matches!(store.update(original.id, patch).await, Err(AppError::Db(_))));
    assert_eq!(store.get(original.id).await.unwrap(), original);
    store.drop_table().await.unwrap();
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn unbounded_list_and_oversized_window() {
    let store = fresh_store().await;
    for i in 0..150 {
        store.create(new_task(&format!("t{i}"))).await.unwrap();
    }
    assert_eq!(store.list(ListQuery::new()).await.unwrap().len(), 150);
    assert_eq!(store.list(ListQuery::new().take(usize::MAX)).await.unwrap().len(), 150);
    assert!(store
        .list(ListQuery::new().skip(usize::MAX))
        .await
        .unwrap()
        .is_empty());
    store.drop_table().await.unwrap();
}
