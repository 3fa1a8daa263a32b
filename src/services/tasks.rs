use chrono::Utc;
use log::info;

use super::parse_id;
use crate::error::AppError;
use crate::models::task::{CreateTask, Task, TaskPatch};
use crate::pagination::{Page, Pagination};
use crate::query::{TaskFilter, TaskQuery};
use crate::stats::{RecentTask, TaskStats};
use crate::store::TaskStore;

pub async fn list_tasks<S: TaskStore + ?Sized>(store: &S, query: &TaskQuery) -> Result<Page<Task>, AppError> {
    let pagination = Pagination::from_params(query.page.as_deref(), query.limit.as_deref())?;
    let filter = TaskFilter::from_query(query);

    let items = store.find_tasks(&filter, Some(pagination)).await?;
    let total = store.count_tasks(&filter).await?;

    Ok(Page {
        items,
        meta: pagination.meta(total),
    })
}

/// Unpaginated variant of [`list_tasks`].
pub async fn search_tasks<S: TaskStore + ?Sized>(store: &S, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
    let filter = TaskFilter::from_query(query);
    Ok(store.find_tasks(&filter, None).await?)
}

pub async fn get_task<S: TaskStore + ?Sized>(store: &S, id: &str) -> Result<Task, AppError> {
    let id = parse_id(id, "Task")?;
    store
        .find_task(id)
        .await?
        .ok_or_else(|| AppError::not_found("Task not found"))
}

pub async fn create_task<S: TaskStore + ?Sized>(store: &S, input: CreateTask) -> Result<Task, AppError> {
    let task = Task::create(input, Utc::now())?;
    store.insert_task(&task).await?;
    info!("Created task {}", task.id);
    Ok(task)
}

pub async fn update_task<S: TaskStore + ?Sized>(store: &S, id: &str, patch: TaskPatch) -> Result<Task, AppError> {
    let mut task = get_task(store, id).await?;
    task.apply(patch, Utc::now())?;
    save(store, &task).await?;
    Ok(task)
}

pub async fn toggle_task<S: TaskStore + ?Sized>(store: &S, id: &str) -> Result<Task, AppError> {
    let mut task = get_task(store, id).await?;
    task.toggle(Utc::now());
    save(store, &task).await?;
    Ok(task)
}

pub async fn delete_task<S: TaskStore + ?Sized>(store: &S, id: &str) -> Result<(), AppError> {
    let id = parse_id(id, "Task")?;
    if !store.delete_task(id).await? {
        return Err(AppError::not_found("Task not found"));
    }
    info!("Deleted task {}", id);
    Ok(())
}

pub async fn delete_completed<S: TaskStore + ?Sized>(store: &S) -> Result<u64, AppError> {
    let deleted = store.delete_tasks(&TaskFilter::completed_only()).await?;
    info!("Deleted {} completed tasks", deleted);
    Ok(deleted)
}

pub async fn task_stats<S: TaskStore + ?Sized>(store: &S) -> Result<TaskStats, AppError> {
    Ok(TaskStats::from(store.task_counts().await?))
}

pub async fn recent_tasks<S: TaskStore + ?Sized>(store: &S, limit: u64) -> Result<Vec<RecentTask>, AppError> {
    let window = Pagination::new(1, limit)?;
    let tasks = store.find_tasks(&TaskFilter::all(), Some(window)).await?;
    Ok(tasks.iter().map(RecentTask::from).collect())
}

// The task can vanish between read and write
async fn save<S: TaskStore + ?Sized>(store: &S, task: &Task) -> Result<(), AppError> {
    if !store.update_task(task).await? {
        return Err(AppError::not_found("Task not found"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::Priority;
    use crate::store::MemoryStore;
    use chrono::Duration;

    async fn seed(store: &MemoryStore, title: &str) -> Task {
        create_task(store, CreateTask { title: Some(title.into()), ..Default::default() })
            .await
            .unwrap()
    }

    fn query(pairs: &[(&str, &str)]) -> TaskQuery {
        let mut q = TaskQuery::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "search" => q.search = value,
                "status" => q.status = value,
                "priority" => q.priority = value,
                "category" => q.category = value,
                "page" => q.page = value,
                "limit" => q.limit = value,
                _ => unreachable!(),
            }
        }
        q
    }

    #[actix_web::test]
    async fn list_paginates_newest_first() {
        let store = MemoryStore::new();
        for i in 0..25 {
            seed(&store, &format!("task {}", i)).await;
        }

        let page = list_tasks(&store, &query(&[("page", "3"), ("limit", "10")])).await.unwrap();
        assert_eq!(page.meta.total, 25);
        assert_eq!(page.meta.pages, 3);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items.last().unwrap().title, "task 0");

        let first = list_tasks(&store, &TaskQuery::default()).await.unwrap();
        assert_eq!(first.items[0].title, "task 24");
        assert_eq!(first.meta.limit, 10);
    }

    #[actix_web::test]
    async fn list_rejects_zero_limit() {
        let store = MemoryStore::new();
        let result = list_tasks(&store, &query(&[("limit", "0")])).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[actix_web::test]
    async fn search_filters_by_text_and_status() {
        let store = MemoryStore::new();
        let foobar = seed(&store, "foobar").await;
        seed(&store, "foo pending").await;
        let bar = seed(&store, "bar").await;
        toggle_task(&store, &foobar.id.to_string()).await.unwrap();
        toggle_task(&store, &bar.id.to_string()).await.unwrap();

        let found = search_tasks(&store, &query(&[("search", "FOO"), ("status", "completed")]))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, foobar.id);
    }

    #[actix_web::test]
    async fn update_only_priority() {
        let store = MemoryStore::new();
        let due = Utc::now() + Duration::days(3);
        let task = create_task(
            &store,
            CreateTask {
                title: Some("Read".into()),
                description: Some("Two chapters".into()),
                due_date: Some(due),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let updated = update_task(
            &store,
            &task.id.to_string(),
            TaskPatch { priority: Some(Priority::Low), ..Default::default() },
        )
        .await
        .unwrap();
        assert_eq!(updated.priority, Priority::Low);

        let stored = get_task(&store, &task.id.to_string()).await.unwrap();
        assert_eq!(stored.title, "Read");
        assert_eq!(stored.description, "Two chapters");
        assert_eq!(stored.due_date, Some(due));
        assert!(stored.updated_at >= task.updated_at);
    }

    #[actix_web::test]
    async fn toggle_keeps_completed_at_consistent() {
        let store = MemoryStore::new();
        let task = seed(&store, "Gym").await;
        let done = toggle_task(&store, &task.id.to_string()).await.unwrap();
        assert!(done.completed);
        assert!(done.completed_at.is_some());
        assert!(done.completed_at.unwrap() >= task.created_at);

        let undone = toggle_task(&store, &task.id.to_string()).await.unwrap();
        assert!(!undone.completed);
        assert_eq!(undone.completed_at, None);
    }

    #[actix_web::test]
    async fn delete_unknown_is_not_found() {
        let store = MemoryStore::new();
        let missing = uuid::Uuid::new_v4().to_string();
        assert!(matches!(delete_task(&store, &missing).await, Err(AppError::NotFound(_))));
        assert!(matches!(delete_task(&store, "not-an-id").await, Err(AppError::NotFound(_))));
        assert!(matches!(update_task(&store, &missing, TaskPatch::default()).await, Err(AppError::NotFound(_))));
    }

    #[actix_web::test]
    async fn delete_completed_with_none_completed() {
        let store = MemoryStore::new();
        seed(&store, "a").await;
        assert_eq!(delete_completed(&store).await.unwrap(), 0);

        let b = seed(&store, "b").await;
        toggle_task(&store, &b.id.to_string()).await.unwrap();
        assert_eq!(delete_completed(&store).await.unwrap(), 1);
        assert_eq!(task_stats(&store).await.unwrap().total, 1);
    }

    #[actix_web::test]
    async fn stats_and_recent() {
        let store = MemoryStore::new();
        assert_eq!(task_stats(&store).await.unwrap().completion_rate, 0);

        let a = seed(&store, "a").await;
        seed(&store, "b").await;
        seed(&store, "c").await;
        toggle_task(&store, &a.id.to_string()).await.unwrap();

        let stats = task_stats(&store).await.unwrap();
        assert_eq!((stats.total, stats.completed, stats.pending), (3, 1, 2));
        assert_eq!(stats.completion_rate, 33);

        let recent = recent_tasks(&store, 2).await.unwrap();
        let titles: Vec<&str> = recent.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "b"]);
    }
}
