use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ProjectStore, Store, TaskStore};
use crate::error::StoreError;
use crate::models::project::Project;
use crate::models::task::Task;
use crate::pagination::Pagination;
use crate::query::{ProjectFilter, TaskFilter};
use crate::stats::{CompletionCounts, ProjectCounts};

/// Process-local store. Records are kept in insertion order so that ties on
/// `created_at` still list the most recently inserted record first.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tasks: RwLock<Vec<Task>>,
    projects: RwLock<Vec<Project>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

// Newest first. Stable sort over reversed insertion order.
fn newest_first<T, F>(items: impl DoubleEndedIterator<Item = T>, created_at: F) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    let mut out: Vec<T> = items.rev().collect();
    out.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    out
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        self.tasks.write().await.push(task.clone());
        Ok(())
    }

    async fn find_tasks(&self, filter: &TaskFilter, window: Option<Pagination>) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        let matching = newest_first(tasks.iter().filter(|t| filter.matches(t)).cloned(), |t| t.created_at);
        Ok(match window {
            Some(pagination) => pagination.window(matching),
            None => matching,
        })
    }

    async fn count_tasks(&self, filter: &TaskFilter) -> Result<u64, StoreError> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().filter(|t| filter.matches(t)).count() as u64)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn find_tasks_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tasks.iter().find(|t| t.id == *id).cloned())
            .collect())
    }

    async fn update_task(&self, task: &Task) -> Result<bool, StoreError> {
        let mut tasks = self.tasks.write().await;
        match tasks.iter_mut().find(|t| t.id == task.id) {
            Some(stored) => {
                *stored = task.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        Ok(tasks.len() != before)
    }

    async fn delete_tasks(&self, filter: &TaskFilter) -> Result<u64, StoreError> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| !filter.matches(t));
        Ok((before - tasks.len()) as u64)
    }

    async fn task_counts(&self) -> Result<CompletionCounts, StoreError> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().fold(CompletionCounts::default(), |mut acc, t| {
            acc.total += 1;
            if t.completed {
                acc.completed += 1;
            }
            acc
        }))
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn insert_project(&self, project: &Project) -> Result<(), StoreError> {
        self.projects.write().await.push(project.clone());
        Ok(())
    }

    async fn find_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, StoreError> {
        let projects = self.projects.read().await;
        Ok(newest_first(
            projects.iter().filter(|p| filter.matches(p)).cloned(),
            |p| p.created_at,
        ))
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let projects = self.projects.read().await;
        Ok(projects.iter().find(|p| p.id == id).cloned())
    }

    async fn update_project(&self, project: &Project) -> Result<bool, StoreError> {
        let mut projects = self.projects.write().await;
        match projects.iter_mut().find(|p| p.id == project.id) {
            Some(stored) => {
                *stored = project.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut projects = self.projects.write().await;
        let before = projects.len();
        projects.retain(|p| p.id != id);
        Ok(projects.len() != before)
    }

    async fn project_counts(&self) -> Result<ProjectCounts, StoreError> {
        let projects = self.projects.read().await;
        Ok(projects.iter().fold(ProjectCounts::default(), |mut acc, p| {
            acc.total += 1;
            if !p.tasks.is_empty() {
                acc.with_tasks += 1;
            }
            acc.task_references += p.tasks.len() as u64;
            acc
        }))
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
