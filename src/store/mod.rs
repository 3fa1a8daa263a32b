//! Persistence seam. Services only talk to these traits; the MySQL backend
//! runs in production and the in-memory backend covers tests and local runs
//! without a database.

pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::project::Project;
use crate::models::task::Task;
use crate::pagination::Pagination;
use crate::query::{ProjectFilter, TaskFilter};
use crate::stats::{CompletionCounts, ProjectCounts};

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, task: &Task) -> Result<(), StoreError>;

    /// Matching tasks, newest first, optionally windowed.
    async fn find_tasks(&self, filter: &TaskFilter, window: Option<Pagination>) -> Result<Vec<Task>, StoreError>;

    async fn count_tasks(&self, filter: &TaskFilter) -> Result<u64, StoreError>;

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    /// Tasks for the given ids in the given order. Unknown ids are skipped.
    async fn find_tasks_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Task>, StoreError>;

    /// Replaces the stored task. Returns false when the id is unknown.
    async fn update_task(&self, task: &Task) -> Result<bool, StoreError>;

    async fn delete_task(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Bulk delete, returns the number of removed tasks.
    async fn delete_tasks(&self, filter: &TaskFilter) -> Result<u64, StoreError>;

    async fn task_counts(&self) -> Result<CompletionCounts, StoreError>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn insert_project(&self, project: &Project) -> Result<(), StoreError>;

    /// Matching projects, newest first.
    async fn find_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, StoreError>;

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, StoreError>;

    async fn update_project(&self, project: &Project) -> Result<bool, StoreError>;

    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn project_counts(&self) -> Result<ProjectCounts, StoreError>;
}

#[async_trait]
pub trait Store: TaskStore + ProjectStore {
    fn backend(&self) -> &'static str;

    /// Round trip to the backing storage.
    async fn ping(&self) -> Result<(), StoreError>;
}
