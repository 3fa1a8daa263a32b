use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::{FromRow, MySql, QueryBuilder};
use uuid::Uuid;

use super::{ProjectStore, Store, TaskStore};
use crate::error::StoreError;
use crate::models::project::Project;
use crate::models::task::Task;
use crate::pagination::Pagination;
use crate::query::{ProjectFilter, TaskFilter};
use crate::stats::{CompletionCounts, ProjectCounts};

const TASK_COLUMNS: &str =
    "id, title, description, priority, category, due_date, completed, completed_at, created_at, updated_at";

const PROJECT_COLUMNS: &str = "id, name, description, created_at, updated_at";

// created_at alone ties for rows written in the same microsecond
const NEWEST_FIRST: &str = " ORDER BY created_at DESC, seq DESC";

// Keeps id lists well below MySQL's placeholder limit
const ID_CHUNK: usize = 1000;

const SCHEMA: [&str; 3] = [
    "
    CREATE TABLE IF NOT EXISTS Tasks_ (
        id CHAR(36) NOT NULL PRIMARY KEY,
        seq BIGINT NOT NULL AUTO_INCREMENT UNIQUE,
        title VARCHAR(100) NOT NULL,
        description VARCHAR(500) NOT NULL DEFAULT '',
        priority VARCHAR(16) NOT NULL DEFAULT 'medium',
        category VARCHAR(16) NOT NULL DEFAULT 'work',
        due_date DATETIME(6) NULL,
        completed TINYINT(1) NOT NULL DEFAULT 0,
        completed_at DATETIME(6) NULL,
        created_at DATETIME(6) NOT NULL,
        updated_at DATETIME(6) NOT NULL,
        INDEX idx_tasks_completed (completed),
        INDEX idx_tasks_priority (priority),
        INDEX idx_tasks_category (category),
        INDEX idx_tasks_due_date (due_date),
        INDEX idx_tasks_created_at (created_at)
    ) DEFAULT CHARSET=utf8mb4
    ",
    "
    CREATE TABLE IF NOT EXISTS Projects_ (
        id CHAR(36) NOT NULL PRIMARY KEY,
        seq BIGINT NOT NULL AUTO_INCREMENT UNIQUE,
        name VARCHAR(100) NOT NULL,
        description VARCHAR(1000) NOT NULL DEFAULT '',
        created_at DATETIME(6) NOT NULL,
        updated_at DATETIME(6) NOT NULL,
        INDEX idx_projects_created_at (created_at)
    ) DEFAULT CHARSET=utf8mb4
    ",
    // No foreign key on task_id: project membership is a plain reference
    "
    CREATE TABLE IF NOT EXISTS ProjectTasks_ (
        project_id CHAR(36) NOT NULL,
        task_id CHAR(36) NOT NULL,
        position INT NOT NULL,
        PRIMARY KEY (project_id, task_id)
    ) DEFAULT CHARSET=utf8mb4
    ",
];

#[derive(FromRow)]
struct TaskRow {
    id: String,
    title: String,
    description: String,
    priority: String,
    category: String,
    due_date: Option<DateTime<Utc>>,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct ProjectRow {
    id: String,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct ProjectTaskRow {
    project_id: String,
    task_id: String,
}

fn parse_uuid(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|e| StoreError::Corrupt(format!("invalid id `{}`: {}", raw, e)))
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: parse_uuid(&row.id)?,
            priority: row
                .priority
                .parse()
                .map_err(|_| StoreError::Corrupt(format!("unknown priority `{}`", row.priority)))?,
            category: row
                .category
                .parse()
                .map_err(|_| StoreError::Corrupt(format!("unknown category `{}`", row.category)))?,
            title: row.title,
            description: row.description,
            due_date: row.due_date,
            completed: row.completed,
            completed_at: row.completed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl ProjectRow {
    fn into_project(self, tasks: Vec<Uuid>) -> Result<Project, StoreError> {
        Ok(Project {
            id: parse_uuid(&self.id)?,
            name: self.name,
            description: self.description,
            tasks,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlStore { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(MySqlStore::new(pool))
    }

    /// Creates the tables when they do not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema is up to date");
        Ok(())
    }

    // Ordered task references grouped by project id
    async fn project_task_ids(
        &self,
        mut builder: QueryBuilder<'_, MySql>,
    ) -> Result<HashMap<String, Vec<Uuid>>, StoreError> {
        let rows: Vec<ProjectTaskRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        let mut refs: HashMap<String, Vec<Uuid>> = HashMap::new();
        for row in rows {
            let task_id = parse_uuid(&row.task_id)?;
            refs.entry(row.project_id).or_default().push(task_id);
        }
        Ok(refs)
    }
}

fn select_tasks(filter: &TaskFilter, window: Option<Pagination>) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM Tasks_", TASK_COLUMNS));
    filter.push_where(&mut builder);
    builder.push(NEWEST_FIRST);
    if let Some(pagination) = window {
        builder.push(" LIMIT ");
        builder.push_bind(pagination.limit);
        builder.push(" OFFSET ");
        builder.push_bind(pagination.skip());
    }
    builder
}

fn select_tasks_by_ids(ids: &[Uuid]) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM Tasks_ WHERE id IN (", TASK_COLUMNS));
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id.to_string());
    }
    builder.push(")");
    builder
}

fn select_projects(filter: &ProjectFilter) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM Projects_", PROJECT_COLUMNS));
    filter.push_where(&mut builder);
    builder.push(NEWEST_FIRST);
    builder
}

// References of every project the filter selects, in one round trip
fn select_project_tasks(filter: &ProjectFilter) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new(
        "SELECT pt.project_id, pt.task_id FROM ProjectTasks_ pt JOIN Projects_ p ON p.id = pt.project_id",
    );
    filter.push_where(&mut builder);
    builder.push(" ORDER BY pt.project_id, pt.position");
    builder
}

fn select_project_tasks_of(id: Uuid) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new("SELECT project_id, task_id FROM ProjectTasks_ WHERE project_id = ");
    builder.push_bind(id.to_string());
    builder.push(" ORDER BY position");
    builder
}

// Rewrites the whole ordered reference list of one project
async fn replace_project_tasks(
    tx: &mut sqlx::Transaction<'_, MySql>,
    project: &Project,
) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM ProjectTasks_ WHERE project_id = ?")
        .bind(project.id.to_string())
        .execute(&mut **tx)
        .await?;

    if project.tasks.is_empty() {
        return Ok(());
    }

    let mut builder = QueryBuilder::<MySql>::new("INSERT INTO ProjectTasks_ (project_id, task_id, position) ");
    builder.push_values(project.tasks.iter().enumerate(), |mut b, (position, task_id)| {
        b.push_bind(project.id.to_string())
            .push_bind(task_id.to_string())
            .push_bind(position as i32);
    });
    builder.build().execute(&mut **tx).await?;
    Ok(())
}

#[async_trait]
impl TaskStore for MySqlStore {
    async fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        sqlx::query(
            "
            INSERT INTO Tasks_ (id, title, description, priority, category, due_date, completed, completed_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(task.id.to_string())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority.as_str())
        .bind(task.category.as_str())
        .bind(task.due_date)
        .bind(task.completed)
        .bind(task.completed_at)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_tasks(&self, filter: &TaskFilter, window: Option<Pagination>) -> Result<Vec<Task>, StoreError> {
        let mut builder = select_tasks(filter, window);
        let rows: Vec<TaskRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(Task::try_from).collect()
    }

    async fn count_tasks(&self, filter: &TaskFilter) -> Result<u64, StoreError> {
        let mut builder = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM Tasks_");
        filter.push_where(&mut builder);
        let (count,): (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(count as u64)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let row: Option<TaskRow> = sqlx::query_as(&format!("SELECT {} FROM Tasks_ WHERE id = ?", TASK_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Task::try_from).transpose()
    }

    async fn find_tasks_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Task>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_id = HashMap::with_capacity(ids.len());
        for chunk in ids.chunks(ID_CHUNK) {
            let mut builder = select_tasks_by_ids(chunk);
            let rows: Vec<TaskRow> = builder.build_query_as().fetch_all(&self.pool).await?;
            for row in rows {
                let task = Task::try_from(row)?;
                by_id.insert(task.id, task);
            }
        }
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn update_task(&self, task: &Task) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let (exists,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM Tasks_ WHERE id = ? FOR UPDATE")
            .bind(task.id.to_string())
            .fetch_one(&mut *tx)
            .await?;
        if exists == 0 {
            return Ok(false);
        }

        sqlx::query(
            "
            UPDATE Tasks_
            SET title = ?, description = ?, priority = ?, category = ?, due_date = ?,
                completed = ?, completed_at = ?, updated_at = ?
            WHERE id = ?
            ",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority.as_str())
        .bind(task.category.as_str())
        .bind(task.due_date)
        .bind(task.completed)
        .bind(task.completed_at)
        .bind(task.updated_at)
        .bind(task.id.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM Tasks_ WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_tasks(&self, filter: &TaskFilter) -> Result<u64, StoreError> {
        let mut builder = QueryBuilder::<MySql>::new("DELETE FROM Tasks_");
        filter.push_where(&mut builder);
        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn task_counts(&self) -> Result<CompletionCounts, StoreError> {
        let (total, completed): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), CAST(COALESCE(SUM(completed), 0) AS SIGNED) FROM Tasks_",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(CompletionCounts {
            total: total as u64,
            completed: completed as u64,
        })
    }
}

#[async_trait]
impl ProjectStore for MySqlStore {
    async fn insert_project(&self, project: &Project) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO Projects_ (id, name, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?)")
            .bind(project.id.to_string())
            .bind(&project.name)
            .bind(&project.description)
            .bind(project.created_at)
            .bind(project.updated_at)
            .execute(&mut *tx)
            .await?;
        replace_project_tasks(&mut tx, project).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, StoreError> {
        let mut builder = select_projects(filter);
        let rows: Vec<ProjectRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let mut refs = self.project_task_ids(select_project_tasks(filter)).await?;

        rows.into_iter()
            .map(|row| {
                let tasks = refs.remove(&row.id).unwrap_or_default();
                row.into_project(tasks)
            })
            .collect()
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let row: Option<ProjectRow> = sqlx::query_as(&format!("SELECT {} FROM Projects_ WHERE id = ?", PROJECT_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let mut refs = self.project_task_ids(select_project_tasks_of(id)).await?;
                let tasks = refs.remove(&row.id).unwrap_or_default();
                row.into_project(tasks).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn update_project(&self, project: &Project) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let (exists,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM Projects_ WHERE id = ? FOR UPDATE")
            .bind(project.id.to_string())
            .fetch_one(&mut *tx)
            .await?;
        if exists == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE Projects_ SET name = ?, description = ?, updated_at = ? WHERE id = ?")
            .bind(&project.name)
            .bind(&project.description)
            .bind(project.updated_at)
            .bind(project.id.to_string())
            .execute(&mut *tx)
            .await?;
        replace_project_tasks(&mut tx, project).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM ProjectTasks_ WHERE project_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM Projects_ WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn project_counts(&self) -> Result<ProjectCounts, StoreError> {
        let (total, with_tasks, task_references): (i64, i64, i64) = sqlx::query_as(
            "
            SELECT
                (SELECT COUNT(*) FROM Projects_),
                (SELECT COUNT(DISTINCT project_id) FROM ProjectTasks_),
                (SELECT COUNT(*) FROM ProjectTasks_)
            ",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(ProjectCounts {
            total: total as u64,
            with_tasks: with_tasks as u64,
            task_references: task_references as u64,
        })
    }
}

#[async_trait]
impl Store for MySqlStore {
    fn backend(&self) -> &'static str {
        "mysql"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
