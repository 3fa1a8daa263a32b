use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::task::{Category, Priority, Task};
use crate::stats::{RecentTask, TaskStats};

// Task as rendered to clients, virtual fields included
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub priority_text: &'static str,
    pub category: Category,
    pub category_text: &'static str,
    pub due_date: Option<DateTime<Utc>>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_overdue: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskView {
    pub fn new(task: Task, now: DateTime<Utc>) -> Self {
        TaskView {
            is_overdue: task.is_overdue(now),
            priority_text: task.priority.label(),
            category_text: task.category.label(),
            id: task.id,
            title: task.title,
            description: task.description,
            priority: task.priority,
            category: task.category,
            due_date: task.due_date,
            completed: task.completed,
            completed_at: task.completed_at,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }

    pub fn many(tasks: Vec<Task>, now: DateTime<Utc>) -> Vec<TaskView> {
        tasks.into_iter().map(|t| TaskView::new(t, now)).collect()
    }
}

// List tasks response
#[derive(Serialize)]
pub struct TaskListResponse {
    pub success: bool,
    pub data: Vec<TaskView>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
    pub timestamp: String,
}

// Search tasks response
#[derive(Serialize)]
pub struct TaskSearchResponse {
    pub success: bool,
    pub data: Vec<TaskView>,
    pub total: usize,
    pub timestamp: String,
}

// Single task response (get, create, update, toggle)
#[derive(Serialize)]
pub struct TaskResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: TaskView,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct DeleteTaskResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCompletedResponse {
    pub success: bool,
    pub message: String,
    pub deleted_count: u64,
    pub timestamp: String,
}

// Stats request and response
#[derive(Deserialize)]
pub struct TaskStatsRequest {
    pub limit: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatsData {
    pub stats: TaskStats,
    pub recent_tasks: Vec<RecentTask>,
}

#[derive(Serialize)]
pub struct TaskStatsResponse {
    pub success: bool,
    pub data: TaskStatsData,
    pub timestamp: String,
}
