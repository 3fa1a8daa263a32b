use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::task::{Category, Priority, Task};

pub const DEFAULT_RECENT_LIMIT: u64 = 5;

/// Raw output of the task aggregate: one pass, conditional sum on `completed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionCounts {
    pub total: u64,
    pub completed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectCounts {
    pub total: u64,
    pub with_tasks: u64,
    pub task_references: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    pub completion_rate: u64,
}

/// Percentage rounded half up; 0 for an empty collection.
pub fn completion_rate(completed: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (completed * 200 + total) / (total * 2)
}

impl From<CompletionCounts> for TaskStats {
    fn from(counts: CompletionCounts) -> Self {
        TaskStats {
            total: counts.total,
            completed: counts.completed,
            pending: counts.total.saturating_sub(counts.completed),
            completion_rate: completion_rate(counts.completed, counts.total),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total: u64,
    pub with_tasks: u64,
    pub empty: u64,
    pub task_references: u64,
    pub average_tasks_per_project: f64,
}

impl From<ProjectCounts> for ProjectStats {
    fn from(counts: ProjectCounts) -> Self {
        let average = if counts.total == 0 {
            0.0
        } else {
            (counts.task_references as f64 / counts.total as f64 * 10.0).round() / 10.0
        };
        ProjectStats {
            total: counts.total,
            with_tasks: counts.with_tasks,
            empty: counts.total.saturating_sub(counts.with_tasks),
            task_references: counts.task_references,
            average_tasks_per_project: average,
        }
    }
}

/// Reduced projection used by the dashboard's "recent tasks" list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTask {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    pub priority: Priority,
    pub category: Category,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Task> for RecentTask {
    fn from(task: &Task) -> Self {
        RecentTask {
            id: task.id,
            title: task.title.clone(),
            completed: task.completed,
            priority: task.priority,
            category: task.category,
            due_date: task.due_date,
            created_at: task.created_at,
        }
    }
}
