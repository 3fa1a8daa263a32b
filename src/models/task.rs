use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{bounded_text, nullable};
use crate::error::AppError;

pub const TITLE_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(AppError::validation("Priority must be one of: low, medium, high")),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Work,
    Personal,
    Study,
    Health,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Study => "study",
            Category::Health => "health",
            Category::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Study => "Study",
            Category::Health => "Health",
            Category::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" => Ok(Category::Work),
            "personal" => Ok(Category::Personal),
            "study" => Ok(Category::Study),
            "health" => Ok(Category::Health),
            "other" => Ok(Category::Other),
            _ => Err(AppError::validation(
                "Category must be one of: work, personal, study, health, other",
            )),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored task.
///
/// `completed_at` is `Some` exactly when `completed` is true. Every write goes
/// through [`Task::create`], [`Task::apply`] or [`Task::toggle`], which keep that
/// invariant and bump `updated_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: Category,
    pub due_date: Option<DateTime<Utc>>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Create request body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub due_date: Option<DateTime<Utc>>,
}

// Partial update body, absent fields stay untouched. An explicit null
// clears optional fields and is rejected for the title.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub completed: Option<bool>,
}

fn check_due_date(due_date: DateTime<Utc>, now: DateTime<Utc>) -> Result<DateTime<Utc>, AppError> {
    if due_date <= now {
        return Err(AppError::validation("Due date must be in the future"));
    }
    Ok(due_date)
}

impl Task {
    /// Validates and normalizes a create request into a new pending task.
    pub fn create(input: CreateTask, now: DateTime<Utc>) -> Result<Task, AppError> {
        let title = bounded_text(input.title.as_deref().unwrap_or(""), "Title", true, TITLE_MAX_LEN)?;
        let description = bounded_text(
            input.description.as_deref().unwrap_or(""),
            "Description",
            false,
            DESCRIPTION_MAX_LEN,
        )?;
        let due_date = input.due_date.map(|d| check_due_date(d, now)).transpose()?;

        Ok(Task {
            id: Uuid::new_v4(),
            title,
            description,
            priority: input.priority.unwrap_or_default(),
            category: input.category.unwrap_or_default(),
            due_date,
            completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a partial update. Either every present field is valid and the
    /// task is changed, or the task is left exactly as it was.
    pub fn apply(&mut self, patch: TaskPatch, now: DateTime<Utc>) -> Result<(), AppError> {
        let mut next = self.clone();

        if let Some(title) = patch.title {
            next.title = bounded_text(title.as_deref().unwrap_or(""), "Title", true, TITLE_MAX_LEN)?;
        }
        if let Some(description) = patch.description {
            next.description = bounded_text(
                description.as_deref().unwrap_or(""),
                "Description",
                false,
                DESCRIPTION_MAX_LEN,
            )?;
        }
        if let Some(priority) = patch.priority {
            next.priority = priority;
        }
        if let Some(category) = patch.category {
            next.category = category;
        }
        if let Some(due_date) = patch.due_date {
            next.due_date = due_date.map(|d| check_due_date(d, now)).transpose()?;
        }
        if let Some(completed) = patch.completed {
            next.set_completed(completed, now);
        }

        next.touch(now);
        *self = next;
        Ok(())
    }

    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.set_completed(!self.completed, now);
        self.touch(now);
    }

    fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        if completed && !self.completed {
            self.completed_at = Some(now);
        }
        if !completed {
            self.completed_at = None;
        }
        self.completed = completed;
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due_date) => !self.completed && due_date < now,
            None => false,
        }
    }
}
