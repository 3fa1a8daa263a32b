use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::{bounded_text, nullable};
use crate::error::AppError;

pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 1000;

/// A stored project.
///
/// `tasks` holds task ids by reference only. Nothing keeps them in sync with
/// the task collection: deleting a project leaves its tasks alone, and
/// deleting a task leaves a dangling id behind until someone removes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub tasks: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tasks: Option<Vec<Uuid>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub tasks: Option<Option<Vec<Uuid>>>,
}

// First occurrence wins
fn dedup_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

impl Project {
    pub fn create(input: CreateProject, now: DateTime<Utc>) -> Result<Project, AppError> {
        let name = bounded_text(input.name.as_deref().unwrap_or(""), "Project name", true, NAME_MAX_LEN)?;
        let description = bounded_text(
            input.description.as_deref().unwrap_or(""),
            "Description",
            false,
            DESCRIPTION_MAX_LEN,
        )?;

        Ok(Project {
            id: Uuid::new_v4(),
            name,
            description,
            tasks: dedup_ids(input.tasks.unwrap_or_default()),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, patch: ProjectPatch, now: DateTime<Utc>) -> Result<(), AppError> {
        let mut next = self.clone();

        if let Some(name) = patch.name {
            next.name = bounded_text(name.as_deref().unwrap_or(""), "Project name", true, NAME_MAX_LEN)?;
        }
        if let Some(description) = patch.description {
            next.description = bounded_text(
                description.as_deref().unwrap_or(""),
                "Description",
                false,
                DESCRIPTION_MAX_LEN,
            )?;
        }
        if let Some(tasks) = patch.tasks {
            next.tasks = dedup_ids(tasks.unwrap_or_default());
        }

        next.touch(now);
        *self = next;
        Ok(())
    }

    /// Adds a task reference. Returns false when it was already there.
    pub fn add_task(&mut self, task_id: Uuid, now: DateTime<Utc>) -> bool {
        self.touch(now);
        if self.tasks.contains(&task_id) {
            return false;
        }
        self.tasks.push(task_id);
        true
    }

    /// Removes a task reference. Returns false when it was not there.
    pub fn remove_task(&mut self, task_id: Uuid, now: DateTime<Utc>) -> bool {
        self.touch(now);
        let before = self.tasks.len();
        self.tasks.retain(|id| *id != task_id);
        self.tasks.len() != before
    }

    pub fn clear_tasks(&mut self, now: DateTime<Utc>) {
        self.touch(now);
        self.tasks.clear();
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}
