//! Turns raw listing parameters into store predicates.
//!
//! A [`TaskFilter`] is evaluated two ways: in memory through
//! [`TaskFilter::matches`], and as a SQL `WHERE` clause through
//! [`TaskFilter::push_where`]. Both must agree.

use serde::Deserialize;
use sqlx::{MySql, QueryBuilder};

use crate::models::project::Project;
use crate::models::task::{Category, Priority, Task};

/// Raw query-string parameters shared by the task listing and search endpoints.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TaskQuery {
    #[serde(alias = "q")]
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    /// Set when a filter value names nothing that can exist.
    pub unsatisfiable: bool,
}

// Blank query-string values count as absent
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl TaskFilter {
    /// The universal predicate.
    pub fn all() -> Self {
        TaskFilter::default()
    }

    pub fn completed_only() -> Self {
        TaskFilter {
            completed: Some(true),
            ..TaskFilter::default()
        }
    }

    pub fn build(
        search: Option<&str>,
        status: Option<&str>,
        priority: Option<&str>,
        category: Option<&str>,
    ) -> Self {
        let mut filter = TaskFilter {
            text: search.filter(|s| !s.is_empty()).map(str::to_string),
            ..TaskFilter::default()
        };

        filter.completed = match present(status) {
            Some("completed") => Some(true),
            Some("pending") => Some(false),
            _ => None,
        };

        if let Some(raw) = present(priority) {
            match raw.parse::<Priority>() {
                Ok(priority) => filter.priority = Some(priority),
                Err(_) => filter.unsatisfiable = true,
            }
        }
        if let Some(raw) = present(category) {
            match raw.parse::<Category>() {
                Ok(category) => filter.category = Some(category),
                Err(_) => filter.unsatisfiable = true,
            }
        }

        filter
    }

    pub fn from_query(query: &TaskQuery) -> Self {
        TaskFilter::build(
            query.search.as_deref(),
            query.status.as_deref(),
            query.priority.as_deref(),
            query.category.as_deref(),
        )
    }

    pub fn is_universal(&self) -> bool {
        *self == TaskFilter::default()
    }

    pub fn matches(&self, task: &Task) -> bool {
        if self.unsatisfiable {
            return false;
        }
        if let Some(text) = &self.text {
            if !contains_ignore_case(&task.title, text) && !contains_ignore_case(&task.description, text) {
                return false;
            }
        }
        if let Some(completed) = self.completed {
            if task.completed != completed {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }
        if let Some(category) = self.category {
            if task.category != category {
                return false;
            }
        }
        true
    }

    /// Appends ` WHERE ...` to `builder`, or nothing for the universal predicate.
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, MySql>) {
        if self.is_universal() {
            return;
        }
        builder.push(" WHERE ");
        if self.unsatisfiable {
            builder.push("1 = 0");
            return;
        }

        let mut clauses = builder.separated(" AND ");
        if let Some(text) = &self.text {
            let pattern = like_pattern(text);
            clauses.push("(LOWER(title) LIKE ");
            clauses.push_bind_unseparated(pattern.clone());
            clauses.push_unseparated(" OR LOWER(description) LIKE ");
            clauses.push_bind_unseparated(pattern);
            clauses.push_unseparated(")");
        }
        if let Some(completed) = self.completed {
            clauses.push("completed = ");
            clauses.push_bind_unseparated(completed);
        }
        if let Some(priority) = self.priority {
            clauses.push("priority = ");
            clauses.push_bind_unseparated(priority.as_str());
        }
        if let Some(category) = self.category {
            clauses.push("category = ");
            clauses.push_bind_unseparated(category.as_str());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilter {
    pub text: Option<String>,
}

impl ProjectFilter {
    pub fn build(search: Option<&str>) -> Self {
        ProjectFilter {
            text: search.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }

    pub fn matches(&self, project: &Project) -> bool {
        match &self.text {
            Some(text) => {
                contains_ignore_case(&project.name, text) || contains_ignore_case(&project.description, text)
            }
            None => true,
        }
    }

    pub fn push_where(&self, builder: &mut QueryBuilder<'_, MySql>) {
        if let Some(text) = &self.text {
            let pattern = like_pattern(text);
            builder.push(" WHERE (LOWER(name) LIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR LOWER(description) LIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// Substring pattern for LIKE. Backslash is MySQL's default escape character.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
