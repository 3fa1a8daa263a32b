use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::project::Project;
use crate::routes::task_view::task_view_models::TaskView;
use crate::services::projects::ProjectDetail;
use crate::stats::ProjectStats;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub tasks: Vec<Uuid>,
    pub task_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectView {
    fn from(project: Project) -> Self {
        ProjectView {
            task_count: project.task_count(),
            id: project.id,
            name: project.name,
            description: project.description,
            tasks: project.tasks,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

// Project with referenced tasks populated
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetailView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub tasks: Vec<TaskView>,
    pub task_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectDetailView {
    pub fn new(detail: ProjectDetail, now: DateTime<Utc>) -> Self {
        let project = detail.project;
        ProjectDetailView {
            task_count: project.task_count(),
            id: project.id,
            name: project.name,
            description: project.description,
            tasks: TaskView::many(detail.tasks, now),
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

// List projects request and response
#[derive(Deserialize, Debug)]
pub struct ListProjectsRequest {
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct ProjectListResponse {
    pub success: bool,
    pub data: Vec<ProjectDetailView>,
    pub total: usize,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct ProjectDetailResponse {
    pub success: bool,
    pub data: ProjectDetailView,
    pub timestamp: String,
}

// Create, update and task reference changes
#[derive(Serialize)]
pub struct ProjectResponse {
    pub success: bool,
    pub message: String,
    pub data: ProjectView,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct DeleteProjectResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddTaskRefRequest {
    pub task_id: Uuid,
}

#[derive(Serialize)]
pub struct ProjectStatsResponse {
    pub success: bool,
    pub data: ProjectStats,
    pub timestamp: String,
}
