use std::collections::{HashMap, HashSet};

use chrono::Utc;
use log::info;
use uuid::Uuid;

use super::parse_id;
use crate::error::AppError;
use crate::models::project::{CreateProject, Project, ProjectPatch};
use crate::models::task::Task;
use crate::query::ProjectFilter;
use crate::stats::ProjectStats;
use crate::store::{ProjectStore, TaskStore};

/// A project with its task references resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDetail {
    pub project: Project,
    pub tasks: Vec<Task>,
}

/// Lists projects newest first with their tasks resolved. All references are
/// loaded in one batch; dangling ones are skipped.
pub async fn list_projects<S>(store: &S, search: Option<&str>) -> Result<Vec<ProjectDetail>, AppError>
where
    S: ProjectStore + TaskStore + ?Sized,
{
    let projects = store.find_projects(&ProjectFilter::build(search)).await?;

    let mut seen = HashSet::new();
    let ids: Vec<Uuid> = projects
        .iter()
        .flat_map(|p| p.tasks.iter().copied())
        .filter(|id| seen.insert(*id))
        .collect();
    let tasks: HashMap<Uuid, Task> = store
        .find_tasks_by_ids(&ids)
        .await?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();

    Ok(projects
        .into_iter()
        .map(|project| {
            let tasks = project.tasks.iter().filter_map(|id| tasks.get(id).cloned()).collect();
            ProjectDetail { project, tasks }
        })
        .collect())
}

pub async fn get_project<S: ProjectStore + ?Sized>(store: &S, id: &str) -> Result<Project, AppError> {
    let id = parse_id(id, "Project")?;
    store
        .find_project(id)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))
}

/// Loads a project and the tasks it references. Dangling references are
/// skipped, not reported.
pub async fn get_project_detail<S>(store: &S, id: &str) -> Result<ProjectDetail, AppError>
where
    S: ProjectStore + TaskStore + ?Sized,
{
    let project = get_project(store, id).await?;
    let tasks = store.find_tasks_by_ids(&project.tasks).await?;
    Ok(ProjectDetail { project, tasks })
}

pub async fn create_project<S: ProjectStore + ?Sized>(store: &S, input: CreateProject) -> Result<Project, AppError> {
    let project = Project::create(input, Utc::now())?;
    store.insert_project(&project).await?;
    info!("Created project {}", project.id);
    Ok(project)
}

pub async fn update_project<S: ProjectStore + ?Sized>(
    store: &S,
    id: &str,
    patch: ProjectPatch,
) -> Result<Project, AppError> {
    let mut project = get_project(store, id).await?;
    project.apply(patch, Utc::now())?;
    save(store, &project).await?;
    Ok(project)
}

/// Deletes the project only. Its tasks stay.
pub async fn delete_project<S: ProjectStore + ?Sized>(store: &S, id: &str) -> Result<(), AppError> {
    let id = parse_id(id, "Project")?;
    if !store.delete_project(id).await? {
        return Err(AppError::not_found("Project not found"));
    }
    info!("Deleted project {}", id);
    Ok(())
}

pub async fn add_task_ref<S>(store: &S, id: &str, task_id: Uuid) -> Result<Project, AppError>
where
    S: ProjectStore + TaskStore + ?Sized,
{
    let mut project = get_project(store, id).await?;
    if store.find_task(task_id).await?.is_none() {
        return Err(AppError::not_found("Task not found"));
    }
    if !project.add_task(task_id, Utc::now()) {
        info!("Task {} already in project {}", task_id, project.id);
    }
    save(store, &project).await?;
    Ok(project)
}

pub async fn remove_task_ref<S: ProjectStore + ?Sized>(store: &S, id: &str, task_id: &str) -> Result<Project, AppError> {
    let mut project = get_project(store, id).await?;
    // An unparseable id cannot be in the list, so removal is a no-op
    if let Ok(task_id) = Uuid::parse_str(task_id) {
        project.remove_task(task_id, Utc::now());
    }
    save(store, &project).await?;
    Ok(project)
}

pub async fn clear_task_refs<S: ProjectStore + ?Sized>(store: &S, id: &str) -> Result<Project, AppError> {
    let mut project = get_project(store, id).await?;
    project.clear_tasks(Utc::now());
    save(store, &project).await?;
    Ok(project)
}

pub async fn project_stats<S: ProjectStore + ?Sized>(store: &S) -> Result<ProjectStats, AppError> {
    Ok(ProjectStats::from(store.project_counts().await?))
}

async fn save<S: ProjectStore + ?Sized>(store: &S, project: &Project) -> Result<(), AppError> {
    if !store.update_project(project).await? {
        return Err(AppError::not_found("Project not found"));
    }
    Ok(())
}
