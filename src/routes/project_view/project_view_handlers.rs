use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use log::info;

use super::project_view_models::{
    AddTaskRefRequest, DeleteProjectResponse, ListProjectsRequest, ProjectDetailResponse,
    ProjectDetailView, ProjectListResponse, ProjectResponse, ProjectStatsResponse, ProjectView,
};
use crate::models::project::{CreateProject, Project, ProjectPatch};
use crate::services::projects;
use crate::store::Store;

fn timestamp() -> String {
    Utc::now().to_rfc3339()
}

fn project_response(project: Project, message: &str) -> HttpResponse {
    HttpResponse::Ok().json(ProjectResponse {
        success: true,
        message: message.to_string(),
        data: ProjectView::from(project),
        timestamp: timestamp(),
    })
}

pub async fn list_projects(
    store: web::Data<dyn Store>,
    query: web::Query<ListProjectsRequest>,
) -> impl Responder {
    info!("Listing projects: {:?}", query);
    match projects::list_projects(store.get_ref(), query.search.as_deref()).await {
        Ok(found) => {
            let now = Utc::now();
            HttpResponse::Ok().json(ProjectListResponse {
                success: true,
                total: found.len(),
                data: found.into_iter().map(|detail| ProjectDetailView::new(detail, now)).collect(),
                timestamp: timestamp(),
            })
        }
        Err(e) => e.respond("list projects"),
    }
}

pub async fn get_project(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();
    info!("Fetching project {}", id);
    match projects::get_project_detail(store.get_ref(), &id).await {
        Ok(detail) => HttpResponse::Ok().json(ProjectDetailResponse {
            success: true,
            data: ProjectDetailView::new(detail, Utc::now()),
            timestamp: timestamp(),
        }),
        Err(e) => e.respond("get project"),
    }
}

pub async fn create_project(
    store: web::Data<dyn Store>,
    request: web::Json<CreateProject>,
) -> impl Responder {
    info!("Received request to create project: {:?}", request);
    match projects::create_project(store.get_ref(), request.into_inner()).await {
        Ok(project) => HttpResponse::Created().json(ProjectResponse {
            success: true,
            message: "Project created successfully".to_string(),
            data: ProjectView::from(project),
            timestamp: timestamp(),
        }),
        Err(e) => e.respond("create project"),
    }
}

pub async fn update_project(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
    request: web::Json<ProjectPatch>,
) -> impl Responder {
    let id = path.into_inner();
    info!("Updating project {}: {:?}", id, request);
    match projects::update_project(store.get_ref(), &id, request.into_inner()).await {
        Ok(project) => project_response(project, "Project updated successfully"),
        Err(e) => e.respond("update project"),
    }
}

pub async fn delete_project(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();
    info!("Deleting project {}", id);
    match projects::delete_project(store.get_ref(), &id).await {
        Ok(()) => HttpResponse::Ok().json(DeleteProjectResponse {
            success: true,
            message: "Project deleted successfully".to_string(),
            timestamp: timestamp(),
        }),
        Err(e) => e.respond("delete project"),
    }
}

pub async fn add_task_ref(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
    request: web::Json<AddTaskRefRequest>,
) -> impl Responder {
    let id = path.into_inner();
    info!("Adding task {} to project {}", request.task_id, id);
    match projects::add_task_ref(store.get_ref(), &id, request.task_id).await {
        Ok(project) => project_response(project, "Task added to project"),
        Err(e) => e.respond("add task to project"),
    }
}

pub async fn remove_task_ref(
    store: web::Data<dyn Store>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (id, task_id) = path.into_inner();
    info!("Removing task {} from project {}", task_id, id);
    match projects::remove_task_ref(store.get_ref(), &id, &task_id).await {
        Ok(project) => project_response(project, "Task removed from project"),
        Err(e) => e.respond("remove task from project"),
    }
}

pub async fn clear_task_refs(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();
    info!("Clearing tasks of project {}", id);
    match projects::clear_task_refs(store.get_ref(), &id).await {
        Ok(project) => project_response(project, "Project tasks cleared"),
        Err(e) => e.respond("clear project tasks"),
    }
}

pub async fn project_stats(store: web::Data<dyn Store>) -> impl Responder {
    info!("Fetching project statistics");
    match projects::project_stats(store.get_ref()).await {
        Ok(stats) => HttpResponse::Ok().json(ProjectStatsResponse {
            success: true,
            data: stats,
            timestamp: timestamp(),
        }),
        Err(e) => e.respond("get project stats"),
    }
}
