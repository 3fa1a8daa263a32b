use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use log::info;

use super::task_view_models::{
    DeleteCompletedResponse, DeleteTaskResponse, TaskListResponse, TaskResponse, TaskSearchResponse,
    TaskStatsData, TaskStatsRequest, TaskStatsResponse, TaskView,
};
use crate::error::AppError;
use crate::models::task::{CreateTask, TaskPatch};
use crate::query::TaskQuery;
use crate::services::tasks;
use crate::stats::DEFAULT_RECENT_LIMIT;
use crate::store::Store;

fn timestamp() -> String {
    Utc::now().to_rfc3339()
}

// List tasks with filters and pagination
pub async fn list_tasks(
    store: web::Data<dyn Store>,
    query: web::Query<TaskQuery>,
) -> impl Responder {
    info!("Listing tasks: {:?}", query);
    match tasks::list_tasks(store.get_ref(), &query).await {
        Ok(page) => HttpResponse::Ok().json(TaskListResponse {
            success: true,
            data: TaskView::many(page.items, Utc::now()),
            total: page.meta.total,
            page: page.meta.page,
            limit: page.meta.limit,
            pages: page.meta.pages,
            timestamp: timestamp(),
        }),
        Err(e) => e.respond("list tasks"),
    }
}

// Unpaginated text search, `q` or `search`
pub async fn search_tasks(
    store: web::Data<dyn Store>,
    query: web::Query<TaskQuery>,
) -> impl Responder {
    info!("Searching tasks: {:?}", query);
    match tasks::search_tasks(store.get_ref(), &query).await {
        Ok(found) => HttpResponse::Ok().json(TaskSearchResponse {
            success: true,
            total: found.len(),
            data: TaskView::many(found, Utc::now()),
            timestamp: timestamp(),
        }),
        Err(e) => e.respond("search tasks"),
    }
}

pub async fn create_task(
    store: web::Data<dyn Store>,
    request: web::Json<CreateTask>,
) -> impl Responder {
    info!("Received request to create task: {:?}", request);
    match tasks::create_task(store.get_ref(), request.into_inner()).await {
        Ok(task) => HttpResponse::Created().json(TaskResponse {
            success: true,
            message: Some("Task created successfully".into()),
            data: TaskView::new(task, Utc::now()),
            timestamp: timestamp(),
        }),
        Err(e) => e.respond("create task"),
    }
}

pub async fn get_task(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();
    info!("Fetching task {}", id);
    match tasks::get_task(store.get_ref(), &id).await {
        Ok(task) => HttpResponse::Ok().json(TaskResponse {
            success: true,
            message: None,
            data: TaskView::new(task, Utc::now()),
            timestamp: timestamp(),
        }),
        Err(e) => e.respond("get task"),
    }
}

pub async fn update_task(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
    request: web::Json<TaskPatch>,
) -> impl Responder {
    let id = path.into_inner();
    info!("Updating task {}: {:?}", id, request);
    match tasks::update_task(store.get_ref(), &id, request.into_inner()).await {
        Ok(task) => HttpResponse::Ok().json(TaskResponse {
            success: true,
            message: Some(format!("Task {} updated successfully", id)),
            data: TaskView::new(task, Utc::now()),
            timestamp: timestamp(),
        }),
        Err(e) => e.respond("update task"),
    }
}

pub async fn toggle_task(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();
    info!("Toggling task {}", id);
    match tasks::toggle_task(store.get_ref(), &id).await {
        Ok(task) => HttpResponse::Ok().json(TaskResponse {
            success: true,
            message: Some(format!("Task {} status changed", id)),
            data: TaskView::new(task, Utc::now()),
            timestamp: timestamp(),
        }),
        Err(e) => e.respond("toggle task"),
    }
}

pub async fn delete_task(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();
    info!("Deleting task {}", id);
    match tasks::delete_task(store.get_ref(), &id).await {
        Ok(()) => HttpResponse::Ok().json(DeleteTaskResponse {
            success: true,
            message: format!("Task {} deleted successfully", id),
            timestamp: timestamp(),
        }),
        Err(e) => e.respond("delete task"),
    }
}

pub async fn delete_completed(store: web::Data<dyn Store>) -> impl Responder {
    info!("Clearing completed tasks");
    match tasks::delete_completed(store.get_ref()).await {
        Ok(deleted_count) => HttpResponse::Ok().json(DeleteCompletedResponse {
            success: true,
            message: format!("{} completed tasks removed", deleted_count),
            deleted_count,
            timestamp: timestamp(),
        }),
        Err(e) => e.respond("delete completed tasks"),
    }
}

pub async fn task_stats(
    store: web::Data<dyn Store>,
    query: web::Query<TaskStatsRequest>,
) -> impl Responder {
    info!("Fetching task statistics");
    let limit = match query.limit.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => match raw.parse::<u64>() {
            Ok(n) if n > 0 => n,
            _ => return AppError::validation("limit must be a positive integer").respond("get task stats"),
        },
        None => DEFAULT_RECENT_LIMIT,
    };

    let stats = match tasks::task_stats(store.get_ref()).await {
        Ok(stats) => stats,
        Err(e) => return e.respond("get task stats"),
    };
    match tasks::recent_tasks(store.get_ref(), limit).await {
        Ok(recent_tasks) => HttpResponse::Ok().json(TaskStatsResponse {
            success: true,
            data: TaskStatsData { stats, recent_tasks },
            timestamp: timestamp(),
        }),
        Err(e) => e.respond("get recent tasks"),
    }
}
