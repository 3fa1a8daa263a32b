use std::sync::Arc;

use actix_web::web;

use super::status::status_models::ServerInfo;
use crate::error::AppError;
use crate::store::Store;

/// Everything the route handlers pull out of app data.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub server: ServerInfo,
}

pub fn app_configure(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::from(state.store))
            .app_data(web::Data::new(state.server))
            .app_data(web::JsonConfig::default().error_handler(|err, _| AppError::validation(err.to_string()).into()))
            .app_data(web::QueryConfig::default().error_handler(|err, _| AppError::validation(err.to_string()).into()))
            .service(
                web::scope("/api")
                    .configure(status_configure)
                    .configure(task_view_configure)
                    .configure(project_view_configure),
            );
    }
}

use super::status::status_handlers;

pub fn status_configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/status", web::get().to(status_handlers::status_get));
}

use super::task_view::task_view_handlers;

// Static segments go before "/{id}"
pub fn task_view_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tasks")
            .route("", web::get().to(task_view_handlers::list_tasks))
            .route("", web::post().to(task_view_handlers::create_task))
            .route("/search", web::get().to(task_view_handlers::search_tasks))
            .route("/stats", web::get().to(task_view_handlers::task_stats))
            .route("/completed", web::delete().to(task_view_handlers::delete_completed))
            .route("/{id}", web::get().to(task_view_handlers::get_task))
            .route("/{id}", web::put().to(task_view_handlers::update_task))
            .route("/{id}", web::delete().to(task_view_handlers::delete_task))
            .route("/{id}/toggle", web::patch().to(task_view_handlers::toggle_task))
    );
}

use super::project_view::project_view_handlers;

pub fn project_view_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/projects")
            .route("", web::get().to(project_view_handlers::list_projects))
            .route("", web::post().to(project_view_handlers::create_project))
            .route("/stats", web::get().to(project_view_handlers::project_stats))
            .route("/{id}", web::get().to(project_view_handlers::get_project))
            .route("/{id}", web::put().to(project_view_handlers::update_project))
            .route("/{id}", web::delete().to(project_view_handlers::delete_project))
            .route("/{id}/tasks", web::post().to(project_view_handlers::add_task_ref))
            .route("/{id}/tasks", web::delete().to(project_view_handlers::clear_task_refs))
            .route("/{id}/tasks/{task_id}", web::delete().to(project_view_handlers::remove_task_ref))
    );
}
