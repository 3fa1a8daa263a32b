// src/routes.rs

pub mod routes;

pub mod status {
    pub mod status_handlers;
    pub mod status_models;
}

pub mod task_view {
    pub mod task_view_handlers;
    pub mod task_view_models;
}

pub mod project_view {
    pub mod project_view_handlers;
    pub mod project_view_models;
}
