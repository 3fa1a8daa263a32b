pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod query;
pub mod routes;
pub mod services;
pub mod stats;
pub mod store;

pub use routes::routes::{app_configure, AppState};
pub use routes::status::status_models::ServerInfo;
