use std::io;
use std::sync::Arc;

use actix_web::{middleware::Logger, App, HttpServer};
use chrono::Utc;
use dotenv::dotenv;
use log::{info, warn};

use taskboard_backend::config::AppConfig;
use taskboard_backend::store::{MemoryStore, MySqlStore, Store};
use taskboard_backend::{app_configure, AppState, ServerInfo};

fn startup_error(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(startup_error)?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(database_url) => {
            let store = MySqlStore::connect(database_url, config.max_connections)
                .await
                .map_err(startup_error)?;
            if config.run_migrations {
                store.migrate().await.map_err(startup_error)?;
            }
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL is not set, data will only live in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState {
        store,
        server: ServerInfo { started_at: Utc::now() },
    };

    info!("Server running at http://{} ({} store)", config.server_address, state.store.backend());

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(app_configure(state.clone()))
    })
    .bind(config.server_address.as_str())?
    .run()
    .await
}
