use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use log::{info, warn};

use super::status_models::{ServerInfo, StatusResponse};
use crate::store::Store;

pub async fn status_get(
    store: web::Data<dyn Store>,
    server: web::Data<ServerInfo>,
) -> impl Responder {
    info!("Checking API status");
    let connected = match store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Store ping failed: {}", e);
            false
        }
    };
    let now = Utc::now();
    HttpResponse::Ok().json(StatusResponse {
        status: "online".into(),
        store: store.backend().into(),
        connected,
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: (now - server.started_at).num_seconds(),
        timestamp: now.to_rfc3339(),
    })
}
