use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use humantime::format_duration;
use serde::Serialize;
use std::time::Duration;

use crate::{constants::START_TIME, repositories::user::UserRepository, AppState};

#[derive(Serialize)]
struct HealthCheckResponse {
    success: bool,
    message: &'static str,
    timestamp: String,
    environment: String,
    version: &'static str,
    uptime: String,
    database: &'static str,
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now_utc = Utc::now();
    let uptime_secs = now_utc.signed_duration_since(*START_TIME).num_seconds().max(0) as u64;

    let database = match state.auth_handler.user_repo.check_connection().await {
        Ok(_) => "OK",
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            "Unavailable"
        }
    };

    HttpResponse::Ok().json(HealthCheckResponse {
        success: true,
        message: "Placify Backend API is running!",
        timestamp: now_utc.to_rfc3339(),
        environment: state.environment.to_string(),
        version: env!("CARGO_PKG_VERSION"),
        uptime: format_duration(Duration::from_secs(uptime_secs)).to_string(),
        database,
    })
}
