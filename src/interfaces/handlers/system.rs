use actix_web::{web, HttpResponse, Responder};
use humantime::format_duration;
use once_cell::sync::Lazy;
use chrono::Utc;
use std::{
    time::Duration,
    sync::{atomic::{AtomicI64, Ordering}, RwLock},
};
use serde::Serialize;
use crate::{
    constants::START_TIME,
    repositories::user::UserRepository,
    use_cases::extractors::AdminClaims,
    AppState,
};

const CACHE_SECONDS: i64 = 5;

#[derive(Serialize, Clone, Default)]
struct LivenessResponse {
    status: String,
    uptime: String,
    version: String,
    database: String,
}

#[derive(Serialize, Clone, Default)]
struct HealthCheckResponse {
    #[serde(flatten)]
    liveness: LivenessResponse,
    timestamp: String,
    start_at: String,
    today_date: String,
    environment: String,
}

static LAST_CHECK: AtomicI64 = AtomicI64::new(0);
static CACHED_STATUS: Lazy<RwLock<HealthCheckResponse>> = Lazy::new(||
    RwLock::new(HealthCheckResponse::default())
);

async fn build_health_response(state: &web::Data<AppState>) -> HealthCheckResponse {
    let now_utc = Utc::now();
    let uptime_duration = now_utc.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime_duration.num_seconds().max(0) as u64));

    let (status, db_status) = match state.auth_handler.user_repo.check_connection().await {
        Ok(_) => ("healthy", "OK"),
        Err(e) => {
            tracing::warn!("Health check database probe failed: {}", e);
            ("degraded", "Unavailable")
        }
    };

    HealthCheckResponse {
        liveness: LivenessResponse {
            status: status.to_string(),
            uptime: human_uptime.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: db_status.to_string(),
        },
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        today_date: now_utc.date_naive().to_string(),
        environment: state.environment.clone(),
    }
}

/// Rebuilds the cached report at most every few seconds.
async fn cached_health(state: &web::Data<AppState>) -> HealthCheckResponse {
    let now = Utc::now().timestamp();
    let last = LAST_CHECK.load(Ordering::Relaxed);

    if now - last > CACHE_SECONDS {
        let response = build_health_response(state).await;

        if let Ok(mut cache) = CACHED_STATUS.write() {
            *cache = response.clone();
            LAST_CHECK.store(now, Ordering::Relaxed);
        }

        response
    } else {
        let cached = CACHED_STATUS
            .read()
            .map(|response| response.clone())
            .map_err(|e| e.to_string());

        match cached {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("HealthCheck cache lock poisoned: {}", e);
                build_health_response(state).await
            }
        }
    }
}

pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(cached_health(&state).await.liveness)
}

pub async fn admin_health_check(
    _admin: AdminClaims,
    state: web::Data<AppState>,
) -> impl Responder {
    HttpResponse::Ok().json(cached_health(&state).await)
}
