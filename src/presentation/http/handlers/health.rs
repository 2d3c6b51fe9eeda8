//! Health Check Handlers
//!
//! `GET /health` pings the database and Redis and reports per-dependency
//! status; `/health/live` and `/health/ready` are the Kubernetes-style
//! probe variants of the same checks.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::time::Instant;

use crate::startup::AppState;

/// Server start time for uptime calculation
static SERVER_START: Lazy<Instant> = Lazy::new(Instant::now);
static SERVER_START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Pin the server start time. Called once during startup so uptime is
/// measured from boot, not from the first probe.
pub fn init_server_start() {
    Lazy::force(&SERVER_START);
    Lazy::force(&SERVER_START_TIME);
}

/// Detailed health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub started_at: String,
    pub checks: HealthChecks,
}

/// Individual dependency health checks
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: ServiceHealth,
    pub redis: ServiceHealth,
    pub gateway: GatewayHealth,
}

/// Health of a single dependency
#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Relay gateway health
#[derive(Debug, Serialize)]
pub struct GatewayHealth {
    pub status: HealthStatus,
    pub active_connections: usize,
    pub active_rooms: usize,
}

/// Overall health status
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Simple liveness response
#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
}

/// Health check endpoint: pings both stores and reports uptime
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    probe(&state).await
}

/// Liveness probe: the process is up and serving
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { status: "alive" })
}

/// Readiness probe: 200 when traffic can be served, 503 otherwise
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    probe(&state).await
}

async fn probe(state: &AppState) -> (StatusCode, Json<HealthResponse>) {
    let uptime = SERVER_START.elapsed().as_secs();
    let started_at = SERVER_START_TIME.to_rfc3339();

    let db_health = check_database(state).await;
    let redis_health = check_redis(state).await;

    let gateway_health = GatewayHealth {
        status: HealthStatus::Healthy,
        active_connections: state.gateway.session_count(),
        active_rooms: state.gateway.active_room_count(),
    };

    let overall_status = determine_overall_status(&db_health, &redis_health);

    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: uptime,
        started_at,
        checks: HealthChecks {
            database: db_health,
            redis: redis_health,
            gateway: gateway_health,
        },
    };

    let status_code = match overall_status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

/// Check database connectivity and latency
async fn check_database(state: &AppState) -> ServiceHealth {
    let start = Instant::now();
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => {
            let latency = start.elapsed().as_millis() as u64;
            ServiceHealth {
                status: if latency < 100 {
                    HealthStatus::Healthy
                } else {
                    HealthStatus::Degraded
                },
                latency_ms: Some(latency),
                message: None,
            }
        }
        Err(e) => ServiceHealth {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            message: Some(format!("Database connection failed: {}", e)),
        },
    }
}

/// Check Redis connectivity and latency
async fn check_redis(state: &AppState) -> ServiceHealth {
    let start = Instant::now();
    let mut conn = state.redis.clone();
    let pong: Result<String, redis::RedisError> =
        redis::cmd("PING").query_async(&mut conn).await;
    match pong {
        Ok(_) => {
            let latency = start.elapsed().as_millis() as u64;
            ServiceHealth {
                status: if latency < 50 {
                    HealthStatus::Healthy
                } else {
                    HealthStatus::Degraded
                },
                latency_ms: Some(latency),
                message: None,
            }
        }
        Err(e) => ServiceHealth {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            message: Some(format!("Redis connection failed: {}", e)),
        },
    }
}

/// The database is load-bearing; Redis only degrades service (the room
/// list falls back to the database).
fn determine_overall_status(db: &ServiceHealth, redis: &ServiceHealth) -> HealthStatus {
    if db.status == HealthStatus::Unhealthy {
        return HealthStatus::Unhealthy;
    }

    if db.status == HealthStatus::Degraded
        || redis.status == HealthStatus::Unhealthy
        || redis.status == HealthStatus::Degraded
    {
        return HealthStatus::Degraded;
    }

    HealthStatus::Healthy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        let status = HealthStatus::Healthy;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"healthy\"");
    }

    #[test]
    fn test_redis_outage_degrades_but_does_not_fail() {
        let healthy = ServiceHealth {
            status: HealthStatus::Healthy,
            latency_ms: Some(10),
            message: None,
        };
        let down = ServiceHealth {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            message: Some("Connection refused".to_string()),
        };

        assert_eq!(
            determine_overall_status(&healthy, &down),
            HealthStatus::Degraded
        );
    }

    #[test]
    fn test_database_outage_is_unhealthy() {
        let healthy = ServiceHealth {
            status: HealthStatus::Healthy,
            latency_ms: Some(10),
            message: None,
        };
        let down = ServiceHealth {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            message: Some("Connection refused".to_string()),
        };

        assert_eq!(
            determine_overall_status(&down, &healthy),
            HealthStatus::Unhealthy
        );
        assert_eq!(
            determine_overall_status(&healthy, &healthy),
            HealthStatus::Healthy
        );
    }
}
