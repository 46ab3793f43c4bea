//! Health Check Handlers
//!
//! - `GET /health` reports the build
//! - `GET /health/live` answers as long as the process serves requests
//! - `GET /health/ready` probes the storage backend, 503 when it is down

use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::config::StorageBackend;
use crate::startup::AppState;

static STARTED: Lazy<(Instant, DateTime<Utc>)> = Lazy::new(|| (Instant::now(), Utc::now()));

/// Slower round trips than this mark the database as degraded
const DEGRADED_AFTER_MS: u64 = 100;

/// Pin the uptime clock. Called once while the application is built.
pub fn mark_started() {
    Lazy::force(&STARTED);
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Readiness report
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub environment: String,
    pub uptime_seconds: u64,
    pub started_at: DateTime<Utc>,
    pub storage: StorageHealth,
}

#[derive(Debug, Serialize)]
pub struct StorageHealth {
    pub backend: StorageBackend,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    fn from_latency(latency_ms: u64) -> Self {
        if latency_ms < DEGRADED_AFTER_MS {
            Self::Healthy
        } else {
            Self::Degraded
        }
    }

    fn status_code(self) -> StatusCode {
        match self {
            Self::Healthy | Self::Degraded => StatusCode::OK,
            Self::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "alive",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let storage = probe_storage(&state).await;
    let (started, started_at) = *STARTED;

    let report = ReadinessResponse {
        status: storage.status,
        version: env!("CARGO_PKG_VERSION"),
        environment: state.settings.environment.clone(),
        uptime_seconds: started.elapsed().as_secs(),
        started_at,
        storage,
    };

    (report.status.status_code(), Json(report))
}

async fn probe_storage(state: &AppState) -> StorageHealth {
    let backend = state.settings.database.backend;

    let Some(pool) = &state.db else {
        // In-process maps cannot be unreachable.
        return StorageHealth {
            backend,
            status: HealthStatus::Healthy,
            latency_ms: None,
            error: None,
        };
    };

    let probe_start = Instant::now();
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => {
            let latency = probe_start.elapsed().as_millis() as u64;
            StorageHealth {
                backend,
                status: HealthStatus::from_latency(latency),
                latency_ms: Some(latency),
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Readiness probe failed");
            StorageHealth {
                backend,
                status: HealthStatus::Unhealthy,
                latency_ms: None,
                error: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_thresholds() {
        assert_eq!(HealthStatus::from_latency(5), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_latency(250), HealthStatus::Degraded);
    }

    #[test]
    fn test_only_unhealthy_is_unavailable() {
        assert_eq!(HealthStatus::Degraded.status_code(), StatusCode::OK);
        assert_eq!(HealthStatus::Unhealthy.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
