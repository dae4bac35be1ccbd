//! Health check handler

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ProcedureBackend;

pub const SERVICE_NAME: &str = "DICRI Evidence Management System API";

/// Health check state
#[derive(Clone)]
pub struct HealthState {
    pub backend: Arc<dyn ProcedureBackend>,
    pub started_at: Arc<Instant>,
}

/// Service health response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `OK` or `DEGRADED`
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: ComponentHealth,
}

/// Component health status
#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentHealth {
    pub status: String,
    pub latency_ms: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let db_start = Instant::now();
    let database = match state.backend.ping().await {
        Ok(()) => ComponentHealth {
            status: "ok".to_string(),
            latency_ms: Some(db_start.elapsed().as_millis() as u64),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database ping failed");
            ComponentHealth {
                status: "error".to_string(),
                latency_ms: None,
            }
        }
    };

    let (http_status, status) = if database.latency_ms.is_some() {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "DEGRADED")
    };

    (
        http_status,
        Json(HealthResponse {
            status: status.to_string(),
            timestamp: Utc::now(),
            service: SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            database,
        }),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::http::StatusCode;

    use crate::application::AuthService;
    use crate::domain::{BackendError, ProcedureBackend, ProcedureOutcome, ProcedureParams};
    use crate::infrastructure::storage::InMemoryProcedureBackend;
    use crate::interfaces::http::router::{create_router, ApiState, RouterOptions};
    use crate::interfaces::http::test_support::*;

    struct Unreachable;

    #[async_trait]
    impl ProcedureBackend for Unreachable {
        async fn invoke(
            &self,
            procedure: &str,
            _params: ProcedureParams,
        ) -> Result<ProcedureOutcome, BackendError> {
            Err(BackendError::Database(format!("{procedure}: connection refused")))
        }

        async fn ping(&self) -> Result<(), BackendError> {
            Err(BackendError::Database("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn healthy_without_credentials() {
        let (app, _) = test_app(InMemoryProcedureBackend::new());
        let (status, body) = send(&app, "GET", "/api/health", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert_eq!(body["service"], "DICRI Evidence Management System API");
        assert_eq!(body["database"]["status"], "ok");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn degraded_when_the_database_is_down() {
        let backend: Arc<dyn ProcedureBackend> = Arc::new(Unreachable);
        let auth = AuthService::new(backend.clone(), jwt_config(), TEST_BCRYPT_COST);
        let app = create_router(ApiState::new(backend, auth), RouterOptions::default());

        let (status, body) = send(&app, "GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "DEGRADED");
        assert_eq!(body["database"]["status"], "error");
    }
}
