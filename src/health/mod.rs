/*!
 * # Health Check Module
 *
 * Endpoints for monitoring the catalog service:
 *
 * - Basic health check (`/health`) - Simple up/down status
 * - Readiness check (`/health/ready`) - Catalog tables are loaded
 * - Liveness check (`/health/live`) - Process is alive
 * - Detailed health check (`/health/details`) - Per-component status
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};

use crate::catalog::CatalogTables;
use crate::services::integrity::check_integrity;

/// Basic health status
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
    Degraded,
}

impl HealthStatus {
    fn status_code(self) -> StatusCode {
        match self {
            HealthStatus::Up | HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Health check detail
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthDetail {
    pub status: HealthStatus,
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Overall health information
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthInfo {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub details: BTreeMap<String, HealthDetail>,
}

/// Health check state
#[derive(Clone)]
pub struct HealthState {
    pub tables: Arc<CatalogTables>,
    pub start_time: SystemTime,
}

impl HealthState {
    pub fn new(tables: Arc<CatalogTables>) -> Self {
        Self {
            tables,
            start_time: SystemTime::now(),
        }
    }

    /// Calculate system uptime
    pub fn uptime(&self) -> u64 {
        SystemTime::now()
            .duration_since(self.start_time)
            .unwrap_or(Duration::from_secs(0))
            .as_secs()
    }

    /// Evaluates every component. An empty catalog is down; integrity
    /// issues only degrade.
    pub fn evaluate(&self) -> HealthInfo {
        let now = Utc::now();
        let mut details = BTreeMap::new();

        let tables = &self.tables;
        let catalog_status = if tables.brands.is_empty() || tables.products.is_empty() {
            HealthStatus::Down
        } else {
            HealthStatus::Up
        };
        details.insert(
            "catalog".to_string(),
            HealthDetail {
                status: catalog_status,
                message: Some(format!(
                    "{} brands, {} categories, {} products",
                    tables.brands.len(),
                    tables.categories.len(),
                    tables.products.len()
                )),
                timestamp: now,
            },
        );

        let report = check_integrity(tables);
        details.insert(
            "integrity".to_string(),
            HealthDetail {
                status: if report.is_clean() {
                    HealthStatus::Up
                } else {
                    HealthStatus::Degraded
                },
                message: Some(format!("{} issues", report.issue_count())),
                timestamp: now,
            },
        );

        let status = if details.values().any(|d| d.status == HealthStatus::Down) {
            HealthStatus::Down
        } else if details.values().any(|d| d.status == HealthStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Up
        };

        if status != HealthStatus::Up {
            for (name, detail) in &details {
                if detail.status != HealthStatus::Up {
                    warn!("Component {name} is not healthy: {:?}", detail.status);
                }
            }
        }

        HealthInfo {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: now,
            uptime_seconds: self.uptime(),
            details,
        }
    }
}

/// Returns build and version information
pub async fn version_info() -> impl IntoResponse {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "commit": option_env!("GIT_HASH").unwrap_or("unknown"),
        "built": option_env!("BUILD_TIME").unwrap_or("unknown"),
    }))
}

/// Basic health check endpoint
pub async fn health_check() -> impl IntoResponse {
    info!("Health check endpoint called");

    (
        StatusCode::OK,
        Json(json!({
            "status": HealthStatus::Up,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}

/// Readiness check endpoint
pub async fn readiness_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    info!("Readiness check endpoint called");

    let health = state.evaluate();
    (
        health.status.status_code(),
        Json(json!({
            "ready": health.status != HealthStatus::Down,
            "timestamp": health.timestamp,
        })),
    )
}

/// Liveness check endpoint
pub async fn liveness_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "alive": true,
            "uptime_seconds": state.uptime(),
            "timestamp": Utc::now(),
        })),
    )
}

/// Detailed health check endpoint
pub async fn detailed_health(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    info!("Detailed health check endpoint called");

    let health = state.evaluate();
    (health.status.status_code(), Json(health))
}

/// Creates router with health check endpoints
pub fn health_routes<S>(tables: Arc<CatalogTables>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let health_state = Arc::new(HealthState::new(tables));

    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
        .route("/details", get(detailed_health))
        .route("/version", get(version_info))
        .with_state(health_state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_catalog_is_degraded_by_integrity_issues() {
        let state = HealthState::new(Arc::new(CatalogTables::embedded().unwrap()));
        let health = state.evaluate();
        assert_eq!(health.status, HealthStatus::Degraded);
        assert_eq!(health.details["catalog"].status, HealthStatus::Up);
        assert_eq!(health.status.status_code(), StatusCode::OK);
    }

    #[test]
    fn empty_catalog_is_down() {
        let state = HealthState::new(Arc::new(CatalogTables::default()));
        let health = state.evaluate();
        assert_eq!(health.status, HealthStatus::Down);
        assert_eq!(health.status.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
