//! Skyline Marine catalog library
//!
//! Brand → category → product browsing over a static seed catalog: lookup
//! helpers, observable stores with simulated latency, route resolution and
//! the read-only JSON API built on them.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod catalog;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod models;
pub mod openapi;
pub mod queries;
pub mod repositories;
pub mod services;
pub mod stores;
pub mod tracing;

use axum::{response::Json, routing::get, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::catalog::CatalogTables;
use crate::services::{CatalogService, CatalogServices, NavigationService};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub tables: Arc<CatalogTables>,
    pub services: CatalogServices,
}

impl AppState {
    /// State over the in-memory repositories, with the latency the config asks for.
    pub fn new(config: config::AppConfig, tables: Arc<CatalogTables>) -> Self {
        let services = CatalogServices::in_memory(tables.clone(), config.store_latency());
        Self {
            config,
            tables,
            services,
        }
    }

    pub fn catalog(&self) -> Arc<CatalogService> {
        self.services.catalog.clone()
    }

    pub fn navigation(&self) -> Arc<NavigationService> {
        self.services.navigation.clone()
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Catalog API routes, mounted under `/api/v1`
pub fn api_v1_routes() -> Router<AppState> {
    use handlers::catalog;

    Router::new()
        .route("/status", get(api_status))
        .nest("/brands", catalog::brand_routes())
        .nest("/products", catalog::product_routes())
        .nest("/categories", catalog::category_routes())
        .route("/navigation/menu", get(catalog::navigation_menu))
        .route("/catalog/integrity", get(catalog::catalog_integrity))
}

/// Full application router without the outer HTTP layers (CORS,
/// compression) that depend on deployment config.
pub fn build_router(state: AppState) -> Router {
    let tables = state.tables.clone();
    Router::<AppState>::new()
        .route("/", get(|| async { "skyline-catalog up" }))
        .nest("/health", health::health_routes(tables))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "git": option_env!("GIT_HASH").unwrap_or("unknown"),
        "build_time": option_env!("BUILD_TIME").unwrap_or("unknown"),
        "service": "skyline-catalog",
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(status_data)))
}
