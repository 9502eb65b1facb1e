use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use skyline_catalog::{build_router, catalog::CatalogTables, config::AppConfig, AppState};
use tower::ServiceExt;

/// Helper harness driving the full router over the embedded seed catalog.
pub struct TestApp {
    router: Router,
    #[allow(dead_code)]
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let tables = CatalogTables::embedded().expect("embedded seed should parse");
        Self::with_tables(tables)
    }

    pub fn with_tables(tables: CatalogTables) -> Self {
        let cfg = AppConfig::new("127.0.0.1".to_string(), 18_080, "test".to_string());
        let state = AppState::new(cfg, Arc::new(tables));
        Self {
            router: build_router(state.clone()),
            state,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = builder.body(Body::empty()).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// GET `uri` and decode the JSON body.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let response = self.request(Method::GET, uri, &[]).await;
        let status = response.status();
        (status, response_json(response).await)
    }
}

pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

/// Values of `field` across a JSON array.
#[allow(dead_code)]
pub fn field_values<'a>(items: &'a Value, field: &str) -> Vec<&'a str> {
    items
        .as_array()
        .expect("expected a JSON array")
        .iter()
        .filter_map(|item| item[field].as_str())
        .collect()
}
