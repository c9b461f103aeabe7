use std::sync::Arc;

use aseobi_core::Catalog;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    catalog: Arc<Catalog>,
    gateway_mode: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub categories: usize,
    pub products: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub catalog: CatalogStats,
    pub gateway_mode: &'static str,
    pub checked_at: String,
}

pub fn router(catalog: Arc<Catalog>, gateway_mode: &'static str) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { catalog, gateway_mode })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        status: "ready",
        service: "aseobi-server",
        catalog: CatalogStats {
            categories: state.catalog.len(),
            products: state.catalog.product_count(),
        },
        gateway_mode: state.gateway_mode,
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}
