//! Domain Routes - Known domain/category pairs

use axum::{extract::State, routing::get, Json, Router};

use crate::models::DomainsResponse;
use crate::AppState;

/// List known domain/category pairs
#[utoipa::path(
    get,
    path = "/api/domains",
    responses(
        (status = 200, description = "Known pairs grouped by domain", body = DomainsResponse)
    ),
    tag = "Domains"
)]
pub async fn list_domains(State(state): State<AppState>) -> Json<DomainsResponse> {
    let domains = state.knowledge.grouped();
    let total_pairs = domains.values().map(Vec::len).sum();

    Json(DomainsResponse {
        domains,
        total_pairs,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/domains", get(list_domains))
}
