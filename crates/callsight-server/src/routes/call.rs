//! Call Routes - Stored calls and statistics

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use callsight::{CallRepository, PromptRepository};

use crate::models::{CallDetailResponse, StatsResponse};
use crate::AppState;

/// Get a stored call with its domain-specific payload and tonal analysis
#[utoipa::path(
    get,
    path = "/api/calls/{call_id}",
    params(
        ("call_id" = i64, Path, description = "Call ID")
    ),
    responses(
        (status = 200, description = "Call found", body = CallDetailResponse),
        (status = 404, description = "Call not found"),
        (status = 503, description = "Storage unavailable")
    ),
    tag = "Calls"
)]
pub async fn get_call(
    State(state): State<AppState>,
    Path(call_id): Path<i64>,
) -> Result<Json<CallDetailResponse>, (StatusCode, String)> {
    let calls = &state.calls;
    let call = state
        .gateway
        .storage("find_call", move || calls.find_call(call_id))
        .await
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?
        .ok_or((StatusCode::NOT_FOUND, format!("Call {} not found", call_id)))?;

    let domain_specific = state
        .gateway
        .storage("find_domain_specific", move || {
            calls.find_domain_specific(call_id)
        })
        .await
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?;

    let tonal_analysis = state
        .gateway
        .storage("find_tonal_analysis", move || calls.find_tonal_analysis(call_id))
        .await
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?;

    Ok(Json(CallDetailResponse {
        call: call.into(),
        domain_specific: domain_specific.map(Into::into),
        tonal_analysis: tonal_analysis.map(Into::into),
    }))
}

/// Row counts across calls and prompts
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Statistics", body = StatsResponse),
        (status = 503, description = "Storage unavailable")
    ),
    tag = "Calls"
)]
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, (StatusCode, String)> {
    let calls = &state.calls;
    let prompts = &state.prompts;

    let stats = state
        .gateway
        .storage("call_stats", move || calls.stats())
        .await
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?;
    let prompt_count = state
        .gateway
        .storage("prompt_count", move || prompts.count())
        .await
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?;

    Ok(Json(StatsResponse {
        total_calls: stats.total_calls,
        domain_specific_records: stats.domain_specific_records,
        prompts: prompt_count,
        known_pairs: state.knowledge.len(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/calls/:call_id", get(get_call))
        .route("/api/stats", get(get_stats))
}
