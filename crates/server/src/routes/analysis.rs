use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use topology::{AnalysisReport, AnalysisView};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    extract::{AppPath, AppQuery},
};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisHistory {
    pub analyses: Vec<AnalysisReport>,
}

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/networks/{network_id}/analyze", post(analyze_network))
        .route("/networks/{network_id}/analyses", get(list_analyses))
        .with_state(state.clone())
}

async fn analyze_network(
    State(state): State<AppState>,
    AppPath(network_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<AnalysisView>>, ApiError> {
    let view = state.topology().analyze(network_id).await?;
    Ok(Json(ApiResponse::success(view)))
}

async fn list_analyses(
    State(state): State<AppState>,
    AppPath(network_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<HistoryQuery>,
) -> Result<Json<ApiResponse<AnalysisHistory>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(state.analysis_config().recent_reports_limit);
    if limit < 1 {
        return Err(ApiError::BadRequest("limit must be positive".into()));
    }
    let analyses = state.topology().recent_reports(network_id, limit).await?;
    Ok(Json(ApiResponse::success(AnalysisHistory { analyses })))
}
