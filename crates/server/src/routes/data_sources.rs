use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, post},
};
use chrono::{DateTime, Utc};
use db::{
    models::{
        data_source::{CreateDataSource, DataSourceError},
        network::NetworkError,
    },
    repositories::DataSourceRepository,
};
use serde::Serialize;
use topology::DataSource;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    extract::{AppJson, AppPath},
};

#[derive(Debug, Serialize)]
pub struct DataSourceStatus {
    #[serde(flatten)]
    pub data_source: DataSource,
    pub needs_update: bool,
}

impl DataSourceStatus {
    fn new(data_source: DataSource, now: DateTime<Utc>, stale_after_hours: i64) -> Self {
        Self {
            needs_update: data_source.needs_update(now, stale_after_hours),
            data_source,
        }
    }
}

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/networks/{network_id}/data-sources", post(add_data_source))
        .route("/data-sources/{data_source_id}", delete(remove_data_source))
        .route("/data-sources/{data_source_id}/refresh", post(refresh_data_source))
        .with_state(state.clone())
}

async fn add_data_source(
    State(state): State<AppState>,
    AppPath(network_id): AppPath<Uuid>,
    AppJson(payload): AppJson<CreateDataSource>,
) -> Result<(StatusCode, Json<ApiResponse<DataSourceStatus>>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Data source name must not be empty".into()));
    }
    let now = Utc::now();
    let data_source = state
        .store()
        .add_data_source(network_id, payload, now)
        .await?
        .ok_or(NetworkError::NotFound)?;
    tracing::info!(%network_id, data_source_id = %data_source.id, "data source added");
    let status = DataSourceStatus::new(data_source, now, state.analysis_config().stale_after_hours);
    Ok((StatusCode::CREATED, Json(ApiResponse::success(status))))
}

async fn remove_data_source(
    State(state): State<AppState>,
    AppPath(data_source_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if !state.store().remove_data_source(data_source_id).await? {
        return Err(DataSourceError::NotFound.into());
    }
    tracing::info!(%data_source_id, "data source removed");
    Ok(Json(ApiResponse::success(())))
}

async fn refresh_data_source(
    State(state): State<AppState>,
    AppPath(data_source_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<DataSourceStatus>>, ApiError> {
    let now = Utc::now();
    let row = DataSourceRepository::touch(&state.db().pool, data_source_id, now)
        .await?
        .ok_or(DataSourceError::NotFound)?;
    let data_source = DataSource::try_from(row)?;
    Ok(Json(ApiResponse::success(DataSourceStatus::new(
        data_source,
        now,
        state.analysis_config().stale_after_hours,
    ))))
}
